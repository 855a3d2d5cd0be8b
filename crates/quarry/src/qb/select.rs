//! SELECT builder.

use crate::qb::expr::Operand;
use crate::qb::state::{
    CanGroupBy, CanHaving, CanJoin, CanLimit, CanOffset, CanOrderBy, CanReplaceFilter, Filtered,
    Grouped, HavingSet, Joinable, Limited, OffsetSet, Ordered, Stage,
};
use crate::qb::subquery::{Cte, Subquery};
use crate::schema::{Column, Table};
use crate::sql::Fragment;
use std::marker::PhantomData;
use std::sync::Arc;

/// One projected output field: an expression and the name it is returned under.
#[derive(Debug, Clone)]
pub struct SelectField {
    pub(crate) name: String,
    pub(crate) expr: Fragment,
}

impl SelectField {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Project `operand` under `name`.
pub fn field(name: impl Into<String>, operand: impl Operand) -> SelectField {
    SelectField {
        name: name.into(),
        expr: operand.into_operand(None),
    }
}

impl From<&Column> for SelectField {
    fn from(column: &Column) -> Self {
        SelectField {
            name: column.field().to_string(),
            expr: Fragment::column(column),
        }
    }
}

/// Something a SELECT can read from.
#[derive(Debug, Clone)]
pub enum Source {
    Table(Table),
    Subquery(Subquery),
    Cte(Cte),
}

impl Source {
    /// The columns this source exposes to the enclosing query.
    pub fn table(&self) -> &Table {
        match self {
            Source::Table(t) => t,
            Source::Subquery(s) => s.table(),
            Source::Cte(c) => c.table(),
        }
    }
}

impl From<&Table> for Source {
    fn from(table: &Table) -> Self {
        Source::Table(table.clone())
    }
}

impl From<Table> for Source {
    fn from(table: Table) -> Self {
        Source::Table(table)
    }
}

impl From<&Subquery> for Source {
    fn from(subquery: &Subquery) -> Self {
        Source::Subquery(subquery.clone())
    }
}

impl From<Subquery> for Source {
    fn from(subquery: Subquery) -> Self {
        Source::Subquery(subquery)
    }
}

impl From<&Cte> for Source {
    fn from(cte: &Cte) -> Self {
        Source::Cte(cte.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    pub(crate) fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Join {
    pub(crate) kind: JoinKind,
    pub(crate) source: Source,
    pub(crate) on: Fragment,
}

/// Everything a SELECT statement is compiled from. Pure data; no SQL text.
#[derive(Debug, Clone)]
pub(crate) struct SelectConfig {
    pub(crate) ctes: Vec<Cte>,
    pub(crate) distinct: bool,
    pub(crate) fields: Vec<SelectField>,
    pub(crate) from: Source,
    pub(crate) joins: Vec<Join>,
    pub(crate) filter: Option<Fragment>,
    pub(crate) group_by: Vec<Fragment>,
    pub(crate) having: Option<Fragment>,
    pub(crate) order_by: Vec<Fragment>,
    pub(crate) limit: Option<Fragment>,
    pub(crate) offset: Option<Fragment>,
}

/// A SELECT that has its projection but no FROM yet.
#[derive(Debug, Clone)]
#[must_use]
pub struct SelectBuilder {
    ctes: Vec<Cte>,
    distinct: bool,
    /// `None` selects every column of the FROM source.
    fields: Option<Vec<SelectField>>,
}

impl SelectBuilder {
    pub(crate) fn new(ctes: Vec<Cte>, distinct: bool, fields: Option<Vec<SelectField>>) -> Self {
        Self {
            ctes,
            distinct,
            fields,
        }
    }

    pub fn from(self, source: impl Into<Source>) -> SelectQuery<Joinable> {
        let from = source.into();
        let fields = match self.fields {
            Some(fields) => fields,
            None => from.table().columns().iter().map(SelectField::from).collect(),
        };
        SelectQuery {
            config: SelectConfig {
                ctes: self.ctes,
                distinct: self.distinct,
                fields,
                from,
                joins: Vec::new(),
                filter: None,
                group_by: Vec::new(),
                having: None,
                order_by: Vec::new(),
                limit: None,
                offset: None,
            },
            _stage: PhantomData,
        }
    }
}

/// Start a SELECT of explicit fields.
///
/// ```ignore
/// let q = select([&users["id"], &users["name"]])
///     .from(&users)
///     .filter(eq(&users["id"], 5));
/// ```
pub fn select<I>(fields: I) -> SelectBuilder
where
    I: IntoIterator,
    I::Item: Into<SelectField>,
{
    SelectBuilder::new(
        Vec::new(),
        false,
        Some(fields.into_iter().map(Into::into).collect()),
    )
}

/// Start a SELECT of every column of the FROM source, in declared order.
pub fn select_all() -> SelectBuilder {
    SelectBuilder::new(Vec::new(), false, None)
}

pub fn select_distinct<I>(fields: I) -> SelectBuilder
where
    I: IntoIterator,
    I::Item: Into<SelectField>,
{
    SelectBuilder::new(
        Vec::new(),
        true,
        Some(fields.into_iter().map(Into::into).collect()),
    )
}

/// A SELECT in stage `S`.
///
/// Each clause method consumes the builder and returns it in a later stage,
/// so compiled output can never be changed by a later call.
#[derive(Debug, Clone)]
#[must_use]
pub struct SelectQuery<S: Stage = Joinable> {
    pub(crate) config: SelectConfig,
    _stage: PhantomData<S>,
}

impl<S: Stage> SelectQuery<S> {
    fn into_stage<T: Stage>(self) -> SelectQuery<T> {
        SelectQuery {
            config: self.config,
            _stage: PhantomData,
        }
    }

    /// Use this query as an aliased FROM/JOIN source.
    ///
    /// The returned subquery exports one column per projected field, scoped to
    /// `alias`.
    pub fn as_subquery(self, alias: impl Into<String>) -> Subquery {
        Subquery::new(alias.into(), Arc::new(self.config))
    }

    /// Use this query as a named CTE, registered on an outer query with
    /// [`with`](crate::qb::with).
    pub fn as_cte(self, name: impl Into<String>) -> Cte {
        Cte::new(name.into(), Arc::new(self.config))
    }
}

// ==================== JOIN ====================

impl<S: CanJoin> SelectQuery<S> {
    fn join(mut self, kind: JoinKind, source: impl Into<Source>, on: Fragment) -> Self {
        self.config.joins.push(Join {
            kind,
            source: source.into(),
            on,
        });
        self
    }

    pub fn inner_join(self, source: impl Into<Source>, on: Fragment) -> Self {
        self.join(JoinKind::Inner, source, on)
    }

    pub fn left_join(self, source: impl Into<Source>, on: Fragment) -> Self {
        self.join(JoinKind::Left, source, on)
    }

    pub fn right_join(self, source: impl Into<Source>, on: Fragment) -> Self {
        self.join(JoinKind::Right, source, on)
    }

    /// Not available on MySQL; compiling there fails with `UnsupportedOperation`.
    pub fn full_join(self, source: impl Into<Source>, on: Fragment) -> Self {
        self.join(JoinKind::Full, source, on)
    }
}

// ==================== WHERE ====================

impl SelectQuery<Joinable> {
    /// Set the WHERE predicate. `None` (e.g. an empty [`and`](crate::qb::and))
    /// emits no WHERE clause.
    pub fn filter(mut self, condition: impl Into<Option<Fragment>>) -> SelectQuery<Filtered> {
        self.config.filter = condition.into();
        self.into_stage()
    }
}

impl<S: CanReplaceFilter> SelectQuery<S> {
    /// Replace the WHERE predicate. `None` removes it.
    pub fn replace_filter(mut self, condition: impl Into<Option<Fragment>>) -> Self {
        self.config.filter = condition.into();
        self
    }
}

// ==================== GROUP BY / HAVING ====================

impl<S: CanGroupBy> SelectQuery<S> {
    pub fn group_by<I>(mut self, items: I) -> SelectQuery<Grouped>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.config.group_by = items.into_iter().map(Into::into).collect();
        self.into_stage()
    }
}

impl<S: CanHaving> SelectQuery<S> {
    pub fn having(mut self, condition: impl Into<Option<Fragment>>) -> SelectQuery<HavingSet> {
        self.config.having = condition.into();
        self.into_stage()
    }
}

// ==================== ORDER BY / LIMIT / OFFSET ====================

impl<S: CanOrderBy> SelectQuery<S> {
    /// Columns sort ascending; wrap with [`asc`](crate::qb::asc) /
    /// [`desc`](crate::qb::desc) to be explicit.
    pub fn order_by<I>(mut self, items: I) -> SelectQuery<Ordered>
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        self.config.order_by = items.into_iter().map(Into::into).collect();
        self.into_stage()
    }
}

impl<S: CanLimit> SelectQuery<S> {
    /// Always bound as a parameter; pass a [`placeholder`](crate::qb::placeholder)
    /// to supply it at execution time.
    pub fn limit(mut self, limit: impl Operand) -> SelectQuery<Limited> {
        self.config.limit = Some(limit.into_operand(None));
        self.into_stage()
    }
}

impl<S: CanOffset> SelectQuery<S> {
    pub fn offset(mut self, offset: impl Operand) -> SelectQuery<OffsetSet> {
        self.config.offset = Some(offset.into_operand(None));
        self.into_stage()
    }
}

impl<S: Stage> Operand for SelectQuery<S> {
    /// A scalar or IN/EXISTS subquery, rendered in parentheses.
    fn into_operand(self, _hint: Option<&Column>) -> Fragment {
        Fragment::subquery(Arc::new(self.config))
    }
}
