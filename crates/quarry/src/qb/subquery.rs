//! Derived sources: aliased subqueries and named CTEs.

use crate::qb::select::{SelectBuilder, SelectConfig, SelectField};
use crate::schema::{Column, ColumnType, Table};
use std::ops::Index;
use std::sync::Arc;

fn exported(name: &str, config: &SelectConfig) -> Table {
    Table::derived(
        name,
        config.fields.iter().map(|f| {
            let ty: Option<ColumnType> = f.expr.as_column().and_then(Column::column_type);
            (f.name.clone(), ty)
        }),
    )
}

/// A SELECT used as a FROM/JOIN source: `( ... ) AS "alias"`.
///
/// Its columns are the inner query's output fields, referenced through the
/// alias: `sq["id"]` renders as `"sq"."id"`.
#[derive(Debug, Clone)]
pub struct Subquery {
    pub(crate) config: Arc<SelectConfig>,
    table: Table,
}

impl Subquery {
    pub(crate) fn new(alias: String, config: Arc<SelectConfig>) -> Self {
        let table = exported(&alias, &config);
        Self { config, table }
    }

    pub fn alias(&self) -> &str {
        self.table.name()
    }

    /// Exported columns.
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.table.column(field)
    }
}

impl Index<&str> for Subquery {
    type Output = Column;

    fn index(&self, field: &str) -> &Column {
        &self.table[field]
    }
}

/// A named common table expression.
///
/// Register it with [`with`] on the statement that reads from it; referencing
/// an unregistered CTE fails to compile with `MalformedQuery`.
#[derive(Debug, Clone)]
pub struct Cte {
    pub(crate) config: Arc<SelectConfig>,
    table: Table,
}

impl Cte {
    pub(crate) fn new(name: String, config: Arc<SelectConfig>) -> Self {
        let table = exported(&name, &config);
        Self { config, table }
    }

    pub fn name(&self) -> &str {
        self.table.name()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.table.column(field)
    }
}

impl Index<&str> for Cte {
    type Output = Column;

    fn index(&self, field: &str) -> &Column {
        &self.table[field]
    }
}

/// A `WITH` prefix waiting for its SELECT.
#[derive(Debug, Clone)]
#[must_use]
pub struct WithBuilder {
    ctes: Vec<Cte>,
}

/// Register CTEs for the following SELECT, in order.
///
/// ```ignore
/// let active = select_all().from(&users).filter(eq(&users["active"], true)).as_cte("active");
/// let q = with([&active]).select_all().from(&active);
/// // WITH "active" AS (SELECT ...) SELECT "active"."id", ... FROM "active"
/// ```
pub fn with<'a, I>(ctes: I) -> WithBuilder
where
    I: IntoIterator<Item = &'a Cte>,
{
    WithBuilder {
        ctes: ctes.into_iter().cloned().collect(),
    }
}

impl WithBuilder {
    pub fn select<I>(self, fields: I) -> SelectBuilder
    where
        I: IntoIterator,
        I::Item: Into<SelectField>,
    {
        SelectBuilder::new(self.ctes, false, Some(fields.into_iter().map(Into::into).collect()))
    }

    pub fn select_all(self) -> SelectBuilder {
        SelectBuilder::new(self.ctes, false, None)
    }

    pub fn select_distinct<I>(self, fields: I) -> SelectBuilder
    where
        I: IntoIterator,
        I::Item: Into<SelectField>,
    {
        SelectBuilder::new(self.ctes, true, Some(fields.into_iter().map(Into::into).collect()))
    }
}
