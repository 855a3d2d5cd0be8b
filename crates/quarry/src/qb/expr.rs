//! Expression functions for WHERE/HAVING/ON/ORDER BY clauses.
//!
//! Every function is a pure constructor returning a [`Fragment`]. Operands go
//! through [`Operand`]: columns, fragments and subqueries pass through, any
//! other scalar is bound as a parameter (typed after the column on the other
//! side of the operator, when there is one). So `eq(&users["id"], 5)` and
//! `eq(&users["id"], &posts["author_id"])` have the same call shape.
//!
//! Shape errors (an empty `in_array` list, a template with the wrong number of
//! arguments) are kept inside the fragment and reported as `MalformedQuery`
//! when the statement is compiled.

use crate::schema::Column;
use crate::sql::{Fragment, Param};
use crate::value::{Value, for_each_scalar};

/// Something that can stand on either side of an operator.
pub trait Operand {
    /// Lower to a fragment. `hint` is the column on the other side of the
    /// operator, used to type bound parameters.
    fn into_operand(self, hint: Option<&Column>) -> Fragment;
}

impl Operand for Fragment {
    fn into_operand(self, _hint: Option<&Column>) -> Fragment {
        self
    }
}

impl Operand for &Column {
    fn into_operand(self, _hint: Option<&Column>) -> Fragment {
        Fragment::column(self)
    }
}

impl Operand for Column {
    fn into_operand(self, _hint: Option<&Column>) -> Fragment {
        Fragment::column(&self)
    }
}

impl Operand for Param {
    fn into_operand(self, hint: Option<&Column>) -> Fragment {
        let ty = self.ty.or_else(|| hint.and_then(Column::column_type));
        Fragment::bound(self.typed(ty))
    }
}

fn bind(value: Value, hint: Option<&Column>) -> Fragment {
    Fragment::bound(Param::new(value).typed(hint.and_then(Column::column_type)))
}

macro_rules! impl_scalar_operand {
    ($($t:ty),* $(,)?) => {
        $(
            impl Operand for $t {
                fn into_operand(self, hint: Option<&Column>) -> Fragment {
                    bind(Value::from(self), hint)
                }
            }
        )*
    };
}

for_each_scalar!(impl_scalar_operand);

impl<T: Into<Value>> Operand for Option<T> {
    fn into_operand(self, hint: Option<&Column>) -> Fragment {
        bind(Value::from(self), hint)
    }
}

/// Lower `left` then `right`, typing `right` after `left` when it is a column.
fn pair(left: impl Operand, right: impl Operand) -> (Fragment, Fragment) {
    let left = left.into_operand(None);
    let right = right.into_operand(left.as_column());
    (left, right)
}

fn binary(left: impl Operand, op: &'static str, right: impl Operand) -> Fragment {
    let (left, right) = pair(left, right);
    Fragment::nested([left, Fragment::raw(op), right])
}

/// A value supplied by name at execution time (see [`Bindings`](crate::sql::Bindings)).
pub fn placeholder(name: impl Into<String>) -> Param {
    Param::placeholder(name)
}

/// Literal SQL text.
pub fn raw(text: impl Into<String>) -> Fragment {
    let text: String = text.into();
    Fragment::raw(text)
}

pub fn eq(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " = ", right)
}

pub fn ne(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " <> ", right)
}

pub fn gt(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " > ", right)
}

pub fn gte(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " >= ", right)
}

pub fn lt(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " < ", right)
}

pub fn lte(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " <= ", right)
}

pub fn like(left: impl Operand, pattern: impl Operand) -> Fragment {
    binary(left, " LIKE ", pattern)
}

pub fn not_like(left: impl Operand, pattern: impl Operand) -> Fragment {
    binary(left, " NOT LIKE ", pattern)
}

pub fn is_null(operand: impl Operand) -> Fragment {
    Fragment::nested([operand.into_operand(None), Fragment::raw(" IS NULL")])
}

pub fn is_not_null(operand: impl Operand) -> Fragment {
    Fragment::nested([operand.into_operand(None), Fragment::raw(" IS NOT NULL")])
}

fn in_list<I>(left: impl Operand, values: I, op: &'static str, name: &str) -> Fragment
where
    I: IntoIterator,
    I::Item: Operand,
{
    let left = left.into_operand(None);
    let hint = left.as_column().cloned();
    let values: Vec<Fragment> = values
        .into_iter()
        .map(|v| v.into_operand(hint.as_ref()))
        .collect();
    if values.is_empty() {
        return Fragment::invalid(format!("{name} requires at least one value"));
    }
    Fragment::nested([
        left,
        Fragment::raw(op),
        Fragment::join(values, ", ").parenthesized(),
    ])
}

/// `left IN (v1, v2, ...)`. An empty list is malformed; use
/// [`in_subquery`] for a subquery.
pub fn in_array<I>(left: impl Operand, values: I) -> Fragment
where
    I: IntoIterator,
    I::Item: Operand,
{
    in_list(left, values, " IN ", "in_array")
}

pub fn not_in_array<I>(left: impl Operand, values: I) -> Fragment
where
    I: IntoIterator,
    I::Item: Operand,
{
    in_list(left, values, " NOT IN ", "not_in_array")
}

/// `left IN (SELECT ...)`.
pub fn in_subquery(left: impl Operand, subquery: impl Operand) -> Fragment {
    binary(left, " IN ", subquery)
}

pub fn not_in_subquery(left: impl Operand, subquery: impl Operand) -> Fragment {
    binary(left, " NOT IN ", subquery)
}

pub fn exists(subquery: impl Operand) -> Fragment {
    Fragment::nested([Fragment::raw("EXISTS "), subquery.into_operand(None)])
}

pub fn not_exists(subquery: impl Operand) -> Fragment {
    Fragment::nested([Fragment::raw("NOT EXISTS "), subquery.into_operand(None)])
}

pub fn between(operand: impl Operand, low: impl Operand, high: impl Operand) -> Fragment {
    let (operand, low) = pair(operand, low);
    let high = high.into_operand(operand.as_column());
    Fragment::nested([operand, Fragment::raw(" BETWEEN "), low, Fragment::raw(" AND "), high])
}

pub fn not_between(operand: impl Operand, low: impl Operand, high: impl Operand) -> Fragment {
    let (operand, low) = pair(operand, low);
    let high = high.into_operand(operand.as_column());
    Fragment::nested([
        operand,
        Fragment::raw(" NOT BETWEEN "),
        low,
        Fragment::raw(" AND "),
        high,
    ])
}

fn group<I>(conditions: I, separator: &'static str) -> Option<Fragment>
where
    I: IntoIterator,
    I::Item: Into<Option<Fragment>>,
{
    let conditions: Vec<Fragment> = conditions.into_iter().filter_map(Into::into).collect();
    if conditions.is_empty() {
        return None;
    }
    Some(Fragment::join(conditions, separator).parenthesized())
}

/// `(c1 AND c2 AND ...)`. `None` entries are skipped; with nothing left the
/// result is `None`, which builders treat as "no predicate".
pub fn and<I>(conditions: I) -> Option<Fragment>
where
    I: IntoIterator,
    I::Item: Into<Option<Fragment>>,
{
    group(conditions, " AND ")
}

/// `(c1 OR c2 OR ...)`, with the same empty handling as [`and`].
pub fn or<I>(conditions: I) -> Option<Fragment>
where
    I: IntoIterator,
    I::Item: Into<Option<Fragment>>,
{
    group(conditions, " OR ")
}

pub fn not(condition: Fragment) -> Fragment {
    Fragment::nested([Fragment::raw("NOT "), condition.parenthesized()])
}

pub fn asc(operand: impl Operand) -> Fragment {
    Fragment::nested([operand.into_operand(None), Fragment::raw(" ASC")])
}

pub fn desc(operand: impl Operand) -> Fragment {
    Fragment::nested([operand.into_operand(None), Fragment::raw(" DESC")])
}

fn call(name: &'static str, operand: impl Operand) -> Fragment {
    Fragment::nested([
        Fragment::raw(name),
        operand.into_operand(None).parenthesized(),
    ])
}

/// `count(*)`
pub fn count() -> Fragment {
    Fragment::raw("count(*)")
}

pub fn count_of(operand: impl Operand) -> Fragment {
    call("count", operand)
}

pub fn sum(operand: impl Operand) -> Fragment {
    call("sum", operand)
}

pub fn avg(operand: impl Operand) -> Fragment {
    call("avg", operand)
}

pub fn min(operand: impl Operand) -> Fragment {
    call("min", operand)
}

pub fn max(operand: impl Operand) -> Fragment {
    call("max", operand)
}

/// `left || right`, with `right` typed after `left` when it is a column.
///
/// String concatenation on SQLite and Postgres. MySQL reads `||` as a logical
/// OR unless `PIPES_AS_CONCAT` is set.
pub fn concat(left: impl Operand, right: impl Operand) -> Fragment {
    binary(left, " || ", right)
}

/// `substring(operand, start[, length])`, built with [`Substring::from`] and
/// [`Substring::length`].
///
/// Bounds are typed after `operand` when it is a column. A length without a
/// start counts from position 1.
///
/// ```ignore
/// let prefix = substring(&users["name"]).from(1).length(3);
/// // substring("users"."name", $1, $2)
/// ```
pub fn substring(operand: impl Operand) -> Substring {
    Substring {
        operand: operand.into_operand(None),
        start: None,
        length: None,
    }
}

/// A `substring` call under construction; see [`substring`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Substring {
    operand: Fragment,
    start: Option<Fragment>,
    length: Option<Fragment>,
}

impl Substring {
    /// 1-based start position.
    pub fn from(mut self, start: impl Operand) -> Self {
        self.start = Some(start.into_operand(self.operand.as_column()));
        self
    }

    pub fn length(mut self, length: impl Operand) -> Self {
        self.length = Some(length.into_operand(self.operand.as_column()));
        self
    }
}

impl From<Substring> for Fragment {
    fn from(s: Substring) -> Self {
        let mut args = vec![s.operand];
        match (s.start, s.length) {
            (Some(start), Some(length)) => args.extend([start, length]),
            (Some(start), None) => args.push(start),
            (None, Some(length)) => args.extend([Fragment::raw("1"), length]),
            (None, None) => args.push(Fragment::raw("1")),
        }
        Fragment::nested([
            Fragment::raw("substring"),
            Fragment::join(args, ", ").parenthesized(),
        ])
    }
}

impl Operand for Substring {
    fn into_operand(self, _hint: Option<&Column>) -> Fragment {
        self.into()
    }
}

/// SQLite's implicit `rowid` column.
pub fn row_id() -> Fragment {
    Fragment::raw("rowid")
}
