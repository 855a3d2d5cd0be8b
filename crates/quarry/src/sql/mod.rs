//! Composable SQL fragments and compiled output.
//!
//! A [`Fragment`] is the unit of composition: expression functions and builders
//! assemble fragment trees, and a dialect reduces a tree to a [`CompiledQuery`]
//! (SQL text plus the ordered parameter list).
//!
//! ```ignore
//! use quarry::sql::Fragment;
//! use quarry::dialect::{Dialect, PgDialect};
//!
//! let frag = Fragment::template("lower(?) = ?", [Fragment::column(&users["name"]), Fragment::param("alice")]);
//! let q = PgDialect.sql_to_query(&frag)?;
//! assert_eq!(q.sql(), r#"lower("users"."name") = $1"#);
//! ```

mod fragment;
mod param;

pub use fragment::Fragment;
pub(crate) use fragment::Node;
pub use param::{Bindings, Param, ParamValue};

use crate::error::QueryResult;
use crate::schema::ColumnType;
use crate::value::Value;

/// One output column of a compiled statement.
///
/// Result rows are decoded by matching cell names against `name`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultField {
    pub name: String,
    pub ty: Option<ColumnType>,
}

/// SQL text plus ordered parameters, produced fresh on every compilation.
///
/// The Nth placeholder in `sql` corresponds to the Nth entry of `params`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub(crate) sql: String,
    pub(crate) params: Vec<Param>,
    pub(crate) fields: Vec<ResultField>,
    pub(crate) returns_rows: bool,
}

impl CompiledQuery {
    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Output fields (SELECT projection or RETURNING list), in order.
    pub fn fields(&self) -> &[ResultField] {
        &self.fields
    }

    /// Whether the statement yields rows (SELECT, or a mutation with RETURNING).
    pub fn returns_rows(&self) -> bool {
        self.returns_rows
    }

    /// Bound values in placeholder order.
    ///
    /// Fails with `MalformedQuery` if the query contains unbound placeholders;
    /// use [`CompiledQuery::resolve`] to supply them.
    pub fn values(&self) -> QueryResult<Vec<Value>> {
        self.resolve(&Bindings::default())
    }

    /// Final ordered parameter values with `bindings` applied.
    pub fn resolve(&self, bindings: &Bindings) -> QueryResult<Vec<Value>> {
        bindings.resolve(&self.params)
    }

    pub(crate) fn field(&self, name: &str) -> Option<&ResultField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
