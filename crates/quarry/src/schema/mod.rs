//! Table and column metadata consumed by the builders and dialect compilers.
//!
//! ```ignore
//! use quarry::schema::{Table, serial, text};
//!
//! let users = Table::builder("users")
//!     .column(serial("id").primary_key())
//!     .column(text("name").not_null())
//!     .build()?;
//!
//! let id = &users["id"];
//! ```

mod column;

pub use column::{
    Column, ColumnDef, ColumnType, big_int, big_serial, boolean, double, integer, json, serial,
    text, timestamp, timestamptz, uuid, varchar,
};
pub(crate) use column::TableRef;

use crate::error::{QueryError, QueryResult};
use std::ops::Index;

/// A table: a name plus an ordered mapping from logical field name to column.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    alias: Option<String>,
    columns: Vec<Column>,
}

impl Table {
    /// Start declaring a table.
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Base table name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The name column references are qualified with inside a query scope.
    pub fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// Columns in declared order.
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// `(field, column)` pairs in declared order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|c| (c.field(), c))
    }

    /// Look up a column by logical field name.
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field() == field)
    }

    /// Look up a column by logical field name, failing with `MalformedQuery`.
    pub fn try_column(&self, field: &str) -> QueryResult<&Column> {
        self.column(field).ok_or_else(|| {
            QueryError::malformed(format!("table \"{}\" has no field \"{field}\"", self.name))
        })
    }

    /// A derived table (subquery or CTE) exporting the given output fields.
    pub(crate) fn derived(
        name: &str,
        fields: impl IntoIterator<Item = (String, Option<ColumnType>)>,
    ) -> Table {
        let scope = TableRef::new(name, None);
        Table {
            name: name.to_string(),
            alias: None,
            columns: fields
                .into_iter()
                .map(|(field, ty)| Column::derived(field, ty, scope.clone()))
                .collect(),
        }
    }

    /// The same table under an alias, for self-joins.
    ///
    /// Every column of the returned table is scoped to the alias, so references
    /// through it render as `"alias"."col"`.
    pub fn aliased(&self, alias: impl Into<String>) -> Table {
        let scope = TableRef::new(self.name.clone(), Some(alias.into()));
        Table {
            name: self.name.clone(),
            alias: scope.alias.clone(),
            columns: self.columns.iter().map(|c| c.rescoped(scope.clone())).collect(),
        }
    }
}

impl Index<&str> for Table {
    type Output = Column;

    /// Panics when the field does not exist; use [`Table::column`] to probe.
    fn index(&self, field: &str) -> &Column {
        match self.column(field) {
            Some(col) => col,
            None => panic!("table \"{}\" has no field \"{field}\"", self.name),
        }
    }
}

/// Builder for [`Table`].
#[derive(Debug, Clone)]
#[must_use]
pub struct TableBuilder {
    name: String,
    columns: Vec<ColumnDef>,
}

impl TableBuilder {
    pub fn column(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    /// Freeze the declaration. Every column gets its table back-reference here.
    pub fn build(self) -> QueryResult<Table> {
        if self.name.is_empty() {
            return Err(QueryError::malformed("table name cannot be empty"));
        }
        if self.columns.is_empty() {
            return Err(QueryError::malformed(format!(
                "table \"{}\" declares no columns",
                self.name
            )));
        }

        let scope = TableRef::new(self.name.clone(), None);
        let mut columns: Vec<Column> = Vec::with_capacity(self.columns.len());
        for def in &self.columns {
            if columns.iter().any(|c| c.field() == def.field) {
                return Err(QueryError::malformed(format!(
                    "table \"{}\" declares field \"{}\" twice",
                    self.name, def.field
                )));
            }
            columns.push(Column::from_def(def, scope.clone()));
        }

        Ok(Table {
            name: self.name,
            alias: None,
            columns,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::builder("users")
            .column(serial("id").primary_key())
            .column(text("name").not_null())
            .column(text("email_address").field("email"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_declared_order_and_lookup() {
        let users = users();
        let fields: Vec<_> = users.fields().map(|(f, _)| f).collect();
        assert_eq!(fields, ["id", "name", "email"]);
        assert_eq!(users["email"].name(), "email_address");
        assert!(users.column("missing").is_none());
        assert!(users.try_column("missing").unwrap_err().is_malformed());
    }

    #[test]
    fn test_columns_point_back_to_table() {
        let users = users();
        for col in users.columns() {
            assert_eq!(col.table_name(), "users");
            assert_eq!(col.scope_name(), "users");
        }
        assert!(users["id"].is_primary_key());
        assert!(users["id"].is_not_null());
    }

    #[test]
    fn test_alias_rescopes_columns() {
        let users = users();
        let parent = users.aliased("parent");
        assert_eq!(parent.name(), "users");
        assert_eq!(parent.scope_name(), "parent");
        assert_eq!(parent["id"].scope_name(), "parent");
        assert_eq!(parent["id"].table_name(), "users");
        // the unaliased table keeps its own scope
        assert_eq!(users["id"].scope_name(), "users");
        assert_ne!(parent["id"], users["id"]);
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = Table::builder("t")
            .column(integer("a"))
            .column(text("b").field("a"))
            .build()
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    #[should_panic(expected = "has no field")]
    fn test_index_panics_on_missing_field() {
        let users = users();
        let _ = &users["nope"];
    }
}
