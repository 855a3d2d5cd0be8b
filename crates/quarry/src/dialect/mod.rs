//! Dialect compilers.
//!
//! Every statement is compiled the same way: the builder's config is assembled
//! into one fragment tree (clause keywords interleaved with the config's
//! fragments, in fixed clause order) and the tree is reduced depth-first into
//! SQL text plus ordered parameters. A [`Dialect`] only supplies the points
//! where engines disagree: quoting, placeholders, LIMIT/OFFSET, RETURNING,
//! upserts and type spelling.

mod build;
mod mysql;
mod postgres;
mod reduce;
mod sqlite;

pub use mysql::MySqlDialect;
pub use postgres::PgDialect;
pub use sqlite::SqliteDialect;

use crate::error::QueryResult;
use crate::qb::{DeleteConfig, InsertConfig, SelectConfig, UpdateConfig};
use crate::schema::{Column, ColumnType, Table};
use crate::sql::{CompiledQuery, Fragment};
use reduce::Reducer;

/// How a dialect spells an upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertStyle {
    /// `ON CONFLICT (...) DO NOTHING | DO UPDATE SET ... [WHERE ...]`
    OnConflict,
    /// `INSERT IGNORE` / `ON DUPLICATE KEY UPDATE ...`
    DuplicateKey,
}

/// A target SQL dialect.
pub trait Dialect: Send + Sync + std::fmt::Debug {
    /// Short name used in errors and logs.
    fn name(&self) -> &'static str;

    fn quote_char(&self) -> char {
        '"'
    }

    /// Quote an identifier, doubling any embedded quote character.
    fn quote_identifier(&self, name: &str) -> String {
        let q = self.quote_char();
        let mut out = String::with_capacity(name.len() + 2);
        out.push(q);
        for ch in name.chars() {
            if ch == q {
                out.push(q);
            }
            out.push(ch);
        }
        out.push(q);
        out
    }

    /// Placeholder token for the parameter at 1-based `index`.
    fn placeholder(&self, index: usize) -> String;

    fn supports_returning(&self) -> bool {
        true
    }

    fn supports_full_join(&self) -> bool {
        true
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::OnConflict
    }

    /// The value proposed for insertion, inside an upsert's update branch.
    fn excluded(&self, column: &str) -> Fragment {
        Fragment::nested([Fragment::raw("excluded."), Fragment::ident(column)])
    }

    /// Whether `DEFAULT` may stand for a value in a VALUES row or a SET.
    fn supports_default_keyword(&self) -> bool {
        true
    }

    /// Emitted for a column a multi-row INSERT row does not provide.
    fn missing_insert_value(&self) -> &'static str {
        "DEFAULT"
    }

    /// Tail of an INSERT that provides no columns at all.
    fn empty_insert(&self) -> &'static str {
        "DEFAULT VALUES"
    }

    /// LIMIT/OFFSET clause. Both arguments are already bound parameters.
    fn limit_offset(&self, limit: Option<Fragment>, offset: Option<Fragment>) -> Option<Fragment> {
        match (limit, offset) {
            (Some(l), Some(o)) => Some(Fragment::nested([
                Fragment::raw("LIMIT "),
                l,
                Fragment::raw(" OFFSET "),
                o,
            ])),
            (Some(l), None) => Some(Fragment::nested([Fragment::raw("LIMIT "), l])),
            (None, Some(o)) => Some(Fragment::nested([Fragment::raw("OFFSET "), o])),
            (None, None) => None,
        }
    }

    /// SQL spelling of a column type.
    fn column_type_sql(&self, ty: ColumnType) -> String;

    /// One column of a CREATE TABLE.
    fn column_definition(&self, column: &Column, inline_primary_key: bool) -> String {
        let mut def = self.quote_identifier(column.name());
        if let Some(ty) = column.column_type() {
            def.push(' ');
            def.push_str(&self.column_type_sql(ty));
        }
        if inline_primary_key && column.is_primary_key() {
            def.push_str(" PRIMARY KEY");
        } else if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }

    /// `CREATE TABLE` statement for `table`.
    fn create_table(&self, table: &Table) -> String {
        let keys: Vec<&Column> = table.columns().iter().filter(|c| c.is_primary_key()).collect();
        let inline = keys.len() == 1;
        let mut parts: Vec<String> = table
            .columns()
            .iter()
            .map(|c| self.column_definition(c, inline))
            .collect();
        if keys.len() > 1 {
            let names: Vec<String> = keys.iter().map(|c| self.quote_identifier(c.name())).collect();
            parts.push(format!("PRIMARY KEY ({})", names.join(", ")));
        }
        format!(
            "CREATE TABLE {} ({})",
            self.quote_identifier(table.name()),
            parts.join(", ")
        )
    }

    /// Reduce a standalone fragment.
    fn sql_to_query(&self, fragment: &Fragment) -> QueryResult<CompiledQuery> {
        let mut reducer = Reducer::new(self);
        reducer.push(fragment)?;
        Ok(reducer.finish(Vec::new(), false))
    }
}

pub(crate) fn compile_select<D: Dialect + ?Sized>(
    dialect: &D,
    config: &SelectConfig,
) -> QueryResult<CompiledQuery> {
    let mut reducer = Reducer::new(dialect);
    let fields = reducer.push_select(config)?;
    Ok(reducer.finish(fields, true))
}

pub(crate) fn compile_insert<D: Dialect + ?Sized>(
    dialect: &D,
    config: &InsertConfig,
) -> QueryResult<CompiledQuery> {
    build::insert(dialect, config)?.reduce(dialect)
}

pub(crate) fn compile_update<D: Dialect + ?Sized>(
    dialect: &D,
    config: &UpdateConfig,
) -> QueryResult<CompiledQuery> {
    build::update(dialect, config)?.reduce(dialect)
}

pub(crate) fn compile_delete<D: Dialect + ?Sized>(
    dialect: &D,
    config: &DeleteConfig,
) -> QueryResult<CompiledQuery> {
    build::delete(dialect, config)?.reduce(dialect)
}
