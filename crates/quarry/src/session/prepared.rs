use super::{Db, Session};
use crate::error::{QueryError, QueryResult};
use crate::qb::StatementKind;
use crate::row::{FromRow, Row};
use crate::sql::{Bindings, CompiledQuery};
use crate::value::Value;
use std::time::Instant;
use tracing::Level;

/// Result of executing one statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// Decoded rows of a SELECT or a mutation with RETURNING.
    Rows(Vec<Row>),
    /// Affected row count of a mutation without RETURNING.
    Affected(u64),
}

impl Execution {
    /// Rows, or an empty list for a row count.
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Execution::Rows(rows) => rows,
            Execution::Affected(_) => Vec::new(),
        }
    }

    /// Affected row count; for row results, the number of rows returned.
    pub fn rows_affected(&self) -> u64 {
        match self {
            Execution::Rows(rows) => rows.len() as u64,
            Execution::Affected(n) => *n,
        }
    }
}

/// A compiled statement bound to a [`Db`], executable any number of times.
///
/// The compiled SQL is frozen at prepare time. A name, when given, is passed
/// to the session as an identity/caching key and is not used otherwise.
#[derive(Debug)]
pub struct PreparedQuery<'db, S> {
    db: &'db Db<S>,
    kind: StatementKind,
    query: CompiledQuery,
    name: Option<String>,
}

/// Dispatch a tracing event at a runtime-determined level.
macro_rules! emit_at_level {
    ($level:expr, $($field:tt)*) => {
        match $level {
            Level::ERROR => tracing::error!($($field)*),
            Level::WARN => tracing::warn!($($field)*),
            Level::INFO => tracing::info!($($field)*),
            Level::DEBUG => tracing::debug!($($field)*),
            Level::TRACE => tracing::trace!($($field)*),
        }
    };
}

impl<'db, S: Session> PreparedQuery<'db, S> {
    pub(crate) fn new(
        db: &'db Db<S>,
        kind: StatementKind,
        query: CompiledQuery,
        name: Option<String>,
    ) -> Self {
        Self {
            db,
            kind,
            query,
            name,
        }
    }

    pub fn sql(&self) -> &str {
        self.query.sql()
    }

    pub fn query(&self) -> &CompiledQuery {
        &self.query
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    fn log(&self, params: &[Value]) {
        let config = self.db.config();
        let sql = config.truncate_sql(self.query.sql());
        let name = self.name.as_deref().unwrap_or("-");
        let dialect = self.db.dialect().name();
        if config.log_params {
            emit_at_level!(
                config.log_level,
                target: "quarry.sql",
                kind = ?self.kind,
                dialect,
                name,
                param_count = params.len(),
                params = ?params,
                sql = %sql,
            );
        } else {
            emit_at_level!(
                config.log_level,
                target: "quarry.sql",
                kind = ?self.kind,
                dialect,
                name,
                param_count = params.len(),
                sql = %sql,
            );
        }
    }

    /// Decode each cell by the type rule of the same-named output field.
    fn decode(&self, row: Row) -> QueryResult<Row> {
        row.try_map_values(|name, value| match self.query.field(name).and_then(|f| f.ty) {
            Some(ty) => ty.decode(name, value),
            None => Ok(value),
        })
    }

    /// Execute with `bindings` applied (placeholders by name, overrides by
    /// position).
    pub async fn execute(&self, bindings: &Bindings) -> QueryResult<Execution> {
        let params = self.query.resolve(bindings)?;
        self.log(&params);

        let session = self.db.session();
        let sql = self.query.sql();
        let start = Instant::now();
        let result = if self.query.returns_rows() {
            let rows = match &self.name {
                Some(name) => session.query_tagged(name, sql, &params).await?,
                None => session.query(sql, &params).await?,
            };
            let rows = rows
                .into_iter()
                .map(|row| self.decode(row))
                .collect::<QueryResult<Vec<_>>>()?;
            Execution::Rows(rows)
        } else {
            let affected = match &self.name {
                Some(name) => session.execute_tagged(name, sql, &params).await?,
                None => session.execute(sql, &params).await?,
            };
            Execution::Affected(affected)
        };

        tracing::trace!(
            target: "quarry.sql",
            kind = ?self.kind,
            elapsed_us = start.elapsed().as_micros() as u64,
            rows = result.rows_affected(),
            "statement finished"
        );
        Ok(result)
    }

    /// All rows.
    pub async fn all(&self, bindings: &Bindings) -> QueryResult<Vec<Row>> {
        Ok(self.execute(bindings).await?.into_rows())
    }

    /// The first row, if any.
    pub async fn get(&self, bindings: &Bindings) -> QueryResult<Option<Row>> {
        Ok(self.all(bindings).await?.into_iter().next())
    }

    /// Affected row count.
    pub async fn run(&self, bindings: &Bindings) -> QueryResult<u64> {
        Ok(self.execute(bindings).await?.rows_affected())
    }

    pub async fn fetch_all<T: FromRow>(&self, bindings: &Bindings) -> QueryResult<Vec<T>> {
        self.all(bindings).await?.iter().map(T::from_row).collect()
    }

    /// The first row mapped to `T`; `NotFound` when there is none.
    pub async fn fetch_one<T: FromRow>(&self, bindings: &Bindings) -> QueryResult<T> {
        match self.get(bindings).await? {
            Some(row) => T::from_row(&row),
            None => Err(QueryError::not_found("Expected 1 row, got 0")),
        }
    }

    pub async fn fetch_opt<T: FromRow>(&self, bindings: &Bindings) -> QueryResult<Option<T>> {
        self.get(bindings).await?.as_ref().map(T::from_row).transpose()
    }
}
