//! Compilation and execution entry points shared by every builder.

use crate::dialect::{Dialect, compile_delete, compile_insert, compile_select, compile_update};
use crate::error::QueryResult;
use crate::qb::delete::DeleteQuery;
use crate::qb::insert::InsertQuery;
use crate::qb::select::SelectQuery;
use crate::qb::state::Stage;
use crate::qb::update::UpdateQuery;
use crate::row::{FromRow, Row};
use crate::session::{Db, Execution, PreparedQuery, Session};
use crate::sql::{Bindings, CompiledQuery};

/// The kind of statement a builder produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
}

/// A statement that can be compiled for a dialect and executed through a [`Db`].
///
/// Every call compiles afresh from the builder's current state.
pub trait Statement: Sync {
    fn kind(&self) -> StatementKind;

    /// Compile to SQL text plus ordered parameters, without executing.
    fn to_sql(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery>;

    /// Compile once for `db`'s dialect and keep the result as a reusable handle.
    ///
    /// `name` is handed to the session as a prepared-statement key.
    fn prepare<'db, S: Session>(
        &self,
        db: &'db Db<S>,
        name: impl Into<String>,
    ) -> QueryResult<PreparedQuery<'db, S>> {
        let query = self.to_sql(db.dialect())?;
        Ok(PreparedQuery::new(db, self.kind(), query, Some(name.into())))
    }

    /// Compile and execute once.
    fn execute<S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<Execution>> + Send {
        async move {
            let query = self.to_sql(db.dialect())?;
            PreparedQuery::new(db, self.kind(), query, None)
                .execute(&Bindings::new())
                .await
        }
    }

    /// Execute and return every row.
    fn all<S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<Vec<Row>>> + Send {
        async move { Ok(self.execute(db).await?.into_rows()) }
    }

    /// Execute and return the first row, if any.
    fn get<S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<Option<Row>>> + Send {
        async move { Ok(self.all(db).await?.into_iter().next()) }
    }

    /// Execute and return the affected row count.
    fn run<S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<u64>> + Send {
        async move { Ok(self.execute(db).await?.rows_affected()) }
    }

    /// Execute and map every row to `T`.
    fn fetch_all<T: FromRow, S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<Vec<T>>> + Send {
        async move {
            let rows = self.all(db).await?;
            rows.iter().map(T::from_row).collect()
        }
    }

    /// Execute and map the first row to `T`; `NotFound` when there is none.
    fn fetch_one<T: FromRow, S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<T>> + Send {
        async move {
            match self.get(db).await? {
                Some(row) => T::from_row(&row),
                None => Err(crate::error::QueryError::not_found("Expected 1 row, got 0")),
            }
        }
    }

    /// Execute and map at most one row to `T`.
    fn fetch_opt<T: FromRow, S: Session>(
        &self,
        db: &Db<S>,
    ) -> impl std::future::Future<Output = QueryResult<Option<T>>> + Send {
        async move {
            let row = self.get(db).await?;
            row.as_ref().map(T::from_row).transpose()
        }
    }
}

impl<S: Stage> Statement for SelectQuery<S> {
    fn kind(&self) -> StatementKind {
        StatementKind::Select
    }

    fn to_sql(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery> {
        compile_select(dialect, &self.config)
    }
}

impl<S: Stage> Statement for InsertQuery<S> {
    fn kind(&self) -> StatementKind {
        StatementKind::Insert
    }

    fn to_sql(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery> {
        compile_insert(dialect, &self.config)
    }
}

impl<S: Stage> Statement for UpdateQuery<S> {
    fn kind(&self) -> StatementKind {
        StatementKind::Update
    }

    fn to_sql(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery> {
        compile_update(dialect, &self.config)
    }
}

impl<S: Stage> Statement for DeleteQuery<S> {
    fn kind(&self) -> StatementKind {
        StatementKind::Delete
    }

    fn to_sql(&self, dialect: &dyn Dialect) -> QueryResult<CompiledQuery> {
        compile_delete(dialect, &self.config)
    }
}
