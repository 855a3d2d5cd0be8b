//! The boundary between compiled queries and the database driver.
//!
//! The core never talks to a socket. A [`Session`] receives exactly the
//! compiled SQL text and the final ordered parameter values; cancellation,
//! timeouts and connection management are its business.
//!
//! ```ignore
//! use quarry::{Db, PgDialect, Statement};
//!
//! let db = Db::new(session, PgDialect);
//! let rows = select_all().from(&users).filter(eq(&users["id"], 1)).all(&db).await?;
//!
//! let by_name = select_all()
//!     .from(&users)
//!     .filter(eq(&users["name"], placeholder("name")))
//!     .prepare(&db, "user_by_name")?;
//! let alice = by_name.get(&Bindings::new().set("name", "alice")).await?;
//! ```

mod config;
mod prepared;

#[cfg(feature = "postgres")]
pub mod postgres;

pub use config::DbConfig;
pub use prepared::{Execution, PreparedQuery};

use crate::dialect::Dialect;
use crate::error::QueryResult;
use crate::row::Row;
use crate::value::Value;
use std::sync::Arc;

/// The execution collaborator.
///
/// Implementations issue one request per call and return exactly one terminal
/// result or error. Errors should be wrapped with
/// [`QueryError::execution`](crate::QueryError::execution) (or another
/// variant) and are passed through to the caller untouched.
pub trait Session: Send + Sync {
    /// Execute a row-returning statement.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Row>>> + Send;

    /// Execute a row-returning statement under a prepared-statement name.
    ///
    /// The default implementation ignores `name` and calls [`Session::query`].
    fn query_tagged(
        &self,
        name: &str,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<Vec<Row>>> + Send {
        let _ = name;
        self.query(sql, params)
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<u64>> + Send;

    /// Execute under a prepared-statement name.
    ///
    /// The default implementation ignores `name` and calls [`Session::execute`].
    fn execute_tagged(
        &self,
        name: &str,
        sql: &str,
        params: &[Value],
    ) -> impl std::future::Future<Output = QueryResult<u64>> + Send {
        let _ = name;
        self.execute(sql, params)
    }
}

/// A session paired with the dialect its statements are compiled for.
#[derive(Debug, Clone)]
pub struct Db<S> {
    session: S,
    dialect: Arc<dyn Dialect>,
    config: DbConfig,
}

impl<S: Session> Db<S> {
    pub fn new(session: S, dialect: impl Dialect + 'static) -> Self {
        Self {
            session,
            dialect: Arc::new(dialect),
            config: DbConfig::default(),
        }
    }

    /// Replace the logging configuration.
    pub fn with_config(mut self, config: DbConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}
