//! # quarry
//!
//! Typed SQL query builders that compile to Postgres, MySQL and SQLite.
//!
//! ## Features
//!
//! - **Declared schema**: describe a table once; columns know their table, type and constraints
//! - **Typestate builders**: clause order is checked by the compiler, not at runtime
//! - **Composable fragments**: columns, bound values and subqueries nest without string pasting
//! - **Dialect compilers**: one config, three dialects, correctly ordered parameters
//! - **Pluggable execution**: any [`Session`] can run compiled statements; a `tokio-postgres`
//!   session ships behind the `postgres` feature
//!
//! ## Example
//!
//! ```ignore
//! use quarry::prelude::*;
//!
//! let users = Table::builder("users")
//!     .column(serial("id").primary_key())
//!     .column(text("name").not_null())
//!     .build()?;
//!
//! let q = select_all().from(&users).filter(eq(&users["name"], "alice"));
//!
//! let compiled = q.to_sql(&PgDialect)?;
//! assert_eq!(
//!     compiled.sql(),
//!     r#"SELECT "users"."id", "users"."name" FROM "users" WHERE "users"."name" = $1"#
//! );
//!
//! let db = Db::new(session, PgDialect);
//! let rows = q.all(&db).await?;
//! ```

pub mod dialect;
pub mod error;
pub mod prelude;
pub mod qb;
pub mod row;
pub mod schema;
pub mod session;
pub mod sql;
pub mod value;

pub use dialect::{Dialect, MySqlDialect, PgDialect, SqliteDialect, UpsertStyle};
pub use error::{QueryError, QueryResult};
pub use qb::{Statement, StatementKind};
pub use row::{FromRow, FromValue, Row};
pub use schema::{Column, ColumnDef, ColumnType, Table};
pub use session::{Db, DbConfig, Execution, PreparedQuery, Session};
pub use sql::{Bindings, CompiledQuery, Fragment, Param};
pub use value::Value;

#[cfg(feature = "postgres")]
pub use session::postgres::{PgSession, PgSessionConfig};
