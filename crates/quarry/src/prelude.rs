//! Convenient imports for typical `quarry` usage.
//!
//! ```ignore
//! use quarry::prelude::*;
//! ```

pub use crate::qb::{
    Values, and, asc, avg, between, concat, count, count_of, delete, desc, eq, exists, field, gt,
    gte, in_array, in_subquery, insert, is_not_null, is_null, like, lt, lte, max, min, ne, not,
    not_between, not_exists, not_in_array, not_in_subquery, not_like, or, placeholder, raw,
    row_id, select, select_all, select_distinct, substring, sum, update, with,
};
pub use crate::schema::{
    big_int, big_serial, boolean, double, integer, json, serial, text, timestamp, timestamptz,
    varchar,
};
pub use crate::{
    Bindings, Db, Dialect, Fragment, FromRow, MySqlDialect, PgDialect, QueryError, QueryResult,
    Row, Session, SqliteDialect, Statement, Table, Value,
};

#[cfg(feature = "postgres")]
pub use crate::{PgSession, PgSessionConfig};
