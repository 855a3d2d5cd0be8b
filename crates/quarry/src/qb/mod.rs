//! Typed query builders and expression functions.
//!
//! Builders hold pure data and walk a fixed clause order enforced by the type
//! system (see [`state`]). Nothing is rendered until a statement is compiled
//! for a [`Dialect`](crate::dialect::Dialect), either for inspection with
//! [`Statement::to_sql`] or on execution through a [`Db`](crate::session::Db).
//!
//! # Usage
//!
//! ```ignore
//! use quarry::qb::*;
//!
//! // SELECT
//! let q = select([&users["id"], &users["name"]])
//!     .from(&users)
//!     .filter(and([eq(&users["active"], true), gt(&users["age"], 18)]))
//!     .order_by([desc(&users["created_at"])])
//!     .limit(20);
//! let rows = q.all(&db).await?;
//!
//! // INSERT ... RETURNING
//! let row = insert(&users)
//!     .values(Values::new().set("name", "alice"))
//!     .returning()
//!     .get(&db)
//!     .await?;
//!
//! // UPDATE
//! update(&users)
//!     .set(Values::new().set("active", false))
//!     .filter(eq(&users["id"], 7))
//!     .run(&db)
//!     .await?;
//!
//! // DELETE
//! delete(&users).filter(eq(&users["id"], 7)).run(&db).await?;
//! ```

mod delete;
mod expr;
mod insert;
mod select;
pub mod state;
mod subquery;
mod traits;
mod update;
mod values;

pub use delete::{DeleteQuery, delete};
pub use expr::{
    Operand, Substring, and, asc, avg, between, concat, count, count_of, desc, eq, exists, gt, gte,
    in_array, in_subquery, is_not_null, is_null, like, lt, lte, max, min, ne, not, not_between,
    not_exists, not_in_array, not_in_subquery, not_like, or, placeholder, raw, row_id, substring,
    sum,
};
pub use insert::{InsertBuilder, InsertQuery, insert};
pub use select::{
    JoinKind, SelectBuilder, SelectField, SelectQuery, Source, field, select, select_all,
    select_distinct,
};
pub use subquery::{Cte, Subquery, WithBuilder, with};
pub use traits::{Statement, StatementKind};
pub use update::{UpdateBuilder, UpdateQuery, update};
pub use values::{IntoRows, SetValue, Values};

pub(crate) use delete::DeleteConfig;
pub(crate) use insert::{ConflictAction, InsertConfig, OnConflict};
pub(crate) use select::SelectConfig;
pub(crate) use update::UpdateConfig;

#[cfg(test)]
mod tests;
