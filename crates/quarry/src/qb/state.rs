//! Typestate markers for the builders.
//!
//! Each clause method moves a builder into a later stage, and a stage only
//! exposes the methods that may still follow it. Calling `filter` twice, or
//! `limit` before `order_by`, does not compile; `replace_filter` is the
//! explicit way to swap a predicate once `filter` can no longer be called.
//!
//! ```compile_fail
//! use quarry::prelude::*;
//!
//! let users = Table::builder("users").column(serial("id")).build().unwrap();
//! let _ = select_all()
//!     .from(&users)
//!     .filter(eq(&users["id"], 1))
//!     .filter(eq(&users["id"], 2));
//! ```
//!
//! ```compile_fail
//! use quarry::prelude::*;
//!
//! let users = Table::builder("users").column(serial("id")).build().unwrap();
//! let _ = select_all().from(&users).limit(1).order_by([&users["id"]]);
//! ```
//!
//! ```compile_fail
//! use quarry::prelude::*;
//!
//! let users = Table::builder("users").column(serial("id")).build().unwrap();
//! let _ = select_all()
//!     .from(&users)
//!     .replace_filter(eq(&users["id"], 1))
//!     .filter(eq(&users["id"], 2));
//! ```
//!
//! ```compile_fail
//! use quarry::prelude::*;
//!
//! let users = Table::builder("users").column(serial("id")).build().unwrap();
//! let _ = delete(&users)
//!     .replace_filter(eq(&users["id"], 1))
//!     .filter(eq(&users["id"], 2));
//! ```

mod sealed {
    pub trait Sealed {}
}

/// A builder stage.
pub trait Stage: sealed::Sealed + Send + Sync + 'static {}

macro_rules! stages {
    ($($(#[$meta:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy)]
            pub struct $name;
            impl sealed::Sealed for $name {}
            impl Stage for $name {}
        )*
    };
}

stages! {
    /// FROM is set; joins may still be added.
    Joinable,
    /// WHERE is set.
    Filtered,
    /// GROUP BY is set.
    Grouped,
    /// HAVING is set.
    HavingSet,
    /// ORDER BY is set.
    Ordered,
    /// LIMIT is set.
    Limited,
    /// OFFSET is set; nothing else may follow.
    OffsetSet,
    /// Required clause present (VALUES / SET), nothing optional yet.
    Pending,
    /// An upsert clause is set.
    Upserted,
    /// RETURNING is set.
    Returning,
}

macro_rules! capability {
    ($(#[$meta:meta])* $cap:ident: $($stage:ident),+) => {
        $(#[$meta])*
        pub trait $cap: Stage {}
        $(impl $cap for $stage {})+
    };
}

capability!(
    /// Stages that accept a JOIN.
    CanJoin: Joinable
);
capability!(
    /// Stages that accept GROUP BY.
    CanGroupBy: Joinable, Filtered
);
capability!(
    /// Stages that accept HAVING.
    CanHaving: Grouped
);
capability!(
    /// Stages that accept ORDER BY.
    CanOrderBy: Joinable, Filtered, Grouped, HavingSet
);
capability!(
    /// Stages that accept LIMIT.
    CanLimit: Joinable, Filtered, Grouped, HavingSet, Ordered
);
capability!(
    /// Stages that accept OFFSET.
    CanOffset: Joinable, Filtered, Grouped, HavingSet, Ordered, Limited
);
capability!(
    /// Mutation stages that accept RETURNING.
    CanReturn: Pending, Upserted, Filtered
);
capability!(
    /// Stages past `filter`, where the predicate may only be swapped explicitly.
    CanReplaceFilter: Filtered, Grouped, HavingSet, Ordered, Limited, OffsetSet, Returning
);
