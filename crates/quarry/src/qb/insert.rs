//! INSERT builder with multi-row VALUES and upserts.

use crate::qb::select::SelectField;
use crate::qb::state::{CanReturn, Pending, Returning, Stage, Upserted};
use crate::qb::values::{IntoRows, Values};
use crate::schema::{Column, Table};
use crate::sql::Fragment;
use std::marker::PhantomData;

/// What to do when an inserted row conflicts with an existing one.
#[derive(Debug, Clone)]
pub(crate) enum ConflictAction {
    Nothing,
    Update(Values),
}

#[derive(Debug, Clone)]
pub(crate) struct OnConflict {
    pub(crate) target: Vec<Column>,
    pub(crate) action: ConflictAction,
    /// WHERE of the update branch.
    pub(crate) filter: Option<Fragment>,
}

#[derive(Debug, Clone)]
pub(crate) struct InsertConfig {
    pub(crate) table: Table,
    pub(crate) rows: Vec<Values>,
    pub(crate) on_conflict: Option<OnConflict>,
    pub(crate) returning: Option<Vec<SelectField>>,
}

/// An INSERT without rows yet.
#[derive(Debug, Clone)]
#[must_use]
pub struct InsertBuilder {
    table: Table,
}

/// Start an INSERT into `table`.
///
/// ```ignore
/// let q = insert(&users)
///     .values(Values::new().set("name", "Alice"))
///     .returning();
/// // INSERT INTO "users" ("name") VALUES ($1) RETURNING "id", "name"
/// ```
pub fn insert(table: &Table) -> InsertBuilder {
    InsertBuilder {
        table: table.clone(),
    }
}

impl InsertBuilder {
    /// One row or several. The column list is every field provided by any row,
    /// in declared table order; rows lacking one of them get the dialect's
    /// missing-value token.
    pub fn values(self, rows: impl IntoRows) -> InsertQuery<Pending> {
        InsertQuery {
            config: InsertConfig {
                table: self.table,
                rows: rows.into_rows(),
                on_conflict: None,
                returning: None,
            },
            _stage: PhantomData,
        }
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct InsertQuery<S: Stage = Pending> {
    pub(crate) config: InsertConfig,
    _stage: PhantomData<S>,
}

impl<S: Stage> InsertQuery<S> {
    fn into_stage<T: Stage>(self) -> InsertQuery<T> {
        InsertQuery {
            config: self.config,
            _stage: PhantomData,
        }
    }
}

impl InsertQuery<Pending> {
    /// `ON CONFLICT (target) DO NOTHING`, or `INSERT IGNORE` on MySQL.
    pub fn on_conflict_do_nothing<'a, I>(mut self, target: I) -> InsertQuery<Upserted>
    where
        I: IntoIterator<Item = &'a Column>,
    {
        self.config.on_conflict = Some(OnConflict {
            target: target.into_iter().cloned().collect(),
            action: ConflictAction::Nothing,
            filter: None,
        });
        self.into_stage()
    }

    /// `ON CONFLICT (target) DO UPDATE SET ...`, or `ON DUPLICATE KEY UPDATE`
    /// on MySQL. Use [`Values::set_excluded`] to copy the proposed value.
    pub fn on_conflict_do_update<'a, I>(mut self, target: I, set: Values) -> InsertQuery<Upserted>
    where
        I: IntoIterator<Item = &'a Column>,
    {
        self.config.on_conflict = Some(OnConflict {
            target: target.into_iter().cloned().collect(),
            action: ConflictAction::Update(set),
            filter: None,
        });
        self.into_stage()
    }
}

impl InsertQuery<Upserted> {
    /// Restrict the upsert's update branch (`DO UPDATE SET ... WHERE ...`).
    ///
    /// Compiling fails with `MalformedQuery` after
    /// [`on_conflict_do_nothing`](InsertQuery::on_conflict_do_nothing), and with
    /// `UnsupportedOperation` on MySQL.
    pub fn update_filter(mut self, condition: impl Into<Option<Fragment>>) -> Self {
        if let Some(on_conflict) = &mut self.config.on_conflict {
            on_conflict.filter = condition.into();
        }
        self
    }
}

impl<S: CanReturn> InsertQuery<S> {
    /// Return every column of the table, in declared order.
    pub fn returning(mut self) -> InsertQuery<Returning> {
        self.config.returning = Some(
            self.config
                .table
                .columns()
                .iter()
                .map(SelectField::from)
                .collect(),
        );
        self.into_stage()
    }

    pub fn returning_fields<I>(mut self, fields: I) -> InsertQuery<Returning>
    where
        I: IntoIterator,
        I::Item: Into<SelectField>,
    {
        self.config.returning = Some(fields.into_iter().map(Into::into).collect());
        self.into_stage()
    }
}
