//! UPDATE builder.

use crate::qb::select::SelectField;
use crate::qb::state::{CanReplaceFilter, CanReturn, Filtered, Pending, Returning, Stage};
use crate::qb::values::Values;
use crate::schema::Table;
use crate::sql::Fragment;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub(crate) struct UpdateConfig {
    pub(crate) table: Table,
    pub(crate) set: Values,
    pub(crate) filter: Option<Fragment>,
    pub(crate) returning: Option<Vec<SelectField>>,
}

/// An UPDATE without its SET yet.
#[derive(Debug, Clone)]
#[must_use]
pub struct UpdateBuilder {
    table: Table,
}

/// Start an UPDATE of `table`.
pub fn update(table: &Table) -> UpdateBuilder {
    UpdateBuilder {
        table: table.clone(),
    }
}

impl UpdateBuilder {
    /// Assignments, keyed by logical field name. An empty map fails to compile
    /// with `MalformedQuery`.
    pub fn set(self, values: Values) -> UpdateQuery<Pending> {
        UpdateQuery {
            config: UpdateConfig {
                table: self.table,
                set: values,
                filter: None,
                returning: None,
            },
            _stage: PhantomData,
        }
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct UpdateQuery<S: Stage = Pending> {
    pub(crate) config: UpdateConfig,
    _stage: PhantomData<S>,
}

impl<S: Stage> UpdateQuery<S> {
    fn into_stage<T: Stage>(self) -> UpdateQuery<T> {
        UpdateQuery {
            config: self.config,
            _stage: PhantomData,
        }
    }
}

impl UpdateQuery<Pending> {
    /// Without a WHERE every row is updated.
    pub fn filter(mut self, condition: impl Into<Option<Fragment>>) -> UpdateQuery<Filtered> {
        self.config.filter = condition.into();
        self.into_stage()
    }
}

impl<S: CanReplaceFilter> UpdateQuery<S> {
    /// Replace the WHERE predicate. `None` removes it.
    pub fn replace_filter(mut self, condition: impl Into<Option<Fragment>>) -> Self {
        self.config.filter = condition.into();
        self
    }
}

impl<S: CanReturn> UpdateQuery<S> {
    pub fn returning(mut self) -> UpdateQuery<Returning> {
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

    pub fn returning_fields<I>(mut self, fields: I) -> UpdateQuery<Returning>
    where
        I: IntoIterator,
        I::Item: Into<SelectField>,
    {
        self.config.returning = Some(fields.into_iter().map(Into::into).collect());
        self.into_stage()
    }
}
