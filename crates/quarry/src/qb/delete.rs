//! DELETE builder.

use crate::qb::select::SelectField;
use crate::qb::state::{CanReplaceFilter, CanReturn, Filtered, Pending, Returning, Stage};
use crate::schema::Table;
use crate::sql::Fragment;
use std::marker::PhantomData;

#[derive(Debug, Clone)]
pub(crate) struct DeleteConfig {
    pub(crate) table: Table,
    pub(crate) filter: Option<Fragment>,
    pub(crate) returning: Option<Vec<SelectField>>,
}

/// Start a DELETE from `table`.
///
/// A DELETE with no WHERE removes every row.
pub fn delete(table: &Table) -> DeleteQuery<Pending> {
    DeleteQuery {
        config: DeleteConfig {
            table: table.clone(),
            filter: None,
            returning: None,
        },
        _stage: PhantomData,
    }
}

#[derive(Debug, Clone)]
#[must_use]
pub struct DeleteQuery<S: Stage = Pending> {
    pub(crate) config: DeleteConfig,
    _stage: PhantomData<S>,
}

impl<S: Stage> DeleteQuery<S> {
    fn into_stage<T: Stage>(self) -> DeleteQuery<T> {
        DeleteQuery {
            config: self.config,
            _stage: PhantomData,
        }
    }
}

impl DeleteQuery<Pending> {
    pub fn filter(mut self, condition: impl Into<Option<Fragment>>) -> DeleteQuery<Filtered> {
        self.config.filter = condition.into();
        self.into_stage()
    }
}

impl<S: CanReplaceFilter> DeleteQuery<S> {
    /// Replace the WHERE predicate. `None` removes it.
    pub fn replace_filter(mut self, condition: impl Into<Option<Fragment>>) -> Self {
        self.config.filter = condition.into();
        self
    }
}

impl<S: CanReturn> DeleteQuery<S> {
    pub fn returning(mut self) -> DeleteQuery<Returning> {
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

    pub fn returning_fields<I>(mut self, fields: I) -> DeleteQuery<Returning>
    where
        I: IntoIterator,
        I::Item: Into<SelectField>,
    {
        self.config.returning = Some(fields.into_iter().map(Into::into).collect());
        self.into_stage()
    }
}
