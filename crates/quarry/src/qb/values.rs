//! Field → value maps for INSERT rows, UPDATE SET and upsert SET.

use crate::sql::{Fragment, Param};
use crate::value::{Value, for_each_scalar};

/// The right-hand side of a field assignment.
#[derive(Debug, Clone)]
pub enum SetValue {
    /// Bound as a parameter, typed after the target column.
    Param(Param),
    /// An arbitrary SQL expression.
    Sql(Fragment),
    /// The `DEFAULT` keyword.
    Default,
    /// The row proposed for insertion, in an upsert's update branch.
    Excluded(String),
}

impl From<Fragment> for SetValue {
    fn from(fragment: Fragment) -> Self {
        SetValue::Sql(fragment)
    }
}

impl From<Param> for SetValue {
    fn from(param: Param) -> Self {
        SetValue::Param(param)
    }
}

macro_rules! impl_scalar_set_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for SetValue {
                fn from(value: $t) -> Self {
                    SetValue::Param(Param::new(value))
                }
            }
        )*
    };
}

for_each_scalar!(impl_scalar_set_value);

impl<T: Into<Value>> From<Option<T>> for SetValue {
    fn from(value: Option<T>) -> Self {
        SetValue::Param(Param::new(Value::from(value)))
    }
}

/// An ordered field → value map.
///
/// Setting a field twice keeps the last value at the first position.
///
/// ```ignore
/// let row = Values::new().set("name", "Alice").set("active", true);
/// ```
#[derive(Debug, Clone, Default)]
#[must_use]
pub struct Values {
    entries: Vec<(String, SetValue)>,
}

impl Values {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, field: impl Into<String>, value: impl Into<SetValue>) -> Self {
        let field = field.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field, value)),
        }
        self
    }

    pub fn set_null(self, field: impl Into<String>) -> Self {
        self.set(field, Value::Null)
    }

    pub fn set_default(self, field: impl Into<String>) -> Self {
        self.set(field, SetValue::Default)
    }

    /// Assign the value proposed for insertion (`excluded."field"` /
    /// `VALUES(field)`); only meaningful in an upsert update.
    pub fn set_excluded(self, field: impl Into<String>) -> Self {
        let field = field.into();
        let value = SetValue::Excluded(field.clone());
        self.set(field, value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn get(&self, field: &str) -> Option<&SetValue> {
        self.entries.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&str, &SetValue)> {
        self.entries.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Values
where
    K: Into<String>,
    V: Into<SetValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Values::new(), |values, (k, v)| values.set(k, v))
    }
}

/// One or more INSERT rows.
pub trait IntoRows {
    fn into_rows(self) -> Vec<Values>;
}

impl IntoRows for Values {
    fn into_rows(self) -> Vec<Values> {
        vec![self]
    }
}

impl IntoRows for Vec<Values> {
    fn into_rows(self) -> Vec<Values> {
        self
    }
}

impl<const N: usize> IntoRows for [Values; N] {
    fn into_rows(self) -> Vec<Values> {
        self.into_iter().collect()
    }
}
