//! Result rows and row mapping.
//!
//! Rows are keyed by output name. Cells are decoded by the type rule of the
//! projection entry with the same name before they reach a [`Row`].

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use uuid::Uuid;

/// One result row: ordered `(name, value)` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cell.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.columns.push(name.into());
        self.values.push(value.into());
    }

    /// Builder form of [`Row::push`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(name, value)` cells in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(String::as_str).zip(self.values.iter())
    }

    /// Cell by output name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| &self.values[i])
    }

    /// Typed cell by output name, failing with `Decode` when missing or mistyped.
    pub fn try_get<T: FromValue>(&self, name: &str) -> QueryResult<T> {
        let value = self
            .get(name)
            .ok_or_else(|| QueryError::decode(name, "column not present in row"))?;
        T::from_value(name, value)
    }

    /// Deserialize the whole row into `T` by field name.
    pub fn deserialize<T: DeserializeOwned>(&self) -> QueryResult<T> {
        let map: serde_json::Map<String, serde_json::Value> = self
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_json()))
            .collect();
        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| QueryError::decode("<row>", e.to_string()))
    }

    /// Apply `f` to every cell.
    pub(crate) fn try_map_values(
        self,
        mut f: impl FnMut(&str, Value) -> QueryResult<Value>,
    ) -> QueryResult<Row> {
        let values = self
            .columns
            .iter()
            .zip(self.values)
            .map(|(name, value)| f(name, value))
            .collect::<QueryResult<Vec<_>>>()?;
        Ok(Row {
            columns: self.columns,
            values,
        })
    }
}

/// Map a [`Row`] into a Rust type.
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> QueryResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> QueryResult<Self> {
        Ok(row.clone())
    }
}

/// Convert a single cell into a Rust type.
pub trait FromValue: Sized {
    fn from_value(column: &str, value: &Value) -> QueryResult<Self>;
}

fn mismatch(column: &str, expected: &str, value: &Value) -> QueryError {
    QueryError::decode(column, format!("expected {expected}, got {}", value.kind()))
}

impl FromValue for Value {
    fn from_value(_column: &str, value: &Value) -> QueryResult<Self> {
        Ok(value.clone())
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(column, other).map(Some),
        }
    }
}

macro_rules! impl_from_value_int {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
                    match value {
                        Value::Int(v) => <$t>::try_from(*v).map_err(|_| {
                            QueryError::decode(
                                column,
                                format!("{v} is out of range for {}", stringify!($t)),
                            )
                        }),
                        other => Err(mismatch(column, stringify!($t), other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_int!(i16, i32, i64, u32, u64);

impl FromValue for f64 {
    fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
        value.as_f64().ok_or_else(|| mismatch(column, "float", value))
    }
}

impl FromValue for bool {
    fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
        value.as_bool().ok_or_else(|| mismatch(column, "bool", value))
    }
}

impl FromValue for String {
    fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
        value
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| mismatch(column, "text", value))
    }
}

macro_rules! impl_from_value_variant {
    ($($t:ty => $variant:ident, $expected:literal;)*) => {
        $(
            impl FromValue for $t {
                fn from_value(column: &str, value: &Value) -> QueryResult<Self> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => Err(mismatch(column, $expected, other)),
                    }
                }
            }
        )*
    };
}

impl_from_value_variant! {
    Vec<u8> => Bytes, "bytes";
    serde_json::Value => Json, "json";
    Uuid => Uuid, "uuid";
    NaiveDate => Date, "date";
    NaiveDateTime => Timestamp, "timestamp";
    DateTime<Utc> => TimestampTz, "timestamptz";
}
