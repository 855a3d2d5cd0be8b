//! Column metadata and per-type decode rules.

use crate::error::{QueryError, QueryResult};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::sync::Arc;

/// Declared SQL type of a column.
///
/// The spelling of each type is dialect specific and lives in
/// [`Dialect::column_type_sql`](crate::dialect::Dialect::column_type_sql).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    SmallInt,
    Integer,
    BigInt,
    /// Auto-incrementing 32-bit key.
    Serial,
    /// Auto-incrementing 64-bit key.
    BigSerial,
    Real,
    Double,
    Numeric,
    Text,
    Varchar(Option<u32>),
    Boolean,
    Bytes,
    Json,
    Uuid,
    Date,
    Timestamp,
    TimestampTz,
}

impl ColumnType {
    /// Serial types imply NOT NULL, a default and autoincrement.
    pub fn is_serial(self) -> bool {
        matches!(self, ColumnType::Serial | ColumnType::BigSerial)
    }

    fn is_integer(self) -> bool {
        matches!(
            self,
            ColumnType::SmallInt
                | ColumnType::Integer
                | ColumnType::BigInt
                | ColumnType::Serial
                | ColumnType::BigSerial
        )
    }

    /// Map a raw driver value to the logical value for this type.
    ///
    /// Drivers disagree on wire representations (MySQL hands back serial keys as
    /// numeric strings, SQLite stores booleans as 0/1 and JSON as text), so
    /// every cell that came from a typed column passes through here.
    pub fn decode(self, column: &str, value: Value) -> QueryResult<Value> {
        let decoded = match (self, value) {
            (_, Value::Null) => Value::Null,
            (ty, Value::Text(s)) if ty.is_integer() => s
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|e| QueryError::decode(column, format!("expected integer, got '{s}': {e}")))?,
            (ty, Value::Float(f)) if ty.is_integer() && f.fract() == 0.0 => Value::Int(f as i64),
            (ColumnType::Real | ColumnType::Double, Value::Int(i)) => Value::Float(i as f64),
            (ColumnType::Real | ColumnType::Double, Value::Text(s)) => s
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|e| QueryError::decode(column, format!("expected float, got '{s}': {e}")))?,
            (ColumnType::Boolean, Value::Int(i)) => Value::Bool(i != 0),
            (ColumnType::Boolean, Value::Text(s)) => match s.as_str() {
                "t" | "true" | "1" => Value::Bool(true),
                "f" | "false" | "0" => Value::Bool(false),
                _ => return Err(QueryError::decode(column, format!("expected boolean, got '{s}'"))),
            },
            (ColumnType::Json, Value::Text(s)) => serde_json::from_str(&s)
                .map(Value::Json)
                .map_err(|e| QueryError::decode(column, format!("invalid JSON: {e}")))?,
            (ColumnType::Json, Value::Bytes(b)) => serde_json::from_slice(&b)
                .map(Value::Json)
                .map_err(|e| QueryError::decode(column, format!("invalid JSON: {e}")))?,
            (ColumnType::Uuid, Value::Text(s)) => ::uuid::Uuid::parse_str(&s)
                .map(Value::Uuid)
                .map_err(|e| QueryError::decode(column, format!("invalid UUID '{s}': {e}")))?,
            (ColumnType::Uuid, Value::Bytes(b)) => ::uuid::Uuid::from_slice(&b)
                .map(Value::Uuid)
                .map_err(|e| QueryError::decode(column, format!("invalid UUID bytes: {e}")))?,
            (ColumnType::Date, Value::Text(s)) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| QueryError::decode(column, format!("invalid date '{s}': {e}")))?,
            (ColumnType::Timestamp, Value::Text(s)) => parse_naive_timestamp(&s)
                .map(Value::Timestamp)
                .ok_or_else(|| QueryError::decode(column, format!("invalid timestamp '{s}'")))?,
            (ColumnType::TimestampTz, Value::Text(s)) => parse_timestamptz(&s)
                .map(Value::TimestampTz)
                .ok_or_else(|| QueryError::decode(column, format!("invalid timestamptz '{s}'")))?,
            (ColumnType::TimestampTz, Value::Timestamp(ts)) => Value::TimestampTz(ts.and_utc()),
            (_, other) => other,
        };
        Ok(decoded)
    }
}

fn parse_naive_timestamp(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f"))
        .ok()
}

fn parse_timestamptz(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    // SQLite has no zone-aware type; naive text is taken as UTC.
    parse_naive_timestamp(s).map(|ts| ts.and_utc())
}

/// The query scope a column belongs to: a table (optionally aliased) or a
/// derived source such as a subquery or CTE.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct TableRef {
    pub(crate) name: String,
    pub(crate) alias: Option<String>,
}

impl TableRef {
    pub(crate) fn new(name: impl Into<String>, alias: Option<String>) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            alias,
        })
    }

    /// The name that column references in this scope are qualified with.
    pub(crate) fn scope_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A column bound to its table.
///
/// Columns are only produced by [`Table`](super::Table) (or by a subquery/CTE
/// exporting its fields); the table back-reference is fixed at that point.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    field: String,
    name: String,
    ty: Option<ColumnType>,
    not_null: bool,
    has_default: bool,
    primary_key: bool,
    auto_increment: bool,
    table: Arc<TableRef>,
}

impl Column {
    pub(crate) fn from_def(def: &ColumnDef, table: Arc<TableRef>) -> Self {
        Self {
            field: def.field.clone(),
            name: def.name.clone(),
            ty: Some(def.ty),
            not_null: def.not_null,
            has_default: def.has_default,
            primary_key: def.primary_key,
            auto_increment: def.auto_increment,
            table,
        }
    }

    /// A column exported by a subquery or CTE.
    pub(crate) fn derived(name: impl Into<String>, ty: Option<ColumnType>, scope: Arc<TableRef>) -> Self {
        let name = name.into();
        Self {
            field: name.clone(),
            name,
            ty,
            not_null: false,
            has_default: false,
            primary_key: false,
            auto_increment: false,
            table: scope,
        }
    }

    /// Same column, seen through another scope (table alias).
    pub(crate) fn rescoped(&self, table: Arc<TableRef>) -> Self {
        Self {
            table,
            ..self.clone()
        }
    }

    /// Logical field name (the key used in `Values` and result rows).
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Database column name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type; `None` for derived expression columns.
    pub fn column_type(&self) -> Option<ColumnType> {
        self.ty
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null
    }

    pub fn has_default(&self) -> bool {
        self.has_default
    }

    pub fn is_primary_key(&self) -> bool {
        self.primary_key
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment
    }

    /// Name of the owning table (or derived source).
    pub fn table_name(&self) -> &str {
        &self.table.name
    }

    /// The alias when the owning table is aliased, else the table name.
    pub fn scope_name(&self) -> &str {
        self.table.scope_name()
    }

    /// Decode a raw driver value using this column's type rule.
    pub fn decode(&self, value: Value) -> QueryResult<Value> {
        match self.ty {
            Some(ty) => ty.decode(&self.name, value),
            None => Ok(value),
        }
    }
}

/// Declaration of a column, consumed by [`TableBuilder`](super::TableBuilder).
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub(crate) field: String,
    pub(crate) name: String,
    pub(crate) ty: ColumnType,
    pub(crate) not_null: bool,
    pub(crate) has_default: bool,
    pub(crate) primary_key: bool,
    pub(crate) auto_increment: bool,
}

impl ColumnDef {
    /// Declare a column. The logical field name defaults to the column name.
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        let name = name.into();
        let serial = ty.is_serial();
        Self {
            field: name.clone(),
            name,
            ty,
            not_null: serial,
            has_default: serial,
            primary_key: false,
            auto_increment: serial,
        }
    }

    /// Use a different logical field name than the database column name.
    pub fn field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Mark that the database supplies a default value.
    pub fn has_default(mut self) -> Self {
        self.has_default = true;
        self
    }

    /// Primary keys are implicitly NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self.has_default = true;
        self
    }
}

pub fn serial(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Serial)
}

pub fn big_serial(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::BigSerial)
}

pub fn integer(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Integer)
}

pub fn big_int(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::BigInt)
}

pub fn double(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Double)
}

pub fn text(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Text)
}

pub fn varchar(name: impl Into<String>, len: u32) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Varchar(Some(len)))
}

pub fn boolean(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Boolean)
}

pub fn json(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Json)
}

pub fn uuid(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Uuid)
}

pub fn timestamp(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::Timestamp)
}

pub fn timestamptz(name: impl Into<String>) -> ColumnDef {
    ColumnDef::new(name, ColumnType::TimestampTz)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_implies_flags() {
        let def = serial("id");
        assert!(def.not_null);
        assert!(def.has_default);
        assert!(def.auto_increment);
        assert!(!def.primary_key);
    }

    #[test]
    fn test_decode_numeric_string_for_serial() {
        let v = ColumnType::Serial.decode("id", Value::Text("42".into())).unwrap();
        assert_eq!(v, Value::Int(42));
    }

    #[test]
    fn test_decode_bad_integer() {
        let err = ColumnType::BigInt
            .decode("id", Value::Text("forty".into()))
            .unwrap_err();
        assert!(matches!(err, QueryError::Decode { ref column, .. } if column == "id"));
    }

    #[test]
    fn test_decode_sqlite_boolean_and_json() {
        assert_eq!(
            ColumnType::Boolean.decode("active", Value::Int(1)).unwrap(),
            Value::Bool(true)
        );
        assert_eq!(
            ColumnType::Json
                .decode("meta", Value::Text(r#"{"a":1}"#.into()))
                .unwrap(),
            Value::Json(serde_json::json!({"a": 1}))
        );
    }

    #[test]
    fn test_decode_timestamps() {
        let v = ColumnType::Timestamp
            .decode("created_at", Value::Text("2024-03-01 10:20:30".into()))
            .unwrap();
        assert!(matches!(v, Value::Timestamp(_)));

        let v = ColumnType::TimestampTz
            .decode("created_at", Value::Text("2024-03-01T10:20:30Z".into()))
            .unwrap();
        assert!(matches!(v, Value::TimestampTz(_)));
    }

    #[test]
    fn test_decode_passes_through_matching_values() {
        assert_eq!(
            ColumnType::Text.decode("name", Value::Text("a".into())).unwrap(),
            Value::Text("a".into())
        );
        assert_eq!(ColumnType::Integer.decode("n", Value::Null).unwrap(), Value::Null);
    }
}
