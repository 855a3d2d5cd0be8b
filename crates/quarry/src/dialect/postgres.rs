use super::Dialect;
use crate::schema::{Column, ColumnType};

/// PostgreSQL: `"ident"`, `$n` placeholders, `ON CONFLICT`, RETURNING.
#[derive(Debug, Clone, Copy, Default)]
pub struct PgDialect;

impl Dialect for PgDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${index}")
    }

    fn column_type_sql(&self, ty: ColumnType) -> String {
        match ty {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Integer => "integer".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Serial => "serial".into(),
            ColumnType::BigSerial => "bigserial".into(),
            ColumnType::Real => "real".into(),
            ColumnType::Double => "double precision".into(),
            ColumnType::Numeric => "numeric".into(),
            ColumnType::Text => "text".into(),
            ColumnType::Varchar(Some(len)) => format!("varchar({len})"),
            ColumnType::Varchar(None) => "varchar".into(),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Bytes => "bytea".into(),
            ColumnType::Json => "jsonb".into(),
            ColumnType::Uuid => "uuid".into(),
            ColumnType::Date => "date".into(),
            ColumnType::Timestamp => "timestamp".into(),
            ColumnType::TimestampTz => "timestamptz".into(),
        }
    }

    fn column_definition(&self, column: &Column, inline_primary_key: bool) -> String {
        let mut def = self.quote_identifier(column.name());
        if let Some(ty) = column.column_type() {
            def.push(' ');
            def.push_str(&self.column_type_sql(ty));
            // serial already implies its sequence
            if column.is_auto_increment() && !ty.is_serial() {
                def.push_str(" GENERATED BY DEFAULT AS IDENTITY");
            }
        }
        if inline_primary_key && column.is_primary_key() {
            def.push_str(" PRIMARY KEY");
        } else if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }
}
