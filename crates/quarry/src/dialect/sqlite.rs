use super::Dialect;
use crate::schema::{Column, ColumnType};
use crate::sql::Fragment;

/// SQLite: `"ident"`, `?` placeholders, `ON CONFLICT`, RETURNING.
///
/// Missing multi-row INSERT cells are `NULL` (SQLite has no `DEFAULT` in a
/// VALUES row); an INTEGER PRIMARY KEY still assigns itself on `NULL`. A
/// column every INSERT row sets to `DEFAULT` is left out of the column list;
/// any other explicit `DEFAULT` is unsupported.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn supports_default_keyword(&self) -> bool {
        false
    }

    fn missing_insert_value(&self) -> &'static str {
        "NULL"
    }

    fn limit_offset(&self, limit: Option<Fragment>, offset: Option<Fragment>) -> Option<Fragment> {
        match (limit, offset) {
            (Some(l), Some(o)) => Some(Fragment::nested([
                Fragment::raw("LIMIT "),
                l,
                Fragment::raw(" OFFSET "),
                o,
            ])),
            (Some(l), None) => Some(Fragment::nested([Fragment::raw("LIMIT "), l])),
            (None, Some(o)) => Some(Fragment::nested([Fragment::raw("LIMIT -1 OFFSET "), o])),
            (None, None) => None,
        }
    }

    fn column_type_sql(&self, ty: ColumnType) -> String {
        match ty {
            ColumnType::SmallInt
            | ColumnType::Integer
            | ColumnType::BigInt
            | ColumnType::Serial
            | ColumnType::BigSerial
            | ColumnType::Boolean => "integer",
            ColumnType::Real | ColumnType::Double => "real",
            ColumnType::Numeric => "numeric",
            ColumnType::Bytes => "blob",
            ColumnType::Text
            | ColumnType::Varchar(_)
            | ColumnType::Json
            | ColumnType::Uuid
            | ColumnType::Date
            | ColumnType::Timestamp
            | ColumnType::TimestampTz => "text",
        }
        .to_string()
    }

    fn column_definition(&self, column: &Column, inline_primary_key: bool) -> String {
        let mut def = self.quote_identifier(column.name());
        if let Some(ty) = column.column_type() {
            def.push(' ');
            def.push_str(&self.column_type_sql(ty));
        }
        if inline_primary_key && column.is_primary_key() {
            def.push_str(" PRIMARY KEY");
            // AUTOINCREMENT is only legal on an INTEGER PRIMARY KEY
            if column.is_auto_increment() {
                def.push_str(" AUTOINCREMENT");
            }
        } else if column.is_not_null() {
            def.push_str(" NOT NULL");
        }
        def
    }
}
