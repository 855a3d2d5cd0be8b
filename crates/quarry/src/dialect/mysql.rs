use super::{Dialect, UpsertStyle};
use crate::schema::{Column, ColumnType};
use crate::sql::Fragment;

/// MySQL: `` `ident` ``, `?` placeholders, `INSERT IGNORE` / `ON DUPLICATE KEY
/// UPDATE`. No RETURNING and no FULL JOIN.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlDialect;

/// MySQL cannot express OFFSET without LIMIT; this is its documented "all rows" limit.
const MAX_LIMIT: &str = "18446744073709551615";

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn supports_returning(&self) -> bool {
        false
    }

    fn supports_full_join(&self) -> bool {
        false
    }

    fn upsert_style(&self) -> UpsertStyle {
        UpsertStyle::DuplicateKey
    }

    fn excluded(&self, column: &str) -> Fragment {
        Fragment::nested([
            Fragment::raw("VALUES("),
            Fragment::ident(column),
            Fragment::raw(")"),
        ])
    }

    fn empty_insert(&self) -> &'static str {
        "() VALUES ()"
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
            (None, Some(o)) => Some(Fragment::nested([
                Fragment::raw("LIMIT "),
                Fragment::raw(MAX_LIMIT),
                Fragment::raw(" OFFSET "),
                o,
            ])),
            (None, None) => None,
        }
    }

    fn column_type_sql(&self, ty: ColumnType) -> String {
        match ty {
            ColumnType::SmallInt => "smallint".into(),
            ColumnType::Integer => "int".into(),
            ColumnType::BigInt => "bigint".into(),
            ColumnType::Serial => "serial".into(),
            ColumnType::BigSerial => "bigint unsigned auto_increment".into(),
            ColumnType::Real => "float".into(),
            ColumnType::Double => "double".into(),
            ColumnType::Numeric => "decimal".into(),
            ColumnType::Text => "text".into(),
            ColumnType::Varchar(len) => format!("varchar({})", len.unwrap_or(255)),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Bytes => "blob".into(),
            ColumnType::Json => "json".into(),
            ColumnType::Uuid => "char(36)".into(),
            ColumnType::Date => "date".into(),
            ColumnType::Timestamp => "datetime".into(),
            ColumnType::TimestampTz => "timestamp".into(),
        }
    }

    fn column_definition(&self, column: &Column, inline_primary_key: bool) -> String {
        let mut def = self.quote_identifier(column.name());
        if let Some(ty) = column.column_type() {
            def.push(' ');
            def.push_str(&self.column_type_sql(ty));
            if column.is_auto_increment() && !ty.is_serial() {
                def.push_str(" AUTO_INCREMENT");
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
