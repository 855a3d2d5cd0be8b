//! Clause assembly: builder config → one fragment tree, in fixed clause order.
//!
//! Every required-clause and dialect-capability check happens here, before
//! anything is reduced to text.

use super::reduce::Reducer;
use super::{Dialect, UpsertStyle};
use crate::error::{QueryError, QueryResult};
use crate::qb::{
    ConflictAction, DeleteConfig, InsertConfig, OnConflict, SelectConfig, SelectField, SetValue,
    Source, UpdateConfig, Values,
};
use crate::schema::{Column, Table};
use crate::sql::{CompiledQuery, Fragment, ResultField};

/// An assembled statement, not yet reduced.
pub(crate) struct Lowered {
    pub(crate) fragment: Fragment,
    pub(crate) fields: Vec<ResultField>,
    pub(crate) returns_rows: bool,
}

impl Lowered {
    pub(crate) fn reduce<D: Dialect + ?Sized>(self, dialect: &D) -> QueryResult<CompiledQuery> {
        let mut reducer = Reducer::new(dialect);
        reducer.push(&self.fragment)?;
        Ok(reducer.finish(self.fields, self.returns_rows))
    }
}

fn result_fields(fields: &[SelectField]) -> Vec<ResultField> {
    fields
        .iter()
        .map(|f| ResultField {
            name: f.name.clone(),
            ty: f.expr.as_column().and_then(Column::column_type),
        })
        .collect()
}

/// `"t"` or `"t" AS "alias"`.
fn table_source(table: &Table) -> Fragment {
    match table.alias() {
        Some(alias) => Fragment::nested([
            Fragment::ident(table.name()),
            Fragment::raw(" AS "),
            Fragment::ident(alias),
        ]),
        None => Fragment::ident(table.name()),
    }
}

fn source(src: &Source, ctes: &[String]) -> QueryResult<Fragment> {
    match src {
        Source::Table(table) => Ok(table_source(table)),
        Source::Subquery(sq) => Ok(Fragment::nested([
            Fragment::subquery(sq.config.clone()),
            Fragment::raw(" AS "),
            Fragment::ident(sq.alias()),
        ])),
        Source::Cte(cte) => {
            if !ctes.iter().any(|name| name == cte.name()) {
                return Err(QueryError::malformed(format!(
                    "CTE \"{}\" is referenced but not registered with `with`",
                    cte.name()
                )));
            }
            Ok(Fragment::ident(cte.name()))
        }
    }
}

fn select_field(field: &SelectField) -> Fragment {
    match field.expr.as_column() {
        Some(column) if column.name() == field.name => field.expr.clone(),
        _ => Fragment::nested([
            field.expr.clone(),
            Fragment::raw(" AS "),
            Fragment::ident(field.name.clone()),
        ]),
    }
}

/// RETURNING lists the target's own columns unqualified.
fn returning_field(field: &SelectField) -> Fragment {
    match field.expr.as_column() {
        Some(column) if column.name() == field.name => Fragment::ident(column.name()),
        Some(column) => Fragment::nested([
            Fragment::ident(column.name()),
            Fragment::raw(" AS "),
            Fragment::ident(field.name.clone()),
        ]),
        None => select_field(field),
    }
}

fn returning<D: Dialect + ?Sized>(
    dialect: &D,
    parts: &mut Vec<Fragment>,
    fields: Option<&Vec<SelectField>>,
) -> QueryResult<(Vec<ResultField>, bool)> {
    let Some(fields) = fields else {
        return Ok((Vec::new(), false));
    };
    if !dialect.supports_returning() {
        return Err(QueryError::unsupported(
            dialect.name(),
            "RETURNING is not supported",
        ));
    }
    if fields.is_empty() {
        return Err(QueryError::malformed("RETURNING requires at least one field"));
    }
    parts.push(Fragment::raw(" RETURNING "));
    parts.push(Fragment::join(fields.iter().map(returning_field), ", "));
    Ok((result_fields(fields), true))
}

fn filter(parts: &mut Vec<Fragment>, condition: Option<&Fragment>) {
    if let Some(condition) = condition {
        parts.push(Fragment::raw(" WHERE "));
        parts.push(condition.clone());
    }
}

/// The right-hand side of one assignment or one INSERT cell.
fn set_value<D: Dialect + ?Sized>(
    dialect: &D,
    table: &Table,
    column: &Column,
    value: &SetValue,
    allow_excluded: bool,
) -> QueryResult<Fragment> {
    Ok(match value {
        SetValue::Param(param) => {
            let ty = param.ty.or_else(|| column.column_type());
            Fragment::bound(param.clone().typed(ty))
        }
        SetValue::Sql(fragment) => fragment.clone(),
        SetValue::Default if dialect.supports_default_keyword() => Fragment::raw("DEFAULT"),
        SetValue::Default => {
            return Err(QueryError::unsupported(
                dialect.name(),
                format!("DEFAULT cannot be assigned to \"{}\"", column.field()),
            ));
        }
        SetValue::Excluded(field) if allow_excluded => {
            dialect.excluded(table.try_column(field)?.name())
        }
        SetValue::Excluded(field) => {
            return Err(QueryError::malformed(format!(
                "excluded value for \"{field}\" is only valid in an upsert update"
            )));
        }
    })
}

/// `"a" = $1, "b" = DEFAULT`
fn assignments<D: Dialect + ?Sized>(
    dialect: &D,
    table: &Table,
    values: &Values,
    allow_excluded: bool,
) -> QueryResult<Fragment> {
    let mut parts = Vec::with_capacity(values.len());
    for (field, value) in values.iter() {
        let column = table.try_column(field)?;
        parts.push(Fragment::nested([
            Fragment::ident(column.name()),
            Fragment::raw(" = "),
            set_value(dialect, table, column, value, allow_excluded)?,
        ]));
    }
    Ok(Fragment::join(parts, ", "))
}

pub(crate) fn select<D: Dialect + ?Sized>(
    dialect: &D,
    config: &SelectConfig,
    ctes: &[String],
) -> QueryResult<Lowered> {
    if config.fields.is_empty() {
        return Err(QueryError::malformed("select requires at least one field"));
    }

    let mut parts = Vec::new();
    if !config.ctes.is_empty() {
        parts.push(Fragment::raw("WITH "));
        parts.push(Fragment::join(
            config.ctes.iter().map(|cte| {
                Fragment::nested([
                    Fragment::ident(cte.name()),
                    Fragment::raw(" AS "),
                    Fragment::subquery(cte.config.clone()),
                ])
            }),
            ", ",
        ));
        parts.push(Fragment::raw(" "));
    }

    parts.push(Fragment::raw(if config.distinct {
        "SELECT DISTINCT "
    } else {
        "SELECT "
    }));
    parts.push(Fragment::join(config.fields.iter().map(select_field), ", "));
    parts.push(Fragment::raw(" FROM "));
    parts.push(source(&config.from, ctes)?);

    for join in &config.joins {
        if join.kind == crate::qb::JoinKind::Full && !dialect.supports_full_join() {
            return Err(QueryError::unsupported(
                dialect.name(),
                "FULL JOIN is not supported",
            ));
        }
        parts.push(Fragment::raw(" "));
        parts.push(Fragment::raw(join.kind.keyword()));
        parts.push(Fragment::raw(" "));
        parts.push(source(&join.source, ctes)?);
        parts.push(Fragment::raw(" ON "));
        parts.push(join.on.clone());
    }

    filter(&mut parts, config.filter.as_ref());

    if !config.group_by.is_empty() {
        parts.push(Fragment::raw(" GROUP BY "));
        parts.push(Fragment::join(config.group_by.iter().cloned(), ", "));
    }
    if let Some(having) = &config.having {
        parts.push(Fragment::raw(" HAVING "));
        parts.push(having.clone());
    }
    if !config.order_by.is_empty() {
        parts.push(Fragment::raw(" ORDER BY "));
        parts.push(Fragment::join(config.order_by.iter().cloned(), ", "));
    }
    if let Some(clause) = dialect.limit_offset(config.limit.clone(), config.offset.clone()) {
        parts.push(Fragment::raw(" "));
        parts.push(clause);
    }

    Ok(Lowered {
        fragment: Fragment::nested(parts),
        fields: result_fields(&config.fields),
        returns_rows: true,
    })
}

pub(crate) fn insert<D: Dialect + ?Sized>(dialect: &D, config: &InsertConfig) -> QueryResult<Lowered> {
    let table = &config.table;
    if config.rows.is_empty() {
        return Err(QueryError::malformed("insert requires at least one row"));
    }
    for row in &config.rows {
        for (field, _) in row.iter() {
            table.try_column(field)?;
        }
    }

    // Union of provided fields, in declared order. Without a DEFAULT keyword a
    // column that is only ever set to DEFAULT is left to the table default.
    let provided = |value: Option<&SetValue>| match value {
        Some(SetValue::Default) => dialect.supports_default_keyword(),
        Some(_) => true,
        None => false,
    };
    let columns: Vec<&Column> = table
        .columns()
        .iter()
        .filter(|c| config.rows.iter().any(|row| provided(row.get(c.field()))))
        .collect();

    let ignore = matches!(
        (&config.on_conflict, dialect.upsert_style()),
        (
            Some(OnConflict {
                action: ConflictAction::Nothing,
                ..
            }),
            UpsertStyle::DuplicateKey
        )
    );
    let mut parts = vec![
        Fragment::raw(if ignore {
            "INSERT IGNORE INTO "
        } else {
            "INSERT INTO "
        }),
        Fragment::ident(table.name()),
    ];

    if columns.is_empty() {
        if config.rows.len() > 1 {
            return Err(QueryError::malformed(
                "multi-row insert requires at least one provided field",
            ));
        }
        parts.push(Fragment::raw(" "));
        parts.push(Fragment::raw(dialect.empty_insert()));
    } else {
        parts.push(Fragment::raw(" "));
        parts.push(Fragment::join(columns.iter().map(|c| Fragment::ident(c.name())), ", ").parenthesized());
        parts.push(Fragment::raw(" VALUES "));

        let mut rows = Vec::with_capacity(config.rows.len());
        for row in &config.rows {
            let mut cells = Vec::with_capacity(columns.len());
            for column in &columns {
                cells.push(match row.get(column.field()) {
                    Some(value) => set_value(dialect, table, column, value, false)?,
                    None => Fragment::raw(dialect.missing_insert_value()),
                });
            }
            rows.push(Fragment::join(cells, ", ").parenthesized());
        }
        parts.push(Fragment::join(rows, ", "));
    }

    if let Some(on_conflict) = &config.on_conflict {
        upsert(dialect, table, on_conflict, &mut parts)?;
    }

    let (fields, returns_rows) = returning(dialect, &mut parts, config.returning.as_ref())?;
    Ok(Lowered {
        fragment: Fragment::nested(parts),
        fields,
        returns_rows,
    })
}

fn upsert<D: Dialect + ?Sized>(
    dialect: &D,
    table: &Table,
    on_conflict: &OnConflict,
    parts: &mut Vec<Fragment>,
) -> QueryResult<()> {
    let set = match &on_conflict.action {
        ConflictAction::Nothing if on_conflict.filter.is_some() => {
            return Err(QueryError::malformed(
                "an upsert filter requires on_conflict_do_update",
            ));
        }
        ConflictAction::Nothing => None,
        ConflictAction::Update(set) if set.is_empty() => {
            return Err(QueryError::malformed(
                "on_conflict_do_update requires at least one SET entry",
            ));
        }
        ConflictAction::Update(set) => Some(set),
    };

    match dialect.upsert_style() {
        UpsertStyle::OnConflict => {
            parts.push(Fragment::raw(" ON CONFLICT"));
            if !on_conflict.target.is_empty() {
                parts.push(Fragment::raw(" "));
                parts.push(
                    Fragment::join(
                        on_conflict.target.iter().map(|c| Fragment::ident(c.name())),
                        ", ",
                    )
                    .parenthesized(),
                );
            }
            match set {
                None => parts.push(Fragment::raw(" DO NOTHING")),
                Some(set) => {
                    if on_conflict.target.is_empty() {
                        return Err(QueryError::malformed(
                            "on_conflict_do_update requires a conflict target",
                        ));
                    }
                    parts.push(Fragment::raw(" DO UPDATE SET "));
                    parts.push(assignments(dialect, table, set, true)?);
                    filter(parts, on_conflict.filter.as_ref());
                }
            }
        }
        UpsertStyle::DuplicateKey => {
            // DO NOTHING is carried by the INSERT IGNORE prefix.
            if let Some(set) = set {
                if on_conflict.filter.is_some() {
                    return Err(QueryError::unsupported(
                        dialect.name(),
                        "ON DUPLICATE KEY UPDATE cannot be filtered",
                    ));
                }
                parts.push(Fragment::raw(" ON DUPLICATE KEY UPDATE "));
                parts.push(assignments(dialect, table, set, true)?);
            }
        }
    }
    Ok(())
}

pub(crate) fn update<D: Dialect + ?Sized>(dialect: &D, config: &UpdateConfig) -> QueryResult<Lowered> {
    if config.set.is_empty() {
        return Err(QueryError::malformed(
            "update requires at least one SET entry",
        ));
    }

    let mut parts = vec![
        Fragment::raw("UPDATE "),
        table_source(&config.table),
        Fragment::raw(" SET "),
        assignments(dialect, &config.table, &config.set, false)?,
    ];
    filter(&mut parts, config.filter.as_ref());

    let (fields, returns_rows) = returning(dialect, &mut parts, config.returning.as_ref())?;
    Ok(Lowered {
        fragment: Fragment::nested(parts),
        fields,
        returns_rows,
    })
}

pub(crate) fn delete<D: Dialect + ?Sized>(dialect: &D, config: &DeleteConfig) -> QueryResult<Lowered> {
    let mut parts = vec![Fragment::raw("DELETE FROM "), table_source(&config.table)];
    filter(&mut parts, config.filter.as_ref());

    let (fields, returns_rows) = returning(dialect, &mut parts, config.returning.as_ref())?;
    Ok(Lowered {
        fragment: Fragment::nested(parts),
        fields,
        returns_rows,
    })
}
