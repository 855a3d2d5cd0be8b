use super::Dialect;
use super::build;
use crate::error::{QueryError, QueryResult};
use crate::qb::SelectConfig;
use crate::sql::{CompiledQuery, Fragment, Node, Param, ResultField};

/// Depth-first, left-to-right reduction of a fragment tree.
///
/// Parameters are appended in traversal order, so the Nth placeholder emitted
/// always matches the Nth parameter.
pub(crate) struct Reducer<'d, D: Dialect + ?Sized> {
    dialect: &'d D,
    sql: String,
    params: Vec<Param>,
    /// CTE names visible at the current nesting level.
    ctes: Vec<String>,
}

impl<'d, D: Dialect + ?Sized> Reducer<'d, D> {
    pub(crate) fn new(dialect: &'d D) -> Self {
        Self {
            dialect,
            sql: String::new(),
            params: Vec::new(),
            ctes: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, fragment: &Fragment) -> QueryResult<()> {
        match &fragment.0 {
            Node::Raw(text) => self.sql.push_str(text),
            Node::Param(param) => {
                self.params.push(param.clone());
                let token = self.dialect.placeholder(self.params.len());
                self.sql.push_str(&token);
            }
            Node::Column(column) => {
                self.sql.push_str(&self.dialect.quote_identifier(column.scope()));
                self.sql.push('.');
                self.sql
                    .push_str(&self.dialect.quote_identifier(column.column.name()));
            }
            Node::Ident(name) => self.sql.push_str(&self.dialect.quote_identifier(name)),
            Node::Nested(children) => {
                for child in children {
                    self.push(child)?;
                }
            }
            Node::Subquery(config) => {
                self.sql.push('(');
                self.push_select(config)?;
                self.sql.push(')');
            }
            Node::Invalid(message) => return Err(QueryError::malformed(message.clone())),
        }
        Ok(())
    }

    /// Assemble and reduce a SELECT, with its CTEs in scope for its body.
    pub(crate) fn push_select(&mut self, config: &SelectConfig) -> QueryResult<Vec<ResultField>> {
        let mark = self.ctes.len();
        self.ctes
            .extend(config.ctes.iter().map(|cte| cte.name().to_string()));
        let result = build::select(self.dialect, config, &self.ctes)
            .and_then(|lowered| self.push(&lowered.fragment).map(|()| lowered.fields));
        self.ctes.truncate(mark);
        result
    }

    pub(crate) fn finish(self, fields: Vec<ResultField>, returns_rows: bool) -> CompiledQuery {
        CompiledQuery {
            sql: self.sql,
            params: self.params,
            fields,
            returns_rows,
        }
    }
}
