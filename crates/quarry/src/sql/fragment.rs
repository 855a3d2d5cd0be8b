use super::param::Param;
use crate::qb::SelectConfig;
use crate::schema::Column;
use crate::value::Value;
use std::borrow::Cow;
use std::sync::Arc;

/// An immutable piece of SQL: literal text, a bound value, a column reference,
/// or an ordered list of child fragments.
///
/// Fragments never contain dialect-specific text; quoting and placeholder
/// tokens are produced when a [`Dialect`](crate::dialect::Dialect) reduces the
/// tree. Token order (and therefore parameter order) is the depth-first,
/// left-to-right order of the tree.
#[derive(Debug, Clone)]
pub struct Fragment(pub(crate) Node);

#[derive(Debug, Clone)]
pub(crate) enum Node {
    Raw(Cow<'static, str>),
    Param(Param),
    Column(ColumnRef),
    /// A bare identifier, quoted but not qualified.
    Ident(String),
    Nested(Vec<Fragment>),
    /// A SELECT lowered when the outer statement is compiled; renders as `( ... )`.
    Subquery(Arc<SelectConfig>),
    /// An argument-shape error, raised as `MalformedQuery` at compile time.
    Invalid(String),
}

/// A column reference, optionally rendered against another table alias.
#[derive(Debug, Clone)]
pub(crate) struct ColumnRef {
    pub(crate) column: Column,
    pub(crate) table_alias: Option<String>,
}

impl ColumnRef {
    pub(crate) fn scope(&self) -> &str {
        self.table_alias
            .as_deref()
            .unwrap_or_else(|| self.column.scope_name())
    }
}

impl Fragment {
    /// Literal SQL text, emitted verbatim.
    pub fn raw(text: impl Into<Cow<'static, str>>) -> Self {
        Fragment(Node::Raw(text.into()))
    }

    /// A bound parameter.
    pub fn param(value: impl Into<Value>) -> Self {
        Fragment(Node::Param(Param::new(value)))
    }

    pub fn bound(param: Param) -> Self {
        Fragment(Node::Param(param))
    }

    /// A qualified column reference (`"table"."column"`).
    pub fn column(column: &Column) -> Self {
        Fragment(Node::Column(ColumnRef {
            column: column.clone(),
            table_alias: None,
        }))
    }

    /// A column reference qualified with `alias` instead of the column's own scope.
    pub fn column_in(column: &Column, alias: impl Into<String>) -> Self {
        Fragment(Node::Column(ColumnRef {
            column: column.clone(),
            table_alias: Some(alias.into()),
        }))
    }

    /// A quoted, unqualified identifier.
    pub fn ident(name: impl Into<String>) -> Self {
        Fragment(Node::Ident(name.into()))
    }

    pub(crate) fn subquery(config: Arc<SelectConfig>) -> Self {
        Fragment(Node::Subquery(config))
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Fragment(Node::Invalid(message.into()))
    }

    /// Concatenate fragments in order.
    ///
    /// Children that are themselves nested contribute their children directly.
    pub fn nested<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let mut children = Vec::new();
        for part in parts {
            match part.into() {
                Fragment(Node::Nested(inner)) => children.extend(inner),
                other => children.push(other),
            }
        }
        Fragment(Node::Nested(children))
    }

    /// An empty fragment.
    pub fn empty() -> Self {
        Fragment(Node::Nested(Vec::new()))
    }

    /// Join fragments with a literal separator.
    pub fn join<I>(parts: I, separator: &'static str) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let mut out = Vec::new();
        for (i, part) in parts.into_iter().enumerate() {
            if i > 0 {
                out.push(Fragment::raw(separator));
            }
            out.push(part.into());
        }
        Fragment::nested(out)
    }

    /// Interpolate `args` at each `?` of `template`.
    ///
    /// ```ignore
    /// Fragment::template("coalesce(?, ?)", [Fragment::column(&users["nick"]), Fragment::param("anon")])
    /// ```
    pub fn template<I>(template: &str, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Fragment>,
    {
        let args: Vec<Fragment> = args.into_iter().map(Into::into).collect();
        let expected = template.matches('?').count();
        if args.len() != expected {
            return Fragment::invalid(format!(
                "template \"{template}\" expects {expected} argument(s), got {}",
                args.len()
            ));
        }

        let mut parts = Vec::with_capacity(expected * 2 + 1);
        let mut args = args.into_iter();
        for (i, piece) in template.split('?').enumerate() {
            if i > 0 {
                if let Some(arg) = args.next() {
                    parts.push(arg);
                }
            }
            if !piece.is_empty() {
                parts.push(Fragment::raw(piece.to_string()));
            }
        }
        Fragment::nested(parts)
    }

    /// Wrap in literal parentheses.
    pub fn parenthesized(self) -> Self {
        Fragment::nested([Fragment::raw("("), self, Fragment::raw(")")])
    }

    pub fn is_empty(&self) -> bool {
        matches!(&self.0, Node::Nested(children) if children.is_empty())
    }

    /// The column this fragment refers to, when it is a bare column reference.
    pub fn as_column(&self) -> Option<&Column> {
        match &self.0 {
            Node::Column(c) => Some(&c.column),
            _ => None,
        }
    }
}

impl From<&'static str> for Fragment {
    fn from(text: &'static str) -> Self {
        Fragment::raw(text)
    }
}

impl From<&Column> for Fragment {
    fn from(column: &Column) -> Self {
        Fragment::column(column)
    }
}

impl From<Param> for Fragment {
    fn from(param: Param) -> Self {
        Fragment::bound(param)
    }
}
