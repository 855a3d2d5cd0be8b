//! Bound parameters and execution-time bindings.

use crate::error::{QueryError, QueryResult};
use crate::schema::ColumnType;
use crate::value::Value;
use std::collections::{BTreeMap, HashMap};

/// Where a bound parameter's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Known at build time.
    Value(Value),
    /// Supplied by name when a prepared query is executed.
    Placeholder(String),
}

/// A value destined for a placeholder, never inlined as literal text.
///
/// `ty` is the declared type of the column the value was compared against or
/// assigned to, when there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: ParamValue,
    pub ty: Option<ColumnType>,
}

impl Param {
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: ParamValue::Value(value.into()),
            ty: None,
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            value: ParamValue::Placeholder(name.into()),
            ty: None,
        }
    }

    /// Attach the declared column type.
    pub fn typed(mut self, ty: Option<ColumnType>) -> Self {
        self.ty = ty;
        self
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.value, ParamValue::Placeholder(_))
    }
}

/// Values supplied when executing a compiled query.
///
/// Named entries fill placeholders; positional entries (0-based, in
/// placeholder order) override whatever the compiled query bound there.
#[derive(Debug, Clone, Default)]
pub struct Bindings {
    positional: BTreeMap<usize, Value>,
    named: HashMap<String, Value>,
}

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Supply a value for `placeholder(name)`.
    pub fn set(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.insert(name.into(), value.into());
        self
    }

    /// Override the parameter at `index` (0-based).
    pub fn at(mut self, index: usize, value: impl Into<Value>) -> Self {
        self.positional.insert(index, value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }

    /// Produce the final ordered value list for `params`.
    pub(crate) fn resolve(&self, params: &[Param]) -> QueryResult<Vec<Value>> {
        if let Some((&index, _)) = self.positional.range(params.len()..).next() {
            return Err(QueryError::malformed(format!(
                "positional binding {index} is out of range for {} parameter(s)",
                params.len()
            )));
        }

        params
            .iter()
            .enumerate()
            .map(|(i, param)| {
                if let Some(v) = self.positional.get(&i) {
                    return Ok(v.clone());
                }
                match &param.value {
                    ParamValue::Value(v) => Ok(v.clone()),
                    ParamValue::Placeholder(name) => self.named.get(name).cloned().ok_or_else(|| {
                        QueryError::malformed(format!("no value bound for placeholder \"{name}\""))
                    }),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fills_placeholders_and_overrides() {
        let params = vec![
            Param::new(1),
            Param::placeholder("name"),
            Param::new("x"),
        ];
        let values = Bindings::new()
            .set("name", "alice")
            .at(2, "y")
            .resolve(&params)
            .unwrap();
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Text("alice".into()), Value::Text("y".into())]
        );
    }

    #[test]
    fn test_resolve_missing_placeholder() {
        let err = Bindings::new()
            .resolve(&[Param::placeholder("id")])
            .unwrap_err();
        assert!(err.is_malformed());
    }

    #[test]
    fn test_resolve_positional_out_of_range() {
        let err = Bindings::new()
            .at(3, 1)
            .resolve(&[Param::new(1)])
            .unwrap_err();
        assert!(err.is_malformed());
    }
}
