//! Hierarchical configuration parameters.
//!
//! [`ParameterList`] is the configuration surface consumed by the registry
//! and the driver: a flat, insertion-ordered key/value map whose values may
//! themselves be nested lists. Reading it from a file is left to callers.

use indexmap::IndexMap;

use crate::error::ParameterError;

/// A single configuration value.
#[derive(Clone, Debug, PartialEq)]
pub enum ParamValue {
    /// Floating-point value.
    Double(f64),
    /// Integer value.
    Int(i64),
    /// Boolean flag.
    Bool(bool),
    /// String value.
    Str(String),
    /// Nested parameter list.
    List(ParameterList),
}

impl ParamValue {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Double(_) => "double",
            Self::Int(_) => "int",
            Self::Bool(_) => "bool",
            Self::Str(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// Ordered map from parameter name to [`ParamValue`].
///
/// Keys keep their insertion order so iteration (and therefore logging
/// and block enumeration) is deterministic.
///
/// ```
/// use strata_core::ParameterList;
///
/// let params = ParameterList::new()
///     .with_f64("Gravity z", -9.81)
///     .with_i64("Number of mesh blocks", 1)
///     .with_list(
///         "Mesh block 1",
///         ParameterList::new().with_i64("Mesh block ID", 100),
///     );
/// assert_eq!(params.get_f64("Gravity z").unwrap(), -9.81);
/// assert_eq!(params.sublist("Mesh block 1").unwrap().get_i64("Mesh block ID").unwrap(), 100);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParameterList {
    entries: IndexMap<String, ParamValue>,
}

impl ParameterList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value.
    pub fn set(&mut self, key: impl Into<String>, value: ParamValue) -> &mut Self {
        self.entries.insert(key.into(), value);
        self
    }

    /// Builder form of [`set`](Self::set) for a double.
    pub fn with_f64(mut self, key: impl Into<String>, value: f64) -> Self {
        self.set(key, ParamValue::Double(value));
        self
    }

    /// Builder form of [`set`](Self::set) for an integer.
    pub fn with_i64(mut self, key: impl Into<String>, value: i64) -> Self {
        self.set(key, ParamValue::Int(value));
        self
    }

    /// Builder form of [`set`](Self::set) for a boolean.
    pub fn with_bool(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set(key, ParamValue::Bool(value));
        self
    }

    /// Builder form of [`set`](Self::set) for a string.
    pub fn with_str(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, ParamValue::Str(value.into()));
        self
    }

    /// Builder form of [`set`](Self::set) for a nested list.
    pub fn with_list(mut self, key: impl Into<String>, value: ParameterList) -> Self {
        self.set(key, ParamValue::List(value));
        self
    }

    /// Whether `key` is present (with any type).
    pub fn is_parameter(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Whether `key` is present and holds a nested list.
    pub fn is_sublist(&self, key: &str) -> bool {
        matches!(self.entries.get(key), Some(ParamValue::List(_)))
    }

    /// Raw value lookup.
    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.entries.get(key)
    }

    /// Number of entries at this level.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this level has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Read a required double. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Result<f64, ParameterError> {
        match self.lookup(key)? {
            ParamValue::Double(v) => Ok(*v),
            ParamValue::Int(v) => Ok(*v as f64),
            other => Err(mismatch(key, "double", other)),
        }
    }

    /// Read an optional double; `Ok(None)` if absent.
    pub fn get_f64_opt(&self, key: &str) -> Result<Option<f64>, ParameterError> {
        if self.is_parameter(key) {
            self.get_f64(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a double, falling back to `default` if absent.
    pub fn get_f64_or(&self, key: &str, default: f64) -> Result<f64, ParameterError> {
        Ok(self.get_f64_opt(key)?.unwrap_or(default))
    }

    /// Read a required integer.
    pub fn get_i64(&self, key: &str) -> Result<i64, ParameterError> {
        match self.lookup(key)? {
            ParamValue::Int(v) => Ok(*v),
            other => Err(mismatch(key, "int", other)),
        }
    }

    /// Read an optional integer; `Ok(None)` if absent.
    pub fn get_i64_opt(&self, key: &str) -> Result<Option<i64>, ParameterError> {
        if self.is_parameter(key) {
            self.get_i64(key).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Read a required boolean.
    pub fn get_bool(&self, key: &str) -> Result<bool, ParameterError> {
        match self.lookup(key)? {
            ParamValue::Bool(v) => Ok(*v),
            other => Err(mismatch(key, "bool", other)),
        }
    }

    /// Read a required string.
    pub fn get_str(&self, key: &str) -> Result<&str, ParameterError> {
        match self.lookup(key)? {
            ParamValue::Str(v) => Ok(v.as_str()),
            other => Err(mismatch(key, "string", other)),
        }
    }

    /// Borrow a required nested list.
    pub fn sublist(&self, name: &str) -> Result<&ParameterList, ParameterError> {
        match self.entries.get(name) {
            Some(ParamValue::List(list)) => Ok(list),
            Some(other) => Err(mismatch(name, "list", other)),
            None => Err(ParameterError::MissingSublist {
                name: name.to_string(),
            }),
        }
    }

    fn lookup(&self, key: &str) -> Result<&ParamValue, ParameterError> {
        self.entries.get(key).ok_or_else(|| ParameterError::Missing {
            key: key.to_string(),
        })
    }
}

fn mismatch(key: &str, expected: &'static str, found: &ParamValue) -> ParameterError {
    ParameterError::TypeMismatch {
        key: key.to_string(),
        expected,
        found: found.type_name(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn missing_key_reports_name() {
        let params = ParameterList::new();
        assert_eq!(
            params.get_f64("Gravity x"),
            Err(ParameterError::Missing {
                key: "Gravity x".into()
            })
        );
    }

    #[test]
    fn int_widens_to_double_but_not_back() {
        let params = ParameterList::new()
            .with_i64("a", 3)
            .with_f64("b", 2.5);
        assert_eq!(params.get_f64("a").unwrap(), 3.0);
        assert!(matches!(
            params.get_i64("b"),
            Err(ParameterError::TypeMismatch {
                expected: "int",
                found: "double",
                ..
            })
        ));
    }

    #[test]
    fn optional_lookups() {
        let params = ParameterList::new().with_f64("Constant viscosity", 8.9e-4);
        assert_eq!(params.get_f64_opt("Constant viscosity").unwrap(), Some(8.9e-4));
        assert_eq!(params.get_f64_opt("Constant water density").unwrap(), None);
        assert_eq!(params.get_f64_or("Constant water density", 1000.0).unwrap(), 1000.0);
    }

    #[test]
    fn sublist_errors() {
        let params = ParameterList::new().with_f64("Mesh block 1", 1.0);
        assert!(matches!(
            params.sublist("Mesh block 1"),
            Err(ParameterError::TypeMismatch { .. })
        ));
        assert!(matches!(
            params.sublist("Mesh block 2"),
            Err(ParameterError::MissingSublist { .. })
        ));
    }

    #[test]
    fn bool_and_string_values() {
        let params = ParameterList::new()
            .with_bool("Write visualization", true)
            .with_str("Mesh type", "column")
            .with_list("Coordinator", ParameterList::new());
        assert!(params.get_bool("Write visualization").unwrap());
        assert_eq!(params.get_str("Mesh type").unwrap(), "column");
        assert!(matches!(
            params.get_bool("Mesh type"),
            Err(ParameterError::TypeMismatch {
                expected: "bool",
                found: "string",
                ..
            })
        ));
        assert!(params.is_sublist("Coordinator"));
        assert!(!params.is_sublist("Mesh type"));
        assert!(!params.is_sublist("Mesh block 1"));
    }

    proptest! {
        #[test]
        fn iteration_preserves_insertion_order(keys in prop::collection::vec("[a-z]{1,8}", 0..16)) {
            let mut params = ParameterList::new();
            let mut expected: Vec<String> = Vec::new();
            for (i, k) in keys.iter().enumerate() {
                params.set(k.clone(), ParamValue::Int(i as i64));
                if !expected.contains(k) {
                    expected.push(k.clone());
                }
            }
            let got: Vec<String> = params.iter().map(|(k, _)| k.to_string()).collect();
            prop_assert_eq!(got, expected);
        }
    }
}
