//! The merged flat key/value view over flags and config file.

use std::collections::BTreeMap;

use toml::Value;

/// Read-only lookup over all configuration sources.
///
/// Values keep their TOML type; the typed accessors coerce common encodings
/// (booleans written as strings, numbers written as strings) because config
/// files in the wild contain both.
#[derive(Debug, Clone, Default)]
pub struct ConfigView {
    values: BTreeMap<String, Value>,
}

impl ConfigView {
    /// Create an empty view.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value under a flat key, replacing any previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    /// Merge a parsed config file table under its section names.
    ///
    /// Nested tables flatten with dot-joined keys; leaf keys are not split
    /// further, so a `[projectmap]` entry whose key contains dots stays one
    /// key.
    pub fn merge_table(&mut self, table: toml::Table) {
        for (key, value) in table {
            self.merge_value(key, value);
        }
    }

    fn merge_value(&mut self, prefix: String, value: Value) {
        match value {
            Value::Table(table) => {
                for (key, value) in table {
                    self.merge_value(format!("{prefix}.{key}"), value);
                }
            }
            other => {
                // flags win over file values
                self.values.entry(prefix).or_insert(other);
            }
        }
    }

    /// Whether any of the keys is present.
    pub fn has_any(&self, keys: &[&str]) -> bool {
        keys.iter().any(|key| self.values.contains_key(*key))
    }

    /// Raw value of the first present key.
    pub fn first(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter().find_map(|key| self.values.get(*key))
    }

    /// String form of the first present key.
    ///
    /// Scalars stringify (`true`, `42`, `1585598059.1`); tables and arrays
    /// yield `None`.
    pub fn first_string(&self, keys: &[&str]) -> Option<String> {
        self.first(keys).and_then(value_to_string)
    }

    /// Boolean form of the first present key, accepting the spellings
    /// `true/True/TRUE` and `false/False/FALSE`.
    pub fn first_bool(&self, keys: &[&str]) -> Option<bool> {
        self.first(keys).and_then(|value| match value {
            Value::Boolean(b) => Some(*b),
            Value::String(s) => parse_bool(s),
            _ => None,
        })
    }

    /// Integer form of the first present key; strings parse leniently.
    pub fn first_int(&self, keys: &[&str]) -> Option<i64> {
        self.first(keys).and_then(|value| match value {
            Value::Integer(n) => Some(*n),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// Float form of the first present key; integers and strings coerce.
    pub fn first_float(&self, keys: &[&str]) -> Option<f64> {
        self.first(keys).and_then(|value| match value {
            Value::Float(f) => Some(*f),
            Value::Integer(n) => Some(*n as f64),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
    }

    /// All list items of the first present key.
    ///
    /// Arrays yield their string elements; a plain string yields itself so
    /// newline-separated lists can be split by the caller.
    pub fn first_string_list(&self, keys: &[&str]) -> Option<Vec<String>> {
        self.first(keys).and_then(|value| match value {
            Value::Array(items) => Some(items.iter().filter_map(value_to_string).collect()),
            Value::String(s) => Some(vec![s.clone()]),
            _ => None,
        })
    }

    /// All `(suffix, value)` pairs under a `section.` prefix, in key order.
    pub fn section_entries(&self, section: &str) -> Vec<(String, String)> {
        let prefix = format!("{section}.");

        self.values
            .iter()
            .filter_map(|(key, value)| {
                let suffix = key.strip_prefix(&prefix)?;
                Some((suffix.to_string(), value_to_string(value)?))
            })
            .collect()
    }
}

fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Integer(n) => Some(n.to_string()),
        Value::Float(f) => Some(f.to_string()),
        Value::Boolean(b) => Some(b.to_string()),
        Value::Datetime(dt) => Some(dt.to_string()),
        Value::Array(_) | Value::Table(_) => None,
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim() {
        "true" | "True" | "TRUE" => Some(true),
        "false" | "False" | "FALSE" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
#[path = "view_test.rs"]
mod tests;
