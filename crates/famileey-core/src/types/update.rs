//! Multi-path atomic update builder.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::error::AppError;
use crate::result::AppResult;
use crate::types::path;

/// A set of writes applied together with all-or-nothing visibility.
///
/// A `null` value deletes the location. Two entries where one path is an
/// ancestor of the other are rejected when the update is validated, as the
/// hosted database does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiPathUpdate {
    entries: BTreeMap<String, Value>,
}

impl MultiPathUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `value` at `path`.
    pub fn set(&mut self, path: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.entries.insert(path.into(), value.into());
        self
    }

    /// Serialize `value` and write it at `path`.
    pub fn set_json<T: Serialize>(&mut self, path: impl Into<String>, value: &T) -> AppResult<&mut Self> {
        let json = serde_json::to_value(value)?;
        self.entries.insert(path.into(), json);
        Ok(self)
    }

    /// Delete the subtree at `path`.
    pub fn remove(&mut self, path: impl Into<String>) -> &mut Self {
        self.entries.insert(path.into(), Value::Null);
        self
    }

    /// Move every entry of `other` into this update.
    pub fn merge(&mut self, other: MultiPathUpdate) -> &mut Self {
        self.entries.extend(other.entries);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The pending value for `path`, if one is staged.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.entries.get(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Normalize every path and reject overlapping entries.
    pub fn validate(self) -> AppResult<BTreeMap<String, Value>> {
        let mut normalized = BTreeMap::new();
        for (raw, value) in self.entries {
            let key = path::normalize(&raw)?;
            if key.is_empty() {
                return Err(AppError::validation("Multi-path update cannot target the root"));
            }
            normalized.insert(key, value);
        }

        // Byte order can put a sibling like `a/b-c` between `a/b` and
        // `a/b/d`, so look up every ancestor of each key directly.
        for key in normalized.keys() {
            let mut end = 0;
            while let Some(offset) = key[end..].find('/') {
                end += offset;
                let ancestor = &key[..end];
                if normalized.contains_key(ancestor) {
                    return Err(AppError::validation(format!(
                        "Multi-path update has overlapping paths '{ancestor}' and '{key}'"
                    )));
                }
                end += 1;
            }
        }
        Ok(normalized)
    }
}

impl IntoIterator for MultiPathUpdate {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
