use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::QTableError;
use crate::game::BoardKey;

/// Action values keyed by board, then by column.
///
/// Serialized as `{ "<board key>": { "<column>": value, ... }, ... }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QTable {
    states: HashMap<BoardKey, BTreeMap<usize, f64>>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of known states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, key: &BoardKey) -> bool {
        self.states.contains_key(key)
    }

    pub fn get(&self, key: &BoardKey) -> Option<&BTreeMap<usize, f64>> {
        self.states.get(key)
    }

    pub fn value(&self, key: &BoardKey, column: usize) -> Option<f64> {
        self.states.get(key)?.get(&column).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&BoardKey, &BTreeMap<usize, f64>)> {
        self.states.iter()
    }

    /// Create the entry for `key` with every column in `columns` at 0.0 if
    /// the state has never been seen. Existing entries are left untouched.
    pub fn ensure_state(&mut self, key: &BoardKey, columns: &[usize]) -> &BTreeMap<usize, f64> {
        self.states
            .entry(key.clone())
            .or_insert_with(|| columns.iter().map(|&col| (col, 0.0)).collect())
    }

    pub(crate) fn value_mut(&mut self, key: &BoardKey, column: usize) -> &mut f64 {
        self.states
            .entry(key.clone())
            .or_default()
            .entry(column)
            .or_insert(0.0)
    }

    /// Largest value recorded for `key`, never below zero; an unknown state
    /// counts as zero.
    pub fn max_value(&self, key: &BoardKey) -> f64 {
        self.states
            .get(key)
            .map_or(0.0, |values| values.values().copied().fold(0.0, f64::max))
    }

    /// Highest-valued column among `columns`, the first listed on ties.
    /// Columns without a recorded value count as zero.
    pub fn best_column(&self, key: &BoardKey, columns: &[usize]) -> Option<usize> {
        let values = self.states.get(key);
        let mut best: Option<(usize, f64)> = None;
        for &col in columns {
            let value = values.and_then(|v| v.get(&col)).copied().unwrap_or(0.0);
            if best.map_or(true, |(_, best_value)| value > best_value) {
                best = Some((col, value));
            }
        }
        best.map(|(col, _)| col)
    }

    /// Build a table from already-parsed JSON, rejecting anything that is
    /// not an object.
    pub fn from_json_value(value: Value) -> Result<Self, QTableError> {
        match value {
            Value::Object(_) => Ok(serde_json::from_value(value)?),
            other => Err(QTableError::NotAMapping(json_kind(&other))),
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self, QTableError> {
        Self::from_json_value(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, QTableError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn load(path: &Path) -> Result<Self, QTableError> {
        let json = fs::read_to_string(path)?;
        let table = Self::from_json_str(&json)?;
        debug!(path = %path.display(), states = table.len(), "loaded value table");
        Ok(table)
    }

    /// Write the table as JSON, going through a temporary file so a crash
    /// never leaves a truncated table behind.
    pub fn save(&self, path: &Path) -> Result<(), QTableError> {
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, self.to_json_pretty()?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
