//! Defines the answer map filled in by the learner during a test-taking session and the keys used
//! to address it.
//!
//! The answer map is a flat mapping from string keys to values. The keys follow the scheme used by
//! the test-taking pages:
//! - `q_<number>` for questions stored under their absolute question number.
//! - `q_<start>_<index>` for the blanks of cloze and paragraph-matching blocks, where `start` is the
//!   first question number of the block and `index` is the zero-based position of the blank.
//!
//! Matching-headings answers are kept as a map from paragraph ID to heading in memory, but they are
//! written out as a JSON-encoded string for compatibility with previously saved answers. Restored
//! strings are kept as text, and only decoded when the headings of a block are read.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::error::AnswerMapError;

/// Returns the key under which the answer to the given absolute question number is stored.
pub fn answer_key(number: usize) -> String {
    format!("q_{number}")
}

/// Returns the key under which the blank at the given index of a sub-keyed block is stored.
pub fn sub_answer_key(start: usize, index: usize) -> String {
    format!("q_{start}_{index}")
}

/// Normalizes a choice in a multi-select block. Zero-based indices are converted to letters, so
/// that `1` and `B` name the same option.
pub fn choice_letter(choice: &str) -> String {
    let choice = choice.trim();
    match choice.parse::<u8>() {
        Ok(index) if index < 26 => char::from(b'A' + index).to_string(),
        _ => choice.to_string(),
    }
}

/// Returns the string form of a scalar JSON value.
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Decodes a string containing a JSON object into a map. Returns `None` if the string is not a
/// JSON object.
pub(crate) fn decode_object(encoded: &str) -> Option<BTreeMap<String, String>> {
    if !encoded.trim_start().starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Value>(encoded) {
        Ok(Value::Object(fields)) => Some(
            fields
                .iter()
                .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
                .collect(),
        ),
        _ => None,
    }
}

/// A value stored in the answer map.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(from = "Value", into = "Value")]
pub enum AnswerValue {
    /// A typed or selected answer.
    Text(String),

    /// The options selected in a multi-select block.
    List(Vec<String>),

    /// The headings chosen in a matching-headings block, keyed by paragraph ID.
    Map(BTreeMap<String, String>),
}

impl AnswerValue {
    /// Returns the text of the value if it is a non-blank text answer.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }

    /// Returns whether the value holds no answer at all.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) => text.trim().is_empty(),
            AnswerValue::List(items) => items.iter().all(|item| item.trim().is_empty()),
            AnswerValue::Map(map) => map.values().all(|v| v.trim().is_empty()),
        }
    }
}

impl From<Value> for AnswerValue {
    fn from(value: Value) -> Self {
        match value {
            // JSON-encoded heading maps stay text until a matching-headings block reads them.
            Value::String(text) => AnswerValue::Text(text),
            Value::Array(items) => {
                AnswerValue::List(items.iter().filter_map(scalar_to_string).collect())
            }
            Value::Object(fields) => AnswerValue::Map(
                fields
                    .iter()
                    .filter_map(|(key, value)| scalar_to_string(value).map(|v| (key.clone(), v)))
                    .collect(),
            ),
            Value::Null => AnswerValue::Text(String::new()),
            other => AnswerValue::Text(scalar_to_string(&other).unwrap_or_default()),
        }
    }
}

impl From<AnswerValue> for Value {
    fn from(value: AnswerValue) -> Self {
        match value {
            AnswerValue::Text(text) => Value::String(text),
            AnswerValue::List(items) => Value::Array(items.into_iter().map(Value::String).collect()),
            // Serializing a map of strings cannot fail.
            AnswerValue::Map(map) => Value::String(serde_json::to_string(&map).unwrap_or_default()),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        AnswerValue::Text(text.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        AnswerValue::Text(text)
    }
}

impl From<Vec<&str>> for AnswerValue {
    fn from(items: Vec<&str>) -> Self {
        AnswerValue::List(items.into_iter().map(str::to_string).collect())
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(items: Vec<String>) -> Self {
        AnswerValue::List(items)
    }
}

impl From<BTreeMap<String, String>> for AnswerValue {
    fn from(map: BTreeMap<String, String>) -> Self {
        AnswerValue::Map(map)
    }
}

/// The learner's responses, keyed by the scheme described in the module documentation. The map is
/// owned by the test-taking session and passed by reference to the numbering and scoring
/// functions.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AnswerMap {
    values: BTreeMap<String, AnswerValue>,
}

impl AnswerMap {
    /// Creates an empty answer map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restores an answer map from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, AnswerMapError> {
        serde_json::from_str(json).map_err(AnswerMapError::Parse)
    }

    /// Writes the answer map in its JSON form.
    pub fn to_json(&self) -> Result<String, AnswerMapError> {
        serde_json::to_string(self).map_err(AnswerMapError::Serialize)
    }

    /// Returns the value stored under the given key.
    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    /// Returns the non-blank text stored under the given key.
    pub fn text(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(AnswerValue::as_text)
    }

    /// Stores a value under the given key and returns the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<AnswerValue>,
    ) -> Option<AnswerValue> {
        self.values.insert(key.into(), value.into())
    }

    /// Removes the value stored under the given key.
    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    /// Removes all values, as done when the learner submits or restarts the test.
    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the map has no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns an iterator over the stored keys and values.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }
}

impl<K: Into<String>, V: Into<AnswerValue>> FromIterator<(K, V)> for AnswerMap {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
