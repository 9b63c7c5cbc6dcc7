use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

/// Schema-less job or candidate record. Only a string `id` is ever inspected.
pub type Record = Map<String, Value>;

/// On-disk shape of `jobs.json` and `candidates.json`: `{ "data": [...] }`.
/// Any other top-level keys are carried through rewrites untouched. Elements
/// that are not objects are kept as-is but never match a lookup; a `null`
/// array reads as empty.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordCollection {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn record_id(record: &Record) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}

fn value_id(value: &Value) -> Option<&str> {
    value.as_object().and_then(record_id)
}

impl RecordCollection {
    /// Index of the first record whose `id` equals `id`. Later duplicates are never seen.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.data.iter().position(|r| value_id(r) == Some(id))
    }

    pub fn find(&self, id: &str) -> Option<&Record> {
        self.position(id).and_then(|idx| self.data[idx].as_object())
    }

    pub fn push(&mut self, record: Record) {
        self.data.push(Value::Object(record));
    }

    /// Shallow merge: top-level keys of `patch` overwrite, everything else is kept.
    /// Nested objects are replaced, not merged.
    pub fn merge(&mut self, id: &str, patch: Record) -> Option<&Record> {
        let idx = self.position(id)?;
        let target = self.data[idx].as_object_mut()?;
        for (key, value) in patch {
            target.insert(key, value);
        }
        self.data[idx].as_object()
    }

    pub fn remove(&mut self, id: &str) -> Option<Record> {
        let idx = self.position(id)?;
        match self.data.remove(idx) {
            Value::Object(record) => Some(record),
            _ => None,
        }
    }
}

/// Accepts a creation body: any JSON object carrying a string `id`.
pub fn new_record(body: Value) -> Result<Record, AppError> {
    match body {
        Value::Object(record) if record_id(&record).is_some() => Ok(record),
        Value::Object(_) => Err(AppError::Validation(
            "Record must have a string \"id\" field".to_string(),
        )),
        _ => Err(AppError::Validation(
            "Record must be a JSON object".to_string(),
        )),
    }
}

/// Accepts an update body: any JSON object.
pub fn patch_record(body: Value) -> Result<Record, AppError> {
    match body {
        Value::Object(patch) => Ok(patch),
        _ => Err(AppError::Validation(
            "Patch must be a JSON object".to_string(),
        )),
    }
}
