use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Singleton application-form document (`job_config.json`).
///
/// Nominally `{ "application_form": [...] }` but stored as an open object:
/// replacement is wholesale and nothing checks for the key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobConfig(pub Map<String, Value>);

impl Default for JobConfig {
    fn default() -> Self {
        let mut doc = Map::new();
        doc.insert("application_form".to_string(), Value::Array(Vec::new()));
        JobConfig(doc)
    }
}

impl JobConfig {
    /// The form schema attached to job responses, if the document has one.
    pub fn application_form(&self) -> Option<&Value> {
        self.0.get("application_form")
    }
}
