//! Job postings. Every response carries the current application-form schema
//! under `config`, so clients always see the form alongside the job.

pub mod handlers;

use serde::Serialize;
use serde_json::Value;

use crate::models::job_config::JobConfig;
use crate::models::record::{Record, RecordCollection};

/// Key under which the application form is attached to job responses.
pub const CONFIG_KEY: &str = "config";

/// `GET /jobs` body: the jobs document with `config` alongside `data`.
#[derive(Debug, Serialize)]
pub struct JobListResponse {
    #[serde(flatten)]
    pub jobs: RecordCollection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<Value>,
}

impl JobListResponse {
    pub fn new(mut jobs: RecordCollection, config: &JobConfig) -> Self {
        jobs.extra.remove(CONFIG_KEY);
        Self {
            jobs,
            config: config.application_form().cloned(),
        }
    }
}

/// A job as returned by the API: stored fields plus the current form schema.
/// A stored `config` field is shadowed in the response only, and dropped when
/// the config document has no form.
pub fn with_config(mut job: Record, config: &JobConfig) -> Record {
    match config.application_form() {
        Some(form) => job.insert(CONFIG_KEY.to_string(), form.clone()),
        None => job.remove(CONFIG_KEY),
    };
    job
}
