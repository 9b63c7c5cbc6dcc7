use std::sync::Arc;

use crate::config::Config;
use crate::models::job_config::JobConfig;
use crate::models::record::RecordCollection;
use crate::models::user::UsersDocument;
use crate::store::JsonDocument;
use crate::uploads::storage::{build_upload_store, UploadStore};

pub const USERS_FILE: &str = "users.json";
pub const JOBS_FILE: &str = "jobs.json";
pub const CANDIDATES_FILE: &str = "candidates.json";
pub const JOB_CONFIG_FILE: &str = "job_config.json";

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub users: JsonDocument<UsersDocument>,
    pub jobs: JsonDocument<RecordCollection>,
    pub candidates: JsonDocument<RecordCollection>,
    pub job_config: JsonDocument<JobConfig>,
    /// Photo backend selected by `UPLOAD_STORAGE`. Lives as long as the process.
    pub uploads: Arc<dyn UploadStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let uploads = build_upload_store(config.upload_storage, config.upload_dir.clone());
        let dir = &config.data_dir;
        let policy = config.read_policy;
        Self {
            users: JsonDocument::new(dir.join(USERS_FILE), policy),
            jobs: JsonDocument::new(dir.join(JOBS_FILE), policy),
            candidates: JsonDocument::new(dir.join(CANDIDATES_FILE), policy),
            job_config: JsonDocument::new(dir.join(JOB_CONFIG_FILE), policy),
            uploads,
            config,
        }
    }
}
