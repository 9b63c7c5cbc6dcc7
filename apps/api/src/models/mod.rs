pub mod job_config;
pub mod record;
pub mod upload;
pub mod user;
