//! Candidate records. Same CRUD contract as jobs, without the form attachment;
//! nothing links a candidate to a job id.

pub mod handlers;
