//! Profile-photo uploads: admission rules, storage backends and the HTTP handlers.

pub mod handlers;
pub mod storage;
pub mod validation;
