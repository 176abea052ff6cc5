//! Curriculum rotor scheduling engine.
//!
//! The engine holds no curriculum state of its own. Every operation reads
//! and writes through the [`Repository`]; multi-step transitions run inside
//! one write transaction while holding the per-key lock of the class type or
//! theme they change, so a failed step leaves no partial write behind.

mod catalog;
mod locks;
mod rotors;
mod scheduler;
mod view;
mod votes;

use std::sync::Arc;

use crate::db::Repository;
use crate::errors::AppError;
use locks::KeyedLocks;

/// Entry point for every curriculum operation.
#[derive(Clone)]
pub struct Engine {
    repo: Arc<Repository>,
    locks: Arc<KeyedLocks>,
}

impl Engine {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self {
            repo,
            locks: Arc::new(KeyedLocks::new()),
        }
    }

    pub fn repo(&self) -> &Repository {
        &self.repo
    }
}

/// Reject empty or whitespace-only names.
fn require_name(name: &str, what: &str) -> Result<String, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} name is required", what)));
    }
    Ok(trimmed.to_string())
}

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
