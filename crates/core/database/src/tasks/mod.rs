//! Semi-important background task management

use crate::Database;

use async_std::task;

pub mod reconcile_collaborators;

const WORKER_COUNT: usize = 2;

/// Spawn background workers
pub fn start_workers(db: Database) {
    for _ in 0..WORKER_COUNT {
        task::spawn(reconcile_collaborators::worker(db.clone()));
    }
}
