// Queue Type: Fire and forget
use deadqueue::limited::Queue;
use once_cell::sync::Lazy;

use crate::Database;

/// Task information
#[derive(Debug)]
struct Data {
    /// Event whose collaborators array changed
    event: String,
}

static Q: Lazy<Queue<Data>> = Lazy::new(|| Queue::new(10_000));

/// Queue a new task for a worker
///
/// Queueing the same event repeatedly is harmless; the pass is pure
/// set-difference cleanup.
pub async fn queue(event: String) {
    Q.try_push(Data { event }).ok();
    info!("Queue is using {} slots from {}.", Q.len(), Q.capacity());
}

/// Start a new worker
pub async fn worker(db: Database) {
    loop {
        let Data { event } = Q.pop().await;

        match db.fetch_event(&event).await {
            Ok(mut event) => {
                if let Err(err) = event.reconcile_collaborators(&db).await {
                    error!("Failed to reconcile collaborators on {}: {err:?}", event.id);
                }
            }
            Err(err) => error!("Failed to fetch event {event} for reconciliation: {err:?}"),
        }
    }
}
