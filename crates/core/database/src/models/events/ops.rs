use tally_result::Result;

use crate::{Event, FieldsEvent, PartialEvent};

#[cfg(feature = "mongodb")]
mod mongodb;
mod reference;

#[async_trait]
pub trait AbstractEvents: Sync + Send {
    /// Fetch an event by its id
    async fn fetch_event(&self, id: &str) -> Result<Event>;

    /// Fetch all events owned by a user, newest first
    async fn fetch_events_by_owner(&self, owner: &str) -> Result<Vec<Event>>;

    /// Fetch all events a contact has accepted access to
    async fn fetch_events_by_collaborator(&self, contact: &str) -> Result<Vec<Event>>;

    /// Fetch all events holding an unresolved invitation for a contact
    ///
    /// This is the invitation inbox: a fan-out scan recomputed on every
    /// load rather than an inverted index.
    async fn fetch_invitations(&self, contact: &str) -> Result<Vec<Event>>;

    /// Insert a new event into the database
    async fn insert_event(&self, event: &Event) -> Result<()>;

    /// Update an event given a partial document and fields to clear
    async fn update_event(
        &self,
        id: &str,
        event: &PartialEvent,
        remove: Vec<FieldsEvent>,
    ) -> Result<()>;

    /// Delete an event and everything nested in it
    async fn delete_event(&self, id: &str) -> Result<()>;

    /// Add a contact to the accepted collaborator set
    async fn add_collaborator(&self, id: &str, contact: &str) -> Result<()>;

    /// Remove a contact from the accepted collaborator set
    async fn remove_collaborator(&self, id: &str, contact: &str) -> Result<()>;

    /// Add a contact to the pending invitation set
    async fn add_pending_collaborator(&self, id: &str, contact: &str) -> Result<()>;

    /// Remove a contact from the pending invitation set
    async fn remove_pending_collaborator(&self, id: &str, contact: &str) -> Result<()>;
}
