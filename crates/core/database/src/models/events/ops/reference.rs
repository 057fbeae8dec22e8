use tally_result::Result;

use crate::ReferenceDb;
use crate::{Event, FieldsEvent, PartialEvent};

use super::AbstractEvents;

#[async_trait]
impl AbstractEvents for ReferenceDb {
    /// Fetch an event by its id
    async fn fetch_event(&self, id: &str) -> Result<Event> {
        let events = self.events.lock().await;
        events.get(id).cloned().ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all events owned by a user, newest first
    async fn fetch_events_by_owner(&self, owner: &str) -> Result<Vec<Event>> {
        let events = self.events.lock().await;
        let mut events: Vec<Event> = events
            .values()
            .filter(|event| event.owner == owner)
            .cloned()
            .collect();

        events.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(events)
    }

    /// Fetch all events a contact has accepted access to
    async fn fetch_events_by_collaborator(&self, contact: &str) -> Result<Vec<Event>> {
        let events = self.events.lock().await;
        Ok(events
            .values()
            .filter(|event| event.collaborators.iter().any(|entry| entry == contact))
            .cloned()
            .collect())
    }

    /// Fetch all events holding an unresolved invitation for a contact
    async fn fetch_invitations(&self, contact: &str) -> Result<Vec<Event>> {
        let events = self.events.lock().await;
        Ok(events
            .values()
            .filter(|event| {
                event
                    .pending_collaborators
                    .iter()
                    .any(|entry| entry == contact)
            })
            .cloned()
            .collect())
    }

    /// Insert a new event into the database
    async fn insert_event(&self, event: &Event) -> Result<()> {
        let mut events = self.events.lock().await;
        if events.contains_key(&event.id) {
            Err(create_database_error!("insert", "events"))
        } else {
            events.insert(event.id.clone(), event.clone());
            Ok(())
        }
    }

    /// Update an event given a partial document and fields to clear
    async fn update_event(
        &self,
        id: &str,
        partial: &PartialEvent,
        remove: Vec<FieldsEvent>,
    ) -> Result<()> {
        let mut events = self.events.lock().await;
        if let Some(event) = events.get_mut(id) {
            for field in &remove {
                event.remove_field(field);
            }

            event.apply_options(partial.clone());
            Ok(())
        } else {
            Err(create_error!(NotFound))
        }
    }

    /// Delete an event and everything nested in it
    async fn delete_event(&self, id: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        events
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| create_error!(NotFound))
    }

    /// Add a contact to the accepted collaborator set
    async fn add_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        if let Some(event) = events.get_mut(id) {
            if !event.collaborators.iter().any(|entry| entry == contact) {
                event.collaborators.push(contact.to_string());
            }

            Ok(())
        } else {
            Err(create_error!(NotFound))
        }
    }

    /// Remove a contact from the accepted collaborator set
    async fn remove_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        if let Some(event) = events.get_mut(id) {
            event.collaborators.retain(|entry| entry != contact);
            Ok(())
        } else {
            Err(create_error!(NotFound))
        }
    }

    /// Add a contact to the pending invitation set
    async fn add_pending_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        if let Some(event) = events.get_mut(id) {
            if !event
                .pending_collaborators
                .iter()
                .any(|entry| entry == contact)
            {
                event.pending_collaborators.push(contact.to_string());
            }

            Ok(())
        } else {
            Err(create_error!(NotFound))
        }
    }

    /// Remove a contact from the pending invitation set
    async fn remove_pending_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        let mut events = self.events.lock().await;
        if let Some(event) = events.get_mut(id) {
            event.pending_collaborators.retain(|entry| entry != contact);
            Ok(())
        } else {
            Err(create_error!(NotFound))
        }
    }
}
