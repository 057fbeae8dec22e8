use serde::{Deserialize, Serialize};

use crate::{Event, FieldsEvent, PartialEvent};

/// Protocol Events
///
/// Published over pub/sub channels keyed by user id (owners) and
/// contact identifier (collaborators and invitees). A client watching
/// its own channel re-runs the repository queries on receipt; there is
/// no optimistic local echo, watchers converge on the store.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type")]
pub enum EventV1 {
    /// New event
    EventCreate(Event),

    /// Update existing event
    EventUpdate {
        id: String,
        data: PartialEvent,
        clear: Vec<FieldsEvent>,
    },

    /// Delete event
    EventDelete { id: String },

    /// A contact has been invited to collaborate
    EventInvite {
        id: String,
        name: String,
        owner_display_name: String,
        contact: String,
    },

    /// A pending invitation was accepted or declined
    EventInviteResolved {
        id: String,
        contact: String,
        accepted: bool,
    },
}

impl EventV1 {
    /// Publish helper wrapper
    ///
    /// Delivery is best effort; a lost publish only delays a watcher
    /// until its next full query.
    pub async fn p(self, channel: String) {
        #[cfg(debug_assertions)]
        info!("Publishing event to {channel}: {self:?}");

        if let Err(err) = redis_kiss::publish(channel, self).await {
            error!("Failed to publish event: {err:?}");
        }
    }

    /// Publish to everyone watching an event: the owner plus every
    /// accepted collaborator
    pub async fn p_event(self, event: &Event) {
        self.clone().p(event.owner.clone()).await;

        for contact in &event.collaborators {
            self.clone().p(contact.clone()).await;
        }
    }
}
