use futures::StreamExt;
use mongodb::bson::Document;
use mongodb::options::FindOptions;
use tally_result::Result;

use crate::{Event, FieldsEvent, PartialEvent};
use crate::{IntoDocumentPath, MongoDb};

use super::AbstractEvents;

static COL: &str = "events";

#[async_trait]
impl AbstractEvents for MongoDb {
    /// Fetch an event by its id
    async fn fetch_event(&self, id: &str) -> Result<Event> {
        query!(self, find_one_by_id, COL, id)?.ok_or_else(|| create_error!(NotFound))
    }

    /// Fetch all events owned by a user, newest first
    async fn fetch_events_by_owner(&self, owner: &str) -> Result<Vec<Event>> {
        query!(
            self,
            find_with_options,
            COL,
            doc! {
                "owner": owner
            },
            FindOptions::builder()
                .sort(doc! {
                    "created_at": -1
                })
                .build()
        )
    }

    /// Fetch all events a contact has accepted access to
    async fn fetch_events_by_collaborator(&self, contact: &str) -> Result<Vec<Event>> {
        query!(
            self,
            find,
            COL,
            doc! {
                "collaborators": contact
            }
        )
    }

    /// Fetch all events holding an unresolved invitation for a contact
    async fn fetch_invitations(&self, contact: &str) -> Result<Vec<Event>> {
        Ok(self
            .col::<Event>(COL)
            .find(doc! {
                "pending_collaborators": contact
            })
            .await
            .map_err(|_| create_database_error!("find", COL))?
            .filter_map(|s| async {
                if cfg!(debug_assertions) {
                    Some(s.unwrap())
                } else {
                    s.ok()
                }
            })
            .collect()
            .await)
    }

    /// Insert a new event into the database
    async fn insert_event(&self, event: &Event) -> Result<()> {
        query!(self, insert_one, COL, event).map(|_| ())
    }

    /// Update an event given a partial document and fields to clear
    async fn update_event(
        &self,
        id: &str,
        partial: &PartialEvent,
        remove: Vec<FieldsEvent>,
    ) -> Result<()> {
        query!(
            self,
            update_one_by_id,
            COL,
            id,
            partial,
            remove.iter().map(|x| x as &dyn IntoDocumentPath).collect()
        )
        .map(|_| ())
    }

    /// Delete an event and everything nested in it
    async fn delete_event(&self, id: &str) -> Result<()> {
        query!(self, delete_one_by_id, COL, id).map(|_| ())
    }

    /// Add a contact to the accepted collaborator set
    async fn add_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$addToSet": {
                        "collaborators": contact
                    }
                },
            )
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Remove a contact from the accepted collaborator set
    async fn remove_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$pull": {
                        "collaborators": contact
                    }
                },
            )
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Add a contact to the pending invitation set
    async fn add_pending_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$addToSet": {
                        "pending_collaborators": contact
                    }
                },
            )
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }

    /// Remove a contact from the pending invitation set
    async fn remove_pending_collaborator(&self, id: &str, contact: &str) -> Result<()> {
        self.col::<Document>(COL)
            .update_one(
                doc! {
                    "_id": id
                },
                doc! {
                    "$pull": {
                        "pending_collaborators": contact
                    }
                },
            )
            .await
            .map(|_| ())
            .map_err(|_| create_database_error!("update_one", COL))
    }
}

impl IntoDocumentPath for FieldsEvent {
    fn as_path(&self) -> Option<&'static str> {
        Some(match self {
            FieldsEvent::Description => "description",
            FieldsEvent::ExpenseSummary => "expense_summary",
        })
    }
}
