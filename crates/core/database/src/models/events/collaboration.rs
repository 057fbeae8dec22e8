//! Collaborator invitation workflow
//!
//! A contact is in exactly one of three states for a given event: not
//! involved, pending, or accepted. All preconditions are checked before
//! any storage round trip, and the accept path orders its two writes so
//! a reader never observes the contact losing access mid-transition.

use tally_config::config;
use tally_result::Result;

use crate::events::client::EventV1;
use crate::tasks::reconcile_collaborators;
use crate::{Database, Event, PartialEvent, Session};

impl Event {
    /// Invite a contact to collaborate on this event
    ///
    /// Owner only; the contact moves from not-involved to pending.
    pub async fn invite_collaborator(
        &mut self,
        db: &Database,
        session: &Session,
        contact: &str,
    ) -> Result<()> {
        if !self.is_owner(&session.user_id) {
            return Err(create_error!(NotOwner));
        }

        if contact == session.contact {
            return Err(create_error!(CannotInviteYourself));
        }

        if self.collaborators.iter().any(|entry| entry == contact) {
            return Err(create_error!(AlreadyCollaborator));
        }

        if self
            .pending_collaborators
            .iter()
            .any(|entry| entry == contact)
        {
            return Err(create_error!(AlreadyInvited));
        }

        let max = config().await.features.limits.collaborators;
        if self.collaborators.len() + self.pending_collaborators.len() >= max {
            return Err(create_error!(TooManyCollaborators { max }));
        }

        db.add_pending_collaborator(&self.id, contact).await?;
        self.pending_collaborators.push(contact.to_string());

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: PartialEvent {
                pending_collaborators: Some(self.pending_collaborators.clone()),
                ..Default::default()
            },
            clear: vec![],
        }
        .p_event(self)
        .await;

        EventV1::EventInvite {
            id: self.id.clone(),
            name: self.name.clone(),
            owner_display_name: self.owner_display_name.clone(),
            contact: contact.to_string(),
        }
        .p(contact.to_string())
        .await;

        Ok(())
    }

    /// Accept a pending invitation addressed to the calling contact
    ///
    /// The store offers no multi-field transaction here, so the writes
    /// are ordered add-then-remove: a reader catching the intermediate
    /// state sees the contact in both sets, never in neither. The
    /// reconciliation task mops up if the second write is lost.
    pub async fn accept_invitation(
        &mut self,
        db: &Database,
        session: &Session,
        contact: &str,
    ) -> Result<()> {
        if session.contact != contact {
            return Err(create_error!(NotAuthorized));
        }

        if !self
            .pending_collaborators
            .iter()
            .any(|entry| entry == contact)
        {
            return Err(create_error!(NotInvited));
        }

        db.add_collaborator(&self.id, contact).await?;
        self.collaborators.push(contact.to_string());

        reconcile_collaborators::queue(self.id.clone()).await;

        db.remove_pending_collaborator(&self.id, contact).await?;
        self.pending_collaborators.retain(|entry| entry != contact);

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: PartialEvent {
                collaborators: Some(self.collaborators.clone()),
                pending_collaborators: Some(self.pending_collaborators.clone()),
                ..Default::default()
            },
            clear: vec![],
        }
        .p_event(self)
        .await;

        EventV1::EventInviteResolved {
            id: self.id.clone(),
            contact: contact.to_string(),
            accepted: true,
        }
        .p(contact.to_string())
        .await;

        Ok(())
    }

    /// Decline a pending invitation addressed to the calling contact
    ///
    /// Idempotent: declining an invitation that is already gone succeeds
    /// without touching anything, so duplicate network retries are safe.
    pub async fn decline_invitation(
        &mut self,
        db: &Database,
        session: &Session,
        contact: &str,
    ) -> Result<()> {
        if session.contact != contact {
            return Err(create_error!(NotAuthorized));
        }

        if !self
            .pending_collaborators
            .iter()
            .any(|entry| entry == contact)
        {
            return Ok(());
        }

        db.remove_pending_collaborator(&self.id, contact).await?;
        self.pending_collaborators.retain(|entry| entry != contact);

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: PartialEvent {
                pending_collaborators: Some(self.pending_collaborators.clone()),
                ..Default::default()
            },
            clear: vec![],
        }
        .p_event(self)
        .await;

        EventV1::EventInviteResolved {
            id: self.id.clone(),
            contact: contact.to_string(),
            accepted: false,
        }
        .p(contact.to_string())
        .await;

        Ok(())
    }

    /// Revoke a contact's accepted access
    ///
    /// Owner only; a collaborator cannot remove themselves through this
    /// operation.
    pub async fn remove_collaborator(
        &mut self,
        db: &Database,
        session: &Session,
        contact: &str,
    ) -> Result<()> {
        if !self.is_owner(&session.user_id) {
            return Err(create_error!(NotOwner));
        }

        if !self.collaborators.iter().any(|entry| entry == contact) {
            return Err(create_error!(NotCollaborator));
        }

        db.remove_collaborator(&self.id, contact).await?;
        self.collaborators.retain(|entry| entry != contact);

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: PartialEvent {
                collaborators: Some(self.collaborators.clone()),
                ..Default::default()
            },
            clear: vec![],
        }
        .p_event(self)
        .await;

        // The revoked contact is no longer in the fan-out, tell them directly
        EventV1::EventDelete {
            id: self.id.clone(),
        }
        .p(contact.to_string())
        .await;

        Ok(())
    }

    /// Drop any contact listed in both collaborator sets from pending
    ///
    /// Safety net for an accept that lost its second write. Pure
    /// set-difference cleanup: safe to run any number of times and never
    /// removes anyone from the accepted set.
    pub async fn reconcile_collaborators(&mut self, db: &Database) -> Result<()> {
        let stuck: Vec<String> = self
            .pending_collaborators
            .iter()
            .filter(|contact| self.collaborators.contains(contact))
            .cloned()
            .collect();

        if stuck.is_empty() {
            return Ok(());
        }

        for contact in &stuck {
            db.remove_pending_collaborator(&self.id, contact).await?;
        }

        self.pending_collaborators
            .retain(|contact| !self.collaborators.contains(contact));

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: PartialEvent {
                pending_collaborators: Some(self.pending_collaborators.clone()),
                ..Default::default()
            },
            clear: vec![],
        }
        .p_event(self)
        .await;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tally_result::{ErrorKind, ErrorType};

    use crate::{DataCreateEvent, Database, Event, Session};

    fn owner() -> Session {
        Session::new("01USER0000000000000000A", "a@x.com", "Alice")
    }

    fn invitee() -> Session {
        Session::new("01USER0000000000000000B", "b@x.com", "Bob")
    }

    async fn fundraiser(db: &Database) -> Event {
        Event::create(
            db,
            DataCreateEvent {
                name: "Fundraiser".to_string(),
                date: "2026-09-01".to_string(),
                ..Default::default()
            },
            &owner(),
        )
        .await
        .unwrap()
    }

    #[async_std::test]
    async fn invite_moves_contact_to_pending() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;

            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.pending_collaborators, vec!["b@x.com"]);
            assert!(fetched.collaborators.is_empty());

            let inbox = db.fetch_invitations("b@x.com").await.unwrap();
            assert_eq!(inbox.len(), 1);
            assert_eq!(inbox[0].id, event.id);
        });
    }

    #[async_std::test]
    async fn invite_rejects_self_and_duplicates() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;

            let result = event.invite_collaborator(&db, &owner(), "a@x.com").await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::CannotInviteYourself
            ));

            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            // Already pending
            let result = event.invite_collaborator(&db, &owner(), "b@x.com").await;
            let error = result.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::AlreadyInvited));
            assert_eq!(error.kind(), ErrorKind::Validation);

            event
                .accept_invitation(&db, &invitee(), "b@x.com")
                .await
                .unwrap();

            // Already accepted
            let result = event.invite_collaborator(&db, &owner(), "b@x.com").await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::AlreadyCollaborator
            ));

            // No mutation slipped through
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.collaborators, vec!["b@x.com"]);
            assert!(fetched.pending_collaborators.is_empty());
        });
    }

    #[async_std::test]
    async fn collaborator_limit_is_enforced() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            let max = tally_config::config().await.features.limits.collaborators;

            // Pending invitations count against the limit too
            for n in 0..max {
                event
                    .invite_collaborator(&db, &owner(), &format!("guest{n}@x.com"))
                    .await
                    .unwrap();
            }

            let result = event.invite_collaborator(&db, &owner(), "late@x.com").await;
            let error = result.unwrap_err();
            assert!(matches!(
                error.error_type,
                ErrorType::TooManyCollaborators { .. }
            ));
            assert_eq!(error.kind(), ErrorKind::Validation);
            assert_eq!(
                db.fetch_event(&event.id)
                    .await
                    .unwrap()
                    .pending_collaborators
                    .len(),
                max
            );
        });
    }

    #[async_std::test]
    async fn invite_requires_ownership() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;

            let result = event.invite_collaborator(&db, &invitee(), "c@x.com").await;
            let error = result.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::NotOwner));
            assert_eq!(error.kind(), ErrorKind::Permission);

            assert!(db
                .fetch_event(&event.id)
                .await
                .unwrap()
                .pending_collaborators
                .is_empty());
        });
    }

    #[async_std::test]
    async fn accept_resolves_invitation() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            event
                .accept_invitation(&db, &invitee(), "b@x.com")
                .await
                .unwrap();

            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.collaborators, vec!["b@x.com"]);
            assert!(fetched.pending_collaborators.is_empty());
            assert!(db.fetch_invitations("b@x.com").await.unwrap().is_empty());

            let shared = db.fetch_events_by_collaborator("b@x.com").await.unwrap();
            assert_eq!(shared.len(), 1);
        });
    }

    #[async_std::test]
    async fn accept_requires_pending_invitation() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;

            let result = event.accept_invitation(&db, &invitee(), "b@x.com").await;
            let error = result.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::NotInvited));
            assert_eq!(error.kind(), ErrorKind::NotFound);
        });
    }

    #[async_std::test]
    async fn accept_and_decline_check_the_caller() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            let impostor = Session::new("01USER0000000000000000C", "c@x.com", "Carol");

            let result = event.accept_invitation(&db, &impostor, "b@x.com").await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::NotAuthorized
            ));

            let result = event.decline_invitation(&db, &impostor, "b@x.com").await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::NotAuthorized
            ));

            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.pending_collaborators, vec!["b@x.com"]);
            assert!(fetched.collaborators.is_empty());
        });
    }

    #[async_std::test]
    async fn decline_is_idempotent() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            event
                .decline_invitation(&db, &invitee(), "b@x.com")
                .await
                .unwrap();
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert!(fetched.pending_collaborators.is_empty());
            assert!(fetched.collaborators.is_empty());

            // Second decline is a success and changes nothing
            event
                .decline_invitation(&db, &invitee(), "b@x.com")
                .await
                .unwrap();
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert!(fetched.pending_collaborators.is_empty());
            assert!(fetched.collaborators.is_empty());
        });
    }

    #[async_std::test]
    async fn removal_is_owner_only() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();
            event
                .accept_invitation(&db, &invitee(), "b@x.com")
                .await
                .unwrap();

            // A collaborator cannot remove themselves
            let result = event.remove_collaborator(&db, &invitee(), "b@x.com").await;
            let error = result.unwrap_err();
            assert!(matches!(error.error_type, ErrorType::NotOwner));
            assert_eq!(error.kind(), ErrorKind::Permission);
            assert_eq!(
                db.fetch_event(&event.id).await.unwrap().collaborators,
                vec!["b@x.com"]
            );

            event
                .remove_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();
            assert!(db
                .fetch_event(&event.id)
                .await
                .unwrap()
                .collaborators
                .is_empty());

            let result = event.remove_collaborator(&db, &owner(), "b@x.com").await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::NotCollaborator
            ));
        });
    }

    #[async_std::test]
    async fn reconciliation_converges() {
        database_test!(|db| async move {
            let mut event = fundraiser(&db).await;
            event
                .invite_collaborator(&db, &owner(), "b@x.com")
                .await
                .unwrap();

            // Simulate an accept whose second write was lost: the contact
            // is now listed in both sets.
            db.add_collaborator(&event.id, "b@x.com").await.unwrap();
            let mut event = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(event.collaborators, vec!["b@x.com"]);
            assert_eq!(event.pending_collaborators, vec!["b@x.com"]);

            event.reconcile_collaborators(&db).await.unwrap();
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.collaborators, vec!["b@x.com"]);
            assert!(fetched.pending_collaborators.is_empty());

            // Running it again is a no-op
            event.reconcile_collaborators(&db).await.unwrap();
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.collaborators, vec!["b@x.com"]);
            assert!(fetched.pending_collaborators.is_empty());
        });
    }
}
