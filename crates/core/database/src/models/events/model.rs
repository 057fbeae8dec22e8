use iso8601_timestamp::Timestamp;
use tally_config::config;
use tally_result::Result;
use ulid::Ulid;

use crate::events::client::EventV1;
use crate::util::summary::Summarizer;
use crate::{Database, Session};

auto_derived!(
    /// Event
    ///
    /// Root aggregate for a single tracked occasion and its financial
    /// line items. Owned by exactly one user; editable by the owner and
    /// any accepted collaborator.
    pub struct Event {
        /// Unique Id
        #[serde(rename = "_id")]
        pub id: String,
        /// User id of the owner, immutable after creation
        pub owner: String,
        /// Denormalized owner label for display, set at creation only
        pub owner_display_name: String,

        /// Name of the event
        pub name: String,
        /// Date of the occasion as entered by the user
        pub date: String,
        /// Description for the event
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,

        /// Which line-item categories are active, UI gating only
        #[serde(default)]
        pub features: EventFeatures,

        /// Contact identifiers with accepted access
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub collaborators: Vec<String>,
        /// Contact identifiers invited but not yet resolved
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub pending_collaborators: Vec<String>,

        /// Income line items
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub incomes: Vec<Income>,
        /// Expense line items
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub expenses: Vec<Expense>,
        /// Donation line items
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        pub donations: Vec<Donation>,

        /// Cached summary of expense notes, a manual snapshot that is
        /// not invalidated when expenses change
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expense_summary: Option<String>,

        /// When this event record was created
        pub created_at: Timestamp,
    }

    /// Partial representation of an event used for updates
    #[derive(Default)]
    pub struct PartialEvent {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub features: Option<EventFeatures>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub collaborators: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub pending_collaborators: Option<Vec<String>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub incomes: Option<Vec<Income>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expenses: Option<Vec<Expense>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub donations: Option<Vec<Donation>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub expense_summary: Option<String>,
    }

    /// Optional fields on event object
    pub enum FieldsEvent {
        Description,
        ExpenseSummary,
    }

    /// Line-item category gates for an event
    pub struct EventFeatures {
        pub expenses: bool,
        pub income: bool,
        pub donations: bool,
    }

    /// How a transaction was carried out
    #[serde(rename_all = "snake_case")]
    pub enum TransactionMedium {
        Cash,
        Bank,
        Goods,
    }

    /// Who recorded a line item
    ///
    /// Informational only; any editor may modify any item.
    pub struct Attribution {
        pub user_id: String,
        pub display_name: String,
    }

    /// Income line item
    pub struct Income {
        pub id: String,
        /// Where the money came from
        pub source: String,
        /// Amount in minor units
        pub amount: i64,
        pub transaction_medium: TransactionMedium,
        pub created_at: Timestamp,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub attribution: Option<Attribution>,
    }

    /// Expense line item
    pub struct Expense {
        pub id: String,
        /// Free-text notes describing the expense
        pub notes: String,
        /// Amount in minor units
        pub amount: i64,
        pub transaction_medium: TransactionMedium,
        pub created_at: Timestamp,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub attribution: Option<Attribution>,
    }

    /// Donation line item
    pub struct Donation {
        pub id: String,
        /// Who made the donation
        pub donor: String,
        pub value: DonationValue,
        pub transaction_medium: TransactionMedium,
        pub created_at: Timestamp,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub attribution: Option<Attribution>,
    }

    /// What was donated
    #[serde(tag = "type")]
    pub enum DonationValue {
        /// Monetary donation in minor units
        Money { amount: i64 },
        /// Donation of goods, described instead of priced
        Goods { description: String },
    }

    /// New event data
    #[derive(Default)]
    pub struct DataCreateEvent {
        pub name: String,
        pub date: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub features: Option<EventFeatures>,
    }

    /// Event detail edits
    #[derive(Default)]
    pub struct DataEditEvent {
        #[serde(skip_serializing_if = "Option::is_none")]
        pub name: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub date: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub description: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub features: Option<EventFeatures>,
    }
);

impl Default for EventFeatures {
    fn default() -> Self {
        EventFeatures {
            expenses: true,
            income: true,
            donations: true,
        }
    }
}

impl From<&Session> for Attribution {
    fn from(session: &Session) -> Self {
        Attribution {
            user_id: session.user_id.clone(),
            display_name: session.display_name.clone(),
        }
    }
}

impl Income {
    pub fn new(source: String, amount: i64, transaction_medium: TransactionMedium) -> Income {
        Income {
            id: Ulid::new().to_string(),
            source,
            amount,
            transaction_medium,
            created_at: Timestamp::now_utc(),
            attribution: None,
        }
    }
}

impl Expense {
    pub fn new(notes: String, amount: i64, transaction_medium: TransactionMedium) -> Expense {
        Expense {
            id: Ulid::new().to_string(),
            notes,
            amount,
            transaction_medium,
            created_at: Timestamp::now_utc(),
            attribution: None,
        }
    }
}

impl Donation {
    pub fn money(donor: String, amount: i64, transaction_medium: TransactionMedium) -> Donation {
        Donation {
            id: Ulid::new().to_string(),
            donor,
            value: DonationValue::Money { amount },
            transaction_medium,
            created_at: Timestamp::now_utc(),
            attribution: None,
        }
    }

    pub fn goods(donor: String, description: String) -> Donation {
        Donation {
            id: Ulid::new().to_string(),
            donor,
            value: DonationValue::Goods { description },
            transaction_medium: TransactionMedium::Goods,
            created_at: Timestamp::now_utc(),
            attribution: None,
        }
    }
}

fn validate_name(name: &str, max: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(create_error!(FailedValidation {
            error: "name must not be empty".to_string()
        }));
    }

    // Limit is in characters, not bytes
    if name.chars().count() > max {
        return Err(create_error!(FailedValidation {
            error: "name too long".to_string()
        }));
    }

    Ok(())
}

#[allow(clippy::disallowed_methods)]
impl Event {
    /// Create a new event owned by the calling user
    pub async fn create(db: &Database, data: DataCreateEvent, session: &Session) -> Result<Event> {
        let config = config().await;
        validate_name(&data.name, config.features.limits.name_length)?;

        let existing = db.fetch_events_by_owner(&session.user_id).await?;
        let max = config.features.limits.events;
        if existing.len() >= max {
            return Err(create_error!(TooManyEvents { max }));
        }

        let event = Event {
            id: Ulid::new().to_string(),
            owner: session.user_id.clone(),
            owner_display_name: session.display_name.clone(),
            name: data.name,
            date: data.date,
            description: data.description,
            features: data.features.unwrap_or_default(),
            collaborators: vec![],
            pending_collaborators: vec![],
            incomes: vec![],
            expenses: vec![],
            donations: vec![],
            expense_summary: None,
            created_at: Timestamp::now_utc(),
        };

        db.insert_event(&event).await?;
        EventV1::EventCreate(event.clone()).p_event(&event).await;
        Ok(event)
    }

    /// Whether the given user id owns this event
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner == user_id
    }

    /// Whether the caller may mutate this event
    pub fn can_edit(&self, session: &Session) -> bool {
        self.is_owner(&session.user_id) || self.collaborators.contains(&session.contact)
    }

    /// Update event data
    ///
    /// Storage write plus change publication; permission checks live on
    /// the operations that call this.
    pub async fn update(
        &mut self,
        db: &Database,
        partial: PartialEvent,
        remove: Vec<FieldsEvent>,
    ) -> Result<()> {
        for field in &remove {
            self.remove_field(field);
        }

        self.apply_options(partial.clone());

        db.update_event(&self.id, &partial, remove.clone()).await?;

        EventV1::EventUpdate {
            id: self.id.clone(),
            data: partial,
            clear: remove,
        }
        .p_event(self)
        .await;

        Ok(())
    }

    /// Edit the user-facing details of this event
    pub async fn update_details(
        &mut self,
        db: &Database,
        session: &Session,
        data: DataEditEvent,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        if let Some(name) = &data.name {
            validate_name(name, config().await.features.limits.name_length)?;
        }

        self.update(
            db,
            PartialEvent {
                name: data.name,
                date: data.date,
                description: data.description,
                features: data.features,
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Delete this event and everything nested in it
    pub async fn delete(&self, db: &Database, session: &Session) -> Result<()> {
        if !self.is_owner(&session.user_id) {
            return Err(create_error!(NotOwner));
        }

        db.delete_event(&self.id).await?;

        EventV1::EventDelete {
            id: self.id.clone(),
        }
        .p_event(self)
        .await;

        Ok(())
    }

    fn check_line_item_limit(&self, len: usize, max: usize) -> Result<()> {
        if len >= max {
            return Err(create_error!(TooManyLineItems { max }));
        }

        Ok(())
    }

    /// Record a new income, prepended to the category array
    pub async fn add_income(
        &mut self,
        db: &Database,
        session: &Session,
        mut income: Income,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let max = config().await.features.limits.line_items;
        self.check_line_item_limit(self.incomes.len(), max)?;

        income.attribution = Some(session.into());

        let mut incomes = self.incomes.clone();
        incomes.insert(0, income);

        self.update(
            db,
            PartialEvent {
                incomes: Some(incomes),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Replace an existing income in place
    pub async fn update_income(
        &mut self,
        db: &Database,
        session: &Session,
        income: Income,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        if !self.incomes.iter().any(|item| item.id == income.id) {
            return Err(create_error!(UnknownLineItem));
        }

        let incomes = self
            .incomes
            .iter()
            .cloned()
            .map(|item| if item.id == income.id { income.clone() } else { item })
            .collect();

        self.update(
            db,
            PartialEvent {
                incomes: Some(incomes),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Remove an income; removing an absent id is a no-op
    pub async fn remove_income(&mut self, db: &Database, session: &Session, id: &str) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let incomes: Vec<Income> = self
            .incomes
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();

        self.update(
            db,
            PartialEvent {
                incomes: Some(incomes),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Record a new expense, prepended to the category array
    pub async fn add_expense(
        &mut self,
        db: &Database,
        session: &Session,
        mut expense: Expense,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let max = config().await.features.limits.line_items;
        self.check_line_item_limit(self.expenses.len(), max)?;

        expense.attribution = Some(session.into());

        let mut expenses = self.expenses.clone();
        expenses.insert(0, expense);

        self.update(
            db,
            PartialEvent {
                expenses: Some(expenses),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Replace an existing expense in place
    pub async fn update_expense(
        &mut self,
        db: &Database,
        session: &Session,
        expense: Expense,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        if !self.expenses.iter().any(|item| item.id == expense.id) {
            return Err(create_error!(UnknownLineItem));
        }

        let expenses = self
            .expenses
            .iter()
            .cloned()
            .map(|item| if item.id == expense.id { expense.clone() } else { item })
            .collect();

        self.update(
            db,
            PartialEvent {
                expenses: Some(expenses),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Remove an expense; removing an absent id is a no-op
    pub async fn remove_expense(
        &mut self,
        db: &Database,
        session: &Session,
        id: &str,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let expenses: Vec<Expense> = self
            .expenses
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();

        self.update(
            db,
            PartialEvent {
                expenses: Some(expenses),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Record a new donation, prepended to the category array
    pub async fn add_donation(
        &mut self,
        db: &Database,
        session: &Session,
        mut donation: Donation,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let max = config().await.features.limits.line_items;
        self.check_line_item_limit(self.donations.len(), max)?;

        donation.attribution = Some(session.into());

        let mut donations = self.donations.clone();
        donations.insert(0, donation);

        self.update(
            db,
            PartialEvent {
                donations: Some(donations),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Replace an existing donation in place
    pub async fn update_donation(
        &mut self,
        db: &Database,
        session: &Session,
        donation: Donation,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        if !self.donations.iter().any(|item| item.id == donation.id) {
            return Err(create_error!(UnknownLineItem));
        }

        let donations = self
            .donations
            .iter()
            .cloned()
            .map(|item| {
                if item.id == donation.id {
                    donation.clone()
                } else {
                    item
                }
            })
            .collect();

        self.update(
            db,
            PartialEvent {
                donations: Some(donations),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Remove a donation; removing an absent id is a no-op
    pub async fn remove_donation(
        &mut self,
        db: &Database,
        session: &Session,
        id: &str,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        let donations: Vec<Donation> = self
            .donations
            .iter()
            .filter(|item| item.id != id)
            .cloned()
            .collect();

        self.update(
            db,
            PartialEvent {
                donations: Some(donations),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Summarize the current expense notes and cache the result
    ///
    /// The stored summary is a snapshot; later expense edits do not
    /// invalidate it.
    pub async fn generate_expense_summary(
        &mut self,
        db: &Database,
        session: &Session,
        summarizer: &dyn Summarizer,
    ) -> Result<()> {
        if !self.can_edit(session) {
            return Err(create_error!(NotAuthorized));
        }

        if self.expenses.is_empty() {
            return Err(create_error!(NoExpenses));
        }

        let notes = self
            .expenses
            .iter()
            .map(|expense| {
                format!(
                    "- {} (Amount: ${:.2})",
                    expense.notes,
                    expense.amount as f64 / 100.0
                )
            })
            .collect::<Vec<String>>()
            .join("\n");

        let summary = summarizer.summarize(&self.name, &notes).await?;

        self.update(
            db,
            PartialEvent {
                expense_summary: Some(summary),
                ..Default::default()
            },
            vec![],
        )
        .await
    }

    /// Clear a field on this object
    pub fn remove_field(&mut self, field: &FieldsEvent) {
        match field {
            FieldsEvent::Description => self.description = None,
            FieldsEvent::ExpenseSummary => self.expense_summary = None,
        }
    }

    /// Apply a partial update onto this object
    pub fn apply_options(&mut self, partial: PartialEvent) {
        let PartialEvent {
            name,
            date,
            description,
            features,
            collaborators,
            pending_collaborators,
            incomes,
            expenses,
            donations,
            expense_summary,
        } = partial;

        if let Some(name) = name {
            self.name = name;
        }
        if let Some(date) = date {
            self.date = date;
        }
        if let Some(description) = description {
            self.description = Some(description);
        }
        if let Some(features) = features {
            self.features = features;
        }
        if let Some(collaborators) = collaborators {
            self.collaborators = collaborators;
        }
        if let Some(pending_collaborators) = pending_collaborators {
            self.pending_collaborators = pending_collaborators;
        }
        if let Some(incomes) = incomes {
            self.incomes = incomes;
        }
        if let Some(expenses) = expenses {
            self.expenses = expenses;
        }
        if let Some(donations) = donations {
            self.donations = donations;
        }
        if let Some(expense_summary) = expense_summary {
            self.expense_summary = Some(expense_summary);
        }
    }
}

#[cfg(test)]
mod tests {
    use tally_result::ErrorType;

    use crate::util::summary::Summarizer;
    use crate::{
        DataCreateEvent, DataEditEvent, Event, Expense, FieldsEvent, Income, PartialEvent,
        Session, TransactionMedium,
    };

    fn owner() -> Session {
        Session::new("01USER0000000000000000A", "a@x.com", "Alice")
    }

    #[async_std::test]
    async fn crud() {
        database_test!(|db| async move {
            let session = owner();

            let mut event = Event::create(
                &db,
                DataCreateEvent {
                    name: "Village Fundraiser".to_string(),
                    date: "2026-09-01".to_string(),
                    description: Some("Annual fundraiser".to_string()),
                    features: None,
                },
                &session,
            )
            .await
            .unwrap();

            assert!(event.features.donations);
            assert_eq!(
                db.fetch_events_by_owner(&session.user_id)
                    .await
                    .unwrap()
                    .len(),
                1
            );

            event
                .update_details(
                    &db,
                    &session,
                    DataEditEvent {
                        name: Some("Spring Fundraiser".to_string()),
                        ..Default::default()
                    },
                )
                .await
                .unwrap();

            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.name, "Spring Fundraiser");
            assert_eq!(fetched.description.as_deref(), Some("Annual fundraiser"));

            event
                .update(&db, PartialEvent::default(), vec![FieldsEvent::Description])
                .await
                .unwrap();
            assert!(db.fetch_event(&event.id).await.unwrap().description.is_none());

            event.delete(&db, &session).await.unwrap();
            assert!(db.fetch_event(&event.id).await.is_err());
        });
    }

    #[async_std::test]
    async fn create_validates_name() {
        database_test!(|db| async move {
            let result = Event::create(
                &db,
                DataCreateEvent {
                    name: "   ".to_string(),
                    date: "2026-09-01".to_string(),
                    ..Default::default()
                },
                &owner(),
            )
            .await;

            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::FailedValidation { .. }
            ));
        });
    }

    #[async_std::test]
    async fn name_limit_counts_characters_not_bytes() {
        database_test!(|db| async move {
            let session = owner();
            let max = tally_config::config().await.features.limits.name_length;

            // Multi-byte characters up to the limit are fine
            Event::create(
                &db,
                DataCreateEvent {
                    name: "é".repeat(max),
                    date: "2026-09-01".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();

            let result = Event::create(
                &db,
                DataCreateEvent {
                    name: "é".repeat(max + 1),
                    date: "2026-09-01".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::FailedValidation { .. }
            ));
        });
    }

    #[async_std::test]
    async fn event_limit_is_enforced() {
        database_test!(|db| async move {
            let session = owner();
            let max = tally_config::config().await.features.limits.events;

            for n in 0..max {
                Event::create(
                    &db,
                    DataCreateEvent {
                        name: format!("Event {n}"),
                        date: "2026-09-01".to_string(),
                        ..Default::default()
                    },
                    &session,
                )
                .await
                .unwrap();
            }

            let result = Event::create(
                &db,
                DataCreateEvent {
                    name: "One too many".to_string(),
                    date: "2026-09-01".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::TooManyEvents { .. }
            ));
        });
    }

    #[async_std::test]
    async fn line_item_limit_is_enforced() {
        database_test!(|db| async move {
            let session = owner();
            let mut event = Event::create(
                &db,
                DataCreateEvent {
                    name: "Bake Sale".to_string(),
                    date: "2026-10-01".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();

            let max = tally_config::config().await.features.limits.line_items;
            for n in 0..max {
                event
                    .add_income(
                        &db,
                        &session,
                        Income::new(format!("Stall {n}"), 100, TransactionMedium::Cash),
                    )
                    .await
                    .unwrap();
            }

            let result = event
                .add_income(
                    &db,
                    &session,
                    Income::new("Overflow".to_string(), 100, TransactionMedium::Cash),
                )
                .await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::TooManyLineItems { .. }
            ));
        });
    }

    #[async_std::test]
    async fn only_owner_can_delete() {
        database_test!(|db| async move {
            let event = Event::create(
                &db,
                DataCreateEvent {
                    name: "Bake Sale".to_string(),
                    date: "2026-10-01".to_string(),
                    ..Default::default()
                },
                &owner(),
            )
            .await
            .unwrap();

            let stranger = Session::new("01USER0000000000000000B", "b@x.com", "Bob");
            let result = event.delete(&db, &stranger).await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::NotOwner
            ));
            assert!(db.fetch_event(&event.id).await.is_ok());
        });
    }

    #[async_std::test]
    async fn line_item_crud_rewrites_category_array() {
        database_test!(|db| async move {
            let session = owner();
            let mut event = Event::create(
                &db,
                DataCreateEvent {
                    name: "Bake Sale".to_string(),
                    date: "2026-10-01".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();

            let first = Income::new("Ticket sales".to_string(), 12_500, TransactionMedium::Cash);
            let second = Income::new("Sponsorship".to_string(), 50_000, TransactionMedium::Bank);
            event.add_income(&db, &session, first.clone()).await.unwrap();
            event
                .add_income(&db, &session, second.clone())
                .await
                .unwrap();

            // Newest entries are prepended
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.incomes[0].id, second.id);
            assert_eq!(fetched.incomes[1].id, first.id);
            assert!(fetched.incomes[0].attribution.is_some());

            let mut edited = fetched.incomes[1].clone();
            edited.amount = 13_000;
            event.update_income(&db, &session, edited).await.unwrap();
            assert_eq!(
                db.fetch_event(&event.id).await.unwrap().incomes[1].amount,
                13_000
            );

            event.remove_income(&db, &session, &first.id).await.unwrap();
            let fetched = db.fetch_event(&event.id).await.unwrap();
            assert_eq!(fetched.incomes.len(), 1);

            // Removing an id that is already gone stays a no-op
            event.remove_income(&db, &session, &first.id).await.unwrap();
            assert_eq!(db.fetch_event(&event.id).await.unwrap().incomes.len(), 1);

            let unknown = Income::new("Ghost".to_string(), 1, TransactionMedium::Cash);
            let result = event.update_income(&db, &session, unknown).await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::UnknownLineItem
            ));
        });
    }

    struct CannedSummarizer;

    #[async_trait]
    impl Summarizer for CannedSummarizer {
        async fn summarize(
            &self,
            event_name: &str,
            _expense_notes: &str,
        ) -> tally_result::Result<String> {
            Ok(format!("Spending for {event_name} was mostly supplies."))
        }
    }

    #[async_std::test]
    async fn expense_summary_is_a_manual_snapshot() {
        database_test!(|db| async move {
            let session = owner();
            let mut event = Event::create(
                &db,
                DataCreateEvent {
                    name: "Gala".to_string(),
                    date: "2026-11-20".to_string(),
                    ..Default::default()
                },
                &session,
            )
            .await
            .unwrap();

            let result = event
                .generate_expense_summary(&db, &session, &CannedSummarizer)
                .await;
            assert!(matches!(
                result.unwrap_err().error_type,
                ErrorType::NoExpenses
            ));

            event
                .add_expense(
                    &db,
                    &session,
                    Expense::new("Venue hire".to_string(), 80_000, TransactionMedium::Bank),
                )
                .await
                .unwrap();

            event
                .generate_expense_summary(&db, &session, &CannedSummarizer)
                .await
                .unwrap();
            assert_eq!(
                db.fetch_event(&event.id).await.unwrap().expense_summary,
                Some("Spending for Gala was mostly supplies.".to_string())
            );

            // Later edits leave the cached summary untouched
            event
                .add_expense(
                    &db,
                    &session,
                    Expense::new("Catering".to_string(), 40_000, TransactionMedium::Cash),
                )
                .await
                .unwrap();
            assert!(db
                .fetch_event(&event.id)
                .await
                .unwrap()
                .expense_summary
                .is_some());
        });
    }
}
