mod events;

pub use events::*;

#[cfg(feature = "mongodb")]
use crate::MongoDb;
use crate::{Database, ReferenceDb};

auto_derived!(
    /// Identity a caller presents when invoking an operation
    ///
    /// Always passed in explicitly, never read from ambient state, so the
    /// workflow stays independently testable.
    pub struct Session {
        /// Stable user id assigned by the identity provider
        pub user_id: String,
        /// Contact identifier (email) other users see and invite
        pub contact: String,
        /// Profile name used for display and attribution
        pub display_name: String,
    }
);

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        contact: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Session {
        Session {
            user_id: user_id.into(),
            contact: contact.into(),
            display_name: display_name.into(),
        }
    }
}

pub trait AbstractDatabase: Sync + Send + events::AbstractEvents {}

impl AbstractDatabase for ReferenceDb {}
#[cfg(feature = "mongodb")]
impl AbstractDatabase for MongoDb {}

impl std::ops::Deref for Database {
    type Target = dyn AbstractDatabase;

    fn deref(&self) -> &Self::Target {
        match &self {
            Database::Reference(dummy) => dummy,
            #[cfg(feature = "mongodb")]
            Database::MongoDb(mongo) => mongo,
        }
    }
}
