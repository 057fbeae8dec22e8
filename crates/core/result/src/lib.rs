#[cfg(feature = "serde")]
#[macro_use]
extern crate serde;

/// Result type with custom Error
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Error information
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone)]
pub struct Error {
    /// Type of error and additional information
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub error_type: ErrorType,

    /// Where this error occurred
    pub location: String,
}

/// Possible error types
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorType {
    /// This error was not labeled :(
    LabelMe,

    // ? Collaboration related errors
    CannotInviteYourself,
    AlreadyCollaborator,
    AlreadyInvited,
    NotInvited,
    NotCollaborator,
    TooManyCollaborators {
        max: usize,
    },

    // ? Event related errors
    UnknownEvent,
    UnknownLineItem,
    NoExpenses,
    TooManyEvents {
        max: usize,
    },
    TooManyLineItems {
        max: usize,
    },

    // ? Permission errors
    NotOwner,
    NotAuthorized,

    // ? General errors
    DatabaseError {
        operation: String,
        collection: String,
    },
    SummarizationFailed,
    InternalError,
    InvalidOperation,
    InvalidProperty,
    NotFound,
    NoEffect,
    FailedValidation {
        error: String,
    },
}

/// Broad classes of failure surfaced to callers
///
/// Every `ErrorType` folds into exactly one of these; user-facing layers
/// only need to distinguish the class, not the individual variant.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or logically invalid request
    Validation,
    /// Caller lacks the required role for the operation
    Permission,
    /// Referenced record or entry does not exist
    NotFound,
    /// Underlying document-store call failed
    Storage,
}

impl Error {
    /// Classify this error into one of the four caller-facing classes
    pub fn kind(&self) -> ErrorKind {
        match self.error_type {
            ErrorType::CannotInviteYourself
            | ErrorType::AlreadyCollaborator
            | ErrorType::AlreadyInvited
            | ErrorType::TooManyCollaborators { .. }
            | ErrorType::NoExpenses
            | ErrorType::TooManyEvents { .. }
            | ErrorType::TooManyLineItems { .. }
            | ErrorType::InvalidOperation
            | ErrorType::InvalidProperty
            | ErrorType::NoEffect
            | ErrorType::FailedValidation { .. } => ErrorKind::Validation,

            ErrorType::NotOwner | ErrorType::NotAuthorized => ErrorKind::Permission,

            ErrorType::NotInvited
            | ErrorType::NotCollaborator
            | ErrorType::UnknownEvent
            | ErrorType::UnknownLineItem
            | ErrorType::NotFound => ErrorKind::NotFound,

            ErrorType::LabelMe
            | ErrorType::DatabaseError { .. }
            | ErrorType::SummarizationFailed
            | ErrorType::InternalError => ErrorKind::Storage,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} (at {})", self.error_type, self.location)
    }
}

impl std::error::Error for Error {}

#[macro_export]
macro_rules! create_error {
    ( $error: ident $( $tt:tt )? ) => {
        $crate::Error {
            error_type: $crate::ErrorType::$error $( $tt )?,
            location: format!("{}:{}:{}", file!(), line!(), column!()),
        }
    };
}

#[macro_export]
macro_rules! create_database_error {
    ( $operation: expr, $collection: expr ) => {
        create_error!(DatabaseError {
            operation: $operation.to_string(),
            collection: $collection.to_string()
        })
    };
}

#[macro_export]
#[cfg(debug_assertions)]
macro_rules! query {
    ( $self: ident, $type: ident, $collection: expr, $($rest:expr),+ ) => {
        Ok($self.$type($collection, $($rest),+).await.unwrap())
    };
}

#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! query {
    ( $self: ident, $type: ident, $collection: expr, $($rest:expr),+ ) => {
        $self.$type($collection, $($rest),+).await
            .map_err(|_| create_database_error!(stringify!($type), $collection))
    };
}
