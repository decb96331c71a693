use backtrace::Backtrace;
use serde::{de, ser};
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::result::Result;

use crate::common::{atomic, Atomic};

/// Error kinds for Firehose operations
///
/// Each kind describes one category of failure so callers can branch on
/// [`FirehoseError::kind`] instead of parsing messages.
///
/// # Examples
///
/// ```rust,ignore
/// use firehose::errors::{FirehoseError, ErrorKind, FirehoseResult};
///
/// fn example() -> FirehoseResult<()> {
///     Err(FirehoseError::new("Document users/1 not found", ErrorKind::NotFound))
/// }
/// ```
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ErrorKind {
    /// A point lookup (direct or group-resolved) found no matching record
    NotFound,
    /// The logical id field of a collection group is not usable
    InvalidIdField,
    /// A collection or document path is malformed
    InvalidPath,
    /// The store failed to read a document or run a query
    StorageRead,
    /// The store failed to write or delete a document
    StorageWrite,
    /// Error mapping domain fields to/from stored data
    ObjectMapping,
    /// Error during filter evaluation or construction
    FilterError,
    /// The operation is not valid in the current context
    InvalidOperation,
    /// Internal error (usually indicates a bug)
    InternalError,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Document not found"),
            ErrorKind::InvalidIdField => write!(f, "Invalid id field"),
            ErrorKind::InvalidPath => write!(f, "Invalid path"),
            ErrorKind::StorageRead => write!(f, "Storage read error"),
            ErrorKind::StorageWrite => write!(f, "Storage write error"),
            ErrorKind::ObjectMapping => write!(f, "Object mapping error"),
            ErrorKind::FilterError => write!(f, "Filter error"),
            ErrorKind::InvalidOperation => write!(f, "Invalid operation"),
            ErrorKind::InternalError => write!(f, "Internal error"),
        }
    }
}

/// Custom Firehose error type.
///
/// `FirehoseError` carries a message, an [`ErrorKind`], an optional cause and
/// the backtrace captured where it was created. It is `Clone` so that one
/// failed lookup can be handed to every caller waiting on the same key.
///
/// # Examples
///
/// ```rust,ignore
/// use firehose::errors::{FirehoseError, ErrorKind};
///
/// let cause = FirehoseError::new("connection reset", ErrorKind::StorageRead);
/// let err = FirehoseError::new_with_cause("Failed to load users/1", ErrorKind::StorageRead, cause);
/// ```
#[derive(Clone)]
pub struct FirehoseError {
    message: String,
    error_kind: ErrorKind,
    cause: Option<Box<FirehoseError>>,
    backtrace: Atomic<Backtrace>,
}

impl FirehoseError {
    /// Creates a new `FirehoseError` with the specified message and error kind.
    pub fn new(message: &str, error_kind: ErrorKind) -> Self {
        FirehoseError {
            message: message.to_string(),
            error_kind,
            cause: None,
            backtrace: atomic(Backtrace::new()),
        }
    }

    /// Creates a new `FirehoseError` with a cause error.
    ///
    /// The cause is kept for `Debug` output and [`Error::source`].
    pub fn new_with_cause(message: &str, error_kind: ErrorKind, cause: FirehoseError) -> Self {
        FirehoseError {
            message: message.to_string(),
            error_kind,
            cause: Some(Box::new(cause)),
            backtrace: atomic(Backtrace::new()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> &ErrorKind {
        &self.error_kind
    }

    pub fn cause(&self) -> Option<&FirehoseError> {
        self.cause.as_deref()
    }

    /// Returns `true` if this is a [`ErrorKind::NotFound`] error.
    pub fn is_not_found(&self) -> bool {
        self.error_kind == ErrorKind::NotFound
    }
}

impl Display for FirehoseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Debug for FirehoseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // print error message with stack trace followed by cause
        match &self.cause {
            Some(cause) => write!(f, "{}\nCaused by: {:?}", self.message, cause),
            None => write!(f, "{}\n{:?}", self.message, self.backtrace.read()),
        }
    }
}

impl Error for FirehoseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.cause {
            Some(cause) => Some(cause.as_ref()),
            None => None,
        }
    }
}

/// A result type alias for Firehose operations.
pub type FirehoseResult<T> = Result<T, FirehoseError>;

impl de::Error for FirehoseError {
    fn custom<T: Display>(msg: T) -> Self {
        FirehoseError::new(&msg.to_string(), ErrorKind::ObjectMapping)
    }
}

impl ser::Error for FirehoseError {
    fn custom<T: Display>(msg: T) -> Self {
        FirehoseError::new(&msg.to_string(), ErrorKind::ObjectMapping)
    }
}

impl From<serde_json::Error> for FirehoseError {
    fn from(err: serde_json::Error) -> Self {
        FirehoseError::new(
            &format!("Object mapping error: {}", err),
            ErrorKind::ObjectMapping,
        )
    }
}

impl From<String> for FirehoseError {
    fn from(msg: String) -> Self {
        FirehoseError::new(&msg, ErrorKind::InternalError)
    }
}

impl From<&str> for FirehoseError {
    fn from(msg: &str) -> Self {
        FirehoseError::new(msg, ErrorKind::InternalError)
    }
}
