//! The error taxonomy shared by sources, sinks and the attack orchestrator.

use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::sync::Arc;

/// Where a failure originated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// The input source.
    Input,
    /// The output sink.
    Output,
}

/// Record-file header field that failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderField {
    Magic,
    Order,
    Description,
}

/// Errors surfaced by the engine.
#[derive(Debug)]
pub enum Error {
    /// An underlying OS call failed.
    Io(io::Error),
    /// The status snapshot was taken after the attack reached its stopped
    /// state. The snapshot is still filled.
    Stopped,
    /// A record was wider than the configured slot, or a sink declared a
    /// record size wider than its file's.
    RecordSizeInvalid {
        /// Offending size.
        size: usize,
        /// Largest size that would have been accepted.
        limit: usize,
    },
    /// A record-file header did not match what the caller expected.
    FileInvalid {
        /// First field that failed validation.
        field: HeaderField,
    },
}

impl Error {
    pub(crate) fn invalid_input(msg: &'static str) -> Error {
        Error::Io(io::Error::new(io::ErrorKind::InvalidInput, msg))
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref e) => e.fmt(f),
            Error::Stopped => write!(f, "the attack has stopped"),
            Error::RecordSizeInvalid { size, limit } => {
                write!(f, "invalid record size {} (limit {})", size, limit)
            }
            Error::FileInvalid { field } => {
                let field = match field {
                    HeaderField::Magic => "magic",
                    HeaderField::Order => "file order",
                    HeaderField::Description => "description",
                };
                write!(f, "record file header mismatch: {}", field)
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match *self {
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Error {
        Error::Io(e)
    }
}

/// The first failure recorded by an attack, tagged with its stage.
///
/// At most one fault is ever installed per attack run; errors raised while
/// shutting down after the first one are dropped.
#[derive(Debug, Clone)]
pub struct Fault {
    /// What went wrong.
    pub error: Arc<Error>,
    /// Whether the input source or the output sink failed.
    pub stage: Stage,
}
