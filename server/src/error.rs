use derive_more::{Display, Error};

/// Everything the session engine and its collaborators can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum Error {
    /// Unknown field or session id.
    #[display("{message}")]
    NotFound { message: String },
    /// The cell is already revealed, off the field, or the game is over.
    #[display("{message}")]
    InvalidMove { message: String },
    #[display("too many sessions: {limit} are already live")]
    Capacity { limit: usize },
    /// The field catalog or config could not be set up; fatal at startup.
    #[display("unavailable: {message}")]
    Unavailable { message: String },
}

impl Error {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}
