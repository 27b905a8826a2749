use thiserror::Error;
use uuid::Uuid;

/// Failure talking to the remote notification store.
///
/// Kept `Clone` (no boxed sources) so the same error can sit in store state,
/// go out on the event channel and be returned to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("remote store returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("rejected by remote store: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("notification {0} is not in the local collection")]
    NotFound(Uuid),

    #[error("invalid page request: page={page} limit={limit}")]
    InvalidPage { page: u32, limit: u32 },

    #[error("a refresh of page 1 is already in flight")]
    RefreshInFlight,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("notification store has been shut down")]
    Closed,
}

pub type Result<T, E = StoreError> = std::result::Result<T, E>;
