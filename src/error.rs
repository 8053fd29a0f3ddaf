// Error types shared by every layer of the library.
//
// Validation failures are raised locally before any request is sent; every
// other variant describes something that went wrong while talking to the
// server or reading local state. Services never wrap or reinterpret errors
// coming back from the transport: they are returned to the caller as-is.

use thiserror::Error;

/// Errors returned by the resource services and the transport.
#[derive(Error, Debug)]
pub enum Error {
    /// The address built from the arguments is not a valid mailbox.
    #[error("invalid email address: '{address}'; {reason}")]
    InvalidEmail { address: String, reason: String },

    /// The server answered with a non-success status code.
    #[error("server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request could not be sent or the response could not be read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A resource name is empty or would change the request path (`.`, `..`).
    #[error("invalid resource name: '{0}'")]
    InvalidPath(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Prompt(String),
}

impl Error {
    /// Whether the server rejected the stored credentials (401 or 403).
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
