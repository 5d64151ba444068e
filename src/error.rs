//! Error type shared by the authorization flow, the credential store and the
//! playlist operations.

use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while authorizing or talking to the playlist service.
#[derive(Error, Debug)]
pub enum Error {
    /// A playlist or other remote resource does not exist.
    #[error("{0} does not exist")]
    NotFound(String),

    /// The service rejected the access token (expired or revoked).
    #[error("the access token was rejected by the service")]
    InvalidCredential,

    /// The authorization redirect carried no code, or the wait was abandoned.
    #[error("authorization failed: {0}")]
    AuthorizationFailed(String),

    /// Writing the cached credential failed.
    #[error("could not save credential to {}: {message}", path.display())]
    Persistence { path: PathBuf, message: String },

    /// The target playlist already exists and overriding was not requested.
    #[error("playlist '{0}' already exists, specify --override-existing to override it")]
    Conflict(String),

    /// The service refused the request (bad id, missing scope, ...).
    #[error("request rejected with status {status}: {message}")]
    Rejected { status: StatusCode, message: String },

    /// Transport or decoding failure while talking to the service.
    #[error("remote service error: {0}")]
    RemoteService(#[from] reqwest::Error),
}

impl Error {
    /// Returns `true` for errors where the service answered but refused the
    /// request, as opposed to transport failures.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Error::InvalidCredential | Error::Rejected { .. })
    }
}
