use std::fmt;

use crate::store;

/// Why a session could not be resolved. Every variant except a store failure
/// means "session invalid": the caller must route the user to sign-in; none
/// of these are retried automatically.
#[derive(Debug)]
pub enum Error {
    /// No token in the store, or a token with nothing to back it.
    CredentialMissing,
    /// Token past its expiry; the session has been purged.
    CredentialExpired,
    /// Token could not be decoded; the session has been purged.
    CredentialDecode(String),
    /// Token subject disagrees with the cached or fetched profile; the
    /// session has been purged.
    IdentityMismatch,
    Store(store::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::CredentialMissing => write!(f, "No credential present"),
            Error::CredentialExpired => write!(f, "Credential expired"),
            Error::CredentialDecode(err) => write!(f, "Credential decode failed: {err}"),
            Error::IdentityMismatch => {
                write!(f, "Credential subject does not match profile subject")
            }
            Error::Store(err) => write!(f, "{err}"),
        }
    }
}

impl From<store::Error> for Error {
    fn from(error: store::Error) -> Self {
        Error::Store(error)
    }
}

/// Failure of the remote "who am I" call. Never fatal to the session: the
/// resolver falls back to the cached profile.
#[derive(Debug)]
pub enum FetchError {
    Initialization(String),
    Transport(String),
    Status(u16),
    Malformed(String),
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Initialization(err) => write!(f, "Failed to build profile client: {err}"),
            FetchError::Transport(err) => write!(f, "Profile request failed: {err}"),
            FetchError::Status(status) => {
                write!(f, "Profile endpoint answered with status {status}")
            }
            FetchError::Malformed(err) => write!(f, "Profile response malformed: {err}"),
        }
    }
}
