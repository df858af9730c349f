//! Identity resolution.
//!
//! Turns the stored credential plus an optional cached profile into an
//! authoritative identity, preferring a fresh server-confirmed profile over
//! cached data, and invalidating the whole session on expiry or on any
//! subject-id mismatch. A failed remote fetch is treated as transient
//! infrastructure trouble, never as a logout signal.

mod error;
pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

pub use error::{Error, FetchError};
pub use http::HttpProfileFetcher;

use crate::credential::{self, Credential};
use crate::identity::{Identity, Profile};
use crate::store::{SessionStore, SessionStoreExt};

/// The abstracted "who am I" collaborator.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileFetcher: Send + Sync {
    /// Fetch the profile the backend associates with the bearer token.
    async fn fetch_me(&self, token: &str) -> Result<Profile, FetchError>;
}

pub struct Resolver {
    store: Arc<dyn SessionStore>,
    fetcher: Arc<dyn ProfileFetcher>,
}

impl Resolver {
    pub fn new(store: Arc<dyn SessionStore>, fetcher: Arc<dyn ProfileFetcher>) -> Self {
        Self { store, fetcher }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        self.store.clone()
    }

    /// Resolves the current session subject.
    ///
    /// With `allow_remote_fetch` the backend is asked for a fresh profile and
    /// the cached one is only a fallback; without it the cached profile is
    /// authoritative. Every invalid-session path clears the credential and
    /// the cached profile together before returning.
    #[instrument(skip(self))]
    pub async fn resolve(&self, allow_remote_fetch: bool) -> Result<Identity, Error> {
        let Some(token) = self.store.load_token().await? else {
            debug!("no credential in session store");
            return Err(Error::CredentialMissing);
        };

        let credential = match Credential::decode(token.expose(), Utc::now()) {
            Ok(credential) => credential,
            Err(credential::Error::Expired) => {
                info!("credential expired, clearing session");
                self.store.clear_session().await?;
                return Err(Error::CredentialExpired);
            }
            Err(credential::Error::Decode(e)) => {
                error!("credential decode failed: {e}");
                self.store.clear_session().await?;
                return Err(Error::CredentialDecode(e));
            }
        };

        // A cached profile that cannot be parsed is treated as absent; the
        // next successful resolution overwrites it.
        let cached = match self.store.load_profile().await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("cached profile unreadable: {e}");
                None
            }
        };

        if let Some(cached_profile) = &cached {
            if let Some(cached_id) = cached_profile.subject_id() {
                if cached_id != credential.subject_id {
                    error!(
                        token_subject = %credential.subject_id,
                        cached_subject = %cached_id,
                        "credential subject does not match cached profile, clearing session"
                    );
                    self.store.clear_session().await?;
                    return Err(Error::IdentityMismatch);
                }
            }
        }

        if allow_remote_fetch {
            match self.fetcher.fetch_me(token.expose()).await {
                Ok(profile) => {
                    if let Some(fetched_id) = profile.subject_id() {
                        if fetched_id != credential.subject_id {
                            error!(
                                token_subject = %credential.subject_id,
                                fetched_subject = %fetched_id,
                                "credential subject does not match fetched profile, clearing session"
                            );
                            self.store.clear_session().await?;
                            return Err(Error::IdentityMismatch);
                        }
                    }

                    let normalized = profile.normalized();
                    self.store.save_profile(&normalized).await?;
                    debug!(subject_id = %credential.subject_id, "resolved identity from fresh profile");
                    return Ok(Identity::from_profile(&normalized, &credential.subject_id));
                }
                Err(e) => {
                    warn!("profile fetch failed, falling back to cached profile: {e}");
                }
            }
        }

        if let Some(cached_profile) = cached {
            let normalized = cached_profile.normalized();
            self.store.save_profile(&normalized).await?;
            debug!(subject_id = %credential.subject_id, "resolved identity from cached profile");
            return Ok(Identity::from_profile(&normalized, &credential.subject_id));
        }

        debug!("credential present but no profile available");
        Err(Error::CredentialMissing)
    }
}
