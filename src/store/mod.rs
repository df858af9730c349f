use std::fmt::Debug;

use async_trait::async_trait;

mod error;
pub mod memory;

pub use error::Error;

use crate::identity::Profile;
use crate::secret::Secret;

/// Key under which the raw bearer token is persisted.
pub const TOKEN_KEY: &str = "authToken";
/// Key under which the JSON-serialized normalized profile is persisted.
pub const PROFILE_KEY: &str = "user";

/// Trait for the persistent credential/profile store backing a session.
///
/// The store is a plain string key-value surface so that embedders can back
/// it with whatever the host platform provides (browser local storage, a
/// keychain, a file). The engine only ever touches the two well-known keys.
#[async_trait]
pub trait SessionStore: Debug + Send + Sync {
    /// Store a value under the given key, replacing any previous value
    async fn store_value(&self, key: &str, value: &str) -> Result<(), Error>;

    /// Retrieve a value from the store
    ///
    /// # Returns
    ///
    /// * `Ok(Some(String))` if a value is present under the key
    /// * `Ok(None)` if the key is not set
    /// * `Err(Error)` if the backend failed
    async fn retrieve_value(&self, key: &str) -> Result<Option<String>, Error>;

    /// Remove a value from the store; removing an absent key is not an error
    async fn remove_value(&self, key: &str) -> Result<(), Error>;
}

/// Typed helpers over the raw key-value surface.
#[async_trait]
pub trait SessionStoreExt: SessionStore {
    /// Load the stored bearer token, if any.
    async fn load_token(&self) -> Result<Option<Secret<String>>, Error> {
        Ok(self.retrieve_value(TOKEN_KEY).await?.map(Secret::from))
    }

    /// Persist a bearer token.
    async fn save_token(&self, token: &Secret<String>) -> Result<(), Error> {
        self.store_value(TOKEN_KEY, token.expose()).await
    }

    /// Load the cached profile, if any.
    async fn load_profile(&self) -> Result<Option<Profile>, Error> {
        match self.retrieve_value(PROFILE_KEY).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Persist a normalized profile. Writes are last-writer-wins: serializing
    /// the same profile twice yields the same bytes, so concurrent writers
    /// for the same server response converge.
    async fn save_profile(&self, profile: &Profile) -> Result<(), Error> {
        let raw = serde_json::to_string(profile)?;
        self.store_value(PROFILE_KEY, &raw).await
    }

    /// Remove the credential and the cached profile together.
    ///
    /// This is the only compound operation the engine requires: a stale
    /// profile must never survive an invalidated credential, so the two keys
    /// are only ever cleared through this one path.
    async fn clear_session(&self) -> Result<(), Error> {
        self.remove_value(TOKEN_KEY).await?;
        self.remove_value(PROFILE_KEY).await
    }
}

#[async_trait]
impl<S: SessionStore + ?Sized> SessionStoreExt for S {}
