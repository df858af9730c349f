use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::configuration::BackendConfig;
use crate::identity::Profile;
use crate::resolver::{FetchError, ProfileFetcher};

/// The single authoritative identity-fetch endpoint.
const ME_PATH: &str = "/api/auth/me";

/// The backend has answered with both `{ "user": {...} }` and a bare profile
/// object across revisions; both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeResponse {
    Wrapped { user: Profile },
    Bare(Profile),
}

impl MeResponse {
    fn into_profile(self) -> Profile {
        match self {
            MeResponse::Wrapped { user } => user,
            MeResponse::Bare(profile) => profile,
        }
    }
}

/// `reqwest`-backed profile fetcher for the `GET /api/auth/me` endpoint.
pub struct HttpProfileFetcher {
    base_url: String,
    client: Client,
}

impl HttpProfileFetcher {
    pub fn new(config: &BackendConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout))
            .build();

        let client = match client {
            Ok(client) => Ok(client),
            Err(err) => {
                let msg = format!("Failed to build HTTP client: {err}");
                Err(FetchError::Initialization(msg))
            }
        }?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

#[async_trait]
impl ProfileFetcher for HttpProfileFetcher {
    async fn fetch_me(&self, token: &str) -> Result<Profile, FetchError> {
        let url = format!("{}{ME_PATH}", self.base_url);
        debug!("Fetching profile from {url}");

        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body: MeResponse = response
            .json()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))?;

        Ok(body.into_profile())
    }
}
