//! Process-wide session state and its host.
//!
//! The session is an explicit value owned by one coordinating component and
//! published over a watch channel, not ambient global state. It is rebuilt by
//! identity resolution on load and on every auth-changed signal (login,
//! logout, external update), and torn down to the empty state on logout,
//! expiry, or mismatch.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::guard::{self, Decision, RoutePolicy};
use crate::identity::Identity;
use crate::resolver::Resolver;
use crate::store::{self, SessionStoreExt};

/// Snapshot of the current session.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub identity: Option<Identity>,
    pub is_authenticated: bool,
    /// True only while a resolution is in flight.
    pub is_resolving: bool,
}

struct HostInner {
    resolver: Arc<Resolver>,
    state: watch::Sender<Session>,
}

impl HostInner {
    async fn refresh(&self) {
        self.state.send_modify(|session| session.is_resolving = true);

        let next = match self.resolver.resolve(true).await {
            Ok(identity) => Session {
                is_authenticated: true,
                identity: Some(identity),
                is_resolving: false,
            },
            Err(e) => {
                debug!("session resolution failed: {e}");
                Session::default()
            }
        };

        self.state.send_replace(next);
    }
}

/// Owns the session lifecycle: initial load, re-resolution on auth-changed
/// signals, logout teardown. Consumers observe state through `subscribe`.
pub struct SessionHost {
    inner: Arc<HostInner>,
    events: mpsc::UnboundedSender<()>,
    listener: JoinHandle<()>,
}

impl SessionHost {
    pub fn new(resolver: Arc<Resolver>) -> SessionHost {
        let (state, _) = watch::channel(Session::default());
        let inner = Arc::new(HostInner { resolver, state });

        let (events, mut rx) = mpsc::unbounded_channel();
        let listener_inner = inner.clone();
        let listener = tokio::spawn(async move {
            while rx.recv().await.is_some() {
                listener_inner.refresh().await;
            }
        });

        SessionHost {
            inner,
            events,
            listener,
        }
    }

    /// Resolves the session now. Called once on startup and whenever the
    /// embedder wants a synchronous refresh.
    pub async fn refresh(&self) {
        self.inner.refresh().await;
    }

    /// Signals that authentication state changed somewhere (login elsewhere,
    /// external store update). The host re-resolves in the background.
    pub fn notify_auth_changed(&self) {
        let _ = self.events.send(());
    }

    /// Clears the stored credential and profile together and publishes the
    /// empty session.
    pub async fn logout(&self) -> Result<(), store::Error> {
        self.inner.resolver.store().clear_session().await?;
        self.inner.state.send_replace(Session::default());
        info!("logged out");
        self.notify_auth_changed();
        Ok(())
    }

    /// Watch the session state.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Current session snapshot.
    pub fn current(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Access decision for the current session against a route's policy.
    pub fn decide(&self, policy: &RoutePolicy) -> Decision {
        let session = self.inner.state.borrow();
        guard::decide(session.identity.as_ref(), session.is_resolving, policy)
    }

    /// Tears the host down. The auth-changed listener stops immediately.
    pub fn shutdown(&self) {
        self.listener.abort();
    }
}

impl Drop for SessionHost {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;
    use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
    use serde_json::json;

    use super::*;
    use crate::identity::{Profile, Role};
    use crate::resolver::{FetchError, MockProfileFetcher};
    use crate::store::{memory, SessionStore, PROFILE_KEY, TOKEN_KEY};

    fn token_for(subject: &str) -> String {
        let exp = (Utc::now() + chrono::Duration::hours(1)).timestamp();
        encode(
            &Header::new(Algorithm::HS256),
            &json!({ "userId": subject, "exp": exp }),
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    fn approved_profile(id: &str) -> Profile {
        Profile {
            mongo_id: Some(id.to_string()),
            role: Some("user".to_string()),
            status: Some("approved".to_string()),
            ..Profile::default()
        }
    }

    fn host_with(store: Arc<memory::Backend>, fetcher: MockProfileFetcher) -> SessionHost {
        let resolver = Arc::new(Resolver::new(store, Arc::new(fetcher)));
        SessionHost::new(resolver)
    }

    #[tokio::test]
    async fn test_refresh_publishes_authenticated_session() {
        let store = Arc::new(memory::Backend::new());
        store.store_value(TOKEN_KEY, &token_for("u1")).await.unwrap();

        let mut fetcher = MockProfileFetcher::new();
        fetcher
            .expect_fetch_me()
            .returning(|_| Ok(approved_profile("u1")));

        let host = host_with(store, fetcher);
        host.refresh().await;

        let session = host.current();
        assert!(session.is_authenticated);
        assert!(!session.is_resolving);
        assert_eq!(session.identity.unwrap().role, Role::User);
    }

    #[tokio::test]
    async fn test_refresh_failure_publishes_empty_session() {
        let store = Arc::new(memory::Backend::new());
        let host = host_with(store, MockProfileFetcher::new());

        host.refresh().await;

        let session = host.current();
        assert!(!session.is_authenticated);
        assert!(session.identity.is_none());
    }

    #[tokio::test]
    async fn test_logout_clears_store_and_state() {
        let store = Arc::new(memory::Backend::new());
        store.store_value(TOKEN_KEY, &token_for("u1")).await.unwrap();
        store.store_value(PROFILE_KEY, "{}").await.unwrap();

        let mut fetcher = MockProfileFetcher::new();
        fetcher
            .expect_fetch_me()
            .returning(|_| Err(FetchError::Status(503)));

        let host = host_with(store.clone(), fetcher);
        host.logout().await.unwrap();

        assert_eq!(store.retrieve_value(TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.retrieve_value(PROFILE_KEY).await.unwrap(), None);
        assert!(!host.current().is_authenticated);
    }

    #[tokio::test]
    async fn test_auth_changed_signal_triggers_resolution() {
        let store = Arc::new(memory::Backend::new());
        store.store_value(TOKEN_KEY, &token_for("u1")).await.unwrap();

        let mut fetcher = MockProfileFetcher::new();
        fetcher
            .expect_fetch_me()
            .returning(|_| Ok(approved_profile("u1")));

        let host = host_with(store, fetcher);
        let mut rx = host.subscribe();

        host.notify_auth_changed();

        let authenticated = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                rx.changed().await.unwrap();
                if rx.borrow().is_authenticated {
                    break;
                }
            }
        })
        .await;
        assert!(authenticated.is_ok(), "host never published a session");
    }

    #[tokio::test]
    async fn test_decide_uses_current_session() {
        let store = Arc::new(memory::Backend::new());
        store.store_value(TOKEN_KEY, &token_for("u1")).await.unwrap();

        let mut fetcher = MockProfileFetcher::new();
        fetcher
            .expect_fetch_me()
            .returning(|_| Ok(approved_profile("u1")));

        let host = host_with(store, fetcher);

        // before any resolution the session is empty
        assert_eq!(
            host.decide(&RoutePolicy::any()),
            Decision::Redirect {
                target: crate::guard::routes::SIGNIN,
                reason: None
            }
        );

        host.refresh().await;
        assert_eq!(host.decide(&RoutePolicy::any()), Decision::Allow);
    }

    #[tokio::test]
    async fn test_shutdown_stops_listener() {
        let store = Arc::new(memory::Backend::new());
        store.store_value(TOKEN_KEY, &token_for("u1")).await.unwrap();

        let mut fetcher = MockProfileFetcher::new();
        fetcher
            .expect_fetch_me()
            .returning(|_| Ok(approved_profile("u1")));

        let host = host_with(store, fetcher);
        host.shutdown();
        host.notify_auth_changed();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!host.current().is_authenticated);
    }
}
