use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::store::{Error, SessionStore};

/// In-memory session store.
///
/// The default backend for tests and for embedders that have no platform
/// store to delegate to. State lives for the lifetime of the process, which
/// matches a browser tab's session when nothing is persisted.
#[derive(Debug, Default)]
pub struct Backend {
    store: Arc<RwLock<HashMap<String, String>>>,
}

impl Backend {
    pub fn new() -> Self {
        info!("Using in-memory session store");
        Backend {
            store: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait]
impl SessionStore for Backend {
    async fn store_value(&self, key: &str, value: &str) -> Result<(), Error> {
        let mut store = self.store.write().await;
        store.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn retrieve_value(&self, key: &str) -> Result<Option<String>, Error> {
        let store = self.store.read().await;
        Ok(store.get(key).cloned())
    }

    async fn remove_value(&self, key: &str) -> Result<(), Error> {
        let mut store = self.store.write().await;
        store.remove(key);
        Ok(())
    }
}
