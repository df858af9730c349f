//! Status polling for the waiting-room view.
//!
//! A pending account only leaves the waiting room when an administrator acts,
//! so the view re-resolves identity on a fixed interval and navigates the
//! moment the access decision stops being `Allow`. The poller is an explicit
//! cancellable task with one unambiguous teardown path; it never relies on a
//! framework unmount hook as the only cancellation route.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::guard::{self, Decision, RoutePolicy};
use crate::resolver::Resolver;

pub struct StatusPoller {
    handle: JoinHandle<()>,
}

impl StatusPoller {
    /// Arms the poller. The first resolution happens immediately; afterwards
    /// the task re-resolves once per `interval`. On the first non-`Allow`
    /// decision it invokes `on_redirect` exactly once and stops.
    ///
    /// Resolutions are serialized by construction: the task is a single loop,
    /// so a tick can never start while a previous resolution is outstanding,
    /// and delayed ticks are skipped rather than replayed.
    pub fn spawn<F>(
        resolver: Arc<Resolver>,
        policy: RoutePolicy,
        interval: Duration,
        on_redirect: F,
    ) -> StatusPoller
    where
        F: FnOnce(Decision) + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut on_redirect = Some(on_redirect);

            loop {
                ticker.tick().await;

                let identity = match resolver.resolve(true).await {
                    Ok(identity) => Some(identity),
                    Err(e) => {
                        debug!("status poll resolution failed: {e}");
                        None
                    }
                };

                let decision = guard::decide(identity.as_ref(), false, &policy);
                if decision == Decision::Allow {
                    debug!("status unchanged, staying on waiting room");
                    continue;
                }

                info!(?decision, "status changed, leaving waiting room");
                if let Some(on_redirect) = on_redirect.take() {
                    on_redirect(decision);
                }
                break;
            }
        });

        StatusPoller { handle }
    }

    /// Disarms the timer. Takes effect synchronously: no tick fires after
    /// this returns.
    pub fn cancel(&self) {
        self.handle.abort();
    }

    /// True once the poller has redirected or been cancelled.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
