#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

//! Session resolution and route-guard engine for the FoundCloud campus
//! lost-and-found portal.
//!
//! The engine decides, from a stored bearer credential and a
//! server-confirmed profile, whether a guarded view may be entered and where
//! an unauthorized or not-yet-approved user is sent instead. It has three
//! cooperating parts, leaves first:
//!
//! 1. [`resolver`] — identity resolution: credential + cached profile +
//!    remote "who am I" call → one authoritative identity.
//! 2. [`guard`] — the pure access decision over a resolved identity and a
//!    route's declared policy.
//! 3. [`poller`] — status polling for the waiting-room view, driving a
//!    redirect the moment a pending account is approved or rejected.
//!
//! [`session::SessionHost`] ties them together for an embedding UI layer.

pub mod configuration;
pub mod credential;
pub mod guard;
pub mod identity;
pub mod poller;
pub mod resolver;
pub mod session;
pub mod store;
pub mod telemetry;

mod secret;

pub use configuration::Configuration;
pub use guard::{decide, role_home, Decision, RoutePolicy};
pub use identity::{Identity, Profile, Role, Status};
pub use poller::StatusPoller;
pub use resolver::{HttpProfileFetcher, ProfileFetcher, Resolver};
pub use secret::Secret;
pub use session::{Session, SessionHost};
pub use store::{SessionStore, SessionStoreExt};
