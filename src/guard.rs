//! Access decisions for guarded views.
//!
//! This is the pure core of the engine: given a resolved identity and the
//! policy a view declares, produce a decision. Every branch yields a value;
//! nothing in here performs I/O or fails.
//!
//! The one rule that must hold above all others: security officers and
//! admins are auto-approved. Their stored status is never authoritative and
//! they must never be routed to the pending view or the rejected sign-in.

use std::collections::HashSet;

use tracing::{debug, error};

use crate::identity::{Identity, Role, Status};

/// Route targets the guard redirects to. External to the engine; consumed by
/// the routing layer as plain strings.
pub mod routes {
    pub const SIGNIN: &str = "/signin";
    pub const UNAUTHORIZED: &str = "/unauthorized";
    pub const PENDING: &str = "/pending";
    pub const DASHBOARD: &str = "/dashboard";
    pub const SECURITY: &str = "/security";
    pub const ADMIN: &str = "/admin";
}

const REJECTED_REASON: &str = "Your account has been rejected. Please contact support.";

/// Access policy a guarded view declares for itself.
#[derive(Clone, Debug, Default)]
pub struct RoutePolicy {
    /// Roles allowed to enter. Empty means any authenticated, approved role.
    pub allowed_roles: HashSet<Role>,
    /// True only for the dedicated waiting-room view.
    pub pending_only: bool,
}

impl RoutePolicy {
    /// Policy for a route any authenticated, approved identity may enter.
    pub fn any() -> RoutePolicy {
        RoutePolicy::default()
    }

    /// Policy restricted to the given roles.
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> RoutePolicy {
        RoutePolicy {
            allowed_roles: roles.into_iter().collect(),
            pending_only: false,
        }
    }

    /// Policy of the waiting-room view.
    pub fn pending_only() -> RoutePolicy {
        RoutePolicy {
            allowed_roles: HashSet::new(),
            pending_only: true,
        }
    }
}

/// Outcome of an access decision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Render the guarded view.
    Allow,
    /// Resolution is still in flight; show a loading state, not a redirect.
    Loading,
    /// Send the user elsewhere, optionally with a user-facing reason.
    Redirect {
        target: &'static str,
        reason: Option<String>,
    },
}

impl Decision {
    fn redirect(target: &'static str) -> Decision {
        Decision::Redirect {
            target,
            reason: None,
        }
    }
}

/// The canonical landing route for a role.
pub fn role_home(role: Role) -> &'static str {
    match role {
        Role::Admin => routes::ADMIN,
        Role::Security => routes::SECURITY,
        Role::User => routes::DASHBOARD,
    }
}

/// Decides whether a view guarded by `policy` may be entered.
///
/// Rules are evaluated in strict order; the first match wins. Total over its
/// input domain: there is no failure path out of this function.
pub fn decide(identity: Option<&Identity>, is_resolving: bool, policy: &RoutePolicy) -> Decision {
    if is_resolving {
        return Decision::Loading;
    }

    let Some(identity) = identity else {
        return Decision::redirect(routes::SIGNIN);
    };

    if identity.subject_id.is_empty() {
        error!("identity without subject id reached the guard");
        return Decision::redirect(routes::SIGNIN);
    }

    if policy.pending_only {
        return decide_pending_only(identity);
    }

    if !identity.is_auto_approved() {
        if identity.status == Status::Rejected {
            debug!(subject_id = %identity.subject_id, "rejected account, redirecting to sign-in");
            let reason = identity
                .rejection_reason
                .clone()
                .unwrap_or_else(|| REJECTED_REASON.to_string());
            return Decision::Redirect {
                target: routes::SIGNIN,
                reason: Some(reason),
            };
        }

        if identity.effective_status() != Status::Approved {
            debug!(subject_id = %identity.subject_id, "account not yet approved, redirecting to waiting room");
            return Decision::redirect(routes::PENDING);
        }
    }

    if !policy.allowed_roles.is_empty() && !policy.allowed_roles.contains(&identity.role) {
        debug!(
            subject_id = %identity.subject_id,
            role = identity.role.as_str(),
            "role not allowed for this route"
        );
        return Decision::redirect(routes::UNAUTHORIZED);
    }

    Decision::Allow
}

/// The waiting room only admits a plain user still pending review. Everyone
/// else who lands there gets sent to where they belong.
fn decide_pending_only(identity: &Identity) -> Decision {
    if identity.is_auto_approved() {
        debug!(
            subject_id = %identity.subject_id,
            role = identity.role.as_str(),
            "auto-approved identity mis-routed to waiting room"
        );
        return Decision::redirect(role_home(identity.role));
    }

    if identity.status != Status::Pending {
        return Decision::redirect(role_home(identity.role));
    }

    Decision::Allow
}
