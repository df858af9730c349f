use serde::{Deserialize, Serialize};

/// Resolved role of a session subject.
///
/// Raw role strings coming from the backend or the session store are
/// inconsistent (`"staff"`, `"security_officer"`, mixed case, historical
/// values). They are normalized exactly once, at the boundary where they
/// enter the engine, and compared as this enum everywhere downstream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Security,
    Admin,
}

impl Role {
    /// Normalizes a raw role string. Unknown or empty values map to `User`.
    pub fn normalize(raw: &str) -> Role {
        match raw.trim().to_ascii_lowercase().as_str() {
            "admin" => Role::Admin,
            "security" | "staff" | "security_officer" | "security-officer" => Role::Security,
            _ => Role::User,
        }
    }

    /// Canonical lowercase token, the form persisted in the session store.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Security => "security",
            Role::Admin => "admin",
        }
    }
}

/// Approval status of a session subject.
///
/// Only meaningful for `Role::User`; security officers and admins are
/// auto-approved and their stored status is never authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// Normalizes a raw status string. Absent or unrecognized values map to
    /// `Pending`, so an account with a garbled status is held at the waiting
    /// room rather than let through.
    pub fn normalize(raw: Option<&str>) -> Status {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("approved") => Status::Approved,
            Some("rejected") => Status::Rejected,
            _ => Status::Pending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        }
    }
}

/// Profile shape exchanged with the backend and persisted in the session
/// store under the `user` key. Only the fields the engine consumes are
/// modeled; the backend sends more.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct Profile {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub mongo_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(
        rename = "rejectionReason",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub rejection_reason: Option<String>,
}

impl Profile {
    /// Subject id of the profile, `_id` first as the backend's canonical
    /// field, then `id`.
    pub fn subject_id(&self) -> Option<&str> {
        self.mongo_id.as_deref().or(self.id.as_deref())
    }

    /// Returns the profile with its role rewritten to the canonical lowercase
    /// token. Idempotent: normalizing a normalized profile is a no-op, which
    /// is what makes concurrent cache writes of the same server response
    /// converge.
    pub fn normalized(&self) -> Profile {
        let mut profile = self.clone();
        profile.role = Some(
            Role::normalize(self.role.as_deref().unwrap_or_default())
                .as_str()
                .to_string(),
        );
        profile
    }
}

/// The resolved, normalized subject of a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub subject_id: String,
    pub role: Role,
    pub status: Status,
    /// Present only when `status` is `Rejected`.
    pub rejection_reason: Option<String>,
}

impl Identity {
    /// Builds an identity from a profile, falling back to the credential's
    /// subject id when the profile carries none.
    pub fn from_profile(profile: &Profile, credential_subject: &str) -> Identity {
        let role = Role::normalize(profile.role.as_deref().unwrap_or_default());
        let status = Status::normalize(profile.status.as_deref());
        let rejection_reason = if status == Status::Rejected {
            profile.rejection_reason.clone()
        } else {
            None
        };

        Identity {
            subject_id: profile
                .subject_id()
                .unwrap_or(credential_subject)
                .to_string(),
            role,
            status,
            rejection_reason,
        }
    }

    /// Security officers and admins bypass all status-based access checks.
    pub fn is_auto_approved(&self) -> bool {
        matches!(self.role, Role::Security | Role::Admin)
    }

    /// The status access checks must act on: auto-approved roles are always
    /// `Approved`, whatever the user store says.
    pub fn effective_status(&self) -> Status {
        if self.is_auto_approved() {
            Status::Approved
        } else {
            self.status
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_normalize_known_aliases() {
        assert_eq!(Role::normalize("admin"), Role::Admin);
        assert_eq!(Role::normalize("security"), Role::Security);
        assert_eq!(Role::normalize("staff"), Role::Security);
        assert_eq!(Role::normalize("security_officer"), Role::Security);
        assert_eq!(Role::normalize("security-officer"), Role::Security);
        assert_eq!(Role::normalize("user"), Role::User);
    }

    #[test]
    fn test_role_normalize_case_insensitive() {
        assert_eq!(Role::normalize("Admin"), Role::Admin);
        assert_eq!(Role::normalize("STAFF"), Role::Security);
        assert_eq!(Role::normalize("  Security-Officer  "), Role::Security);
    }

    #[test]
    fn test_role_normalize_unknown_defaults_to_user() {
        assert_eq!(Role::normalize(""), Role::User);
        assert_eq!(Role::normalize("superuser"), Role::User);
        assert_eq!(Role::normalize("moderator"), Role::User);
    }

    #[test]
    fn test_role_normalize_idempotent() {
        for raw in ["admin", "staff", "security_officer", "user", "whatever"] {
            let once = Role::normalize(raw);
            assert_eq!(Role::normalize(once.as_str()), once);
        }
    }

    #[test]
    fn test_status_normalize_defaults_to_pending() {
        assert_eq!(Status::normalize(None), Status::Pending);
        assert_eq!(Status::normalize(Some("")), Status::Pending);
        assert_eq!(Status::normalize(Some("under-review")), Status::Pending);
    }

    #[test]
    fn test_status_normalize_case_insensitive() {
        assert_eq!(Status::normalize(Some("Approved")), Status::Approved);
        assert_eq!(Status::normalize(Some("REJECTED")), Status::Rejected);
        assert_eq!(Status::normalize(Some("pending")), Status::Pending);
    }

    #[test]
    fn test_profile_subject_id_prefers_mongo_id() {
        let profile = Profile {
            mongo_id: Some("u1".to_string()),
            id: Some("u2".to_string()),
            ..Profile::default()
        };
        assert_eq!(profile.subject_id(), Some("u1"));

        let profile = Profile {
            id: Some("u2".to_string()),
            ..Profile::default()
        };
        assert_eq!(profile.subject_id(), Some("u2"));
    }

    #[test]
    fn test_profile_normalized_rewrites_role() {
        let profile = Profile {
            mongo_id: Some("u1".to_string()),
            role: Some("Staff".to_string()),
            status: Some("approved".to_string()),
            ..Profile::default()
        };

        let normalized = profile.normalized();
        assert_eq!(normalized.role.as_deref(), Some("security"));
        assert_eq!(normalized.status.as_deref(), Some("approved"));
        assert_eq!(normalized.normalized(), normalized);
    }

    #[test]
    fn test_identity_auto_approval() {
        let admin = Identity {
            subject_id: "a1".to_string(),
            role: Role::Admin,
            status: Status::Rejected,
            rejection_reason: None,
        };
        assert!(admin.is_auto_approved());
        assert_eq!(admin.effective_status(), Status::Approved);

        let user = Identity {
            subject_id: "u1".to_string(),
            role: Role::User,
            status: Status::Pending,
            rejection_reason: None,
        };
        assert!(!user.is_auto_approved());
        assert_eq!(user.effective_status(), Status::Pending);
    }

    #[test]
    fn test_identity_from_profile_falls_back_to_credential_subject() {
        let profile = Profile {
            role: Some("user".to_string()),
            status: Some("approved".to_string()),
            ..Profile::default()
        };
        let identity = Identity::from_profile(&profile, "u42");
        assert_eq!(identity.subject_id, "u42");
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.status, Status::Approved);
    }

    #[test]
    fn test_identity_rejection_reason_only_when_rejected() {
        let profile = Profile {
            mongo_id: Some("u1".to_string()),
            role: Some("user".to_string()),
            status: Some("approved".to_string()),
            rejection_reason: Some("stale reason".to_string()),
            ..Profile::default()
        };
        let identity = Identity::from_profile(&profile, "u1");
        assert_eq!(identity.rejection_reason, None);

        let profile = Profile {
            status: Some("rejected".to_string()),
            ..profile
        };
        let identity = Identity::from_profile(&profile, "u1");
        assert_eq!(identity.rejection_reason.as_deref(), Some("stale reason"));
    }

    #[test]
    fn test_profile_deserializes_wire_shape() {
        let profile: Profile = serde_json::from_str(
            r#"{"_id":"64fa","role":"staff","status":"approved","email":"x@y.z"}"#,
        )
        .unwrap();
        assert_eq!(profile.subject_id(), Some("64fa"));
        assert_eq!(profile.role.as_deref(), Some("staff"));
    }
}
