use std::fmt;

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

#[derive(Debug, PartialEq)]
pub enum Error {
    /// Token is structurally invalid or carries no usable subject claim.
    Decode(String),
    /// Token is well-formed but past its expiry.
    Expired,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Decode(err) => write!(f, "Invalid credential: {err}"),
            Error::Expired => write!(f, "Credential expired"),
        }
    }
}

/// Claims as issued by the backend. The subject id has moved between claim
/// names across backend revisions, so all four spellings are accepted.
#[derive(Debug, Deserialize)]
struct TokenClaims {
    exp: i64,
    #[serde(rename = "userId", default)]
    user_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(rename = "_id", default)]
    mongo_id: Option<String>,
    #[serde(default)]
    sub: Option<String>,
}

impl TokenClaims {
    fn subject_id(self) -> Option<String> {
        self.user_id.or(self.id).or(self.mongo_id).or(self.sub)
    }
}

/// A decoded, not-yet-expired bearer credential.
///
/// The engine runs on the client side and holds no verification key, so the
/// token signature is deliberately not checked here; the backend remains the
/// authority and re-verifies on every request. Expiry is validated by the
/// engine itself so that an expired token and a malformed one surface as
/// distinct failures.
#[derive(Clone, Debug, PartialEq)]
pub struct Credential {
    pub subject_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Credential {
    pub fn decode(token: &str, now: DateTime<Utc>) -> Result<Credential, Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation)
            .map_err(|e| Error::Decode(e.to_string()))?;

        let exp = data.claims.exp;
        let expires_at = DateTime::from_timestamp(exp, 0)
            .ok_or_else(|| Error::Decode(format!("exp claim out of range: {exp}")))?;

        let subject_id = data
            .claims
            .subject_id()
            .ok_or_else(|| Error::Decode("no subject id claim in token".to_string()))?;

        if expires_at <= now {
            return Err(Error::Expired);
        }

        Ok(Credential {
            subject_id,
            expires_at,
        })
    }
}
