use std::fmt;

use serde::Deserialize;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Wrapper for the raw bearer token (and anything else credential-shaped)
/// that is zeroed from memory when dropped.
///
/// Both `Debug` and `Display` print `[REDACTED]`, so the token cannot leak
/// through tracing fields or error messages no matter how it is formatted.
/// Deserialization is transparent, so a `Secret<String>` reads straight from
/// a plain TOML/JSON string.
#[derive(Clone, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct Secret<T: Zeroize>(T);

impl<T: Zeroize> Secret<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl Secret<String> {
    /// Length of the wrapped token. Safe to log; a JWT's length is not
    /// sensitive and helps tell an empty or truncated token apart from a
    /// plausible one.
    pub fn len_hint(&self) -> usize {
        self.0.len()
    }
}

impl<T: Zeroize> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Zeroize> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T: Zeroize + Default> Default for Secret<T> {
    fn default() -> Self {
        Self(T::default())
    }
}

impl From<String> for Secret<String> {
    fn from(value: String) -> Self {
        Self(value)
    }
}
