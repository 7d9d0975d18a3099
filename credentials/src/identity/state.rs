use std::fmt;

use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Anti-replay value bound to one outbound sign-in attempt.
///
/// The caller stores it between [`sign_in`] and [`callback`] and must drop it
/// after a successful callback. Comparison runs in constant time.
///
/// [`sign_in`]: crate::identity::IdentityProvider::sign_in
/// [`callback`]: crate::identity::IdentityProvider::callback
#[derive(Clone, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthState(String);

impl AuthState {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn matches(&self, candidate: &str) -> bool {
        self.0.as_bytes().ct_eq(candidate.as_bytes()).into()
    }
}

impl PartialEq for AuthState {
    fn eq(&self, other: &Self) -> bool {
        self.matches(&other.0)
    }
}

impl From<String> for AuthState {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AuthState {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl fmt::Debug for AuthState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthState(..)")
    }
}
