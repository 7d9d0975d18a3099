use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Claims carried by a session token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    /// Authorization scopes, order preserved.
    #[serde(default)]
    pub scope: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Issued-at timestamp (Unix seconds).
    #[serde(default)]
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    /// Absent for tokens minted with [`Expiry::Never`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
    /// Unique token ID, useful for revocation lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

impl Claims {
    pub fn new(user_id: i64, username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            email: email.into(),
            ..Default::default()
        }
    }

    pub fn with_scope<I, S>(mut self, scope: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scope = scope.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_random_token_id(mut self) -> Self {
        self.jti = Some(Uuid::new_v4().to_string());
        self
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scope.iter().any(|s| s == scope)
    }
}

/// Token lifetime requested at issuance.
///
/// There is no zero sentinel: an unbounded token has to be asked for with
/// [`Expiry::Never`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    Never,
    After(#[serde(with = "humantime_serde")] Duration),
}

impl Expiry {
    /// Maps the legacy seconds-based call shape, where `0` meant "never".
    pub fn from_ttl_secs(secs: u64) -> Self {
        match secs {
            0 => Self::Never,
            secs => Self::After(Duration::from_secs(secs)),
        }
    }

    pub(crate) fn expires_at(&self, now: u64) -> Result<Option<u64>> {
        match self {
            Self::Never => Ok(None),
            Self::After(ttl) if ttl.as_secs() == 0 => Err(Error::InvalidExpiry),
            Self::After(ttl) => Ok(Some(now.saturating_add(ttl.as_secs()))),
        }
    }
}

impl Default for Expiry {
    fn default() -> Self {
        Self::After(Duration::from_secs(86400))
    }
}

/// A freshly minted token and the exact claims it carries.
#[derive(Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

impl fmt::Debug for IssuedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedToken")
            .field("token", &"[REDACTED]")
            .field("claims", &self.claims)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    Valid,
    Expired,
    NotYetValid,
}

/// Claims of a correctly signed token together with their time validity.
#[derive(Debug, Clone)]
pub struct TokenDetails {
    pub claims: Claims,
    pub status: TokenStatus,
}

impl TokenDetails {
    pub fn is_valid(&self) -> bool {
        self.status == TokenStatus::Valid
    }
}
