use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Error, Result};
use crate::identity::AuthState;

/// Where to send the user agent, and the state to keep until the callback.
#[derive(Debug, Clone)]
pub struct SignInRequest {
    pub url: Url,
    pub state: AuthState,
}

/// Token response from the provider's token endpoint.
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub token_type: Option<String>,
    /// Access token lifetime in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

impl fmt::Debug for OAuthTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |token: &Option<String>| token.as_ref().map(|_| "[REDACTED]");

        f.debug_struct("OAuthTokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &redacted(&self.refresh_token))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("id_token", &redacted(&self.id_token))
            .field("scope", &self.scope)
            .finish()
    }
}

/// Userinfo payload exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawProfile {
    bytes: Vec<u8>,
}

impl RawProfile {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.bytes).map_err(Error::malformed_response)
    }

    pub fn user_info(&self) -> Result<UserInfo> {
        self.parse()
    }
}

/// Common fields of the userinfo response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CallbackOutcome {
    pub token: OAuthTokenResponse,
    pub profile: RawProfile,
}

/// Claims of a provider-issued identity token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub given_name: String,
    #[serde(default)]
    pub family_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    pub iss: String,
    pub sub: String,
    pub aud: String,
    /// Expiration timestamp (Unix seconds).
    pub exp: u64,
    #[serde(default)]
    pub iat: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nbf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}
