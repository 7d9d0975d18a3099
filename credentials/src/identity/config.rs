use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;
use zeroize::{Zeroize, ZeroizeOnDrop};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub endpoints: ProviderEndpoints,

    /// Where the provider sends the user back after sign-in.
    ///
    /// Default: `http://localhost:3000/oauth2/callback`
    pub redirect_url: Url,

    /// Scopes requested on every sign-in.
    pub scopes: Vec<String>,

    /// Extra scopes appended after [`IdentityConfig::scopes`].
    pub additional_scopes: Vec<String>,

    /// Canonical `iss` values accepted on identity tokens.
    pub accepted_issuers: Vec<String>,

    /// Upper bound for every request made to the provider.
    ///
    /// Default: `10s`
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,

    pub key_cache: KeyCacheConfig,
}

impl IdentityConfig {
    /// Base scopes followed by the additional ones, without duplicates.
    pub fn requested_scopes(&self) -> Vec<&str> {
        let mut scopes = Vec::with_capacity(self.scopes.len() + self.additional_scopes.len());
        for scope in self.scopes.iter().chain(&self.additional_scopes) {
            if !scope.is_empty() && !scopes.contains(&scope.as_str()) {
                scopes.push(scope.as_str());
            }
        }
        scopes
    }
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            endpoints: ProviderEndpoints::default(),
            redirect_url: default_url("http://localhost:3000/oauth2/callback"),
            scopes: vec![
                "https://www.googleapis.com/auth/userinfo.email".to_owned(),
                "https://www.googleapis.com/auth/userinfo.profile".to_owned(),
            ],
            additional_scopes: Vec::new(),
            accepted_issuers: vec![
                "accounts.google.com".to_owned(),
                "https://accounts.google.com".to_owned(),
            ],
            request_timeout: Duration::from_secs(10),
            key_cache: KeyCacheConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub authorization: Url,
    pub token: Url,
    pub userinfo: Url,
    /// JSON Web Key Set with the provider's signing keys.
    pub jwks: Url,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            authorization: default_url("https://accounts.google.com/o/oauth2/v2/auth"),
            token: default_url("https://oauth2.googleapis.com/token"),
            userinfo: default_url("https://www.googleapis.com/oauth2/v3/userinfo"),
            jwks: default_url("https://www.googleapis.com/oauth2/v3/certs"),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyCacheConfig {
    /// How long a fetched key set is trusted before it is fetched again.
    ///
    /// Default: `1h`
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,

    /// Minimum age of the cached set before an unknown key id may force a
    /// refetch.
    ///
    /// Default: `1m`
    #[serde(with = "humantime_serde")]
    pub min_refresh_interval: Duration,
}

impl Default for KeyCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(3600),
            min_refresh_interval: Duration::from_secs(60),
        }
    }
}

/// OAuth client registration. Kept out of config files.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ClientCredentials {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }
}

impl fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

fn default_url(url: &str) -> Url {
    Url::parse(url).expect("shouldn't happen")
}
