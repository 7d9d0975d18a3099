//! Federated sign-in against an external identity provider.
//!
//! Two independent paths share one [`IdentityProvider`]:
//!
//! - the redirect flow, [`IdentityProvider::sign_in`] followed by
//!   [`IdentityProvider::callback`], which exchanges an authorization code
//!   and returns the raw userinfo profile;
//! - the assertion flow, [`IdentityProvider::validate_assertion`], which
//!   checks a provider-issued identity token against the provider's
//!   published signing keys.
//!
//! Every provider request honours `request_timeout`, and dropping the
//! returned future cancels it. Nothing is retried.

use std::sync::Arc;

use reqwest::Client as HttpClient;

pub use self::config::{ClientCredentials, IdentityConfig, KeyCacheConfig, ProviderEndpoints};
pub use self::models::{
    CallbackOutcome, IdentityClaims, OAuthTokenResponse, RawProfile, SignInRequest, UserInfo,
};
pub use self::state::AuthState;
use self::keys::RemoteKeys;
use crate::error::Error;
use crate::utils::time::{Clock, system_clock};

mod assertion;
mod config;
mod keys;
mod models;
mod oauth;
mod state;

pub struct IdentityProviderBuilder<MandatoryFields = (HttpClient, ClientCredentials)> {
    config: IdentityConfig,
    clock: Arc<dyn Clock>,
    mandatory_fields: MandatoryFields,
}

impl IdentityProviderBuilder {
    pub fn build(self) -> IdentityProvider {
        let (http_client, credentials) = self.mandatory_fields;
        let config = self.config;

        let keys = RemoteKeys::new(
            http_client.clone(),
            config.endpoints.jwks.clone(),
            config.request_timeout,
            &config.key_cache,
        );

        IdentityProvider {
            inner: Arc::new(Inner {
                config,
                credentials,
                http_client,
                clock: self.clock,
                keys,
            }),
        }
    }
}

impl<T2> IdentityProviderBuilder<((), T2)> {
    pub fn with_http_client(
        self,
        http_client: HttpClient,
    ) -> IdentityProviderBuilder<(HttpClient, T2)> {
        let (_, credentials) = self.mandatory_fields;

        IdentityProviderBuilder {
            config: self.config,
            clock: self.clock,
            mandatory_fields: (http_client, credentials),
        }
    }
}

impl<T1> IdentityProviderBuilder<(T1, ())> {
    pub fn with_credentials(
        self,
        credentials: ClientCredentials,
    ) -> IdentityProviderBuilder<(T1, ClientCredentials)> {
        let (http_client, _) = self.mandatory_fields;

        IdentityProviderBuilder {
            config: self.config,
            clock: self.clock,
            mandatory_fields: (http_client, credentials),
        }
    }
}

impl<T1, T2> IdentityProviderBuilder<(T1, T2)> {
    pub fn with_config(self, config: IdentityConfig) -> IdentityProviderBuilder<(T1, T2)> {
        IdentityProviderBuilder { config, ..self }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> IdentityProviderBuilder<(T1, T2)> {
        IdentityProviderBuilder { clock, ..self }
    }
}

#[derive(Clone)]
#[repr(transparent)]
pub struct IdentityProvider {
    inner: Arc<Inner>,
}

impl IdentityProvider {
    pub fn builder() -> IdentityProviderBuilder<((), ())> {
        IdentityProviderBuilder {
            config: IdentityConfig::default(),
            clock: system_clock(),
            mandatory_fields: ((), ()),
        }
    }

    pub fn config(&self) -> &IdentityConfig {
        &self.inner.config
    }

    pub fn client_id(&self) -> &str {
        &self.inner.credentials.client_id
    }
}

struct Inner {
    config: IdentityConfig,
    credentials: ClientCredentials,
    http_client: HttpClient,
    clock: Arc<dyn Clock>,
    keys: RemoteKeys,
}

/// Body decoding failures are the provider's fault, everything else is transport.
pub(crate) fn map_reqwest_error(e: reqwest::Error) -> Error {
    if e.is_decode() {
        Error::malformed_response(e)
    } else {
        Error::network(e)
    }
}
