use url::Url;

use crate::error::{Error, Result};
use crate::identity::{
    AuthState, CallbackOutcome, IdentityProvider, OAuthTokenResponse, RawProfile, SignInRequest,
    map_reqwest_error,
};

impl IdentityProvider {
    /// Starts a redirect sign-in with a fresh [`AuthState`].
    pub fn sign_in(&self) -> SignInRequest {
        let state = AuthState::generate();
        let url = self.authorization_url(&state);

        tracing::info!("identity sign-in initiated");
        SignInRequest { url, state }
    }

    pub fn authorization_url(&self, state: &AuthState) -> Url {
        let config = &self.inner.config;
        let mut url = config.endpoints.authorization.clone();

        url.query_pairs_mut()
            .append_pair("client_id", &self.inner.credentials.client_id)
            .append_pair("redirect_uri", config.redirect_url.as_str())
            .append_pair("response_type", "code")
            .append_pair("scope", &config.requested_scopes().join(" "))
            .append_pair("state", state.as_str())
            .append_pair("access_type", "offline");

        url
    }

    /// Completes a redirect sign-in.
    ///
    /// `bound_state` is the value returned by [`Self::sign_in`] for this
    /// attempt; the caller must discard it once this succeeds.
    pub async fn callback(
        &self,
        code: &str,
        state: &str,
        bound_state: &AuthState,
    ) -> Result<CallbackOutcome> {
        if code.is_empty() {
            return Err(Error::EmptyCode);
        }
        if state.is_empty() {
            return Err(Error::EmptyState);
        }
        if !bound_state.matches(state) {
            tracing::warn!("identity callback rejected: state mismatch");
            return Err(Error::StateMismatch);
        }

        let token = self.exchange_code(code).await?;
        let profile = self.fetch_profile(&token.access_token).await?;

        tracing::info!("identity callback completed");
        Ok(CallbackOutcome { token, profile })
    }

    async fn exchange_code(&self, code: &str) -> Result<OAuthTokenResponse> {
        let config = &self.inner.config;
        let credentials = &self.inner.credentials;

        self.inner
            .http_client
            .post(config.endpoints.token.clone())
            .timeout(config.request_timeout)
            .form(&[
                ("code", code),
                ("client_id", credentials.client_id.as_str()),
                ("client_secret", credentials.client_secret.as_str()),
                ("redirect_uri", config.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!("authorization code exchange failed: {e}");
                Error::network(e)
            })?
            .json()
            .await
            .map_err(map_reqwest_error)
    }

    async fn fetch_profile(&self, access_token: &str) -> Result<RawProfile> {
        let config = &self.inner.config;

        let bytes = self
            .inner
            .http_client
            .get(config.endpoints.userinfo.clone())
            .timeout(config.request_timeout)
            .bearer_auth(access_token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                tracing::warn!("userinfo request failed: {e}");
                Error::network(e)
            })?
            .bytes()
            .await
            .map_err(Error::network)?;

        Ok(RawProfile::new(bytes.to_vec()))
    }
}
