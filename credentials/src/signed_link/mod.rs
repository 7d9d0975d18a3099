//! Expiring signed action links.
//!
//! The signer appends a `hash` query parameter anchor to the URL, then signs
//! the whole string together with the current time. The result is itself a
//! usable link whose `hash` value carries the timestamp and the MAC.

use std::sync::Arc;

pub use self::config::SignedLinkConfig;
use crate::error::{Error, Result};
use crate::secret::Secret;
use crate::utils::time::{Clock, system_clock};

pub mod codec;

mod config;

/// Minimum secret length for the link signer (HMAC-SHA256 block strength).
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Clone)]
pub struct SignedLinkService {
    secret: Arc<Secret>,
    config: SignedLinkConfig,
    clock: Arc<dyn Clock>,
}

impl SignedLinkService {
    pub fn new(secret: Secret) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::WeakSecret {
                min: MIN_SECRET_LEN,
            });
        }

        Ok(Self {
            secret: Arc::new(secret),
            config: SignedLinkConfig::default(),
            clock: system_clock(),
        })
    }

    pub fn with_config(self, config: SignedLinkConfig) -> Self {
        Self { config, ..self }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> Self {
        Self { clock, ..self }
    }

    pub fn config(&self) -> &SignedLinkConfig {
        &self.config
    }

    /// Signs `url` and returns the full link.
    pub fn generate_token_from_string(&self, url: &str) -> String {
        let anchor = if url.contains('?') { "&hash=" } else { "?hash=" };
        let url_to_sign = format!("{url}{anchor}");

        codec::sign(self.secret.expose(), &url_to_sign, self.clock.now_sec())
    }

    /// Checks the signature only. Age is checked by [`Self::expired`].
    pub fn verify_token(&self, token: &str) -> bool {
        codec::verify(self.secret.expose(), token).is_some()
    }

    /// Whether the link is older than `minutes_until_expired`.
    ///
    /// Reads the timestamp without checking the signature, so the answer only
    /// means something for a token that already passed [`Self::verify_token`].
    /// Use [`Self::check`] to do both. Tokens without a readable timestamp
    /// count as expired.
    pub fn expired(&self, token: &str, minutes_until_expired: u64) -> bool {
        let Some(issued_at) = codec::extract_timestamp(token) else {
            tracing::debug!("signed link has no readable timestamp");
            return true;
        };

        let age = self.clock.now_sec().saturating_sub(issued_at);
        age > minutes_until_expired.saturating_mul(60)
    }

    /// Verifies the signature and the configured lifetime.
    ///
    /// Returns the signed URL, including its trailing `hash=` anchor.
    pub fn check(&self, token: &str) -> Result<String> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }

        let url = codec::verify(self.secret.expose(), token).ok_or(Error::SignatureInvalid)?;
        if self.expired(token, self.config.expires_in_minutes) {
            return Err(Error::Expired);
        }
        Ok(url.to_owned())
    }
}
