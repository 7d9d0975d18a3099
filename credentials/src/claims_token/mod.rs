//! HS256 session tokens carrying an application claim set.
//!
//! Tokens use the compact JWT layout `header.payload.signature`. Signature
//! problems and expiry are reported as distinct errors, so a caller can tell
//! a tampered token from a stale one.

use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

pub use self::config::ClaimsTokenConfig;
pub use self::models::{Claims, Expiry, IssuedToken, TokenDetails, TokenStatus};
use crate::error::{Error, Result};
use crate::secret::Secret;
use crate::utils::time::{Clock, system_clock};

mod config;
mod models;

/// Issues a token with the system clock and default config.
pub fn issue(secret: &[u8], claims: Claims, expiry: Expiry) -> Result<IssuedToken> {
    ClaimsTokenService::new(Secret::from(secret))?.issue(claims, expiry)
}

/// Verifies a token with the system clock and default config.
pub fn verify(secret: &[u8], token: &str) -> Result<Claims> {
    ClaimsTokenService::new(Secret::from(secret))?.verify(token)
}

pub struct ClaimsTokenServiceBuilder<MandatoryFields = Secret> {
    config: ClaimsTokenConfig,
    clock: Arc<dyn Clock>,
    mandatory_fields: MandatoryFields,
}

impl ClaimsTokenServiceBuilder {
    pub fn build(self) -> Result<ClaimsTokenService> {
        let secret = self.mandatory_fields;
        if secret.is_empty() {
            return Err(Error::EmptySecret);
        }

        Ok(ClaimsTokenService {
            inner: Arc::new(Inner {
                config: self.config,
                secret,
                clock: self.clock,
            }),
        })
    }
}

impl ClaimsTokenServiceBuilder<()> {
    pub fn with_secret(self, secret: Secret) -> ClaimsTokenServiceBuilder<Secret> {
        ClaimsTokenServiceBuilder {
            config: self.config,
            clock: self.clock,
            mandatory_fields: secret,
        }
    }
}

impl<T> ClaimsTokenServiceBuilder<T> {
    pub fn with_config(self, config: ClaimsTokenConfig) -> ClaimsTokenServiceBuilder<T> {
        ClaimsTokenServiceBuilder { config, ..self }
    }

    pub fn with_clock(self, clock: Arc<dyn Clock>) -> ClaimsTokenServiceBuilder<T> {
        ClaimsTokenServiceBuilder { clock, ..self }
    }
}

#[derive(Clone)]
#[repr(transparent)]
pub struct ClaimsTokenService {
    inner: Arc<Inner>,
}

impl ClaimsTokenService {
    pub fn builder() -> ClaimsTokenServiceBuilder<()> {
        ClaimsTokenServiceBuilder {
            config: ClaimsTokenConfig::default(),
            clock: system_clock(),
            mandatory_fields: (),
        }
    }

    pub fn new(secret: Secret) -> Result<Self> {
        Self::builder().with_secret(secret).build()
    }

    pub fn config(&self) -> &ClaimsTokenConfig {
        &self.inner.config
    }

    /// Signs `claims` and sets `exp`.
    ///
    /// `iat` and `iss` are filled in only when unset; every other field is
    /// signed exactly as given.
    pub fn issue(&self, mut claims: Claims, expiry: Expiry) -> Result<IssuedToken> {
        let now = self.inner.clock.now_sec();

        claims.exp = expiry.expires_at(now)?;
        if claims.iat == 0 {
            claims.iat = now;
        }
        if claims.iss.is_none() {
            claims.iss = self.inner.config.issuer.clone();
        }

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.inner.secret.expose()),
        )
        .map_err(|e| Error::MalformedToken(e.to_string()))?;

        tracing::debug!(user_id = claims.user_id, exp = ?claims.exp, "issued claims token");
        Ok(IssuedToken { token, claims })
    }

    pub fn issue_default(&self, claims: Claims) -> Result<IssuedToken> {
        self.issue(claims, self.inner.config.default_expiry)
    }

    /// Checks the signature and reports time validity without enforcing it.
    pub fn inspect(&self, token: &str) -> Result<TokenDetails> {
        if token.is_empty() {
            return Err(Error::EmptyToken);
        }

        let claims = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.inner.secret.expose()),
            &validation(),
        )
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::debug!(kind = ?e.kind(), "rejected claims token");
            Error::SignatureInvalid
        })?;

        let now = self.inner.clock.now_sec();
        let status = if claims.nbf.is_some_and(|nbf| now < nbf) {
            TokenStatus::NotYetValid
        } else if claims.exp.is_some_and(|exp| now >= exp) {
            TokenStatus::Expired
        } else {
            TokenStatus::Valid
        };

        Ok(TokenDetails { claims, status })
    }

    /// Returns the claims of a correctly signed, currently valid token.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let details = self.inspect(token)?;

        if let Some(issuer) = &self.inner.config.issuer
            && details.claims.iss.as_ref() != Some(issuer)
        {
            return Err(Error::IssuerInvalid);
        }

        match details.status {
            TokenStatus::Valid => Ok(details.claims),
            TokenStatus::Expired => Err(Error::Expired),
            TokenStatus::NotYetValid => Err(Error::NotYetValid),
        }
    }
}

struct Inner {
    config: ClaimsTokenConfig,
    secret: Secret,
    clock: Arc<dyn Clock>,
}

// Time claims are checked against the injected clock, not by the decoder.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.validate_aud = false;
    validation.set_required_spec_claims::<&str>(&[]);
    validation
}
