use serde::{Deserialize, Serialize};

use crate::claims_token::Expiry;

#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimsTokenConfig {
    /// Stamped into `iss` on issuance and required on verification.
    ///
    /// Default: none, no issuer check.
    pub issuer: Option<String>,

    /// Lifetime used by `issue_default`.
    ///
    /// Default: 24 hours.
    pub default_expiry: Expiry,
}
