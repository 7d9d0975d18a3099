use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignedLinkConfig {
    /// Link lifetime used by `SignedLinkService::check`.
    ///
    /// Default: `60`
    pub expires_in_minutes: u64,
}

impl Default for SignedLinkConfig {
    fn default() -> Self {
        Self {
            expires_in_minutes: 60,
        }
    }
}
