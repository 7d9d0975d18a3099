use std::path::Path;

use anyhow::{Context, Result};
use gatekit_credentials::Secret;
use gatekit_credentials::claims_token::ClaimsTokenConfig;
use gatekit_credentials::identity::{ClientCredentials, IdentityConfig};
use gatekit_credentials::signed_link::SignedLinkConfig;
use serde::{Deserialize, Serialize};

use crate::utils;
use crate::utils::logger::LoggerConfig;

pub const TOKEN_SECRET_ENV: &str = "GATEKIT_TOKEN_SECRET";
pub const LINK_SECRET_ENV: &str = "GATEKIT_LINK_SECRET";
pub const CLIENT_ID_ENV: &str = "GATEKIT_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "GATEKIT_CLIENT_SECRET";
pub const ADDITIONAL_SCOPES_ENV: &str = "GATEKIT_SCOPES_ADDITIONAL";

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub claims_token: ClaimsTokenConfig,

    pub signed_link: SignedLinkConfig,

    pub identity: IdentityConfig,

    pub logger: LoggerConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config: AppConfig = match path {
            Some(path) => {
                utils::serde::load_json_from_file(path).context("failed to load gatekit config")?
            }
            None => AppConfig::default(),
        };

        if let Ok(scopes) = std::env::var(ADDITIONAL_SCOPES_ENV) {
            config.identity.additional_scopes.extend(split_scopes(&scopes));
        }

        Ok(config)
    }
}

/// Parses a `|`-separated scope list.
pub fn split_scopes(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split('|')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

pub fn token_secret() -> Result<Secret> {
    Secret::from_env(TOKEN_SECRET_ENV).with_context(|| format!("{TOKEN_SECRET_ENV} not set"))
}

pub fn link_secret() -> Result<Secret> {
    Secret::from_env(LINK_SECRET_ENV).with_context(|| format!("{LINK_SECRET_ENV} not set"))
}

/// Client registration from the environment.
///
/// The client secret is only needed for the code exchange.
pub fn client_credentials(require_secret: bool) -> Result<ClientCredentials> {
    let client_id =
        std::env::var(CLIENT_ID_ENV).with_context(|| format!("{CLIENT_ID_ENV} not set"))?;

    let client_secret = match std::env::var(CLIENT_SECRET_ENV) {
        Ok(secret) => secret,
        Err(_) if !require_secret => String::new(),
        Err(_) => anyhow::bail!("{CLIENT_SECRET_ENV} not set"),
    };

    Ok(ClientCredentials::new(client_id, client_secret))
}
