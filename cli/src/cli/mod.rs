use std::path::PathBuf;
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use gatekit_credentials::claims_token::{Claims, ClaimsTokenService, Expiry, TokenStatus};
use gatekit_credentials::identity::{AuthState, IdentityProvider};
use gatekit_credentials::signed_link::SignedLinkService;
use serde::Serialize;

use crate::config::{self, AppConfig};
use crate::utils;

#[derive(Parser)]
#[clap(name = "gatekit")]
#[clap(version = version_string())]
#[clap(subcommand_required = true, arg_required_else_help = true)]
pub struct App {
    /// Path to the JSON config.
    #[clap(short, long, global = true)]
    config: Option<PathBuf>,

    #[clap(subcommand)]
    cmd: Cmd,
}

impl App {
    pub fn run(self) -> Result<()> {
        let config = AppConfig::load(self.config.as_deref())?;

        utils::logger::init_logger(&config.logger)?;
        utils::logger::set_abort_with_tracing();

        self.cmd.run(config)
    }
}

#[derive(Subcommand)]
enum Cmd {
    /// Session tokens.
    #[clap(subcommand)]
    Token(CmdToken),

    /// Signed links.
    #[clap(subcommand)]
    Link(CmdLink),

    /// Redirect sign-in against the identity provider.
    #[clap(subcommand)]
    Signin(CmdSignin),

    /// Provider-issued identity tokens.
    #[clap(subcommand)]
    Assertion(CmdAssertion),
}

impl Cmd {
    fn run(self, config: AppConfig) -> Result<()> {
        match self {
            Cmd::Token(cmd) => cmd.run(config),
            Cmd::Link(cmd) => cmd.run(config),
            Cmd::Signin(cmd) => cmd.run(config),
            Cmd::Assertion(cmd) => cmd.run(config),
        }
    }
}

// === Token ===

#[derive(Subcommand)]
enum CmdToken {
    /// Issue a session token.
    Issue(CmdTokenIssue),
    /// Verify a session token and print its claims.
    Verify(CmdTokenVerify),
}

impl CmdToken {
    fn run(self, config: AppConfig) -> Result<()> {
        let service = ClaimsTokenService::builder()
            .with_secret(config::token_secret()?)
            .with_config(config.claims_token)
            .build()?;

        match self {
            Self::Issue(cmd) => cmd.run(&service),
            Self::Verify(cmd) => cmd.run(&service),
        }
    }
}

#[derive(Args)]
struct CmdTokenIssue {
    #[clap(long)]
    user_id: i64,

    #[clap(long)]
    username: String,

    #[clap(long)]
    email: String,

    /// Granted scope. Can be repeated.
    #[clap(long = "scope")]
    scopes: Vec<String>,

    /// Token lifetime, e.g. `15m` or `2h`. Uses the configured default if omitted.
    #[clap(long, value_parser = humantime_serde::re::humantime::parse_duration, conflicts_with = "never_expires")]
    ttl: Option<Duration>,

    /// Issue a token without an expiration time.
    #[clap(long)]
    never_expires: bool,

    /// Attach a random token id.
    #[clap(long)]
    with_id: bool,
}

impl CmdTokenIssue {
    fn run(self, service: &ClaimsTokenService) -> Result<()> {
        let mut claims = Claims::new(self.user_id, self.username, self.email).with_scope(self.scopes);
        if self.with_id {
            claims = claims.with_random_token_id();
        }

        let expiry = match (self.never_expires, self.ttl) {
            (true, _) => Expiry::Never,
            (false, Some(ttl)) => Expiry::After(ttl),
            (false, None) => service.config().default_expiry,
        };

        let issued = service.issue(claims, expiry)?;
        print_json(&serde_json::json!({
            "token": issued.token,
            "claims": issued.claims,
        }))
    }
}

#[derive(Args)]
struct CmdTokenVerify {
    token: String,
}

impl CmdTokenVerify {
    fn run(self, service: &ClaimsTokenService) -> Result<()> {
        let details = service.inspect(&self.token)?;
        let status = match details.status {
            TokenStatus::Valid => "valid",
            TokenStatus::Expired => "expired",
            TokenStatus::NotYetValid => "not_yet_valid",
        };
        print_json(&serde_json::json!({
            "status": status,
            "claims": details.claims,
        }))?;

        service.verify(&self.token)?;
        Ok(())
    }
}

// === Link ===

#[derive(Subcommand)]
enum CmdLink {
    /// Sign a URL.
    Sign(CmdLinkSign),
    /// Check a signed link and print the URL it carries.
    Verify(CmdLinkVerify),
}

impl CmdLink {
    fn run(self, mut config: AppConfig) -> Result<()> {
        if let Self::Verify(CmdLinkVerify {
            minutes: Some(minutes),
            ..
        }) = &self
        {
            config.signed_link.expires_in_minutes = *minutes;
        }

        let service =
            SignedLinkService::new(config::link_secret()?)?.with_config(config.signed_link);

        match self {
            Self::Sign(cmd) => {
                println!("{}", service.generate_token_from_string(&cmd.url));
                Ok(())
            }
            Self::Verify(cmd) => {
                println!("{}", service.check(&cmd.token)?);
                Ok(())
            }
        }
    }
}

#[derive(Args)]
struct CmdLinkSign {
    url: String,
}

#[derive(Args)]
struct CmdLinkVerify {
    token: String,

    /// Override the configured link lifetime.
    #[clap(long)]
    minutes: Option<u64>,
}

// === Sign-in ===

#[derive(Subcommand)]
enum CmdSignin {
    /// Print an authorization URL and the state bound to it.
    Url,
    /// Exchange an authorization code and print the user profile.
    Callback(CmdSigninCallback),
}

impl CmdSignin {
    fn run(self, config: AppConfig) -> Result<()> {
        match self {
            Self::Url => {
                let provider = identity_provider(config, false)?;
                let request = provider.sign_in();
                print_json(&serde_json::json!({
                    "url": request.url.as_str(),
                    "state": request.state.as_str(),
                }))
            }
            Self::Callback(cmd) => {
                let provider = identity_provider(config, true)?;
                block_on(cmd.run(provider))
            }
        }
    }
}

#[derive(Args)]
struct CmdSigninCallback {
    /// Authorization code from the callback query.
    #[clap(long)]
    code: String,

    /// State from the callback query.
    #[clap(long)]
    state: String,

    /// State printed by `signin url` for this attempt.
    #[clap(long)]
    expected_state: String,
}

impl CmdSigninCallback {
    async fn run(self, provider: IdentityProvider) -> Result<()> {
        let bound = AuthState::from(self.expected_state);
        let outcome = provider.callback(&self.code, &self.state, &bound).await?;

        let profile: serde_json::Value = outcome
            .profile
            .parse()
            .context("userinfo response is not JSON")?;
        print_json(&profile)
    }
}

// === Assertion ===

#[derive(Subcommand)]
enum CmdAssertion {
    /// Validate an identity token and print its claims.
    Validate(CmdAssertionValidate),
}

impl CmdAssertion {
    fn run(self, config: AppConfig) -> Result<()> {
        match self {
            Self::Validate(cmd) => {
                let provider = identity_provider(config, false)?;
                block_on(cmd.run(provider))
            }
        }
    }
}

#[derive(Args)]
struct CmdAssertionValidate {
    token: String,

    /// Expected audience. Defaults to the configured client id.
    #[clap(long)]
    audience: Option<String>,
}

impl CmdAssertionValidate {
    async fn run(self, provider: IdentityProvider) -> Result<()> {
        let audience = self.audience.as_deref().unwrap_or(provider.client_id());
        let claims = provider.validate_assertion(&self.token, audience).await?;
        print_json(&claims)
    }
}

// === Helpers ===

fn identity_provider(config: AppConfig, require_secret: bool) -> Result<IdentityProvider> {
    let http_client = reqwest::Client::builder()
        .build()
        .context("failed to build http client")?;

    Ok(IdentityProvider::builder()
        .with_http_client(http_client)
        .with_credentials(config::client_credentials(require_secret)?)
        .with_config(config.identity)
        .build())
}

fn block_on<F>(f: F) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(f)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let output = serde_json::to_string_pretty(value)?;
    println!("{output}");
    Ok(())
}

fn version_string() -> &'static str {
    static STRING: OnceLock<String> = OnceLock::new();
    STRING.get_or_init(|| format!("(release {GATEKIT_VERSION}) (rustc {RUSTC_VERSION})"))
}

static GATEKIT_VERSION: &str = env!("GATEKIT_VERSION");
static RUSTC_VERSION: &str = env!("GATEKIT_RUSTC_VERSION");
