// Local stand-in for an identity provider: token, userinfo and key endpoints
// served by axum on an ephemeral port, with per-endpoint hit counters.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use axum::Json;
use axum::Router;
use axum::extract::{Form, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use gatekit_credentials::identity::{ClientCredentials, IdentityConfig, IdentityProvider};
use gatekit_credentials::ManualClock;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde_json::{Value, json};
use url::Url;

pub const NOW: u64 = 1_700_000_000;
pub const CLIENT_ID: &str = "client-123.apps.example.com";
pub const CLIENT_SECRET: &str = "client-secret";
pub const GOOD_CODE: &str = "good-code";
pub const ACCESS_TOKEN: &str = "access-123";

pub const SLOW_RESPONSE_DELAY: Duration = Duration::from_secs(3);

pub const PROVIDER_KID: &str = "provider-key";
pub const SECONDARY_KID: &str = "secondary-key";

pub const PROVIDER_KEY_PEM: &[u8] = include_bytes!("../fixtures/provider_key.pem");
pub const ROGUE_KEY_PEM: &[u8] = include_bytes!("../fixtures/rogue_key.pem");

const PROVIDER_KEY_N: &str = "n4p-m1K8gOxHw7gaizjF3_4BL2MikU6cmKwh9tIL1mxL_CwVAOb-E9881ek6ztp2YWHfv15601UgTdUMro3Jzmlg9tiSpoSvoxQRpjmiKNYb6hoPJRhrXUmYay9CCTNv2Q6swIUbVf4mWvibmUWKChUtwMletfetCh_1HY0OuBrElIJ0fIjAavI728qp153sTEnbMV5xJRhYzqlgKdO_fMgTaUgLIb7qeVQnrlzfO_8_k6qu5cacKnTggiZpKzQavhx6M0dD6A7yU5UY42JCNjUHEB1qT-31vs1jUY9BZODiVIchRLCas1nQuzNSQCB6KJNTRDPrYwDXHAuwvVxsHQ";
// Public half of the rogue key, published under the secondary key id.
const SECONDARY_KEY_N: &str = "xDZZoKUQwj2i6OfzdQq5uJH4h2vxAiX3nE_BN-Geq5Qt20tMngYQ3RXFVnBd_eZEyOHgaQ5XbTCjiGu-KbBzZOFjF7waBQh3W2r3OZhix1C_V2kjyltpGkaLj5qBznpX0NBbkHt3y6l8J9z4AB5wecznK58P1182NwV3dsBG6wJdJs9YhLvDp3koMySyRJ3GHsqygaDSHJmULSxlj64av3ZZXr76ajw8rLtxrtI9-sCB1BVm7UoHeHKa3BiDJrIHpJyyArhKXIi8NRnr5ZcUM245ir0xKMrkBrWgv_1W0SW0YOs-TSkRIKXHG6dZadjuGaqnJeh8PAcOos94tJHgkw";

#[derive(Clone, Default)]
struct Hits {
    token: Arc<AtomicUsize>,
    userinfo: Arc<AtomicUsize>,
    jwks: Arc<AtomicUsize>,
}

pub struct MockProvider {
    pub base: Url,
    hits: Hits,
}

impl MockProvider {
    pub async fn start() -> Self {
        let hits = Hits::default();

        let router = Router::new()
            .route("/token", post(token))
            .route("/userinfo", get(userinfo))
            .route("/certs", get(certs))
            .route("/garbage", get(garbage).post(garbage))
            .route("/unavailable", get(unavailable).post(unavailable))
            .route("/slow", get(slow).post(slow))
            .with_state(hits.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Self {
            base: Url::parse(&format!("http://{addr}/")).unwrap(),
            hits,
        }
    }

    pub fn url(&self, path: &str) -> Url {
        self.base.join(path).unwrap()
    }

    pub fn config(&self) -> IdentityConfig {
        let mut config = IdentityConfig::default();
        config.endpoints.authorization = self.url("authorize");
        config.endpoints.token = self.url("token");
        config.endpoints.userinfo = self.url("userinfo");
        config.endpoints.jwks = self.url("certs");
        config.request_timeout = Duration::from_secs(5);
        config
    }

    pub fn identity_provider(&self, config: IdentityConfig) -> IdentityProvider {
        IdentityProvider::builder()
            .with_config(config)
            .with_http_client(reqwest::Client::new())
            .with_credentials(ClientCredentials::new(CLIENT_ID, CLIENT_SECRET))
            .with_clock(Arc::new(ManualClock::new(NOW)))
            .build()
    }

    pub fn token_hits(&self) -> usize {
        self.hits.token.load(Ordering::SeqCst)
    }

    pub fn userinfo_hits(&self) -> usize {
        self.hits.userinfo.load(Ordering::SeqCst)
    }

    pub fn jwks_hits(&self) -> usize {
        self.hits.jwks.load(Ordering::SeqCst)
    }
}

/// A URL on a port nothing listens on.
pub async fn closed_url(path: &str) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    Url::parse(&format!("http://{addr}/{path}")).unwrap()
}

pub fn identity_claims() -> Value {
    json!({
        "iss": "https://accounts.google.com",
        "aud": CLIENT_ID,
        "sub": "110169484474386276334",
        "email": "ada@example.com",
        "email_verified": true,
        "given_name": "Ada",
        "family_name": "Lovelace",
        "iat": NOW - 60,
        "exp": NOW + 3600,
    })
}

pub fn sign_id_token(claims: &Value, kid: Option<&str>, pem: &[u8]) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(str::to_owned);
    encode(&header, claims, &EncodingKey::from_rsa_pem(pem).unwrap()).unwrap()
}

async fn token(State(hits): State<Hits>, Form(form): Form<HashMap<String, String>>) -> Response {
    hits.token.fetch_add(1, Ordering::SeqCst);

    let field = |name: &str| form.get(name).map(String::as_str);
    let valid = field("grant_type") == Some("authorization_code")
        && field("code") == Some(GOOD_CODE)
        && field("client_id") == Some(CLIENT_ID)
        && field("client_secret") == Some(CLIENT_SECRET);

    if !valid {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "invalid_grant" }))).into_response();
    }

    Json(json!({
        "access_token": ACCESS_TOKEN,
        "refresh_token": "refresh-456",
        "token_type": "Bearer",
        "expires_in": 3599,
        "scope": "openid email profile",
    }))
    .into_response()
}

async fn userinfo(State(hits): State<Hits>, headers: HeaderMap) -> Response {
    hits.userinfo.fetch_add(1, Ordering::SeqCst);

    let bearer = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if bearer != Some(ACCESS_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "sub": "110169484474386276334",
        "email": "ada@example.com",
        "email_verified": true,
        "name": "Ada Lovelace",
        "given_name": "Ada",
        "family_name": "Lovelace",
    }))
    .into_response()
}

async fn certs(State(hits): State<Hits>) -> Json<Value> {
    hits.jwks.fetch_add(1, Ordering::SeqCst);

    // Keep the fetch in flight long enough for concurrent callers to pile up.
    tokio::time::sleep(Duration::from_millis(100)).await;

    Json(json!({
        "keys": [
            { "kty": "RSA", "use": "sig", "alg": "RS256", "kid": PROVIDER_KID, "n": PROVIDER_KEY_N, "e": "AQAB" },
            { "kty": "RSA", "use": "sig", "alg": "RS256", "kid": SECONDARY_KID, "n": SECONDARY_KEY_N, "e": "AQAB" },
        ]
    }))
}

async fn garbage() -> &'static str {
    "<html>definitely not json</html>"
}

async fn unavailable() -> StatusCode {
    StatusCode::SERVICE_UNAVAILABLE
}

/// Answers only after [`SLOW_RESPONSE_DELAY`].
async fn slow() -> Json<Value> {
    tokio::time::sleep(SLOW_RESPONSE_DELAY).await;
    Json(json!({}))
}
