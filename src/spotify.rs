//! Spotify login for the in-browser player: the authorization code flow with PKCE, with the
//! tokens kept in an HTTP-only cookie.

use axum::{
    extract::{Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::Utc;
use cookie::time::Duration as CookieDuration;
use cookie::{Cookie, SameSite};
use rand::distr::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::model::SpotifyStatus;

pub const AUTHORIZE_URL: &str = "https://accounts.spotify.com/authorize";
pub const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SCOPES: [&str; 5] = [
    "streaming",
    "user-read-email",
    "user-read-private",
    "user-read-playback-state",
    "user-modify-playback-state",
];

pub const TOKENS_COOKIE: &str = "spotify_tokens";
pub const VERIFIER_COOKIE: &str = "spotify_code_verifier";
pub const STATE_COOKIE: &str = "spotify_auth_state";
pub const ERROR_COOKIE: &str = "spotify_error";
pub const AUTH_COOKIE: &str = "spotify_auth";

/// Where the player lives.
pub const RETURN_PATH: &str = "/door/10";

const VERIFIER_LENGTH: usize = 128;
const STATE_LENGTH: usize = 16;
/// Tokens this close to expiry are refreshed before use.
const REFRESH_BUFFER_MS: i64 = 60_000;

#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("environment variable {0} is not set")]
    MissingVariable(&'static str),
    #[error("Spotify login is not configured")]
    NotConfigured,
    #[error("could not build the authorize url: {0}")]
    AuthorizeUrl(String),
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint answered {status}: {body}")]
    TokenEndpoint { status: u16, body: String },
    #[error("token response has no refresh token")]
    MissingRefreshToken,
    #[error("could not encode the token cookie: {0}")]
    Encode(#[from] serde_json::Error),
}

impl IntoResponse for SpotifyError {
    fn into_response(self) -> Response {
        warn!(error = %self, "spotify request failed");
        let payload = json!({ "error": "server_error" });
        (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
    }
}

#[derive(Clone, Debug)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

impl SpotifyConfig {
    /// Reads `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and `SPOTIFY_REDIRECT_URI`.
    pub fn from_env() -> Result<Self, SpotifyError> {
        let var = |name: &'static str| {
            env::var(name)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or(SpotifyError::MissingVariable(name))
        };
        Ok(Self {
            client_id: var("SPOTIFY_CLIENT_ID")?,
            client_secret: var("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: var("SPOTIFY_REDIRECT_URI")?,
        })
    }
}

/// Shared by every request. The config is absent when the environment is incomplete; the routes
/// then answer 500 instead of the server refusing to start.
pub struct SpotifyState {
    config: Option<SpotifyConfig>,
    client: reqwest::Client,
}

pub type SharedSpotify = Arc<SpotifyState>;

impl SpotifyState {
    pub fn new(config: Option<SpotifyConfig>) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        match SpotifyConfig::from_env() {
            Ok(config) => Self::new(Some(config)),
            Err(e) => {
                warn!(error = %e, "Spotify login disabled");
                Self::new(None)
            }
        }
    }

    fn config(&self) -> Result<&SpotifyConfig, SpotifyError> {
        self.config.as_ref().ok_or(SpotifyError::NotConfigured)
    }

    async fn request_token(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let config = self.config()?;
        let response = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&config.client_id, Some(&config.client_secret))
            .form(form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::TokenEndpoint {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }

    async fn exchange_code(&self, code: &str, verifier: &str) -> Result<StoredTokens, SpotifyError> {
        let redirect_uri = self.config()?.redirect_uri.clone();
        let response = self
            .request_token(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &redirect_uri),
                ("code_verifier", verifier),
            ])
            .await?;
        StoredTokens::from_response(response, None, now_ms())
    }

    async fn refresh(&self, refresh_token: &str) -> Result<StoredTokens, SpotifyError> {
        let response = self
            .request_token(&[("grant_type", "refresh_token"), ("refresh_token", refresh_token)])
            .await?;
        StoredTokens::from_response(response, Some(refresh_token), now_ms())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
}

/// What the token cookie holds. `expires_at` is in epoch milliseconds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: i64,
}

impl StoredTokens {
    fn from_response(
        response: TokenResponse,
        previous_refresh_token: Option<&str>,
        now_ms: i64,
    ) -> Result<Self, SpotifyError> {
        let refresh_token = response
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string))
            .ok_or(SpotifyError::MissingRefreshToken)?;
        Ok(Self {
            access_token: response.access_token,
            refresh_token,
            expires_at: now_ms + response.expires_in * 1000,
        })
    }

    /// Usable for at least another minute.
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        now_ms < self.expires_at - REFRESH_BUFFER_MS
    }

    fn is_complete(&self) -> bool {
        !self.access_token.is_empty() && !self.refresh_token.is_empty() && self.expires_at > 0
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn random_string(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// S256 code challenge: unpadded base64url of the SHA-256 of the verifier.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

pub fn authorize_url(config: &SpotifyConfig, state: &str, challenge: &str) -> Result<String, SpotifyError> {
    let scope = SCOPES.join(" ");
    reqwest::Url::parse_with_params(
        AUTHORIZE_URL,
        &[
            ("client_id", config.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", scope.as_str()),
            ("state", state),
            ("code_challenge_method", "S256"),
            ("code_challenge", challenge),
            ("show_dialog", "false"),
        ],
    )
    .map(String::from)
    .map_err(|e| SpotifyError::AuthorizeUrl(e.to_string()))
}

/// The value of the cookie `name` in the request, if any.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse_encoded)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_string())
}

pub fn read_tokens(headers: &HeaderMap) -> Option<StoredTokens> {
    let raw = read_cookie(headers, TOKENS_COOKIE)?;
    match serde_json::from_str::<StoredTokens>(&raw) {
        Ok(tokens) if tokens.is_complete() => Some(tokens),
        Ok(_) => None,
        Err(e) => {
            warn!(error = %e, "ignoring unreadable Spotify token cookie");
            None
        }
    }
}

pub fn session_status(headers: &HeaderMap) -> SpotifyStatus {
    SpotifyStatus {
        connected: read_tokens(headers).is_some(),
        error: read_cookie(headers, ERROR_COOKIE),
    }
}

/// `Set-Cookie` headers for one response.
#[derive(Default)]
struct SetCookies(HeaderMap);

impl SetCookies {
    fn add(&mut self, cookie: Cookie<'_>) {
        match HeaderValue::from_str(&cookie.encoded().to_string()) {
            Ok(value) => {
                self.0.append(header::SET_COOKIE, value);
            }
            Err(e) => warn!(cookie = cookie.name(), error = %e, "dropping cookie"),
        }
    }

    fn remove(&mut self, name: &'static str) {
        let mut cookie = private_cookie(name, String::new(), CookieDuration::ZERO);
        cookie.make_removal();
        self.add(cookie);
    }

    fn clear_session(&mut self) {
        for name in [TOKENS_COOKIE, STATE_COOKIE, VERIFIER_COOKIE] {
            self.remove(name);
        }
    }

    /// A short-lived cookie the page's scripts can read.
    fn flash(&mut self, name: &'static str, value: &str) {
        self.add(
            Cookie::build((name, value.to_string()))
                .path("/")
                .same_site(SameSite::Lax)
                .max_age(CookieDuration::seconds(60))
                .build(),
        );
    }

    fn tokens(&mut self, tokens: &StoredTokens) -> Result<(), SpotifyError> {
        let value = serde_json::to_string(tokens)?;
        // Outlives the access token so the refresh token stays available.
        self.add(private_cookie(TOKENS_COOKIE, value, CookieDuration::days(30)));
        Ok(())
    }

    fn into_headers(self) -> HeaderMap {
        self.0
    }
}

fn private_cookie(name: &'static str, value: String, max_age: CookieDuration) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age)
        .build()
}

pub fn router<S>(state: SharedSpotify) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/api/auth/spotify/login", get(login))
        .route("/api/auth/spotify/callback", get(callback))
        .route("/api/auth/spotify/logout", post(logout))
        .route("/api/spotify/token", get(token))
        .with_state(state)
}

async fn login(State(state): State<SharedSpotify>) -> Result<Response, SpotifyError> {
    let config = state.config()?;
    let verifier = random_string(VERIFIER_LENGTH);
    let auth_state = random_string(STATE_LENGTH);
    let url = authorize_url(config, &auth_state, &code_challenge(&verifier))?;

    let mut cookies = SetCookies::default();
    cookies.add(private_cookie(VERIFIER_COOKIE, verifier, CookieDuration::minutes(15)));
    cookies.add(private_cookie(STATE_COOKIE, auth_state, CookieDuration::minutes(15)));
    info!("redirecting to Spotify login");
    Ok((cookies.into_headers(), Redirect::to(&url)).into_response())
}

#[derive(Debug, Default, Deserialize)]
pub struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Error)]
enum CallbackError {
    #[error("Spotify reported {0}")]
    Denied(String),
    #[error("callback is missing code or state")]
    MissingCodeOrState,
    #[error("state does not match the login")]
    StateMismatch,
    #[error("no code verifier cookie")]
    MissingVerifier,
    #[error("token exchange failed: {0}")]
    ExchangeFailed(#[source] SpotifyError),
    #[error("callback failed: {0}")]
    Exception(#[source] SpotifyError),
}

impl CallbackError {
    /// The value of the `spotify_error` cookie the page shows.
    fn code(&self) -> &str {
        match self {
            CallbackError::Denied(error) => error,
            CallbackError::MissingCodeOrState => "missing_code_or_state",
            CallbackError::StateMismatch => "state_mismatch",
            CallbackError::MissingVerifier => "missing_verifier",
            CallbackError::ExchangeFailed(_) => "token_exchange_failed",
            CallbackError::Exception(_) => "callback_exception",
        }
    }

    fn clears_session(&self) -> bool {
        matches!(self, CallbackError::Denied(_) | CallbackError::Exception(_))
    }
}

async fn complete_login(
    state: &SpotifyState,
    params: CallbackParams,
    headers: &HeaderMap,
) -> Result<StoredTokens, CallbackError> {
    if let Some(error) = params.error {
        return Err(CallbackError::Denied(error));
    }
    let (Some(code), Some(returned_state)) = (params.code, params.state) else {
        return Err(CallbackError::MissingCodeOrState);
    };
    if read_cookie(headers, STATE_COOKIE).as_deref() != Some(returned_state.as_str()) {
        return Err(CallbackError::StateMismatch);
    }
    let verifier = read_cookie(headers, VERIFIER_COOKIE).ok_or(CallbackError::MissingVerifier)?;
    state
        .exchange_code(&code, &verifier)
        .await
        .map_err(|e| match e {
            SpotifyError::TokenEndpoint { .. } => CallbackError::ExchangeFailed(e),
            other => CallbackError::Exception(other),
        })
}

async fn callback(
    State(state): State<SharedSpotify>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let mut cookies = SetCookies::default();
    let stored = match complete_login(&state, params, &headers).await {
        Ok(tokens) => cookies.tokens(&tokens).map_err(CallbackError::Exception),
        Err(e) => Err(e),
    };
    match stored {
        Ok(()) => {
            cookies.remove(STATE_COOKIE);
            cookies.remove(VERIFIER_COOKIE);
            cookies.flash(AUTH_COOKIE, "success");
            info!("Spotify login completed");
        }
        Err(e) => {
            warn!(error = %e, "Spotify callback failed");
            if e.clears_session() {
                cookies.clear_session();
            }
            cookies.flash(ERROR_COOKIE, e.code());
        }
    }
    (cookies.into_headers(), Redirect::to(RETURN_PATH))
}

fn unauthorized() -> Response {
    let mut cookies = SetCookies::default();
    cookies.clear_session();
    (
        StatusCode::UNAUTHORIZED,
        cookies.into_headers(),
        Json(json!({ "error": "unauthorized" })),
    )
        .into_response()
}

async fn token(State(state): State<SharedSpotify>, headers: HeaderMap) -> Response {
    let Some(stored) = read_tokens(&headers) else {
        return unauthorized();
    };
    if stored.is_fresh(now_ms()) {
        return Json(json!({ "token": stored.access_token })).into_response();
    }

    match state.refresh(&stored.refresh_token).await {
        Ok(refreshed) => {
            let mut cookies = SetCookies::default();
            if let Err(e) = cookies.tokens(&refreshed) {
                return e.into_response();
            }
            info!("refreshed Spotify access token");
            (
                cookies.into_headers(),
                Json(json!({ "token": refreshed.access_token })),
            )
                .into_response()
        }
        Err(SpotifyError::NotConfigured) => SpotifyError::NotConfigured.into_response(),
        Err(e) => {
            warn!(error = %e, "could not refresh Spotify token");
            unauthorized()
        }
    }
}

async fn logout() -> impl IntoResponse {
    let mut cookies = SetCookies::default();
    cookies.clear_session();
    (cookies.into_headers(), Json(json!({ "success": true })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{self, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    fn configured() -> SharedSpotify {
        Arc::new(SpotifyState::new(Some(SpotifyConfig {
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "http://127.0.0.1:3000/api/auth/spotify/callback".to_string(),
        })))
    }

    fn app(state: SharedSpotify) -> Router {
        router(state)
    }

    fn set_cookies(response: &Response) -> Vec<String> {
        response
            .headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .map(str::to_string)
            .collect()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[test]
    fn test_code_challenge_matches_rfc7636() {
        assert_eq!(
            code_challenge("dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk"),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn test_random_string() {
        let verifier = random_string(VERIFIER_LENGTH);
        assert_eq!(verifier.len(), 128);
        assert!(verifier.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(random_string(STATE_LENGTH), random_string(STATE_LENGTH));
    }

    #[test]
    fn test_stored_tokens_json_uses_camel_case() {
        let tokens = StoredTokens {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            expires_at: 1_733_000_000_000,
        };
        let json = serde_json::to_value(&tokens).expect("serialize");
        assert_eq!(
            json,
            json!({ "accessToken": "access", "refreshToken": "refresh", "expiresAt": 1_733_000_000_000i64 })
        );
        let back: StoredTokens = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, tokens);
    }

    #[test]
    fn test_freshness_buffer() {
        let tokens = StoredTokens {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_at: 100_000,
        };
        assert!(tokens.is_fresh(39_999));
        assert!(!tokens.is_fresh(40_000));
        assert!(!tokens.is_fresh(100_001));
    }

    #[test]
    fn test_refresh_keeps_old_refresh_token() {
        let response = TokenResponse {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_in: 3600,
        };
        let tokens = StoredTokens::from_response(response, Some("old"), 1_000).expect("tokens");
        assert_eq!(tokens.refresh_token, "old");
        assert_eq!(tokens.expires_at, 3_601_000);

        let response = TokenResponse {
            access_token: "new".to_string(),
            refresh_token: None,
            expires_in: 3600,
        };
        assert!(matches!(
            StoredTokens::from_response(response, None, 0),
            Err(SpotifyError::MissingRefreshToken)
        ));
    }

    #[test]
    fn test_read_tokens_from_cookie_header() {
        let tokens = StoredTokens {
            access_token: "BQD-access".to_string(),
            refresh_token: "AQC-refresh".to_string(),
            expires_at: 1_733_000_000_000,
        };
        let mut cookies = SetCookies::default();
        cookies.tokens(&tokens).expect("cookie");
        let set_cookie = cookies.into_headers();
        let pair = set_cookie
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .expect("set-cookie")
            .to_string();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}")).expect("header"),
        );
        assert_eq!(read_tokens(&headers), Some(tokens));
        assert_eq!(read_cookie(&headers, "theme").as_deref(), Some("dark"));
        assert_eq!(read_cookie(&headers, ERROR_COOKIE), None);
    }

    #[test]
    fn test_session_status() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_status(&headers), SpotifyStatus::default());
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("spotify_error=state_mismatch"),
        );
        let status = session_status(&headers);
        assert!(!status.connected);
        assert_eq!(status.error.as_deref(), Some("state_mismatch"));
    }

    #[test]
    fn test_return_path_is_spotify_door() {
        assert_eq!(
            RETURN_PATH,
            format!("/door/{}", crate::model::SPOTIFY_DOOR_ID)
        );
    }

    #[test]
    fn test_authorize_url() {
        let state = configured();
        let config = state.config().expect("config");
        let url = authorize_url(config, "abc123", "challenge").expect("url");
        assert!(url.starts_with("https://accounts.spotify.com/authorize?client_id=client"));
        assert!(url.contains("code_challenge_method=S256"));
        assert!(url.contains("scope=streaming+user-read-email"));
        assert!(url.contains("state=abc123"));
    }

    #[tokio::test]
    async fn test_login_redirects_and_sets_cookies() {
        let response = app(configured())
            .oneshot(Request::get("/api/auth/spotify/login").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .expect("location");
        assert!(location.starts_with(AUTHORIZE_URL));
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().any(|c| c.starts_with("spotify_code_verifier=") && c.contains("HttpOnly")));
        assert!(cookies.iter().any(|c| c.starts_with("spotify_auth_state=")));
    }

    #[tokio::test]
    async fn test_login_without_config_is_server_error() {
        let response = app(Arc::new(SpotifyState::new(None)))
            .oneshot(Request::get("/api/auth/spotify/login").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_callback_state_mismatch() {
        let request = Request::get("/api/auth/spotify/callback?code=abc&state=evil")
            .header(header::COOKIE, "spotify_auth_state=good; spotify_code_verifier=v")
            .body(Body::empty())
            .expect("request");
        let response = app(configured()).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()),
            Some(RETURN_PATH)
        );
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 1);
        assert!(cookies[0].starts_with("spotify_error=state_mismatch"));
        assert!(!cookies[0].contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_callback_missing_code_and_denied() {
        let request = Request::get("/api/auth/spotify/callback?state=good")
            .body(Body::empty())
            .expect("request");
        let response = app(configured()).oneshot(request).await.expect("response");
        assert!(set_cookies(&response)[0].starts_with("spotify_error=missing_code_or_state"));

        let request = Request::get("/api/auth/spotify/callback?error=access_denied")
            .body(Body::empty())
            .expect("request");
        let response = app(configured()).oneshot(request).await.expect("response");
        let cookies = set_cookies(&response);
        // Session cookies cleared, then the error flash.
        assert_eq!(cookies.len(), 4);
        assert!(cookies[3].starts_with("spotify_error=access_denied"));
    }

    #[tokio::test]
    async fn test_callback_missing_verifier() {
        let request = Request::get("/api/auth/spotify/callback?code=abc&state=good")
            .header(header::COOKIE, "spotify_auth_state=good")
            .body(Body::empty())
            .expect("request");
        let response = app(configured()).oneshot(request).await.expect("response");
        assert!(set_cookies(&response)[0].starts_with("spotify_error=missing_verifier"));
    }

    #[tokio::test]
    async fn test_token_without_cookie_is_unauthorized() {
        let response = app(configured())
            .oneshot(Request::get("/api/spotify/token").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(set_cookies(&response).len(), 3);
        assert_eq!(json_body(response).await, json!({ "error": "unauthorized" }));
    }

    #[tokio::test]
    async fn test_token_returns_fresh_token() {
        let tokens = StoredTokens {
            access_token: "fresh".to_string(),
            refresh_token: "r".to_string(),
            expires_at: now_ms() + 3_600_000,
        };
        let mut cookies = SetCookies::default();
        cookies.tokens(&tokens).expect("cookie");
        let pair = cookies
            .into_headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_string)
            .expect("cookie pair");
        let request = Request::get("/api/spotify/token")
            .header(header::COOKIE, pair)
            .body(Body::empty())
            .expect("request");
        let response = app(configured()).oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({ "token": "fresh" }));
    }

    #[tokio::test]
    async fn test_logout_clears_cookies() {
        let response = app(configured())
            .oneshot(
                Request::post("/api/auth/spotify/logout")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let cookies = set_cookies(&response);
        assert_eq!(cookies.len(), 3);
        assert!(cookies.iter().all(|c| c.contains("Max-Age=0")));
        assert_eq!(json_body(response).await, json!({ "success": true }));
    }
}
