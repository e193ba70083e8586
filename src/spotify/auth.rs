use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::{
    Res,
    config::{self, Settings},
    error::ApiError,
    server::{CallbackState, start_api_server},
    session::SessionStore,
    types::{PkceToken, Session, SessionError, TokenResponse},
    utils, warning,
};

/// Where and how to exchange codes and refresh tokens.
#[derive(Debug, Clone)]
pub struct TokenEndpoint {
    pub url: String,
    pub client_id: String,
    pub client_secret: String,
}

impl TokenEndpoint {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
        }
    }
}

/// HTTP client for the accounts service.
///
/// Token calls run while the session gate is held, so they get the same fixed
/// timeout as Web API requests. A stalled endpoint then ends as a failed
/// refresh instead of blocking every caller waiting on the gate.
///
/// # Errors
///
/// Returns [`ApiError::Transport`] if the TLS backend cannot be initialised.
pub fn token_client() -> Result<Client, ApiError> {
    Ok(Client::builder()
        .user_agent(concat!("spotshuffle/", env!("CARGO_PKG_VERSION")))
        .timeout(config::REQUEST_TIMEOUT)
        .build()?)
}

/// Error body of the accounts service, e.g. `{"error":"invalid_grant","error_description":"..."}`.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Runs the authorization-code flow with PKCE and persists the resulting session.
///
/// 1. Generates the PKCE verifier and challenge
/// 2. Binds the local callback server on `settings.server_addr`
/// 3. Opens the authorization URL in the browser (or prints it)
/// 4. Waits up to 60 seconds for the callback to exchange the code
/// 5. Writes the session to `store`
pub async fn auth(settings: &Settings, store: &SessionStore) -> Res<Session> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let shared_state: Arc<Mutex<Option<PkceToken>>> = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        session: None,
    })));

    let callback_state = CallbackState {
        pkce: Arc::clone(&shared_state),
        endpoint: TokenEndpoint::from_settings(settings),
        redirect_uri: settings.redirect_uri.clone(),
        http: token_client()?,
    };
    let server = start_api_server(settings.server_addr, callback_state).await?;

    let auth_url = authorize_url(settings, &code_challenge)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let session = wait_for_session(shared_state).await;
    server.abort();

    match session {
        Some(session) => {
            store.persist(&session).await?;
            Ok(session)
        }
        None => Err("Authentication failed or timed out.".into()),
    }
}

/// Builds the `/authorize` URL with the S256 code challenge.
pub fn authorize_url(settings: &Settings, code_challenge: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(
        &settings.auth_url,
        &[
            ("client_id", settings.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", settings.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", settings.scope.as_str()),
        ],
    )
}

/// Polls the shared state once a second for up to 60 seconds.
async fn wait_for_session(shared_state: Arc<Mutex<Option<PkceToken>>>) -> Option<Session> {
    use std::time::Instant;

    let max_wait = Duration::from_secs(60);
    let start = Instant::now();

    while start.elapsed() < max_wait {
        let lock = shared_state.lock().await;
        if let Some(session) = lock.as_ref().and_then(|p| p.session.as_ref()) {
            return Some(session.clone());
        }
        drop(lock);
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    None
}

/// Exchanges an authorization code for a fresh session.
pub async fn exchange_code(
    http: &Client,
    endpoint: &TokenEndpoint,
    redirect_uri: &str,
    code: &str,
    verifier: &str,
) -> Result<Session, ApiError> {
    let response = http
        .post(&endpoint.url)
        .basic_auth(&endpoint.client_id, Some(&endpoint.client_secret))
        .form(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", redirect_uri),
            ("code_verifier", verifier),
        ])
        .send()
        .await?;

    let tokens = token_response(response).await?;
    Ok(Session {
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token.unwrap_or_default(),
        expires_at: utils::now_secs() + tokens.expires_in,
        scope: tokens.scope.unwrap_or_default(),
        error: None,
    })
}

/// Returns `session` untouched while `now < expires_at`, otherwise refreshes it.
pub async fn refresh_if_expired(
    http: &Client,
    endpoint: &TokenEndpoint,
    session: Session,
    now: i64,
) -> Session {
    if session.is_valid_at(now) {
        trace!(expires_at = session.expires_at, "access token still valid");
        return session;
    }

    debug!(expires_at = session.expires_at, now, "access token expired");
    refresh_access_token(http, endpoint, session, now).await
}

/// Exchanges the refresh token for a new access token.
///
/// Never fails: on error the prior tokens are kept and the session is marked
/// with [`SessionError::RefreshAccessTokenError`].
pub async fn refresh_access_token(
    http: &Client,
    endpoint: &TokenEndpoint,
    session: Session,
    now: i64,
) -> Session {
    match request_refresh(http, endpoint, &session.refresh_token).await {
        Ok(tokens) => {
            debug!(expires_in = tokens.expires_in, "access token refreshed");
            Session {
                access_token: tokens.access_token,
                // Spotify does not always rotate the refresh token
                refresh_token: tokens
                    .refresh_token
                    .filter(|t| !t.is_empty())
                    .unwrap_or(session.refresh_token),
                expires_at: now + tokens.expires_in,
                scope: tokens.scope.unwrap_or(session.scope),
                error: None,
            }
        }
        Err(e) => {
            warn!(error = %e, "RefreshAccessTokenError");
            Session {
                error: Some(SessionError::RefreshAccessTokenError),
                ..session
            }
        }
    }
}

async fn request_refresh(
    http: &Client,
    endpoint: &TokenEndpoint,
    refresh_token: &str,
) -> Result<TokenResponse, ApiError> {
    let response = http
        .post(&endpoint.url)
        .basic_auth(&endpoint.client_id, Some(&endpoint.client_secret))
        .form(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .send()
        .await?;

    token_response(response).await
}

async fn token_response(response: reqwest::Response) -> Result<TokenResponse, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<TokenResponse>().await?);
    }

    let message = match response.json::<OAuthErrorResponse>().await {
        Ok(body) => body.error_description.unwrap_or(body.error),
        Err(_) => ApiError::UNKNOWN_MESSAGE.to_string(),
    };
    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings::from_lookup(|key| match key {
            "SPOTIFY_CLIENT_ID" => Some("client-id".to_string()),
            "SPOTIFY_CLIENT_SECRET" => Some("client-secret".to_string()),
            _ => None,
        })
        .unwrap()
    }

    #[test]
    fn authorize_url_carries_pkce_challenge_and_scope() {
        let url = authorize_url(&settings(), "challenge123").unwrap();
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        assert_eq!(url.host_str(), Some("accounts.spotify.com"));
        assert!(pairs.contains(&("client_id".into(), "client-id".into())));
        assert!(pairs.contains(&("code_challenge".into(), "challenge123".into())));
        assert!(pairs.contains(&("code_challenge_method".into(), "S256".into())));
        assert!(pairs.contains(&(
            "redirect_uri".into(),
            "http://127.0.0.1:8888/callback".into()
        )));
        assert!(
            pairs
                .iter()
                .any(|(k, v)| k == "scope" && v.contains("user-library-read"))
        );
    }
}
