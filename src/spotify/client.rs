//! Outbound HTTP client for the Spotify Web API.

use std::sync::Arc;

use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{CONTENT_TYPE, HeaderMap, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, instrument, trace, warn};

use crate::{
    config::{self, Settings},
    error::ApiError,
    session::SessionProvider,
    types::SpotifyErrorResponse,
};

/// Web API client bound to a base URL and a [`SessionProvider`].
///
/// Every request asks the provider for the current session and sends its
/// access token as a bearer token (or goes out unauthenticated when there
/// is none). A 401 on the first attempt makes the client ask the provider
/// for a refreshed session and replay the request once with the new token.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    base_url: String,
    sessions: Arc<dyn SessionProvider>,
}

impl SpotifyClient {
    /// Builds a client for `base_url` (e.g. `https://api.spotify.com/v1`).
    ///
    /// The underlying `reqwest::Client` sends a `spotshuffle/<version>` user
    /// agent and a JSON content type, and gives up on any request after
    /// [`config::REQUEST_TIMEOUT`]. A trailing slash on `base_url` is ignored.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the Web API, without trailing path segments
    /// * `sessions` - Where bearer tokens come from, and who refreshes them
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    ///
    /// # Example
    ///
    /// ```
    /// let client = SpotifyClient::new("https://api.spotify.com/v1", sessions)?;
    /// ```
    pub fn new(
        base_url: impl Into<String>,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(concat!("spotshuffle/", env!("CARGO_PKG_VERSION")))
            .timeout(config::REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            sessions,
        })
    }

    pub fn from_settings(
        settings: &Settings,
        sessions: Arc<dyn SessionProvider>,
    ) -> Result<Self, ApiError> {
        Self::new(settings.api_url.clone(), sessions)
    }

    /// Sends `GET {base_url}{path}?{query}` and decodes the JSON body as `R`.
    ///
    /// # Errors
    ///
    /// - [`ApiError::Status`] for a non-success status, including a 401 that
    ///   persisted after one refresh and replay
    /// - [`ApiError::Decode`] when a success body does not match `R`
    /// - [`ApiError::Transport`] for network failures and timeouts
    /// - [`ApiError::Session`] when the session provider fails
    ///
    /// # Example
    ///
    /// ```
    /// let page: SavedAlbumsPage = client
    ///     .get("/me/albums", &[("limit", "1"), ("offset", "0")])
    ///     .await?;
    /// ```
    #[instrument(skip(self, query))]
    pub async fn get<Q, R>(&self, path: &str, query: &Q) -> Result<R, ApiError>
    where
        Q: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        self.send(|| self.http.get(&url).query(query)).await
    }

    /// Sends `POST {base_url}{path}` with `body` as JSON. Same auth, replay and
    /// error behaviour as [`SpotifyClient::get`].
    #[instrument(skip(self, body))]
    pub async fn post<B, R>(&self, path: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        let url = self.url(path);
        self.send(|| self.http.post(&url).json(body)).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `build` is called once per attempt so the replay is the same request.
    async fn send<R, F>(&self, build: F) -> Result<R, ApiError>
    where
        R: DeserializeOwned,
        F: Fn() -> RequestBuilder,
    {
        let session = self.sessions.session().await?;
        let token = session
            .as_ref()
            .and_then(|s| s.bearer())
            .map(str::to_owned);
        if token.is_none() {
            debug!("no session, sending unauthenticated request");
        }

        let response = with_bearer(build(), token.as_deref()).send().await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return handle_response(response).await;
        }

        debug!("401 received, refreshing session");
        let fresh = match self.sessions.refresh(token.as_deref()).await {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "session refresh failed");
                None
            }
        };
        let Some(fresh_token) = fresh.as_ref().and_then(|s| s.bearer()) else {
            return handle_response(response).await;
        };

        debug!("replaying request with refreshed token");
        let retried = with_bearer(build(), Some(fresh_token)).send().await?;
        handle_response(retried).await
    }
}

fn with_bearer(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
    match token {
        Some(token) => builder.bearer_auth(token),
        None => builder,
    }
}

async fn handle_response<R: DeserializeOwned>(response: Response) -> Result<R, ApiError> {
    let status = response.status();
    trace!(%status, url = %response.url(), "response");

    if status.is_success() {
        return response
            .json::<R>()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()));
    }

    let message = response
        .json::<SpotifyErrorResponse>()
        .await
        .ok()
        .and_then(|body| body.error)
        .and_then(|error| error.message)
        .unwrap_or_else(|| ApiError::UNKNOWN_MESSAGE.to_string());

    Err(ApiError::Status {
        status: status.as_u16(),
        message,
    })
}
