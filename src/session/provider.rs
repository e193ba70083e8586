use async_trait::async_trait;
use reqwest::Client;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    error::ApiError,
    spotify::auth::{self, TokenEndpoint},
    types::Session,
    utils,
};

use super::SessionStore;

/// Source of the current session for outbound requests.
///
/// [`crate::spotify::client::SpotifyClient`] asks for a session before every
/// request and asks for a refresh after a 401.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// The session to authenticate the next request with, `None` when there is
    /// no logged-in user.
    async fn session(&self) -> Result<Option<Session>, ApiError>;

    /// Called after `stale_token` was rejected. Returns a session carrying a
    /// replacement token, or `None` when none can be obtained.
    async fn refresh(&self, stale_token: Option<&str>) -> Result<Option<Session>, ApiError>;
}

/// File-backed provider that refreshes through the token endpoint.
///
/// All loads, refreshes and writes happen under one async gate, so
/// concurrent callers holding the same stale token trigger a single
/// token endpoint call.
pub struct StoredSessions {
    store: SessionStore,
    http: Client,
    endpoint: TokenEndpoint,
    gate: Mutex<()>,
}

impl StoredSessions {
    /// Provider over `store` that refreshes through `endpoint`, using
    /// [`auth::token_client`] so token calls time out.
    ///
    /// # Errors
    ///
    /// Fails only if the HTTP client cannot be built.
    pub fn new(store: SessionStore, endpoint: TokenEndpoint) -> Result<Self, ApiError> {
        Ok(Self::with_client(store, endpoint, auth::token_client()?))
    }

    pub fn with_client(store: SessionStore, endpoint: TokenEndpoint, http: Client) -> Self {
        Self {
            store,
            http,
            endpoint,
            gate: Mutex::new(()),
        }
    }
}

#[async_trait]
impl SessionProvider for StoredSessions {
    async fn session(&self) -> Result<Option<Session>, ApiError> {
        let _guard = self.gate.lock().await;

        let Some(current) = self.store.load().await? else {
            return Ok(None);
        };

        // a failed refresh is terminal until the user logs in again
        if current.is_tainted() {
            return Ok(Some(current));
        }

        let checked =
            auth::refresh_if_expired(&self.http, &self.endpoint, current.clone(), utils::now_secs())
                .await;
        if checked != current {
            self.store.persist(&checked).await?;
        }

        Ok(Some(checked))
    }

    async fn refresh(&self, stale_token: Option<&str>) -> Result<Option<Session>, ApiError> {
        let _guard = self.gate.lock().await;

        let Some(current) = self.store.load().await? else {
            return Ok(None);
        };

        if current.bearer().is_some() && current.bearer() != stale_token {
            debug!("session already refreshed by a concurrent request");
            return Ok(Some(current));
        }

        if current.is_tainted() {
            return Ok(None);
        }

        let refreshed =
            auth::refresh_access_token(&self.http, &self.endpoint, current, utils::now_secs())
                .await;
        self.store.persist(&refreshed).await?;

        if refreshed.is_tainted() {
            warn!("token refresh failed, session marked for re-authentication");
            return Ok(None);
        }

        Ok(Some(refreshed))
    }
}
