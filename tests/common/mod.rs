#![allow(dead_code)]

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use serde_json::{Value, json};
use spotshuffle::{
    error::ApiError,
    session::SessionProvider,
    spotify::{auth::TokenEndpoint, client::SpotifyClient},
    types::Session,
    utils,
};
use tokio::sync::Mutex;
use wiremock::MockServer;

pub const CLIENT_ID: &str = "client-id";
pub const CLIENT_SECRET: &str = "client-secret";

pub const NO_QUERY: [(&str, &str); 0] = [];

/// In-memory provider: hands out `current`, and on refresh swaps in `next`.
pub struct StaticSessions {
    current: Mutex<Option<Session>>,
    next: Mutex<Option<Session>>,
    pub refresh_calls: AtomicUsize,
}

impl StaticSessions {
    pub fn new(current: Option<Session>, next: Option<Session>) -> Arc<Self> {
        Arc::new(Self {
            current: Mutex::new(current),
            next: Mutex::new(next),
            refresh_calls: AtomicUsize::new(0),
        })
    }

    pub fn refreshes(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for StaticSessions {
    async fn session(&self) -> Result<Option<Session>, ApiError> {
        Ok(self.current.lock().await.clone())
    }

    async fn refresh(&self, _stale_token: Option<&str>) -> Result<Option<Session>, ApiError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.next.lock().await.take();
        if let Some(next) = &next {
            *self.current.lock().await = Some(next.clone());
        }
        Ok(next)
    }
}

pub fn session(access_token: &str, expires_in: i64) -> Session {
    Session {
        access_token: access_token.to_string(),
        refresh_token: format!("{access_token}-refresh"),
        expires_at: utils::now_secs() + expires_in,
        scope: "user-library-read".to_string(),
        error: None,
    }
}

pub fn client(server: &MockServer, sessions: Arc<dyn SessionProvider>) -> SpotifyClient {
    SpotifyClient::new(format!("{}/v1", server.uri()), sessions).unwrap()
}

pub fn token_endpoint(server: &MockServer) -> TokenEndpoint {
    TokenEndpoint {
        url: format!("{}/api/token", server.uri()),
        client_id: CLIENT_ID.to_string(),
        client_secret: CLIENT_SECRET.to_string(),
    }
}

pub fn album_json(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:album:{id}"),
        "album_type": "album",
        "artists": [{ "id": format!("{id}-artist"), "name": format!("Artist of {name}") }],
        "images": [{ "url": format!("https://example.com/{id}.jpg"), "height": 640, "width": 640 }],
        "release_date": "2020-01-01",
        "total_tracks": 10,
        "external_urls": { "spotify": format!("https://open.spotify.com/album/{id}") }
    })
}

/// One-item page of `/me/albums`, or an empty page when `album` is `None`.
pub fn page_json(album: Option<Value>, total: u64, offset: u64) -> Value {
    let items: Vec<Value> = album
        .into_iter()
        .map(|a| json!({ "added_at": "2024-01-01T00:00:00Z", "album": a }))
        .collect();
    json!({
        "href": "https://api.spotify.com/v1/me/albums",
        "items": items,
        "limit": 1,
        "offset": offset,
        "total": total,
        "next": null,
        "previous": null
    })
}
