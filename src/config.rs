//! Configuration management for spotshuffle.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Process environment wins over the file.
//!
//! The `.env` file lives at:
//! - Linux: `~/.local/share/spotshuffle/.env`
//! - macOS: `~/Library/Application Support/spotshuffle/.env`
//! - Windows: `%LOCALAPPDATA%/spotshuffle/.env`

use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use crate::error::ConfigError;

pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPE: &str = "user-read-email user-read-private playlist-read-private playlist-read-collaborative user-library-read";

/// Fixed timeout for every outbound Web API request.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Loads environment variables from `spotshuffle/.env` in the local data directory.
///
/// Creates the directory if needed. A missing `.env` file is not an error,
/// since every value can also come from the process environment.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> Result<(), String> {
    let path = env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Directory holding `.env`, the session cache and the `.env.example` copy.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("spotshuffle");
    path
}

fn env_path() -> PathBuf {
    data_dir().join(".env")
}

/// Resolved application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub server_addr: SocketAddr,
    pub api_url: String,
    pub auth_url: String,
    pub token_url: String,
    pub scope: String,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` are required, everything
    /// else falls back to the public Spotify endpoints and a local callback
    /// server on port 8888.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Settings::from_env`] with an injectable variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &'static str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));
        let optional = |key: &'static str, default: &str| {
            get(key)
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| default.to_string())
        };

        let server_addr = get("SERVER_ADDRESS").unwrap_or_else(|| DEFAULT_SERVER_ADDRESS.into());
        let server_addr =
            SocketAddr::from_str(server_addr.trim()).map_err(|e| ConfigError::Invalid {
                var: "SERVER_ADDRESS",
                reason: e.to_string(),
            })?;

        Ok(Self {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: get("SPOTIFY_REDIRECT_URI").unwrap_or_else(|| DEFAULT_REDIRECT_URI.into()),
            server_addr,
            api_url: optional("SPOTIFY_API_URL", DEFAULT_API_URL),
            auth_url: optional("SPOTIFY_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: optional("SPOTIFY_TOKEN_URL", DEFAULT_TOKEN_URL),
            scope: get("SPOTIFY_SCOPE").unwrap_or_else(|| DEFAULT_SCOPE.into()),
        })
    }
}
