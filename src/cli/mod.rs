//! # CLI Module
//!
//! User-facing commands. Each command builds what it needs from the
//! environment, calls into [`crate::spotify`], and prints the outcome with
//! the `info!`/`success!`/`warning!`/`error!` macros and `tabled` tables.
//!
//! ## Commands
//!
//! - [`auth`] - log in through the browser and store the session
//! - [`list_albums`] - one page of saved albums
//! - [`show_album`] - a single album with its tracks
//! - [`shuffle`] - random albums from the library, optionally opening the first
//! - [`session`] - show or remove the stored session
//!
//! ## Typical use
//!
//! ```bash
//! spotshuffle auth                 # log in once
//! spotshuffle shuffle --count 5    # five random albums
//! spotshuffle shuffle --play       # open one random album in Spotify
//! spotshuffle albums --offset 50   # browse the library
//! spotshuffle session              # check token expiry
//! ```
//!
//! ## Errors
//!
//! Configuration problems and failed requests end the process through
//! `error!`. When a request still fails with 401 after the replay, or the
//! stored session carries `RefreshAccessTokenError`, the message points the
//! user to `spotshuffle auth`.

mod albums;
mod auth;
mod session;
mod shuffle;

use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::Settings,
    error::{AlbumError, ApiError},
    session::{SessionProvider, SessionStore, StoredSessions},
    spotify::{auth::TokenEndpoint, client::SpotifyClient},
};

pub use albums::list_albums;
pub use albums::show_album;
pub use auth::auth;
pub use session::session;
pub use shuffle::shuffle;

const REAUTH_HINT: &str = "Your Spotify session is no longer valid. Please run spotshuffle auth.";

fn settings() -> Settings {
    match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => crate::error!("Invalid configuration: {}", e),
    }
}

/// Client wired to the stored session, plus the store for post-mortem checks.
fn client(settings: &Settings) -> (SpotifyClient, SessionStore) {
    let store = SessionStore::default_location();
    let sessions = match StoredSessions::new(store.clone(), TokenEndpoint::from_settings(settings))
    {
        Ok(sessions) => sessions,
        Err(e) => crate::error!("Failed to build HTTP client: {}", e),
    };
    let sessions: Arc<dyn SessionProvider> = Arc::new(sessions);

    match SpotifyClient::from_settings(settings, sessions) {
        Ok(client) => (client, store),
        Err(e) => crate::error!("Failed to build HTTP client: {}", e),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}

/// The message to exit with; auth failures get a re-authentication hint.
///
/// That covers a 401 surviving the replay, a session tainted by a failed
/// refresh, and a session file that could not be read at all.
async fn failure_message(err: &AlbumError, store: &SessionStore) -> String {
    let tainted = matches!(store.load().await, Ok(Some(s)) if s.is_tainted());
    let api_error = err.api_error();
    if api_error.is_unauthorized() || matches!(api_error, ApiError::Session(_)) || tainted {
        format!("{}\n{}", err, REAUTH_HINT)
    } else {
        err.to_string()
    }
}
