//! # Spotify Integration Module
//!
//! Everything that talks to Spotify: the accounts service (login and token
//! refresh) and the Web API (saved albums, album details).
//!
//! ## Architecture
//!
//! ```text
//! CLI (shuffle, albums, album, session)
//!          ↓
//! albums      select_random_albums, get_user_saved_albums, get_album_details
//!          ↓
//! client      SpotifyClient: bearer token per request, one replay after 401
//!          ↓                      ↑
//! reqwest     session::SessionProvider (session / refresh)
//!                                 ↓
//! auth        refresh_if_expired, refresh_access_token, exchange_code
//! ```
//!
//! ### Authentication
//!
//! [`auth`] implements the authorization-code grant with PKCE. The code
//! exchange and every refresh authenticate with the client id and secret
//! over HTTP Basic. Refresh is driven by expiry: a session whose
//! `expires_at` (epoch seconds) has passed is refreshed before it is used.
//! A failed refresh never raises; it keeps the old tokens and marks the
//! session with `RefreshAccessTokenError` so the CLI can ask the user to
//! log in again.
//!
//! ### HTTP client
//!
//! [`client`] wraps one `reqwest::Client` with the API base URL, a fixed
//! 10 second timeout and a JSON content type. The session provider is
//! injected at construction, so tests can substitute their own.
//!
//! ### Albums
//!
//! [`albums`] holds the saved-album endpoints and the random selection.
//! Random selection fetches one album per request at random offsets,
//! rejecting offsets it has already drawn. That is fine for the handful of
//! albums a shuffle asks for; a partial Fisher–Yates over `[0, total)` would
//! avoid the re-draws when `count` approaches `total`.
//!
//! ## API Coverage
//!
//! - `POST /api/token` - code exchange and token refresh
//! - `GET /me/albums` - saved albums, one page
//! - `GET /albums/{id}` - album with tracks

pub mod albums;
pub mod auth;
pub mod client;
