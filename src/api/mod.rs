//! # API Module
//!
//! HTTP endpoints served by the short-lived local server that runs during
//! `spotshuffle auth`.
//!
//! - [`callback`] receives the authorization code from Spotify's accounts
//!   service and exchanges it, together with the PKCE verifier, for a session.
//! - [`health`] reports status and version, handy when checking that the
//!   redirect URI actually reaches this process.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use spotshuffle::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
