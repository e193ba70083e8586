use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Local, Utc};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Album, AlbumTableRow, Track, TrackTableRow};

/// Generates a PKCE code verifier: 128 random alphanumeric characters,
/// the maximum length RFC 7636 allows.
///
/// # Example
///
/// ```
/// let verifier = generate_code_verifier();
/// assert_eq!(verifier.len(), 128);
/// ```
pub fn generate_code_verifier() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(128)
        .map(char::from)
        .collect()
}

/// Derives the S256 code challenge for `verifier`: the SHA-256 digest,
/// base64url-encoded without padding.
///
/// # Arguments
///
/// * `verifier` - The code verifier sent later with the token exchange
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Current time in epoch seconds.
pub fn now_secs() -> i64 {
    Utc::now().timestamp()
}

/// Renders an epoch-seconds timestamp in local time, e.g. `2024-05-01 13:37:00`.
pub fn format_epoch_secs(secs: i64) -> String {
    match DateTime::from_timestamp(secs, 0) {
        Some(dt) => dt
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
            .to_string(),
        None => secs.to_string(),
    }
}

/// `m:ss` for track lengths.
pub fn format_duration_ms(ms: u64) -> String {
    let total_secs = ms / 1000;
    format!("{}:{:02}", total_secs / 60, total_secs % 60)
}

/// Positions start at `first_position`, so paged listings keep their offset.
pub fn album_table_rows(albums: &[Album], first_position: usize) -> Vec<AlbumTableRow> {
    albums
        .iter()
        .enumerate()
        .map(|(i, a)| AlbumTableRow {
            position: first_position + i,
            name: a.name.clone(),
            artists: a.artist_names(),
            released: a.release_date.clone(),
            tracks: a.total_tracks,
            id: a.id.clone(),
        })
        .collect()
}

pub fn track_table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .map(|t| TrackTableRow {
            number: t.track_number,
            name: t.name.clone(),
            artists: t
                .artists
                .iter()
                .map(|a| a.name.clone())
                .collect::<Vec<String>>()
                .join(", "),
            length: format_duration_ms(t.duration_ms),
        })
        .collect()
}
