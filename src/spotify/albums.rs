use std::collections::HashSet;

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, instrument, trace};

use crate::{
    error::AlbumError,
    types::{Album, AlbumDetails, SavedAlbumsPage},
};

use super::client::SpotifyClient;

/// Spotify resolves the market from the user's token.
const MARKET: &str = "from_token";

/// Largest page `GET /me/albums` accepts.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Fetches one page of the user's saved albums (`GET /me/albums`).
///
/// `limit` is clamped to `1..=50`, the range the endpoint accepts.
#[instrument(skip(client))]
pub async fn get_user_saved_albums(
    client: &SpotifyClient,
    limit: u32,
    offset: u64,
) -> Result<SavedAlbumsPage, AlbumError> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    client
        .get(
            "/me/albums",
            &[
                ("limit", limit.to_string()),
                ("offset", offset.to_string()),
                ("market", MARKET.to_string()),
            ],
        )
        .await
        .map_err(AlbumError::SavedAlbums)
}

/// Fetches a single album with its tracks (`GET /albums/{id}`).
#[instrument(skip(client))]
pub async fn get_album_details(
    client: &SpotifyClient,
    album_id: &str,
) -> Result<AlbumDetails, AlbumError> {
    client
        .get(&format!("/albums/{album_id}"), &[("market", MARKET)])
        .await
        .map_err(|source| AlbumError::Details {
            id: album_id.to_string(),
            source,
        })
}

/// Picks `count` distinct random albums from the user's library.
///
/// See [`select_random_albums_with`].
pub async fn select_random_albums(
    client: &SpotifyClient,
    count: usize,
) -> Result<Vec<Album>, AlbumError> {
    let mut rng = StdRng::from_os_rng();
    select_random_albums_with(client, count, &mut rng).await
}

/// Picks `count` distinct random albums using `rng`.
///
/// The library size comes from a one-item page at offset 0. Offsets are then
/// drawn uniformly from `[0, total)`, re-drawing any offset already used, and
/// each album is fetched on its own. The result holds `min(count, total)`
/// albums unless the library shrinks while sampling, in which case the loop
/// ends once every offset has been tried.
///
/// Any failed request aborts the whole selection; no partial result is returned.
pub async fn select_random_albums_with<R: Rng>(
    client: &SpotifyClient,
    count: usize,
    rng: &mut R,
) -> Result<Vec<Album>, AlbumError> {
    if count == 0 {
        return Ok(Vec::new());
    }

    let total = get_user_saved_albums(client, 1, 0)
        .await
        .map_err(|e| AlbumError::Random(Box::new(e)))?
        .total;
    debug!(total, count, "sampling saved albums");

    if total == 0 {
        return Ok(Vec::new());
    }

    let target = usize::try_from(total).map_or(count, |total| count.min(total));
    let mut drawn: HashSet<u64> = HashSet::with_capacity(target);
    let mut albums: Vec<Album> = Vec::with_capacity(target);

    while albums.len() < target && (drawn.len() as u64) < total {
        let offset = loop {
            let candidate = rng.random_range(0..total);
            if drawn.insert(candidate) {
                break candidate;
            }
        };
        trace!(offset, "drawing album");

        let page = get_user_saved_albums(client, 1, offset)
            .await
            .map_err(|e| AlbumError::Random(Box::new(e)))?;

        if let Some(saved) = page.items.into_iter().next() {
            albums.push(saved.album);
        }
    }

    Ok(albums)
}
