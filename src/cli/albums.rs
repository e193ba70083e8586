use tabled::Table;

use crate::{
    error, info,
    spotify::albums::{self, MAX_PAGE_SIZE},
    types::Album,
    utils, warning,
};

/// Prints one page of saved albums as a table, numbered from `offset + 1`.
///
/// # Arguments
///
/// * `limit` - Albums per page, clamped to 1..=50
/// * `offset` - Index of the first album to show
pub async fn list_albums(limit: u32, offset: u64) {
    let settings = super::settings();
    let (client, store) = super::client(&settings);

    let pb = super::spinner("Fetching saved albums...");
    let result = albums::get_user_saved_albums(&client, limit, offset).await;
    pb.finish_and_clear();

    let page = match result {
        Ok(page) => page,
        Err(e) => {
            let message = super::failure_message(&e, &store).await;
            error!("{}", message)
        }
    };

    if page.items.is_empty() {
        warning!("No saved albums at offset {} (library holds {}).", offset, page.total);
        return;
    }

    let albums: Vec<Album> = page.items.into_iter().map(|saved| saved.album).collect();
    let first = usize::try_from(offset).unwrap_or(usize::MAX - albums.len()) + 1;
    println!("{}", Table::new(utils::album_table_rows(&albums, first)));

    let shown_until = offset + albums.len() as u64;
    info!("Showing {}-{} of {} saved albums", offset + 1, shown_until, page.total);
    if page.next.is_some() {
        info!(
            "Next page: spotshuffle albums --limit {} --offset {}",
            limit.clamp(1, MAX_PAGE_SIZE),
            shown_until
        );
    }
}

/// Prints an album's metadata and track list.
pub async fn show_album(album_id: String) {
    let settings = super::settings();
    let (client, store) = super::client(&settings);

    let pb = super::spinner("Fetching album...");
    let result = albums::get_album_details(&client, &album_id).await;
    pb.finish_and_clear();

    let details = match result {
        Ok(details) => details,
        Err(e) => {
            let message = super::failure_message(&e, &store).await;
            error!("{}", message)
        }
    };

    let album = &details.album;
    info!("{} - {}", album.name, album.artist_names());
    info!(
        "Released {} · {} tracks{}",
        album.release_date,
        album.total_tracks,
        details
            .label
            .as_deref()
            .map(|l| format!(" · {l}"))
            .unwrap_or_default()
    );
    if let Some(url) = album.external_url() {
        info!("{}", url);
    }

    if details.tracks.items.is_empty() {
        return;
    }
    println!("{}", Table::new(utils::track_table_rows(&details.tracks.items)));
    if details.tracks.total as usize > details.tracks.items.len() {
        warning!(
            "Showing the first {} of {} tracks.",
            details.tracks.items.len(),
            details.tracks.total
        );
    }
}
