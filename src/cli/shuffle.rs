use tabled::Table;

use crate::{error, info, spotify::albums, success, utils, warning};

/// Picks `count` random saved albums and prints them in play order.
///
/// With `play`, the first album is opened through its Spotify link so the
/// desktop app (or the web player) starts on it.
pub async fn shuffle(count: usize, play: bool) {
    let settings = super::settings();
    let (client, store) = super::client(&settings);

    let pb = super::spinner("Shuffling saved albums...");
    let result = albums::select_random_albums(&client, count).await;
    pb.finish_and_clear();

    let picked = match result {
        Ok(picked) => picked,
        Err(e) => {
            let message = super::failure_message(&e, &store).await;
            error!("{}", message)
        }
    };

    if picked.is_empty() {
        warning!("Your library has no saved albums yet.");
        return;
    }
    if picked.len() < count {
        info!(
            "Only {} saved albums available, all of them are in the queue.",
            picked.len()
        );
    }

    println!("{}", Table::new(utils::album_table_rows(&picked, 1)));

    if !play {
        return;
    }

    let first = &picked[0];
    match first.external_url() {
        Some(url) => match webbrowser::open(url) {
            Ok(_) => success!("Playing {} - {}", first.name, first.artist_names()),
            Err(e) => warning!("Failed to open {}: {}", url, e),
        },
        None => warning!("{} has no Spotify link to open.", first.name),
    }
}
