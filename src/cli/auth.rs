use crate::{error, info, session::SessionStore, spotify, success, utils};

/// Logs in through the browser and stores the resulting session.
///
/// Exits through `error!` when the configuration is incomplete, the callback
/// server cannot bind, or no code arrives within 60 seconds.
pub async fn auth() {
    let settings = super::settings();
    let store = SessionStore::default_location();

    info!("Opening the Spotify login page...");
    match spotify::auth::auth(&settings, &store).await {
        Ok(session) => {
            success!("Authentication successful!");
            info!(
                "Access token valid until {}",
                utils::format_epoch_secs(session.expires_at)
            );
        }
        Err(e) => error!("Authentication failed: {}", e),
    }
}
