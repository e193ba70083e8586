use crate::{error, info, session::SessionStore, success, utils, warning};

/// Prints the stored session's state, or removes it with `logout`.
pub async fn session(logout: bool) {
    let store = SessionStore::default_location();

    if logout {
        match store.clear().await {
            Ok(true) => success!("Session removed."),
            Ok(false) => info!("No session stored."),
            Err(e) => error!("Failed to remove session: {}", e),
        }
        return;
    }

    let session = match store.load().await {
        Ok(Some(session)) => session,
        Ok(None) => {
            warning!("Not logged in. Run spotshuffle auth.");
            return;
        }
        Err(e) => error!("Failed to read session: {}", e),
    };

    info!("Session file: {}", store.path().display());
    info!("Scope: {}", session.scope);

    let expires = utils::format_epoch_secs(session.expires_at);
    if session.is_valid_at(utils::now_secs()) {
        success!("Access token valid until {}", expires);
    } else {
        info!(
            "Access token expired at {}, it is refreshed on the next request",
            expires
        );
    }

    if let Some(err) = session.error {
        warning!("{:?}: the last refresh failed. Run spotshuffle auth.", err);
    }
}
