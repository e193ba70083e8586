use std::{net::SocketAddr, sync::Arc};

use axum::{Extension, Router, routing::get};
use reqwest::Client;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{debug, warn};

use crate::{Res, api, spotify::auth::TokenEndpoint, types::PkceToken};

/// Everything the `/callback` handler needs to finish the code exchange.
#[derive(Clone)]
pub struct CallbackState {
    pub pkce: Arc<Mutex<Option<PkceToken>>>,
    pub endpoint: TokenEndpoint,
    pub redirect_uri: String,
    pub http: Client,
}

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Binds `addr` and serves the callback router in the background.
///
/// Binding happens before returning so an occupied port is reported to the
/// caller instead of silently killing the task.
pub async fn start_api_server(addr: SocketAddr, state: CallbackState) -> Res<JoinHandle<()>> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    debug!(%addr, "callback server listening");

    let app = router(state);
    Ok(tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!(error = %e, "callback server stopped");
        }
    }))
}
