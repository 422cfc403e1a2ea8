// SPDX-License-Identifier: GPL-3.0-only

//! HTTP surface over the hand store
//!
//! | Method | Path           | Body                                  |
//! |--------|----------------|---------------------------------------|
//! | GET    | `/hands/left`  | [`HandResponse`] or 404 [`NoReadingResponse`] |
//! | GET    | `/hands/right` | [`HandResponse`] or 404 [`NoReadingResponse`] |
//! | GET    | `/hands`       | [`HandsResponse`]                     |

pub mod handlers;
pub mod response;

pub use response::{HandResponse, HandsResponse, NoReadingResponse};

use crate::errors::AppError;
use crate::store::SharedHandStore;
use axum::Router;
use axum::routing::get;
use std::future::Future;
use tokio::net::TcpListener;
use tracing::info;

/// Build the router with the store as shared state
pub fn router(store: SharedHandStore) -> Router {
    Router::new()
        .route("/hands", get(handlers::get_hands))
        .route("/hands/left", get(handlers::get_left_hand))
        .route("/hands/right", get(handlers::get_right_hand))
        .with_state(store)
}

/// Serve the store until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, store: SharedHandStore, shutdown: F) -> Result<(), AppError>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "HTTP server listening");
    }

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AppError::Server(e.to_string()))?;

    info!("HTTP server stopped");
    Ok(())
}
