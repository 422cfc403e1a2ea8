// SPDX-License-Identifier: GPL-3.0-only

//! Request handlers
//!
//! Handlers only read the store. A side that was never published answers
//! 404 with a JSON body; that is an expected state, not a failure.

use super::response::{HandResponse, HandsResponse, NoReadingResponse};
use crate::hands::Side;
use crate::store::SharedHandStore;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::trace;

pub async fn get_left_hand(State(store): State<SharedHandStore>) -> Response {
    hand_response(&store, Side::Left)
}

pub async fn get_right_hand(State(store): State<SharedHandStore>) -> Response {
    hand_response(&store, Side::Right)
}

pub async fn get_hands(State(store): State<SharedHandStore>) -> Json<HandsResponse> {
    Json(HandsResponse::from(&store.snapshot()))
}

/// Map the current reading for `side` to a response
pub fn hand_response(store: &SharedHandStore, side: Side) -> Response {
    match store.read(side) {
        Some(reading) => {
            trace!(side = %side, sequence = reading.sequence, "Serving hand reading");
            (StatusCode::OK, Json(HandResponse::from(reading.as_ref()))).into_response()
        }
        None => {
            trace!(side = %side, "No reading for side yet");
            (StatusCode::NOT_FOUND, Json(NoReadingResponse::new(side))).into_response()
        }
    }
}
