//! The `{ "data": ... }` envelope every successful response uses.
//!
//! Handlers return [`DataResponse`] values directly; the [`IntoResponse`]
//! impl serializes them as JSON, so the envelope shape lives in exactly one
//! place instead of being rebuilt per handler.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Successful-response envelope: `{ "data": T }`.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

impl<T: Serialize> IntoResponse for DataResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}
