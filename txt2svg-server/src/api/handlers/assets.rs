//! Static files for every `GET` other than `/service`.

use crate::api::error::ApiError;
use crate::api::response;
use crate::api::state::AppState;
use crate::assets::content_type_for;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use std::sync::Arc;

/// Serve a static asset for a request path.
pub async fn serve(path: &str, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let path = if path == "/" || path.is_empty() {
        state.index_file.as_str()
    } else {
        path
    };

    match state.renderer.assets().fetch(path).await {
        Ok(bytes) => response::bytes_response(StatusCode::OK, content_type_for(path), bytes),
        Err(e) => {
            let detail = e.to_string();
            let err = ApiError::from(e);
            if err.is_server_error() {
                tracing::error!(path = %path, error = %detail, "Static asset fetch failed");
            } else {
                tracing::debug!(path = %path, code = err.code, "Static asset not served");
            }
            err.into_response()
        }
    }
}
