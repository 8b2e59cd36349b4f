//! Request routing for the API.
//!
//! | Method | Path | Handler |
//! |:-------|:-----|:--------|
//! | `GET` | `/service` | [`handlers::service::render`] |
//! | `GET` | anything else | [`handlers::assets::serve`] |
//! | other | any | 405 |

use super::handlers;
use super::response;
use super::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Path of the render endpoint.
pub const SERVICE_PATH: &str = "/service";

/// Route an incoming request to the appropriate handler.
///
/// No handler reads the request body, so any body type is accepted and the
/// body is dropped before dispatch.
pub async fn route<B>(
    req: Request<B>,
    state: Arc<AppState>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let (parts, _) = req.into_parts();
    let method = parts.method;
    let path = parts.uri.path();

    tracing::debug!(method = %method, path = %path, "Routing request");

    let response = match method {
        Method::GET if path == SERVICE_PATH => {
            handlers::service::render(parts.uri.query(), state).await
        }
        Method::GET => handlers::assets::serve(path, state).await,
        _ => response::method_not_allowed(&["GET"]),
    };

    tracing::debug!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        "Request handled"
    );
    Ok(response)
}
