//! `GET /service`: render text to SVG.

use crate::api::error::ApiError;
use crate::api::response;
use crate::api::state::AppState;
use bytes::Bytes;
use http_body_util::Full;
use hyper::Response;
use std::sync::Arc;
use txt2svg_core::request::RenderRequest;

/// Query parameters recognized by `/service`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ServiceQuery {
    /// `text`
    pub text: Option<String>,
    /// `font`
    pub font: Option<String>,
    /// `color`
    pub color: Option<String>,
}

impl ServiceQuery {
    /// Parse a raw query string.
    ///
    /// Values are percent-decoded with `+` read as a space. The first
    /// occurrence of a key wins; unknown keys are ignored.
    pub fn parse(query: &str) -> Self {
        let mut parsed = Self::default();

        for pair in query.split('&') {
            let (key, value) = match pair.split_once('=') {
                Some((k, v)) => (k, decode_component(v)),
                None => (pair, String::new()),
            };

            let slot = match key {
                "text" => &mut parsed.text,
                "font" => &mut parsed.font,
                "color" => &mut parsed.color,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }

        parsed
    }

    /// Build a render request, applying defaults.
    pub fn into_request(self) -> RenderRequest {
        RenderRequest::from_parts(
            self.text.as_deref(),
            self.font.as_deref(),
            self.color.as_deref(),
        )
    }
}

/// Invalid UTF-8 after percent-decoding becomes U+FFFD.
fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    let bytes = urlencoding::decode_binary(spaced.as_bytes());
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Render the SVG for a `/service` request.
pub async fn render(query: Option<&str>, state: Arc<AppState>) -> Response<Full<Bytes>> {
    let request = ServiceQuery::parse(query.unwrap_or_default()).into_request();

    match state.renderer.render(&request).await {
        Ok(svg) => response::svg_response(svg),
        Err(e) => {
            if e.is_validation_error() {
                tracing::debug!(code = e.code(), font = %request.font_key, "Rejected render request");
            } else {
                tracing::error!(
                    code = e.code(),
                    error = %e,
                    font = %request.font_key,
                    text_len = request.text.len(),
                    "Render failed"
                );
            }
            ApiError::from(e).into_response()
        }
    }
}
