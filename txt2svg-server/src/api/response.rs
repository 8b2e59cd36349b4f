//! Response builders for the API.

use bytes::Bytes;
use http_body_util::Full;
use hyper::http::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde::Serialize;

/// Content type of generated documents.
pub const SVG_CONTENT_TYPE: &str = "image/svg+xml";

/// Cache policy for generated documents; output is a pure function of the query.
pub const SVG_CACHE_CONTROL: &str = "public, max-age=31536000";

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

fn apply_security_headers(mut response: Response<Full<Bytes>>) -> Response<Full<Bytes>> {
    response.headers_mut().insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    response
}

/// Build a JSON response with status code.
pub fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let json = serde_json::to_string(body)
        .unwrap_or_else(|_| r#"{"error":"Internal server error"}"#.to_string());

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Full::new(Bytes::from(json)))
        .expect("response builder should not fail");
    apply_security_headers(response)
}

/// Build an `{"error": message}` response.
pub fn error_response(status: StatusCode, message: &str) -> Response<Full<Bytes>> {
    json_response(status, &ErrorBody { error: message })
}

/// Build a 200 OK response carrying a generated SVG.
pub fn svg_response(svg: String) -> Response<Full<Bytes>> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, SVG_CONTENT_TYPE)
        .header(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")
        .header(header::CACHE_CONTROL, SVG_CACHE_CONTROL)
        .body(Full::new(Bytes::from(svg)))
        .expect("response builder should not fail");
    apply_security_headers(response)
}

/// Build a 404 Not Found response.
pub fn not_found() -> Response<Full<Bytes>> {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

/// Build a 405 Method Not Allowed response.
pub fn method_not_allowed(allowed: &[&str]) -> Response<Full<Bytes>> {
    let mut response = error_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed");
    if let Ok(value) = HeaderValue::from_str(&allowed.join(", ")) {
        response.headers_mut().insert(header::ALLOW, value);
    }
    response
}

/// Build a raw bytes response (used for static assets).
pub fn bytes_response(
    status: StatusCode,
    content_type: &str,
    body: Bytes,
) -> Response<Full<Bytes>> {
    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type)
        .body(Full::new(body))
        .expect("response builder should not fail");
    apply_security_headers(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn svg_response_headers() {
        let response = svg_response("<svg/>".to_string());

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers.get("Content-Type").unwrap(), "image/svg+xml");
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            headers.get("Cache-Control").unwrap(),
            "public, max-age=31536000"
        );
        assert_eq!(body_string(response).await, "<svg/>");
    }

    #[tokio::test]
    async fn error_body_shape() {
        let response = error_response(StatusCode::BAD_REQUEST, "Unsupported font: comic");
        assert_eq!(
            response.headers().get("Content-Type").unwrap(),
            "application/json"
        );
        assert_eq!(
            body_string(response).await,
            r#"{"error":"Unsupported font: comic"}"#
        );
    }

    #[test]
    fn not_found_response() {
        let response = not_found();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn method_not_allowed_response() {
        let response = method_not_allowed(&["GET"]);
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get("Allow").unwrap(), "GET");
        assert_eq!(body_string(response).await, r#"{"error":"Method not allowed"}"#);
    }

    #[test]
    fn bytes_response_content_type() {
        let response = bytes_response(StatusCode::OK, "font/ttf", Bytes::from_static(b"x"));
        assert_eq!(response.headers().get("Content-Type").unwrap(), "font/ttf");
        assert_eq!(
            response.headers().get("X-Content-Type-Options").unwrap(),
            "nosniff"
        );
    }
}
