//! End-to-end tests of the HTTP surface against real WebAssembly modules.

mod common;

use bytes::Bytes;
use common::*;
use http_body_util::{BodyExt, Full};
use hyper::{Method, Request, Response, StatusCode};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use txt2svg_core::host::InstancePolicy;
use txt2svg_server::api::{ApiServer, AppState, ServerConfig, route};
use txt2svg_server::assets::MemoryAssetStore;
use txt2svg_server::render::RenderService;

struct Harness {
    state: Arc<AppState>,
    store: Arc<MemoryAssetStore>,
}

impl Harness {
    fn new(wasm: &[u8]) -> Self {
        let store = Arc::new(asset_store());
        let generator = generator(wasm, runtime_config(), InstancePolicy::Shared);
        let renderer = RenderService::new(store.clone(), generator);
        Self {
            state: Arc::new(AppState::new(renderer)),
            store,
        }
    }

    fn echo() -> Self {
        Self::new(&echo_module(IMPORTED_MEMORY))
    }

    async fn request(&self, method: Method, uri: &str) -> Response<Full<Bytes>> {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(())
            .unwrap();
        route(req, Arc::clone(&self.state)).await.unwrap()
    }

    async fn get(&self, uri: &str) -> Response<Full<Bytes>> {
        self.request(Method::GET, uri).await
    }
}

async fn body_string(response: Response<Full<Bytes>>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn header<'a>(response: &'a Response<Full<Bytes>>, name: &str) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

#[tokio::test]
async fn service_renders_svg() {
    let harness = Harness::echo();
    let response = harness
        .get("/service?text=Hi%20there&font=roboto&color=ff0000")
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Content-Type"), "image/svg+xml");
    assert_eq!(header(&response, "Access-Control-Allow-Origin"), "*");
    assert_eq!(header(&response, "Cache-Control"), "public, max-age=31536000");
    assert_eq!(
        body_string(response).await,
        "<svg xmlns='http://www.w3.org/2000/svg'><text fill='#ff0000'>Hi there</text></svg>"
    );
}

#[tokio::test]
async fn service_applies_defaults() {
    let harness = Harness::echo();
    let body = body_string(harness.get("/service").await).await;
    assert!(body.contains("fill='#000000'>Hello World<"));

    let empty = body_string(harness.get("/service?text=&font=&color=").await).await;
    assert_eq!(body, empty);
}

#[tokio::test]
async fn color_with_and_without_marker_match() {
    let harness = Harness::echo();
    let bare = body_string(harness.get("/service?text=X&color=336699").await).await;
    let marked = body_string(harness.get("/service?text=X&color=%23336699").await).await;
    assert_eq!(bare, marked);
}

#[tokio::test]
async fn repeated_requests_are_byte_identical() {
    let harness = Harness::echo();
    let uri = "/service?text=Same&font=WendyOne&color=abcdef";
    let first = body_string(harness.get(uri).await).await;
    for _ in 0..5 {
        assert_eq!(body_string(harness.get(uri).await).await, first);
    }
}

#[tokio::test]
async fn unsupported_font_is_bad_request() {
    let harness = Harness::echo();
    let response = harness.get("/service?font=ComicSans").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(header(&response, "Content-Type"), "application/json");
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Unsupported font: comicsans"}"#
    );
    assert_eq!(harness.store.fetches(), 0);
}

#[tokio::test]
async fn missing_font_asset_is_internal_error() {
    let harness = Harness::echo();
    harness.store.remove("fonts/AlfaSlabOne.ttf");

    let response = harness.get("/service?font=alfaslabone").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Internal server error"}"#
    );
}

#[tokio::test]
async fn empty_generation_is_reported() {
    let harness = Harness::new(&silent_module());
    let response = harness.get("/service?text=x").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_string(response).await,
        r#"{"error":"Generated SVG is empty"}"#
    );
}

#[tokio::test]
async fn guest_trap_does_not_leak_details() {
    let harness = Harness::new(&trapping_module());
    let response = harness.get("/service?text=x").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_string(response).await;
    assert_eq!(body, r#"{"error":"Internal server error"}"#);
}

#[tokio::test]
async fn non_get_methods_are_rejected() {
    let harness = Harness::echo();
    for method in [Method::POST, Method::PUT, Method::DELETE, Method::HEAD] {
        let response = harness.request(method.clone(), "/service").await;
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
        assert_eq!(header(&response, "Allow"), "GET");
    }
}

#[tokio::test]
async fn root_serves_index() {
    let harness = Harness::echo();
    let response = harness.get("/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Content-Type"), "text/html; charset=utf-8");
    assert!(body_string(response).await.contains("<title>txt2svg</title>"));
}

#[tokio::test]
async fn root_serves_configured_index_file() {
    let store = Arc::new(asset_store());
    let generator = generator(
        &echo_module(IMPORTED_MEMORY),
        runtime_config(),
        InstancePolicy::Shared,
    );
    let state =
        AppState::new(RenderService::new(store, generator)).with_index_file("css/site.css");

    let req = Request::builder().uri("/").body(()).unwrap();
    let response = route(req, Arc::new(state)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Content-Type"), "text/css; charset=utf-8");
    assert_eq!(body_string(response).await, "body { margin: 0 }");
}

#[tokio::test]
async fn static_assets_are_served() {
    let harness = Harness::echo();
    let response = harness.get("/css/site.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header(&response, "Content-Type"), "text/css; charset=utf-8");

    let response = harness.get("/fonts/Roboto.ttf").await;
    assert_eq!(header(&response, "Content-Type"), "font/ttf");
}

#[tokio::test]
async fn unknown_and_traversing_paths_are_not_found() {
    let harness = Harness::echo();
    for uri in ["/missing.html", "/fonts/../index.html", "/css//site.css"] {
        let response = harness.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(body_string(response).await, r#"{"error":"Not found"}"#);
    }
}

#[tokio::test]
async fn concurrent_requests_share_one_instance() {
    let harness = Arc::new(Harness::echo());

    let tasks: Vec<_> = (0..16)
        .map(|i| {
            let harness = Arc::clone(&harness);
            tokio::spawn(async move {
                let response = harness.get(&format!("/service?text=req{}", i)).await;
                let body = body_string(response).await;
                assert!(body.contains(&format!(">req{}<", i)), "{body}");
            })
        })
        .collect();

    for task in tasks {
        task.await.unwrap();
    }
}

#[tokio::test]
async fn serves_over_tcp() {
    let harness = Harness::echo();
    let server = ApiServer::new(ServerConfig::new("127.0.0.1", 0), Arc::clone(&harness.state));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

    let server_task = tokio::spawn(async move {
        server
            .serve(listener, async {
                let _ = shutdown_rx.await;
            })
            .await
    });

    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(
            b"GET /service?text=tcp+works&color=00aa00 HTTP/1.1\r\n\
              Host: localhost\r\n\
              Connection: close\r\n\r\n",
        )
        .await
        .unwrap();
    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();

    assert!(raw.starts_with("HTTP/1.1 200 OK"), "{raw}");
    assert!(raw.to_ascii_lowercase().contains("content-type: image/svg+xml"));
    assert!(raw.ends_with("<text fill='#00aa00'>tcp works</text></svg>"), "{raw}");

    shutdown_tx.send(()).unwrap();
    server_task.await.unwrap().unwrap();
}
