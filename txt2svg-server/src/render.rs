//! Request orchestration: font resolution, asset fetch, generation.

use crate::assets::AssetStore;
use std::sync::Arc;
use std::time::{Duration, Instant};
use txt2svg_core::error::{Result, Txt2SvgError};
use txt2svg_core::font::FontKey;
use txt2svg_core::host::SvgGenerator;
use txt2svg_core::request::RenderRequest;

/// Turns a [`RenderRequest`] into an SVG document.
pub struct RenderService {
    assets: Arc<dyn AssetStore>,
    generator: Arc<dyn SvgGenerator>,
    timeout: Option<Duration>,
}

impl RenderService {
    /// Create a render service.
    pub fn new(assets: Arc<dyn AssetStore>, generator: Arc<dyn SvgGenerator>) -> Self {
        Self {
            assets,
            generator,
            timeout: None,
        }
    }

    /// Bound how long a caller waits for generation.
    ///
    /// The guest itself is stopped by its epoch deadline; this only stops
    /// the wait.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Get the asset store.
    pub fn assets(&self) -> &Arc<dyn AssetStore> {
        &self.assets
    }

    /// Render one request.
    ///
    /// An unsupported font is rejected before the asset store or the module
    /// is touched. Asset failures are not retried.
    pub async fn render(&self, request: &RenderRequest) -> Result<String> {
        let font = FontKey::parse(&request.font_key)?;
        let path = font.asset_path();

        let font_bytes = self.assets.fetch(&path).await.map_err(|e| match e {
            Txt2SvgError::AssetNotFound { path } => Txt2SvgError::AssetFetch {
                path,
                cause: "not found".to_string(),
            },
            other => other,
        })?;
        if font_bytes.is_empty() {
            return Err(Txt2SvgError::EmptyFontAsset { path });
        }

        let started = Instant::now();
        let generator = Arc::clone(&self.generator);
        let text = request.text.clone();
        let color = request.color.to_string();
        let task = tokio::task::spawn_blocking(move || {
            generator.generate(&text, &font_bytes, &color)
        });

        let joined = match self.timeout {
            Some(timeout) => tokio::time::timeout(timeout, task).await.map_err(|_| {
                Txt2SvgError::WasmTimeout {
                    function: "wasm_generate_svg",
                    timeout_ms: timeout.as_millis() as u64,
                }
            })?,
            None => task.await,
        };
        let decoded = joined.map_err(|e| Txt2SvgError::WasmExecution {
            function: "wasm_generate_svg",
            cause: format!("Task join error: {}", e),
        })??;

        tracing::debug!(
            font = font.as_str(),
            decoded = decoded.kind(),
            svg_len = decoded.as_str().len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Rendered SVG"
        );

        if decoded.is_empty() {
            return Err(Txt2SvgError::GenerationEmpty);
        }
        Ok(decoded.into_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssetStore;
    use txt2svg_core::host::{InstancePolicy, ModuleHost};
    use txt2svg_core::marshal::{DecodedOutput, Marshaler};
    use txt2svg_core::testing::{StubFactory, StubGuest};

    const MEMORY: usize = 256 * 1024;

    fn fonts() -> MemoryAssetStore {
        MemoryAssetStore::new()
            .with_asset("fonts/Roboto.ttf", &b"roboto-ttf"[..])
            .with_asset("fonts/WendyOne.ttf", &b"wendy-ttf"[..])
            .with_asset("fonts/AlfaSlabOne.ttf", &b"alfa-ttf"[..])
    }

    fn service(
        store: Arc<MemoryAssetStore>,
        factory: StubFactory,
        policy: InstancePolicy,
    ) -> RenderService {
        let host = ModuleHost::new(factory, policy, Marshaler::default());
        RenderService::new(store, Arc::new(host))
    }

    fn echo_factory() -> StubFactory {
        StubFactory::new(|| StubGuest::new(MEMORY))
    }

    #[tokio::test]
    async fn defaults_render() {
        let store = Arc::new(fonts());
        let service = service(Arc::clone(&store), echo_factory(), InstancePolicy::Shared);

        let svg = service
            .render(&RenderRequest::from_parts(None, None, None))
            .await
            .unwrap();
        assert!(svg.contains(">Hello World<"));
        assert!(svg.contains("fill='#000000'"));
        assert_eq!(store.fetches(), 1);
    }

    #[tokio::test]
    async fn font_selector_is_case_insensitive() {
        let store = Arc::new(fonts());
        let service = service(Arc::clone(&store), echo_factory(), InstancePolicy::Shared);

        let request = RenderRequest::default().with_font("WendyOne");
        service.render(&request).await.unwrap();
        let request = RenderRequest::default().with_font("ALFASLABONE");
        service.render(&request).await.unwrap();
    }

    #[tokio::test]
    async fn unsupported_font_touches_nothing() {
        let store = Arc::new(fonts());
        let factory = echo_factory();
        let service = service(Arc::clone(&store), factory.clone(), InstancePolicy::Shared);

        let request = RenderRequest::default().with_font("ComicSans");
        let err = service.render(&request).await.unwrap_err();

        assert_eq!(err.to_string(), "E101: Unsupported font: comicsans");
        assert_eq!(store.fetches(), 0);
        assert_eq!(factory.instantiations(), 0);
    }

    #[tokio::test]
    async fn color_marker_is_optional() {
        let service = service(Arc::new(fonts()), echo_factory(), InstancePolicy::Shared);

        let bare = service
            .render(&RenderRequest::default().with_color("ff0000"))
            .await
            .unwrap();
        let marked = service
            .render(&RenderRequest::default().with_color("#ff0000"))
            .await
            .unwrap();

        assert_eq!(bare, marked);
        assert!(bare.contains("fill='#ff0000'"));
        assert!(!bare.contains("##"));
    }

    #[tokio::test]
    async fn missing_font_asset_is_fetch_error() {
        let store = Arc::new(fonts());
        store.remove("fonts/Roboto.ttf");
        let factory = echo_factory();
        let service = service(store, factory.clone(), InstancePolicy::Shared);

        let err = service.render(&RenderRequest::default()).await.unwrap_err();
        assert!(matches!(err, Txt2SvgError::AssetFetch { .. }));
        assert_eq!(factory.instantiations(), 0);
    }

    #[tokio::test]
    async fn empty_font_asset_is_rejected_before_generation() {
        let store = Arc::new(fonts());
        store.insert("fonts/Roboto.ttf", bytes::Bytes::new());
        let factory = echo_factory();
        let service = service(store, factory.clone(), InstancePolicy::Shared);

        let err = service.render(&RenderRequest::default()).await.unwrap_err();
        assert!(matches!(err, Txt2SvgError::EmptyFontAsset { .. }));
        assert_eq!(factory.instantiations(), 0);
    }

    #[tokio::test]
    async fn failing_entry_point_is_generation_empty() {
        let factory = StubFactory::new(|| StubGuest::scribbling(MEMORY, 0));
        let service = service(Arc::new(fonts()), factory, InstancePolicy::Shared);

        let err = service.render(&RenderRequest::default()).await.unwrap_err();
        assert!(matches!(err, Txt2SvgError::GenerationEmpty));
        assert_eq!(err.to_string(), "E401: Generated SVG is empty");
    }

    #[tokio::test]
    async fn guest_trap_is_internal() {
        let factory = StubFactory::new(|| StubGuest::new(MEMORY).trapping());
        let service = service(Arc::new(fonts()), factory, InstancePolicy::Shared);

        let err = service.render(&RenderRequest::default()).await.unwrap_err();
        assert_eq!(err.code(), "E702");
    }

    struct SlowGenerator(Duration);

    impl SvgGenerator for SlowGenerator {
        fn generate(&self, _text: &str, _font: &[u8], _color: &str) -> Result<DecodedOutput> {
            std::thread::sleep(self.0);
            Ok(DecodedOutput::Terminated("<svg/>".to_string()))
        }
    }

    #[tokio::test]
    async fn wait_is_bounded_by_timeout() {
        let service = RenderService::new(
            Arc::new(fonts()),
            Arc::new(SlowGenerator(Duration::from_millis(500))),
        )
        .with_timeout(Some(Duration::from_millis(20)));

        let err = service.render(&RenderRequest::default()).await.unwrap_err();
        assert!(matches!(err, Txt2SvgError::WasmTimeout { timeout_ms: 20, .. }));
    }

    #[tokio::test]
    async fn concurrent_requests_on_shared_instance() {
        let factory = echo_factory();
        let service = Arc::new(service(
            Arc::new(fonts()),
            factory.clone(),
            InstancePolicy::Shared,
        ));

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let service = Arc::clone(&service);
                tokio::spawn(async move {
                    let text = format!("request {}", i);
                    let request = RenderRequest::default().with_text(text.clone());
                    let svg = service.render(&request).await.unwrap();
                    assert!(svg.contains(&format!(">{}<", text)));
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }
        assert_eq!(factory.instantiations(), 1);
    }

    #[tokio::test]
    async fn per_request_policy() {
        let factory = echo_factory();
        let service = service(Arc::new(fonts()), factory.clone(), InstancePolicy::PerRequest);

        for _ in 0..3 {
            service.render(&RenderRequest::default()).await.unwrap();
        }
        assert_eq!(factory.instantiations(), 3);
    }
}
