use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use aesthete_core::{fixtures, EngineConfig, EngineError, MeasurementReport};
use aesthete_pipeline::{
    AnalysisOptions, AnalysisService, CacheStatus, MeasurementProvider, MemoryCacheStore, PipelineConfig,
    PipelineError, ProviderError,
};
use assert_matches::assert_matches;

/// Provider returning a fixed payload after an optional delay.
struct FakeProvider {
    payload: String,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeProvider {
    fn new(report: &MeasurementReport) -> Self {
        Self {
            payload: serde_json::to_string(report).unwrap(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn raw(payload: &str) -> Self {
        Self {
            payload: payload.to_string(),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl MeasurementProvider for FakeProvider {
    async fn measure(&self, _photo: &[u8], _options: &AnalysisOptions) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        Ok(self.payload.clone())
    }
}

type Service = AnalysisService<Arc<FakeProvider>, Arc<MemoryCacheStore>>;

fn service_with(provider: &Arc<FakeProvider>, store: &Arc<MemoryCacheStore>, config: PipelineConfig) -> Service {
    AnalysisService::new(
        Arc::clone(provider),
        Arc::clone(store),
        EngineConfig::standard().unwrap(),
        config,
    )
}

fn service(provider: &Arc<FakeProvider>) -> (Service, Arc<MemoryCacheStore>) {
    let store = Arc::new(MemoryCacheStore::new());
    (service_with(provider, &store, PipelineConfig::default()), store)
}

fn options() -> AnalysisOptions {
    AnalysisOptions::new(4, "en")
}

// -- caching ------------------------------------------------------------------

#[tokio::test]
async fn second_identical_request_hits() {
    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(true)));
    let (service, _) = service(&provider);

    let first = service.analyze(b"photo-bytes", &options()).await.unwrap();
    let second = service.analyze(b"photo-bytes", &options()).await.unwrap();

    assert_eq!(first.cache_status, CacheStatus::Miss);
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.response, second.response);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn concurrent_identical_requests_call_provider_once() {
    let provider = Arc::new(FakeProvider::new(&fixtures::body_report(true)).slow(Duration::from_millis(100)));
    let (service, _) = service(&provider);
    let service = Arc::new(service);

    let requests = (0..10).map(|_| {
        let service = Arc::clone(&service);
        async move { service.analyze(b"same-photo", &options()).await }
    });
    let outcomes = futures::future::join_all(requests).await;

    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    let responses: Vec<_> = outcomes.into_iter().map(|o| o.unwrap().response).collect();
    assert!(responses.windows(2).all(|w| w[0] == w[1]));
}

#[tokio::test]
async fn reordered_options_share_cache_entry() {
    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(false)));
    let (service, _) = service(&provider);

    let a: AnalysisOptions =
        serde_json::from_str(r#"{"variations": 3, "locale": "en", "extra": {"lens": "wide", "flash": false}}"#)
            .unwrap();
    let b: AnalysisOptions =
        serde_json::from_str(r#"{"extra": {"flash": false, "lens": "wide"}, "locale": "en", "variations": 3}"#)
            .unwrap();

    let first = service.analyze(b"photo", &a).await.unwrap();
    let second = service.analyze(b"photo", &b).await.unwrap();
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.response.seed, second.response.seed);
    assert_eq!(first.response.variation_order.len(), 3);
}

#[tokio::test]
async fn data_url_and_raw_bytes_share_cache_entry() {
    use base64::{engine::general_purpose::STANDARD as B64, Engine as _};

    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(false)));
    let (service, _) = service(&provider);
    let raw = b"\xff\xd8\xff fake jpeg";
    let wrapped = format!("data:image/jpeg;base64,{}", B64.encode(raw));

    let first = service.analyze(raw, &options()).await.unwrap();
    let second = service.analyze(wrapped.as_bytes(), &options()).await.unwrap();
    assert_eq!(second.cache_status, CacheStatus::Hit);
    assert_eq!(first.response.content_hash, second.response.content_hash);
}

#[tokio::test]
async fn schema_version_change_is_a_miss() {
    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(false)));
    let store = Arc::new(MemoryCacheStore::new());
    let v1 = service_with(&provider, &store, PipelineConfig::default());
    let v2 = service_with(
        &provider,
        &store,
        PipelineConfig {
            schema_version: PipelineConfig::default().schema_version + 1,
            ..PipelineConfig::default()
        },
    );

    v1.analyze(b"photo", &options()).await.unwrap();
    let outcome = v2.analyze(b"photo", &options()).await.unwrap();
    assert_eq!(outcome.cache_status, CacheStatus::Miss);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

// -- failures -----------------------------------------------------------------

#[tokio::test]
async fn slow_provider_times_out_and_caches_nothing() {
    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(false)).slow(Duration::from_secs(5)));
    let store = Arc::new(MemoryCacheStore::new());
    let service = service_with(
        &provider,
        &store,
        PipelineConfig {
            upstream_timeout_secs: 1,
            ..PipelineConfig::default()
        },
    );

    let err = service.analyze(b"photo", &options()).await.unwrap_err();
    assert!(err.is_retryable());
    assert_matches!(
        err,
        PipelineError::Engine(EngineError::UpstreamComputationFailure(msg)) if msg.contains("timed out")
    );
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn rejected_photo_is_distinct_from_upstream_failure() {
    let mut report = fixtures::face_report(false);
    if let MeasurementReport::Face(m) = &mut report {
        m.front.pose.yaw = 45.0;
    }
    let provider = Arc::new(FakeProvider::new(&report));
    let (service, store) = service(&provider);

    let err = service.analyze(b"photo", &options()).await.unwrap_err();
    assert!(!err.is_retryable());
    assert_matches!(err, PipelineError::Engine(EngineError::ValidationRejected(_)));
    assert!(store.is_empty().await);

    // Rejections are not cached: the provider is consulted again.
    let _ = service.analyze(b"photo", &options()).await;
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn garbage_payload_is_retryable_upstream_failure() {
    let provider = Arc::new(FakeProvider::raw(r#"{"domain": "face", "harmony": "nope"}"#));
    let (service, store) = service(&provider);

    let err = service.analyze(b"photo", &options()).await.unwrap_err();
    assert!(err.is_retryable());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn invalid_options_never_reach_provider() {
    let provider = Arc::new(FakeProvider::new(&fixtures::face_report(false)));
    let (service, _) = service(&provider);

    let err = service.analyze(b"photo", &AnalysisOptions::new(0, "en")).await.unwrap_err();
    assert_matches!(err, PipelineError::InvalidOptions(_));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

// -- validation only ----------------------------------------------------------

#[tokio::test]
async fn validate_reports_every_photo() {
    let provider = Arc::new(FakeProvider::new(&fixtures::body_report(true)));
    let (service, store) = service(&provider);

    let validations = service.validate(b"photo", &options()).await.unwrap();
    assert_eq!(validations.len(), 3);
    assert!(validations.iter().all(|v| v.is_valid));
    assert!(store.is_empty().await);
}
