//! API integration tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use bw_api::{create_router, ApiConfig, AppState, VideoPipeline, WeatherWorkflow};
use bw_genai::{
    GenAiError, GenAiResult, ImageSynthesizer, OperationStatus, VideoJobRunner, VideoProvider,
    VideoResult,
};
use bw_maps::{GeoError, GeoResult, LocationResolver};
use bw_models::{LocationQuery, OperationHandle, PRESETS_OBJECT};
use bw_storage::{ObjectStore, StorageError, StorageResult, StoredObject};

struct KnownCities;

#[async_trait]
impl LocationResolver for KnownCities {
    async fn resolve(&self, query: &LocationQuery) -> GeoResult<String> {
        match query {
            LocationQuery::City(name) if name == "Nowhere" => Err(GeoError::CityNotFound),
            LocationQuery::City(name) => Ok(format!("{}, Testland", name)),
            LocationQuery::Coordinates { .. } => Ok("Paris, France".to_string()),
        }
    }
}

struct PngImages;

#[async_trait]
impl ImageSynthesizer for PngImages {
    async fn synthesize(&self, city: &str, _extra_context: Option<&str>) -> GenAiResult<Vec<u8>> {
        if city.starts_with("Broken") {
            return Err(GenAiError::synthesis("no image data found in response"));
        }
        Ok(b"png".to_vec())
    }
}

#[derive(Default)]
struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    fn with_object(key: &str, data: &[u8]) -> Self {
        let store = Self::default();
        store
            .objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());
        store
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn upload(&self, data: Vec<u8>, key: &str, _content_type: &str) -> StorageResult<StoredObject> {
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(StoredObject {
            uri: format!("gs://media/{}", key),
            public_url: format!("https://storage.googleapis.com/media/{}", key),
        })
    }

    async fn read(&self, key: &str) -> StorageResult<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(key))
    }
}

struct InstantVideo;

#[async_trait]
impl VideoProvider for InstantVideo {
    async fn submit(&self, _source_image_uri: &str, _prompt: &str) -> VideoResult<OperationHandle> {
        Ok(OperationHandle::from_string("operations/42"))
    }

    async fn poll(&self, _handle: &OperationHandle) -> VideoResult<OperationStatus> {
        Ok(OperationStatus::Done(
            json!({"videos": [{"gcsUri": "gs://media/videos/42/sample_0.mp4"}]}),
        ))
    }
}

fn image_only_app() -> Router {
    let workflow = WeatherWorkflow::new(Arc::new(KnownCities), Arc::new(PngImages));
    create_router(AppState::new(ApiConfig::default(), workflow, None), None)
}

fn app_with_store(store: Arc<MemoryStore>) -> Router {
    let runner = VideoJobRunner::new(Arc::new(InstantVideo))
        .with_poll_interval(Duration::from_millis(10));
    let workflow = WeatherWorkflow::new(Arc::new(KnownCities), Arc::new(PngImages)).with_video(
        VideoPipeline {
            store: store.clone(),
            runner: Arc::new(runner),
        },
    );
    create_router(
        AppState::new(ApiConfig::default(), workflow, Some(store)),
        None,
    )
}

async fn get(app: Router, uri: &str, accept: Option<&str>) -> (StatusCode, axum::http::HeaderMap, String) {
    let mut request = Request::builder().uri(uri);
    if let Some(accept) = accept {
        request = request.header(header::ACCEPT, accept);
    }

    let response = app
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
}

/// Split an SSE body into `(event, data)` pairs, skipping keep-alive comments.
fn parse_sse(body: &str) -> Vec<(String, String)> {
    body.split("\n\n")
        .filter_map(|frame| {
            let mut event = None;
            let mut data: Vec<&str> = Vec::new();
            for line in frame.lines() {
                if let Some(v) = line.strip_prefix("event:") {
                    event = Some(v.trim().to_string());
                } else if let Some(v) = line.strip_prefix("data:") {
                    data.push(v.strip_prefix(' ').unwrap_or(v));
                }
            }
            event.map(|e| (e, data.join("\n")))
        })
        .collect()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (status, _, body) = get(image_only_app(), "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_ready_in_image_only_mode() {
    let (status, _, body) = get(image_only_app(), "/ready", None).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["video_enabled"], false);
    assert_eq!(body["checks"]["storage"]["status"], "disabled");
}

#[tokio::test]
async fn test_ready_with_empty_bucket() {
    let (status, _, body) = get(app_with_store(Arc::new(MemoryStore::default())), "/ready", None).await;

    // A bucket without a registry yet is still reachable.
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "ready");
    assert_eq!(body["video_enabled"], true);
    assert_eq!(body["checks"]["storage"]["status"], "ok");
}

#[tokio::test]
async fn test_security_headers_are_set() {
    let (_, headers, _) = get(image_only_app(), "/health", None).await;

    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert!(headers.get("X-Request-ID").is_some());
}

#[tokio::test]
async fn test_invalid_coordinates_are_rejected() {
    let (status, headers, body) =
        get(image_only_app(), "/api/weather?lat=abc&lng=2.35", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_ne!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["detail"].as_str().unwrap().contains("invalid latitude"));
}

#[tokio::test]
async fn test_weather_streams_events_in_order() {
    let (status, headers, body) =
        get(image_only_app(), "/api/weather?city=Paris", Some("text/event-stream")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "text/event-stream"
    );

    let events = parse_sse(&body);
    let kinds: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();
    assert_eq!(kinds, vec!["status", "status", "status", "result"]);

    assert_eq!(events[0].1, "Identifying location...");
    assert_eq!(events[1].1, "Found location: Paris, Testland");
    assert_eq!(
        events[2].1,
        "Getting a banana image of the weather for Paris, Testland..."
    );

    let payload: Value = serde_json::from_str(&events[3].1).unwrap();
    assert_eq!(payload["city"], "Paris, Testland");
    assert_eq!(payload["image_base64"], "cG5n");
}

#[tokio::test]
async fn test_weather_by_coordinates() {
    let (_, _, body) = get(image_only_app(), "/api/weather?lat=48.85&lng=2.35", None).await;

    let events = parse_sse(&body);
    assert_eq!(events[1].1, "Found location: Paris, France");
}

#[tokio::test]
async fn test_unknown_city_ends_with_error() {
    let (status, _, body) = get(image_only_app(), "/api/weather?city=Nowhere", None).await;

    // The stream itself succeeds; failures travel as events.
    assert_eq!(status, StatusCode::OK);
    let events = parse_sse(&body);
    let last = events.last().unwrap();
    assert_eq!(last.0, "error");
    assert!(last.1.starts_with("Failed to find city: "));
}

#[tokio::test]
async fn test_weather_with_video() {
    let store = Arc::new(MemoryStore::default());
    let (_, _, body) = get(
        app_with_store(store.clone()),
        "/api/weather?city=Tokyo",
        Some("text/event-stream"),
    )
    .await;

    let events = parse_sse(&body);
    let kinds: Vec<&str> = events.iter().map(|(e, _)| e.as_str()).collect();
    assert_eq!(
        kinds,
        vec!["status", "status", "status", "result", "status", "status", "status", "video"]
    );
    assert_eq!(
        events.last().unwrap().1,
        "https://storage.googleapis.com/media/videos/42/sample_0.mp4"
    );

    // The source image was uploaded for animation.
    let objects = store.objects.lock().unwrap();
    assert!(objects.keys().any(|k| k.starts_with("image_") && k.ends_with(".png")));
}

#[tokio::test]
async fn test_json_fallback_when_event_stream_not_accepted() {
    let (status, headers, body) =
        get(image_only_app(), "/api/weather?city=Paris", Some("application/json")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers.get(header::CONTENT_TYPE).unwrap(),
        "application/json"
    );

    let events: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0]["event"], "status");
    assert_eq!(events[0]["data"], "Identifying location...");
    assert_eq!(events[3]["event"], "result");
}

#[tokio::test]
async fn test_presets_fallback_without_storage() {
    let (status, _, body) = get(image_only_app(), "/api/presets", None).await;

    assert_eq!(status, StatusCode::OK);
    let presets: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(presets.len(), 1);
    assert_eq!(presets[0]["id"], "ft_collins");
}

#[tokio::test]
async fn test_presets_from_registry() {
    let registry = json!([
        {"id": "tokyo", "name": "Tokyo", "category": "Asia", "image_url": "https://i", "video_url": "https://v"}
    ]);
    let store = Arc::new(MemoryStore::with_object(
        PRESETS_OBJECT,
        registry.to_string().as_bytes(),
    ));

    let (status, _, body) = get(app_with_store(store), "/api/presets", None).await;

    assert_eq!(status, StatusCode::OK);
    let presets: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(presets, registry.as_array().unwrap().clone());
}

#[tokio::test]
async fn test_presets_fallback_on_corrupt_registry() {
    let store = Arc::new(MemoryStore::with_object(PRESETS_OBJECT, b"not json"));

    let (_, _, body) = get(app_with_store(store), "/api/presets", None).await;

    let presets: Vec<Value> = serde_json::from_str(&body).unwrap();
    assert_eq!(presets[0]["id"], "ft_collins");
}
