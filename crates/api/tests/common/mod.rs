#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use napwatch_core::audit_config::AuditConfiguration;
use napwatch_core::identity::{Address, MasterIdentityRecord};
use napwatch_core::platform::{PlatformTarget, RawSnapshot};
use napwatch_core::store::MemoryReportStore;
use napwatch_events::LogSink;
use napwatch_pipeline::{AuditEngine, Scheduler};
use napwatch_providers::FixtureProvider;
use tower::ServiceExt;

use napwatch_api::config::ServerConfig;
use napwatch_api::router::build_app_router;
use napwatch_api::state::AppState;

/// Test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        seed_path: "config/seed.json".to_string(),
        alert_webhook_urls: Vec::new(),
        fetch_timeout_secs: 5,
        fetch_max_attempts: 1,
        fixture_path: None,
    }
}

pub fn master_record() -> MasterIdentityRecord {
    MasterIdentityRecord {
        name: "Kiez Dental Praxis".into(),
        address: Address {
            street: "Torstrasse 1".into(),
            city: "Berlin".into(),
            region: "Berlin".into(),
            postal_code: "10119".into(),
            country: "DE".into(),
        },
        phone: "+49 30 12345678".into(),
        email: Some("info@kiez-dental.de".into()),
        website: "https://kiez-dental.de".into(),
        coordinates: None,
        updated_at: chrono::Utc::now(),
    }
}

pub fn snapshot_with_city(city: &str) -> RawSnapshot {
    let mut address = master_record().address;
    address.city = city.into();
    RawSnapshot {
        name: "Kiez Dental Praxis".into(),
        address,
        phone: "030 12345678".into(),
        email: None,
        website: None,
        verified: true,
        last_updated: None,
    }
}

pub struct TestApp {
    pub router: Router,
    pub engine: Arc<AuditEngine>,
    pub scheduler: Arc<Scheduler>,
    pub provider: Arc<FixtureProvider>,
}

/// Two fixture platforms: `maps` matches the master record, `directory`
/// lists the city as `Berlin-Mitte`.
pub async fn build_test_app() -> TestApp {
    let provider = Arc::new(FixtureProvider::new());
    provider.set_snapshot("maps", snapshot_with_city("Berlin")).await;
    provider
        .set_snapshot("directory", snapshot_with_city("Berlin-Mitte"))
        .await;

    let config = AuditConfiguration::with_platforms(vec![
        PlatformTarget::new("maps", "fixture://maps"),
        PlatformTarget::new("directory", "fixture://directory"),
    ]);
    let engine = AuditEngine::new(
        master_record(),
        config,
        provider.clone(),
        Arc::new(LogSink),
        Arc::new(MemoryReportStore::new()),
    )
    .expect("valid configuration");
    let scheduler = Arc::new(Scheduler::new(engine.clone()));

    let server_config = test_config();
    let state = AppState {
        engine: engine.clone(),
        scheduler: scheduler.clone(),
        pool: None,
        config: Arc::new(server_config.clone()),
    };

    TestApp {
        router: build_app_router(state, &server_config),
        engine,
        scheduler,
        provider,
    }
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_empty(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
