//! Integration tests for the service facade.
//!
//! These tests drive the public API end-to-end with scripted collaborators:
//! - MODIS lookups through a scripted HTTP client (date snapping, caching)
//! - Scheduled scan followed by the stress update broadcast
//! - Outbreak push with per-device failure isolation
//! - Nearby query over recorded outbreaks

use chrono::{NaiveDate, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wheatguard::cache::MemoryValueCache;
use wheatguard::events::{EventTopic, OutbreakEvent, RealtimeEvent};
use wheatguard::fetcher::{FetcherConfig, IndexFetcher};
use wheatguard::provider::{AsyncHttpClient, IndexProvider, ModisProvider, ProviderError};
use wheatguard::push::{PushError, PushNotification, PushSender};
use wheatguard::scheduler::{Scheduler, Trigger, DAILY_SCAN_JOB_ID};
use wheatguard::service::{ServiceConfig, Stores, WheatGuardService};
use wheatguard::stress::StressSeverity;

// =============================================================================
// Test Helpers
// =============================================================================

/// HTTP client answering every GET with the same body and recording URLs.
#[derive(Clone)]
struct ScriptedHttp {
    body: String,
    urls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttp {
    fn new(body: &str) -> Self {
        Self {
            body: body.to_string(),
            urls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }
}

impl AsyncHttpClient for ScriptedHttp {
    async fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.urls.lock().unwrap().push(url.to_string());
        Ok(self.body.clone().into_bytes())
    }

    async fn post_form(&self, url: &str, _form: &[(&str, &str)]) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::HttpStatus {
            status: 405,
            url: url.to_string(),
        })
    }

    async fn post_json(
        &self,
        url: &str,
        _json_body: &str,
        _headers: &[(&str, &str)],
    ) -> Result<Vec<u8>, ProviderError> {
        Err(ProviderError::HttpStatus {
            status: 405,
            url: url.to_string(),
        })
    }
}

/// Provider that never has a value.
struct EmptyProvider;

impl IndexProvider for EmptyProvider {
    async fn lookup(
        &self,
        _coord: wheatguard::coord::Coordinate,
        _date: Option<NaiveDate>,
    ) -> Result<Option<f64>, ProviderError> {
        Ok(None)
    }

    fn name(&self) -> &str {
        "empty"
    }
}

/// Push sender that fails for chosen tokens.
#[derive(Clone, Default)]
struct FlakySender {
    failing: Vec<String>,
    delivered: Arc<Mutex<HashMap<String, PushNotification>>>,
}

impl PushSender for FlakySender {
    async fn send(&self, notification: &PushNotification) -> Result<(), PushError> {
        if self.failing.contains(&notification.token) {
            return Err(PushError::Delivery("device unregistered".to_string()));
        }
        self.delivered
            .lock()
            .unwrap()
            .insert(notification.token.clone(), notification.clone());
        Ok(())
    }
}

fn modis_service(http: ScriptedHttp) -> WheatGuardService<ModisProvider<ScriptedHttp>, FlakySender> {
    let provider = ModisProvider::new(http, Duration::from_secs(5))
        .with_base_url("http://modis.test/MOD13Q1");
    let fetcher = IndexFetcher::new(
        provider,
        Arc::new(MemoryValueCache::new(1_000)),
        FetcherConfig::default(),
    );
    WheatGuardService::new(ServiceConfig::default(), fetcher, Stores::in_memory(), None)
}

fn empty_service(sender: Option<FlakySender>) -> WheatGuardService<EmptyProvider, FlakySender> {
    let fetcher = IndexFetcher::new(
        EmptyProvider,
        Arc::new(MemoryValueCache::new(10)),
        FetcherConfig::default(),
    );
    WheatGuardService::new(ServiceConfig::default(), fetcher, Stores::in_memory(), sender)
}

/// Offsets a coordinate north by the given distance.
fn north_of(lat: f64, km: f64) -> f64 {
    lat + km / 111.195
}

// =============================================================================
// Index queries
// =============================================================================

#[tokio::test]
async fn test_point_query_snaps_date_and_caches() {
    let http = ScriptedHttp::new(r#"{"ndvi": 0.61234}"#);
    let service = modis_service(http.clone());
    let date = NaiveDate::from_ymd_opt(2024, 1, 20);

    let first = service.point_index(30.9, 75.85, date).await.unwrap();
    let second = service.point_index(30.9, 75.85, date).await.unwrap();

    assert_eq!(first.date_used, NaiveDate::from_ymd_opt(2024, 1, 17));
    assert_eq!(first.value, Some(0.612));
    assert_eq!(first.status, "Healthy");
    assert_eq!(second.value, Some(0.612));

    let urls = http.urls();
    assert_eq!(urls.len(), 1, "second query must be served from cache");
    assert!(urls[0].contains("date=2024-01-17"));
    assert!(urls[0].contains("latitude=30.9"));

    // Both answers were recorded as samples.
    assert_eq!(service.sample_history(30.9, 75.85).unwrap().len(), 2);
}

#[tokio::test]
async fn test_null_value_is_reported_as_no_data() {
    let service = modis_service(ScriptedHttp::new(r#"{"ndvi": null}"#));

    let response = service.point_index(30.9, 75.85, None).await.unwrap();

    assert_eq!(response.value, None);
    assert_eq!(response.status, "no data");
    assert!(response.date_used.is_some());
}

#[tokio::test]
async fn test_polygon_without_values_is_no_data() {
    let service = empty_service(None);
    let ring = serde_json::json!({
        "geometry": {"coordinates": [[[1.0, 1.0], [1.0, 1.1], [1.1, 1.1], [1.0, 1.0]]]}
    });

    let response = service.polygon_index_geojson(&ring, None).await.unwrap();

    assert_eq!(response.average, None);
    assert_eq!(response.status, "no data");
    assert!(service.sample_history(1.0, 1.0).unwrap().is_empty());
}

// =============================================================================
// Scheduled scan and broadcast
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_scheduled_scan_broadcasts_alert_set() {
    let service = empty_service(None);
    for value in [0.78, 0.76, 0.74, 0.71, 0.70, 0.68, 0.45, 0.40] {
        service.ingest_sample(30.90001, 75.85001, value).unwrap();
    }
    // Too short a history to be judged.
    for value in [0.8, 0.1] {
        service.ingest_sample(10.0, 10.0, value).unwrap();
    }

    let mut updates = service.broadcaster().subscribe_topic(EventTopic::NdviStressUpdate);
    let scheduler = Scheduler::new(CancellationToken::new());
    scheduler.schedule(
        DAILY_SCAN_JOB_ID,
        Trigger::Interval(Duration::from_secs(60)),
        Arc::new(service.scan_job()),
    );

    let event = updates.recv().await.unwrap();
    let RealtimeEvent::NdviStressUpdate(alerts) = event else {
        panic!("expected a stress update");
    };
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, StressSeverity::High);
    assert_eq!(alerts[0].baseline, 0.689);
    assert_eq!(alerts[0].current, 0.4);
    assert_eq!(alerts[0].drop, 0.289);
    assert_eq!(alerts[0].lat, 30.9);

    // The next cycle replaces the set with an identical one.
    let event = updates.recv().await.unwrap();
    let RealtimeEvent::NdviStressUpdate(again) = event else {
        panic!("expected a stress update");
    };
    assert_eq!(again.len(), 1);
    assert_eq!(again[0].severity, StressSeverity::High);
    assert_eq!(service.active_alerts().unwrap().len(), 1);

    scheduler.shutdown().await;
}

#[test]
fn test_recovered_location_loses_its_alert() {
    let service = empty_service(None);
    for value in [0.8, 0.8, 0.8, 0.3] {
        service.ingest_sample(5.0, 5.0, value).unwrap();
    }
    assert_eq!(service.trigger_scan().unwrap().alerts_created, 1);

    for value in [0.8, 0.8, 0.8] {
        service.ingest_sample(5.0, 5.0, value).unwrap();
    }
    assert_eq!(service.trigger_scan().unwrap().alerts_created, 0);
    assert!(service.active_alerts().unwrap().is_empty());
}

// =============================================================================
// Outbreak fan-out
// =============================================================================

#[tokio::test]
async fn test_outbreak_push_isolates_failures() {
    let sender = FlakySender {
        failing: vec!["tok-broken".to_string()],
        ..Default::default()
    };
    let service = empty_service(Some(sender.clone()));
    let mut alerts = service.broadcaster().subscribe_topic(EventTopic::NewAlert);

    service
        .register_device("a", "tok-a", Some(north_of(20.0, 4.9)), Some(70.0))
        .unwrap();
    service
        .register_device("b", "tok-broken", Some(north_of(20.0, 1.0)), Some(70.0))
        .unwrap();
    service
        .register_device("c", "tok-c", Some(north_of(20.0, 5.1)), Some(70.0))
        .unwrap();
    service.register_device("d", "tok-d", None, None).unwrap();

    let outcome = service
        .record_outbreak(OutbreakEvent {
            id: 42,
            disease: "Yellow Rust".to_string(),
            severity: "High".to_string(),
            cases: 12,
            lat: 20.0,
            lon: 70.0,
            source: Some("field report".to_string()),
            timestamp: Utc::now(),
        })
        .await
        .unwrap();

    let report = outcome.push.unwrap();
    assert_eq!(report.considered, 4);
    assert_eq!(report.in_range, 2);
    assert_eq!(report.delivered, 1);
    assert_eq!(report.failed, 1);

    let delivered = sender.delivered.lock().unwrap();
    let notification = &delivered["tok-a"];
    assert_eq!(notification.title, "Disease Alert: Yellow Rust");
    assert!(notification.body.starts_with("High severity near your area (4.9"));
    assert!(!delivered.contains_key("tok-c"));
    drop(delivered);

    match alerts.recv().await {
        Some(RealtimeEvent::NewAlert(event)) => assert_eq!(event.id, 42),
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test]
async fn test_nearby_query_returns_recorded_outbreaks() {
    let service = empty_service(None);
    for (id, km) in [(1, 5.1), (2, 4.9), (3, 0.2)] {
        service
            .record_outbreak(OutbreakEvent {
                id,
                disease: "Karnal bunt".to_string(),
                severity: "Moderate".to_string(),
                cases: 2,
                lat: north_of(20.0, km),
                lon: 70.0,
                source: None,
                timestamp: Utc::now(),
            })
            .await
            .unwrap();
    }

    let nearby = service.nearby_alerts(20.0, 70.0).unwrap();

    let found: Vec<(u64, f64)> = nearby.iter().map(|a| (a.id, a.distance_km)).collect();
    assert_eq!(found, vec![(3, 0.2), (2, 4.9)]);
    let json = serde_json::to_value(&nearby[1]).unwrap();
    assert_eq!(json["distance_km"], 4.9);
    assert_eq!(json["cases"], 2);
}
