//! Failure injection against real sockets through the reqwest executor.

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use tokio::sync::mpsc;

use egress_hub::config::{HubConfig, PathConfig, PathKind, RetryConfig};
use egress_hub::health::HealthStatus;
use egress_hub::{Hub, HubRequest};

mod common;

fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_attempts: 2,
        base_delay_ms: 10,
        max_delay_ms: 50,
    }
}

fn hub(paths: Vec<PathConfig>) -> Hub {
    let config = HubConfig {
        paths,
        retries: fast_retries(),
        ..HubConfig::default()
    };
    Hub::from_config(config).expect("valid config")
}

/// Backend that records every request head and answers `200 body`.
async fn recording_backend(body: &'static str) -> (SocketAddr, mpsc::UnboundedReceiver<String>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let addr = common::start_programmable_backend(move |head| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(head);
            (200, body.to_string())
        }
    })
    .await;
    (addr, rx)
}

#[tokio::test]
async fn test_dead_direct_fails_over_to_relay() {
    let dead = common::closed_addr().await;
    let (relay, mut heads) = recording_backend("via relay").await;

    let hub = hub(vec![
        PathConfig::direct("direct", 0),
        PathConfig::forwarding(
            "relay",
            PathKind::Relay,
            3,
            &format!("http://{relay}/fetch"),
            Some("relay-token".into()),
        ),
    ]);

    let target = format!("http://{dead}/live/stream.m3u8");
    let res = hub.dispatch(&HubRequest::get(&target).unwrap()).await;

    assert!(res.success, "error: {:?}", res.error);
    assert_eq!(res.provider, "relay");
    assert_eq!(res.status, 200);
    assert_eq!(res.text(), "via relay");

    let head = heads.recv().await.unwrap().to_ascii_lowercase();
    assert!(head.starts_with("get /fetch?url=http%3a%2f%2f127.0.0.1"));
    assert!(head.contains("authorization: bearer relay-token"));
    assert!(head.contains("x-forwarded-for: "));

    let direct = hub.registry().get("direct").unwrap();
    assert_eq!(direct.failure_count, 2);
    assert_eq!(hub.registry().get("relay").unwrap().success_count, 1);
}

#[tokio::test]
async fn test_scraper_api_receives_key_and_target() {
    let (scraper, mut heads) = recording_backend("scraped").await;

    let hub = hub(vec![PathConfig::forwarding(
        "scraperapi",
        PathKind::ScraperApi,
        1,
        &format!("http://{scraper}/"),
        Some("k-123".into()),
    )]);

    let res = hub
        .dispatch(&HubRequest::get("https://music.example/track?id=7").unwrap())
        .await;
    assert!(res.success);
    assert_eq!(res.provider, "scraperapi");

    let head = heads.recv().await.unwrap();
    let request_line = head.lines().next().unwrap();
    assert!(request_line
        .starts_with("GET /?api_key=k-123&url=https%3A%2F%2Fmusic.example%2Ftrack%3Fid%3D7 "));
}

#[tokio::test]
async fn test_bright_data_uses_authenticated_proxy() {
    let (proxy, mut heads) = recording_backend("proxied").await;

    let hub = hub(vec![PathConfig::forwarding(
        "brightdata",
        PathKind::BrightData,
        2,
        &format!("http://{proxy}"),
        Some("u:p".into()),
    )]);

    let res = hub
        .dispatch(&HubRequest::get("http://upstream.example/page").unwrap())
        .await;
    assert!(res.success, "error: {:?}", res.error);
    assert_eq!(res.provider, "brightdata");

    let head = heads.recv().await.unwrap();
    // Absolute-form target means the request went through the proxy.
    assert!(head.starts_with("GET http://upstream.example/page HTTP/1.1"));
    // base64("u:p")
    assert!(head.to_ascii_lowercase().contains("proxy-authorization: basic dtpw"));
}

#[tokio::test]
async fn test_retry_same_path_after_503() {
    let calls = Arc::new(AtomicU32::new(0));
    let counter = calls.clone();
    let addr = common::start_programmable_backend(move |_| {
        let counter = counter.clone();
        async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                (503, "busy".into())
            } else {
                (200, "ok".into())
            }
        }
    })
    .await;

    let hub = hub(vec![PathConfig::direct("direct", 0)]);
    let res = hub
        .dispatch(&HubRequest::get(&format!("http://{addr}/")).unwrap())
        .await;

    assert!(res.success);
    assert_eq!(res.provider, "direct");
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let history = hub.history("direct").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].consecutive_failures, 1);
    assert_eq!(history[1].consecutive_failures, 0);
}

#[tokio::test]
async fn test_error_status_exhausts_with_aggregated_errors() {
    let addr = common::start_programmable_backend(|_| async { (404, "gone".into()) }).await;

    let hub = hub(vec![PathConfig::direct("direct", 0)]);
    let res = hub
        .dispatch(&HubRequest::get(&format!("http://{addr}/missing")).unwrap())
        .await;

    assert!(!res.success);
    assert_eq!(res.provider, "none");
    assert_eq!(res.error.as_deref(), Some("direct: HTTP 404; direct: HTTP 404"));
}

#[tokio::test]
async fn test_path_without_credential_starts_disabled() {
    let (relay, _heads) = recording_backend("ok").await;
    let mut scraper = PathConfig::forwarding(
        "scraperapi",
        PathKind::ScraperApi,
        1,
        "https://api.scraperapi.com/",
        None,
    );
    scraper.credential_env = Some("EGRESS_HUB_TEST_UNSET_SCRAPER_KEY".into());

    let hub = hub(vec![
        scraper,
        PathConfig::forwarding(
            "relay",
            PathKind::Relay,
            3,
            &format!("http://{relay}/"),
            Some("t".into()),
        ),
    ]);

    let snapshot = hub.snapshot();
    let scraper = snapshot.iter().find(|p| p.name == "scraperapi").unwrap();
    assert!(!scraper.enabled);

    let res = hub
        .dispatch(&HubRequest::get("http://upstream.example/").unwrap())
        .await;
    assert_eq!(res.provider, "relay");
}

#[tokio::test]
async fn test_probe_against_live_endpoint_rehabilitates() {
    let probe = common::start_mock_backend("ok").await;

    let mut config = HubConfig {
        paths: vec![PathConfig::direct("direct", 0)],
        ..HubConfig::default()
    };
    config.health_check.probe_url = format!("http://{probe}/status/200");
    let hub = Hub::from_config(config).unwrap();

    for _ in 0..5 {
        hub.registry()
            .record_outcome("direct", false, std::time::Duration::ZERO);
    }
    assert_eq!(hub.registry().get("direct").unwrap().status, HealthStatus::Unhealthy);

    let reports = hub.monitor().probe_all().await;
    assert_eq!(reports.len(), 1);
    assert!(reports[0].success);
    assert!(reports[0].rehabilitated);
    assert_eq!(hub.registry().get("direct").unwrap().status, HealthStatus::Degraded);
}
