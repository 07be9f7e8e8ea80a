// Integration tests for `BridgeClient` using wiremock.
#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bridgectl_api::{BridgeClient, Error, RebootOutcome, SbusMode};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let client =
        BridgeClient::with_client(reqwest::Client::new(), Url::parse(&server.uri()).unwrap());
    (server, client)
}

// ── Reads ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_config_returns_raw_document() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "device1Role": 1,
            "device4TargetIp": "10.0.0.5",
            "boardType": "xiao"
        })))
        .mount(&server)
        .await;

    let config = client.get_config().await.unwrap();
    assert_eq!(config["device1Role"], 1);
    assert_eq!(config["boardType"], "xiao");
}

#[tokio::test]
async fn test_get_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "deviceName": "UART Bridge",
            "version": "2.18.3",
            "uptime": 3600,
            "freeRam": 120_000,
            "device1Rx": 10,
            "device1Tx": 20,
            "lastActivity": "3 seconds ago",
            "protocolStats": { "packetsDetected": 5 }
        })))
        .mount(&server)
        .await;

    let status = client.get_status().await.unwrap();
    assert_eq!(status.device_name, "UART Bridge");
    assert_eq!(status.uptime, 3600);
    assert_eq!(status.device1_tx, 20);
    assert_eq!(status.last_activity, "3 seconds ago");
    assert_eq!(status.protocol_stats.unwrap()["packetsDetected"], 5);
}

#[tokio::test]
async fn test_get_logs() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/logs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "logs": ["[INFO] boot", "[INFO] wifi up"] })),
        )
        .mount(&server)
        .await;

    let logs = client.get_logs().await.unwrap();
    assert_eq!(logs, vec!["[INFO] boot".to_owned(), "[INFO] wifi up".to_owned()]);
}

#[tokio::test]
async fn test_get_crash_log() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/crashlog_json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "total": 2,
            "entries": [
                { "num": 2, "reason": "Task watchdog", "uptime": 7200, "heap": 90000,
                  "min_heap": 60000, "time": 1_700_000_000, "version": "2.18.1" },
                { "num": 1, "reason": "Panic", "uptime": 12, "heap": 100_000,
                  "min_heap": 80000, "time": 0 }
            ]
        })))
        .mount(&server)
        .await;

    let log = client.get_crash_log().await.unwrap();
    assert_eq!(log.total, 2);
    assert_eq!(log.entries.len(), 2);
    assert_eq!(log.entries[0].version.as_deref(), Some("2.18.1"));
    assert_eq!(log.entries[1].time, 0);
}

#[tokio::test]
async fn test_sbus_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sbus/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "mode": 1,
            "state": 0,
            "activeSource": 2,
            "sources": [
                { "id": 0, "name": "Device1 (GPIO4)", "configured": true, "quality": 98,
                  "priority": 0, "hasData": true, "valid": true, "hasFailsafe": false },
                { "id": 2, "name": "Device4 (UDP)", "configured": true, "quality": 75,
                  "priority": 2, "hasData": true, "valid": true, "hasFailsafe": false }
            ],
            "framesRouted": 1000,
            "repeatedFrames": 3
        })))
        .mount(&server)
        .await;

    let status = client.sbus_status().await.unwrap();
    assert_eq!(status.mode, 1);
    assert_eq!(status.active_source, 2);
    assert_eq!(status.sources.len(), 2);
    assert!(status.sources[1].has_data);
    assert_eq!(status.repeated_frames, 3);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_sbus_source_and_mode() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sbus/set_source"))
        .and(query_param("source", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "ok", "source": 2, "mode": "manual" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/sbus/set_mode"))
        .and(query_param("mode", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok", "mode": 0 })))
        .expect(1)
        .mount(&server)
        .await;

    client.set_sbus_source(2).await.unwrap();
    client.set_sbus_mode(SbusMode::Auto).await.unwrap();
}

#[tokio::test]
async fn test_invalid_sbus_source_surfaces_device_message() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/sbus/set_source"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "status": "error", "message": "Invalid source" })),
        )
        .mount(&server)
        .await;

    let err = client.set_sbus_source(7).await.unwrap_err();
    assert!(matches!(err, Error::Http { status: 400, .. }));
    assert_eq!(err.device_message(), Some("Invalid source"));
}

#[tokio::test]
async fn test_reset_stats() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/reset_stats"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "message": "Statistics and logs cleared"
        })))
        .mount(&server)
        .await;

    let ack = client.reset_stats().await.unwrap();
    assert_eq!(ack.message.as_deref(), Some("Statistics and logs cleared"));
}

#[tokio::test]
async fn test_sync_time_sends_epoch() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/time"))
        .and(query_param("epoch", "1700000000"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    client.sync_time(1_700_000_000).await.unwrap();
}

// ── Reboot-inducing requests ────────────────────────────────────────

#[tokio::test]
async fn test_save_accepted() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .and(body_partial_json(json!({ "device1_role": 1 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "message": "Configuration saved successfully! Device restarting..."
        })))
        .mount(&server)
        .await;

    let outcome = client
        .save_config(&json!({ "device1_role": 1, "baudrate": 115_200 }))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        RebootOutcome::Accepted {
            message: "Configuration saved successfully! Device restarting...".into()
        }
    );
}

#[tokio::test]
async fn test_save_unchanged() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "unchanged",
            "message": "Configuration was not modified"
        })))
        .mount(&server)
        .await;

    let outcome = client.save_config(&json!({})).await.unwrap();
    assert!(!outcome.reboots());
}

#[tokio::test]
async fn test_save_non_json_reply_means_rebooting() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>restarting</html>"))
        .mount(&server)
        .await;

    let outcome = client.save_config(&json!({})).await.unwrap();
    assert_eq!(outcome, RebootOutcome::Rebooting);
}

#[tokio::test]
async fn test_save_refused_connection_is_an_error() {
    // Nothing listens on the discard port.
    let client =
        BridgeClient::with_client(reqwest::Client::new(), Url::parse("http://127.0.0.1:9").unwrap());

    let err = client.save_config(&json!({})).await.unwrap_err();
    assert!(matches!(err, Error::Transport(_)), "got {err:?}");
    assert!(!err.is_reboot_signal());
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_save_rejected_with_message() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "message": "Client SSID cannot be empty"
        })))
        .mount(&server)
        .await;

    let err = client.save_config(&json!({})).await.unwrap_err();
    assert_eq!(err.device_message(), Some("Client SSID cannot be empty"));
}

#[tokio::test]
async fn test_save_failure_without_message_names_status() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/save"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({})))
        .mount(&server)
        .await;

    let err = client.save_config(&json!({})).await.unwrap_err();
    assert_eq!(err.device_message(), Some("Save failed: 500"));
}

#[tokio::test]
async fn test_factory_reset() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/config/reset"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ok",
            "message": "Factory reset complete"
        })))
        .mount(&server)
        .await;

    let outcome = client.factory_reset().await.unwrap();
    assert!(outcome.reboots());
}

#[tokio::test]
async fn test_firmware_upload_uses_update_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/update"))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client
        .upload_firmware(vec![0xE9, 0x00, 0x01], "firmware.bin")
        .await
        .unwrap();
    assert_eq!(outcome, RebootOutcome::Rebooting);

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains("name=\"update\""));
    assert!(body.contains("filename=\"firmware.bin\""));
}

#[tokio::test]
async fn test_import_rejected() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/config/import"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "status": "error",
            "message": "Invalid configuration file"
        })))
        .mount(&server)
        .await;

    let err = client
        .import_config(b"{}".to_vec(), "backup.json")
        .await
        .unwrap_err();
    assert_eq!(err.device_message(), Some("Invalid configuration file"));
}

// ── Probes ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_probe_status_requires_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let target = Url::parse(&server.uri()).unwrap();
    assert!(client.probe_status(&target).await.is_err());
    // Any answer is enough for the lenient probe.
    assert!(client.probe_any(&target).await.is_ok());
}

#[tokio::test]
async fn test_deserialization_error_keeps_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/crashlog_json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    match client.get_crash_log().await.unwrap_err() {
        Error::Deserialization { body, .. } => assert_eq!(body, "not json"),
        other => panic!("unexpected error: {other:?}"),
    }
}
