use std::{fs, path::Path, sync::Arc};

use anyhow::Result;
use event_collector::{check_track_order, create_router, ApiState, CollectorConfig};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokio::{net::TcpListener, task::JoinHandle};

const HAND_WRITTEN_TRANSFORM: &str = r#"/***
 * This transformation blocks events from reaching a downstream destination.
***/

function transformEvent(event, metadata) {
    return event;
}
"#;

async fn start_collector(config: CollectorConfig) -> (JoinHandle<()>, String) {
    let state = Arc::new(ApiState::new(config).expect("failed to build collector state"));
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind ephemeral port");
    let addr = listener.local_addr().expect("listener has no local addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .await
            .expect("collector server failed");
    });

    (handle, format!("http://{}", addr))
}

async fn teardown(handle: JoinHandle<()>) {
    handle.abort();
    let _ = handle.await;
}

fn base_config(dir: &Path) -> CollectorConfig {
    let output = dir.join("output_files/batch_content.txt");
    fs::create_dir_all(output.parent().unwrap()).unwrap();
    fs::write(&output, "").unwrap();

    CollectorConfig {
        server_port: 0,
        batch_output_file: output,
        source_config_path: dir.join("json_files/sample_config.json"),
        ..CollectorConfig::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn batches_are_recorded_in_arrival_order() -> Result<()> {
    let temp = tempdir()?;
    let config = base_config(temp.path());
    let output = config.batch_output_file.clone();
    let (handle, base_url) = start_collector(config).await;
    let client = Client::new();

    for chunk in [[1, 2, 3], [4, 6, 5]] {
        let batch: Vec<Value> = chunk
            .iter()
            .map(|n| json!({ "type": "track", "event": format!("Track: {n}") }))
            .collect();

        let response = client
            .post(format!("{base_url}/v1/batch"))
            .json(&json!({ "batch": batch, "sentAt": "2024-05-01T10:00:00Z" }))
            .send()
            .await?;
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body["recorded"], 3);
    }

    let content = fs::read_to_string(&output)?;
    assert_eq!(
        content,
        "Track: 1\nTrack: 2\nTrack: 3\n\nTrack: 4\nTrack: 6\nTrack: 5\n\n"
    );

    let report = check_track_order(&content);
    assert_eq!(report.tracks, vec![1, 2, 3, 4, 6, 5]);
    assert_eq!(report.inconsistencies.len(), 1);
    assert_eq!(report.inconsistencies[0].position, 6);
    assert!(report.missing.is_empty());

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn source_config_is_served_from_disk() -> Result<()> {
    let temp = tempdir()?;
    let config = base_config(temp.path());
    fs::create_dir_all(config.source_config_path.parent().unwrap())?;
    fs::write(
        &config.source_config_path,
        json!({ "source": { "id": "src-1", "enabled": true } }).to_string(),
    )?;
    let (handle, base_url) = start_collector(config).await;

    let response = Client::new()
        .get(format!("{base_url}/sourceConfig"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["source"]["id"], "src-1");

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn hand_written_transform_takes_precedence() -> Result<()> {
    let temp = tempdir()?;
    let transform_path = temp.path().join("denylist.js");
    fs::write(&transform_path, HAND_WRITTEN_TRANSFORM)?;

    let config = CollectorConfig {
        transform_source_path: Some(transform_path),
        denylist: vec!["Product Added".into()],
        deny_disposition: Some("suppress".into()),
        ..base_config(temp.path())
    };
    let (handle, base_url) = start_collector(config).await;

    let response = Client::new()
        .get(format!("{base_url}/denylist"))
        .send()
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.text().await?;
    assert!(body.starts_with("function transformEvent(event, metadata) {"));
    assert!(!body.contains("blocks events"));

    teardown(handle).await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn suppressed_events_return_null() -> Result<()> {
    let temp = tempdir()?;
    let config = CollectorConfig {
        deny_prefix: Some("Home".into()),
        deny_disposition: Some("suppress".into()),
        ..base_config(temp.path())
    };
    let (handle, base_url) = start_collector(config).await;
    let client = Client::new();

    let suppressed: Value = client
        .post(format!("{base_url}/v1/transform"))
        .json(&json!({ "event": { "event": "Home Page Viewed" }, "metadata": {} }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(suppressed["outcome"], "suppressed");
    assert_eq!(suppressed["event"], Value::Null);

    let passed: Value = client
        .post(format!("{base_url}/v1/transform"))
        .json(&json!({ "event": { "event": "Page Viewed", "userId": "u-1" } }))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(passed["outcome"], "passed");
    assert_eq!(passed["event"], json!({ "event": "Page Viewed", "userId": "u-1" }));

    let health: Value = client
        .get(format!("{base_url}/health"))
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(health["rule_configured"], true);

    teardown(handle).await;
    Ok(())
}
