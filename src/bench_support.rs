use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use event_collector::{create_router, ApiState, CollectorConfig};
use event_filter::{DenyRule, Disposition, Event, EventFilter};
use serde_json::json;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub use event_collector;
pub use event_filter;
pub use serde_json;

pub const SAMPLE_DENYLIST: &[&str] = &["Product Added", "Order Completed"];
pub const SAMPLE_PREFIX: &str = "Single";

pub struct FilterBenchFixture {
    pub filter: Arc<EventFilter>,
    pub events: Vec<Event>,
}

impl FilterBenchFixture {
    pub fn new(disposition: Disposition, batch_size: usize) -> Self {
        let rule = DenyRule::new(SAMPLE_DENYLIST.iter().copied(), Some(SAMPLE_PREFIX), disposition);
        let filter = EventFilter::new(rule).expect("sample rule is valid");
        Self {
            filter: Arc::new(filter),
            events: sample_events(batch_size),
        }
    }
}

/// Track events cycling through passing, exact-match and prefix-match names.
pub fn sample_events(count: usize) -> Vec<Event> {
    const NAMES: &[&str] = &[
        "Page Viewed",
        "Product Added",
        "Single Item Viewed",
        "Checkout Started",
        "Order Completed",
    ];

    (0..count)
        .map(|i| {
            let value = json!({
                "type": "track",
                "event": NAMES[i % NAMES.len()],
                "messageId": format!("msg-{i}"),
                "properties": { "index": i, "currency": "USD" },
                "context": { "library": { "name": "analytics-swift" } }
            });
            Event::from_value(value).expect("sample event is an object")
        })
        .collect()
}

/// A collector bound to an ephemeral port, writing into a private temp dir.
pub struct CollectorFixture {
    pub base_url: String,
    pub output_file: PathBuf,
    pub temp_dir: TempDir,
    handle: JoinHandle<()>,
}

impl CollectorFixture {
    pub async fn start(configure: impl FnOnce(&mut CollectorConfig)) -> Result<Self> {
        let temp_dir = TempDir::new().context("creating collector tempdir")?;
        let output_file = temp_dir.path().join("output_files/batch_content.txt");
        std::fs::create_dir_all(temp_dir.path().join("output_files"))?;
        std::fs::write(&output_file, "")?;

        let mut config = CollectorConfig {
            server_port: 0,
            batch_output_file: output_file.clone(),
            source_config_path: temp_dir.path().join("json_files/sample_config.json"),
            ..CollectorConfig::default()
        };
        configure(&mut config);

        let state = Arc::new(ApiState::new(config).context("building collector state")?);
        let router = create_router(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("binding collector listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            if let Err(err) = axum::serve(listener, router.into_make_service()).await {
                eprintln!("collector fixture stopped: {err}");
            }
        });

        Ok(Self {
            base_url: format!("http://{addr}"),
            output_file,
            temp_dir,
            handle,
        })
    }

    pub fn recorded(&self) -> Result<String> {
        std::fs::read_to_string(&self.output_file).context("reading recorded batches")
    }

    pub async fn shutdown(self) {
        self.handle.abort();
        let _ = self.handle.await;
    }
}
