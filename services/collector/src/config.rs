use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Context, Result};
use event_filter::{DenyRule, Disposition, EventFilter, DEFAULT_MARKER, DEFAULT_NAME_FIELD};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectorConfig {
    pub server_host: String,
    pub server_port: u16,
    pub batch_output_file: PathBuf,
    pub source_config_path: PathBuf,
    pub transform_source_path: Option<PathBuf>,
    pub denylist: Vec<String>,
    pub deny_prefix: Option<String>,
    pub deny_disposition: Option<String>,
    pub deny_marker: String,
    pub event_name_field: String,
    pub log_level: String,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: 12791,
            batch_output_file: PathBuf::from("output_files/batch_content.txt"),
            source_config_path: PathBuf::from("json_files/sample_config.json"),
            transform_source_path: None,
            denylist: Vec::new(),
            deny_prefix: None,
            deny_disposition: None,
            deny_marker: DEFAULT_MARKER.to_string(),
            event_name_field: DEFAULT_NAME_FIELD.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl CollectorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source, falling back
    /// to defaults for anything unset or blank.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = var("COLLECTOR_HOST") {
            cfg.server_host = host;
        }
        if let Some(port) = var("COLLECTOR_PORT") {
            cfg.server_port = port
                .parse::<u16>()
                .context("failed to parse COLLECTOR_PORT as u16")?;
        }
        if let Some(path) = var("BATCH_OUTPUT_FILE") {
            cfg.batch_output_file = PathBuf::from(path);
        }
        if let Some(path) = var("SOURCE_CONFIG_PATH") {
            cfg.source_config_path = PathBuf::from(path);
        }
        if let Some(path) = var("TRANSFORM_SOURCE_PATH") {
            cfg.transform_source_path = Some(PathBuf::from(path));
        }
        if let Some(list) = var("DENYLIST") {
            cfg.denylist = parse_list(&list);
        }
        cfg.deny_prefix = var("DENY_PREFIX");
        cfg.deny_disposition = var("DENY_DISPOSITION");
        if let Some(marker) = var("DENY_MARKER") {
            cfg.deny_marker = marker;
        }
        if let Some(field) = var("EVENT_NAME_FIELD") {
            cfg.event_name_field = field;
        }
        cfg.log_level = log_level_from_lookup(&lookup);

        cfg.validate()?;

        info!(
            output = %cfg.batch_output_file.display(),
            rule_configured = cfg.has_deny_criteria(),
            "collector configuration resolved"
        );

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        ensure_output_file(&self.batch_output_file)?;
        self.build_filter()?;
        Ok(())
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }

    pub fn has_deny_criteria(&self) -> bool {
        !self.denylist.is_empty() || self.deny_prefix.is_some()
    }

    /// Builds the event filter described by the deny settings. Returns `None`
    /// when neither a denylist nor a prefix is configured.
    pub fn build_filter(&self) -> Result<Option<EventFilter>> {
        if !self.has_deny_criteria() {
            if self.deny_disposition.is_some() {
                warn!("DENY_DISPOSITION is set but no DENYLIST or DENY_PREFIX is configured");
            }
            return Ok(None);
        }

        let disposition = match self.deny_disposition.as_deref() {
            Some(value) => parse_disposition(value, &self.deny_marker)?,
            None => bail!(
                "DENY_DISPOSITION must be 'rename' or 'suppress' when DENYLIST or DENY_PREFIX is set"
            ),
        };

        let rule = DenyRule::new(
            self.denylist.iter().cloned(),
            self.deny_prefix.as_deref(),
            disposition,
        )
        .with_name_field(self.event_name_field.clone());

        let filter = EventFilter::new(rule).context("invalid deny rule configuration")?;
        Ok(Some(filter))
    }
}

/// `LOG_LEVEL` or `info`. Read on its own so tracing can be installed before
/// the rest of the configuration is resolved.
pub fn log_level_from_env() -> String {
    log_level_from_lookup(|key| env::var(key).ok())
}

fn log_level_from_lookup<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup("LOG_LEVEL")
        .map(|level| level.trim().to_string())
        .filter(|level| !level.is_empty())
        .unwrap_or_else(|| "info".to_string())
}

fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_disposition(value: &str, marker: &str) -> Result<Disposition> {
    match value.trim().to_ascii_lowercase().as_str() {
        "rename" => Ok(Disposition::rename(marker)),
        "suppress" | "drop" => Ok(Disposition::Suppress),
        other => Err(anyhow!("invalid DENY_DISPOSITION value: {}", other)),
    }
}

fn ensure_output_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| {
            format!("unable to create output directory {}", parent.display())
        })?;
    }

    if path.exists() {
        if !path.is_file() {
            bail!("{} exists but is not a file", path.display());
        }
    } else {
        fs::File::create(path)
            .with_context(|| format!("unable to create batch output file {}", path.display()))?;
    }
    Ok(())
}
