use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::event::DEFAULT_NAME_FIELD;

/// Marker prepended to denied event names by the rename disposition.
pub const DEFAULT_MARKER: &str = "SK~";

/// What happens to an event whose name is denied.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Disposition {
    /// Forward the event with `marker` prepended to its name.
    Rename { marker: String },
    /// Drop the event.
    Suppress,
}

impl Disposition {
    pub fn rename(marker: impl Into<String>) -> Self {
        Disposition::Rename {
            marker: marker.into(),
        }
    }

    pub fn rename_default() -> Self {
        Self::rename(DEFAULT_MARKER)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Disposition::Rename { .. } => "rename",
            Disposition::Suppress => "suppress",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a name was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Exact,
    Prefix,
}

impl MatchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchKind::Exact => "exact",
            MatchKind::Prefix => "prefix",
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A denylist of exact names plus an optional prefix, and the disposition to
/// apply when either matches.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DenyRule {
    #[serde(default)]
    pub denylist: BTreeSet<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    pub disposition: Disposition,
    #[serde(default = "default_name_field")]
    pub name_field: String,
}

fn default_name_field() -> String {
    DEFAULT_NAME_FIELD.to_string()
}

impl DenyRule {
    pub fn new<I, S>(denylist: I, prefix: Option<&str>, disposition: Disposition) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            denylist: denylist.into_iter().map(Into::into).collect(),
            prefix: prefix.map(str::to_string),
            disposition,
            name_field: default_name_field(),
        }
    }

    pub fn with_name_field(mut self, field: impl Into<String>) -> Self {
        self.name_field = field.into();
        self
    }

    /// Checks `name` against the rule. Exact matches win over prefix matches.
    /// Empty names never match.
    pub fn matches(&self, name: &str) -> Option<MatchKind> {
        if name.is_empty() {
            return None;
        }

        if self.denylist.contains(name) {
            return Some(MatchKind::Exact);
        }

        match self.prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() && name.starts_with(prefix) => {
                Some(MatchKind::Prefix)
            }
            _ => None,
        }
    }
}
