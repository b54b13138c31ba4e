//! Denylist filtering for analytics events.
//!
//! A [`DenyRule`] names a set of exact event names and an optional prefix.
//! Events whose name matches either are renamed with a marker or suppressed,
//! depending on the rule's [`Disposition`]. Everything else passes through
//! unchanged. Filtering is pure and never fails; only rule construction is
//! validated.

use thiserror::Error;

// Module declarations
pub mod codegen;
pub mod event;
pub mod filter;
pub mod rule;
pub mod validator;

// Re-export key types
pub use event::{Event, DEFAULT_NAME_FIELD};
pub use filter::{transform_event, EventFilter, FilterOutcome};
pub use rule::{DenyRule, Disposition, MatchKind, DEFAULT_MARKER};

/// Errors emitted while validating a [`DenyRule`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    /// Rename disposition without a marker
    #[error("rename marker cannot be empty")]
    EmptyMarker,

    /// Prefix configured as an empty string
    #[error("deny prefix cannot be empty")]
    EmptyPrefix,

    /// Name field configured as an empty string
    #[error("event name field cannot be empty")]
    EmptyNameField,

    /// Denylist contains an empty name
    #[error("denylist entries cannot be empty")]
    EmptyDenylistEntry,

    /// Rule would never match anything
    #[error("rule needs at least one denylist entry or a prefix")]
    NoCriteria,
}

/// Builds a filter from its parts and validates it.
///
/// # Example
/// ```
/// use event_filter::{build_filter, Disposition, Event};
/// use serde_json::json;
///
/// let filter = build_filter(
///     ["Product Added", "Order Completed"],
///     Some("Single"),
///     Disposition::rename_default(),
/// )
/// .unwrap();
///
/// let event = Event::from_value(json!({ "event": "Product Added" })).unwrap();
/// let out = filter.filter(event, &json!({})).unwrap();
/// assert_eq!(out.name("event"), Some("SK~Product Added"));
/// ```
pub fn build_filter<I, S>(
    denylist: I,
    prefix: Option<&str>,
    disposition: Disposition,
) -> Result<EventFilter, FilterError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    EventFilter::new(DenyRule::new(denylist, prefix, disposition))
}
