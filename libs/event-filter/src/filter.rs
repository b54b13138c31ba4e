use serde_json::Value;
use tracing::debug;

use crate::{
    event::Event,
    rule::{DenyRule, Disposition, MatchKind},
    validator, FilterError,
};

/// Result of running one event through an [`EventFilter`].
#[derive(Debug, Clone, PartialEq)]
pub enum FilterOutcome {
    /// The name did not match; the event is returned untouched.
    Passed(Event),
    /// The name matched and the marker was prepended.
    Renamed {
        event: Event,
        original_name: String,
        match_kind: MatchKind,
    },
    /// The name matched and the event must not proceed.
    Suppressed { name: String, match_kind: MatchKind },
}

impl FilterOutcome {
    pub fn into_event(self) -> Option<Event> {
        match self {
            FilterOutcome::Passed(event) => Some(event),
            FilterOutcome::Renamed { event, .. } => Some(event),
            FilterOutcome::Suppressed { .. } => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilterOutcome::Passed(_) => "passed",
            FilterOutcome::Renamed { .. } => "renamed",
            FilterOutcome::Suppressed { .. } => "suppressed",
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, FilterOutcome::Suppressed { .. })
    }
}

/// Applies a validated [`DenyRule`] to events. Holds no mutable state, so a
/// single instance can be shared across threads.
#[derive(Debug, Clone)]
pub struct EventFilter {
    rule: DenyRule,
}

impl EventFilter {
    pub fn new(rule: DenyRule) -> Result<Self, FilterError> {
        validator::validate_rule(&rule)?;
        Ok(Self { rule })
    }

    pub fn rule(&self) -> &DenyRule {
        &self.rule
    }

    pub fn apply(&self, event: Event) -> FilterOutcome {
        apply_rule(&self.rule, event)
    }

    /// Host-facing entry point. `metadata` is accepted for signature
    /// compatibility and is not inspected.
    pub fn filter(&self, event: Event, _metadata: &Value) -> Option<Event> {
        self.apply(event).into_event()
    }

    /// Filters each event independently, dropping suppressed ones.
    pub fn filter_batch<I>(&self, events: I) -> Vec<Event>
    where
        I: IntoIterator<Item = Event>,
    {
        events
            .into_iter()
            .filter_map(|event| self.apply(event).into_event())
            .collect()
    }
}

/// Stateless equivalent of [`EventFilter::filter`] that takes the rule
/// directly. The rule is not validated; an empty prefix is ignored and an
/// empty marker leaves renamed events unchanged.
pub fn transform_event(event: Event, _metadata: &Value, rule: &DenyRule) -> Option<Event> {
    apply_rule(rule, event).into_event()
}

fn apply_rule(rule: &DenyRule, mut event: Event) -> FilterOutcome {
    let field = rule.name_field.as_str();

    let matched = event
        .name(field)
        .and_then(|name| rule.matches(name).map(|kind| (name.to_string(), kind)));
    let Some((name, match_kind)) = matched else {
        return FilterOutcome::Passed(event);
    };

    match &rule.disposition {
        Disposition::Rename { marker } => {
            let renamed = format!("{marker}{name}");
            debug!(
                event_name = %name,
                renamed = %renamed,
                %match_kind,
                "denied event renamed"
            );
            event.set_name(field, renamed);
            FilterOutcome::Renamed {
                event,
                original_name: name,
                match_kind,
            }
        }
        Disposition::Suppress => {
            debug!(event_name = %name, %match_kind, "denied event suppressed");
            FilterOutcome::Suppressed { name, match_kind }
        }
    }
}
