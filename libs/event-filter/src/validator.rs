use crate::{
    rule::{DenyRule, Disposition},
    FilterError,
};

pub fn validate_rule(rule: &DenyRule) -> Result<(), FilterError> {
    validate_name_field(&rule.name_field)?;
    validate_denylist(rule)?;
    validate_prefix(rule.prefix.as_deref())?;
    validate_disposition(&rule.disposition)?;

    if rule.denylist.is_empty() && rule.prefix.is_none() {
        return Err(FilterError::NoCriteria);
    }

    Ok(())
}

pub fn validate_name_field(field: &str) -> Result<(), FilterError> {
    if field.trim().is_empty() {
        return Err(FilterError::EmptyNameField);
    }
    Ok(())
}

pub fn validate_denylist(rule: &DenyRule) -> Result<(), FilterError> {
    for entry in &rule.denylist {
        if entry.is_empty() {
            return Err(FilterError::EmptyDenylistEntry);
        }
        if entry.trim() != entry {
            tracing::warn!(
                entry = %entry,
                "denylist entry has surrounding whitespace and only matches names that carry it"
            );
        }
    }
    Ok(())
}

/// An empty prefix would deny every named event.
pub fn validate_prefix(prefix: Option<&str>) -> Result<(), FilterError> {
    match prefix {
        Some(prefix) if prefix.is_empty() => Err(FilterError::EmptyPrefix),
        _ => Ok(()),
    }
}

pub fn validate_disposition(disposition: &Disposition) -> Result<(), FilterError> {
    match disposition {
        Disposition::Rename { marker } if marker.is_empty() => Err(FilterError::EmptyMarker),
        _ => Ok(()),
    }
}
