use crate::rule::{DenyRule, Disposition};

const BANNER: &str = "/***\n * Generated transformation: denied events are {action}.\n***/";

/// Renders `rule` as the `transformEvent(event, metadata)` snippet executed by
/// SDK transformation hosts. The output is classic (non-module) JavaScript so
/// that it also runs under JavaScriptCore.
pub fn generate_transform(rule: &DenyRule) -> String {
    let mut sections = Vec::new();
    sections.push(generate_banner(&rule.disposition));
    sections.push(generate_function(rule));

    sections.join("\n\n")
}

pub fn generate_banner(disposition: &Disposition) -> String {
    let action = match disposition {
        Disposition::Rename { marker } => format!("renamed with the {marker} marker"),
        Disposition::Suppress => "dropped".to_string(),
    };
    BANNER.replace("{action}", &action)
}

pub fn generate_function(rule: &DenyRule) -> String {
    let accessor = generate_accessor(&rule.name_field);

    let mut lines = Vec::new();
    lines.push("function transformEvent(event, metadata) {".to_string());
    lines.push(format!("    const property = {accessor};"));
    lines.push(format!(
        "    const denylist = {};",
        generate_string_list(rule.denylist.iter().map(String::as_str))
    ));
    if let Some(prefix) = &rule.prefix {
        lines.push(format!("    const denyPattern = {};", string_literal(prefix)));
    }
    lines.push(String::new());
    lines.push(format!("    if ({}) {{", generate_condition(rule)));
    lines.push(format!("        {}", generate_disposition(&rule.disposition, &accessor)));
    lines.push("    }".to_string());
    lines.push("    return event;".to_string());
    lines.push("}".to_string());

    lines.join("\n")
}

/// Names that are missing, empty or not strings never match.
pub fn generate_condition(rule: &DenyRule) -> String {
    const GUARD: &str = "typeof property === \"string\" && property";
    if rule.prefix.is_some() {
        format!("{GUARD} && (denylist.includes(property) || property.startsWith(denyPattern))")
    } else {
        format!("{GUARD} && denylist.includes(property)")
    }
}

pub fn generate_disposition(disposition: &Disposition, accessor: &str) -> String {
    match disposition {
        Disposition::Rename { marker } => {
            format!("{accessor} = {} + property;", string_literal(marker))
        }
        Disposition::Suppress => "return;".to_string(),
    }
}

fn generate_accessor(field: &str) -> String {
    if is_identifier(field) {
        format!("event.{field}")
    } else {
        format!("event[{}]", string_literal(field))
    }
}

fn generate_string_list<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let rendered: Vec<String> = values.map(string_literal).collect();
    format!("[{}]", rendered.join(", "))
}

fn is_identifier(field: &str) -> bool {
    let mut chars = field.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' || first == '$' => {}
        _ => return false,
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '$')
}

// JSON string literals are valid JavaScript string literals.
fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Extracts the transformation function from a hand-written snippet, dropping
/// the `/*** ... ***/` banner blocks and comment lines that precede it.
/// Returns `None` when no `function transformEvent` or `export function`
/// declaration is present.
pub fn extract_transform_function(source: &str) -> Option<String> {
    let mut function_lines = Vec::new();
    let mut in_function = false;

    for line in source.lines() {
        let stripped = line.trim();
        if stripped.starts_with("/***") || stripped.starts_with("***") {
            continue;
        }
        if stripped.starts_with('*') && !line.contains("function") {
            continue;
        }

        if line.contains("function transformEvent") || line.contains("export function") {
            in_function = true;
        }

        if in_function {
            function_lines.push(line);
        }
    }

    if function_lines.is_empty() {
        None
    } else {
        Some(function_lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessor_uses_brackets_for_non_identifiers() {
        assert_eq!(generate_accessor("event"), "event.event");
        assert_eq!(generate_accessor("event-name"), "event[\"event-name\"]");
        assert_eq!(generate_accessor("1st"), "event[\"1st\"]");
    }

    #[test]
    fn string_literal_escapes_quotes() {
        assert_eq!(string_literal("say \"hi\""), "\"say \\\"hi\\\"\"");
    }
}
