//! Tolerant parsing of model output into findings.
//!
//! The model is told to return bare JSON but regularly wraps it in code
//! fences, adds a sentence before or after it, or leaves trailing commas.
//! [`clean`] undoes those slips; [`findings`] maps the result onto
//! [`Finding`]s.

use std::sync::LazyLock;

use pipeline::{Category, Finding, SummarizeError};
use regex::Regex;
use serde_json::{Map, Value};
use tracing::debug;

static TRAILING_COMMA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",\s*([}\]])").unwrap());

/// Strips code fences and surrounding prose, then removes trailing commas.
pub fn clean(raw: &str) -> String {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the info string (`json`) on the opening fence line.
        text = rest.split_once('\n').map_or(rest, |(_, body)| body);
    }
    text = text.trim_end().trim_end_matches("```").trim();

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            text = &text[start..=end];
        }
    }
    TRAILING_COMMA.replace_all(text, "$1").into_owned()
}

/// Parses model output into findings.
///
/// An empty object (or an object whose lists are all empty) yields no
/// findings. Output that is not a JSON object after [`clean`] is
/// [`SummarizeError::Malformed`].
pub fn findings(raw: &str) -> Result<Vec<Finding>, SummarizeError> {
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Ok(Vec::new());
    }
    let value: Value = serde_json::from_str(&cleaned).map_err(|e| SummarizeError::Malformed {
        message: format!("not valid JSON: {e}"),
    })?;
    let Value::Object(categories) = value else {
        return Err(SummarizeError::Malformed {
            message: "expected a JSON object keyed by category".into(),
        });
    };

    let mut out = Vec::new();
    for (label, entries) in categories {
        let category = Category::from_label(&label);
        let Value::Array(entries) = entries else {
            debug!(label = %label, "ignoring non-list category value");
            continue;
        };
        out.extend(entries.iter().filter_map(|e| finding(category, e)));
    }
    Ok(out)
}

fn finding(category: Category, entry: &Value) -> Option<Finding> {
    match entry {
        Value::String(text) => non_empty(text).map(|headline| Finding {
            category,
            headline,
            url: None,
            critical: false,
        }),
        Value::Object(fields) => {
            let headline = ["description", "headline", "summary"]
                .iter()
                .find_map(|key| fields.get(*key).and_then(Value::as_str).and_then(non_empty))?;
            Some(Finding {
                category,
                headline,
                url: fields
                    .get("url")
                    .and_then(Value::as_str)
                    .and_then(non_empty),
                critical: is_critical(fields),
            })
        }
        _ => None,
    }
}

fn is_critical(fields: &Map<String, Value>) -> bool {
    match fields.get("critical") {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(s)) => s.eq_ignore_ascii_case("true"),
        _ => false,
    }
}

fn non_empty(text: &str) -> Option<String> {
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
