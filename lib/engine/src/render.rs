//! Response rendering.
//!
//! A node is rendered by walking the definition's output fields in order
//! and emitting one `"<label> <value>"` line per field that resolves.
//! Without output fields the whole node is pretty-printed.

use crate::path;
use crate::result::ResponseMode;
use selfservice_catalog::OutputField;
use serde_json::Value;

const NO_DATA: &str = "No data available.";
const SELECT_PROMPT: &str = "Select an option:";

/// A response body, parsed when it is JSON.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// Non-JSON content, or JSON that failed to parse.
    Opaque(String),
}

impl ResponseBody {
    /// Parses `raw` when the response declared a JSON content type.
    #[must_use]
    pub fn parse(raw: &str, is_json: bool) -> Self {
        if is_json {
            if let Ok(value) = serde_json::from_str(raw) {
                return Self::Json(value);
            }
        }
        Self::Opaque(raw.to_string())
    }

    /// Number of items: array length, otherwise one.
    #[must_use]
    pub fn item_count(&self) -> usize {
        match self {
            Self::Json(Value::Array(items)) => items.len(),
            _ => 1,
        }
    }

    /// The only item, when the body holds exactly one JSON item.
    #[must_use]
    pub fn single_item(&self) -> Option<&Value> {
        match self {
            Self::Json(Value::Array(items)) if items.len() == 1 => items.first(),
            Self::Json(Value::Array(_)) | Self::Opaque(_) => None,
            Self::Json(value) => Some(value),
        }
    }

    /// The body for logging: pretty JSON or the raw text.
    #[must_use]
    pub fn pretty(&self) -> String {
        match self {
            Self::Json(value) => pretty(value),
            Self::Opaque(text) => text.clone(),
        }
    }
}

/// Rendered output ready to become an [`ExecutionResult`](crate::ExecutionResult).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub mode: ResponseMode,
    pub message: String,
    /// One label per selectable item; empty outside CARD mode.
    pub choices: Vec<String>,
    /// Object-context value of each choice.
    pub context_values: Vec<Option<String>>,
}

impl Rendered {
    fn text(message: impl Into<String>) -> Self {
        Self {
            mode: ResponseMode::Text,
            message: message.into(),
            choices: Vec::new(),
            context_values: Vec::new(),
        }
    }
}

/// Text form of a scalar: strings verbatim, anything else as compact JSON.
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Renders one node with the given output fields.
#[must_use]
pub fn render_node(node: &Value, outputs: &[OutputField]) -> String {
    if outputs.is_empty() {
        return pretty(node);
    }
    outputs
        .iter()
        .filter_map(|output| {
            path::resolve(node, output.field())
                .map(|value| format!("{} {}", output.label(), value_text(value)))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// CARD rendering: several items become a selection list, a single item
/// collapses to plain text.
#[must_use]
pub fn render_card(
    body: &ResponseBody,
    outputs: &[OutputField],
    object_field: Option<&OutputField>,
) -> Rendered {
    let items = match body {
        ResponseBody::Opaque(text) => return Rendered::text(text.as_str()),
        ResponseBody::Json(Value::Array(items)) => items,
        ResponseBody::Json(node) => {
            let text = render_node(node, outputs);
            return if text.trim().is_empty() {
                Rendered::text(NO_DATA)
            } else {
                Rendered::text(text)
            };
        }
    };

    let (mut choices, mut context_values) = (Vec::new(), Vec::new());
    for item in items {
        let text = render_node(item, outputs);
        if text.trim().is_empty() {
            continue;
        }
        context_values.push(object_field.and_then(|field| {
            path::resolve(item, field.field())
                .map(value_text)
                .filter(|value| !value.trim().is_empty())
        }));
        choices.push(text);
    }

    match choices.len() {
        0 => Rendered::text(NO_DATA),
        1 => Rendered::text(choices.remove(0)),
        _ => Rendered {
            mode: ResponseMode::Card,
            message: SELECT_PROMPT.to_string(),
            choices,
            context_values,
        },
    }
}

/// TEXT rendering: arrays get `Item N:` headers when they hold more than one
/// element; blank renderings are skipped.
#[must_use]
pub fn render_text(body: &ResponseBody, outputs: &[OutputField]) -> Rendered {
    let node = match body {
        ResponseBody::Opaque(text) => return Rendered::text(text.as_str()),
        ResponseBody::Json(node) => node,
    };
    if outputs.is_empty() {
        return Rendered::text(pretty(node));
    }

    let text = match node {
        Value::Array(items) => {
            let numbered = items.len() > 1;
            items
                .iter()
                .map(|item| render_node(item, outputs))
                .filter(|text| !text.trim().is_empty())
                .enumerate()
                .map(|(index, text)| {
                    if numbered {
                        format!("Item {}:\n{text}", index + 1)
                    } else {
                        text
                    }
                })
                .collect::<Vec<_>>()
                .join("\n\n")
        }
        other => render_node(other, outputs),
    };

    if text.trim().is_empty() {
        Rendered::text(NO_DATA)
    } else {
        Rendered::text(text)
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
