//! Response normalization.
//!
//! Collapses every remote payload shape (bare object, array, paginated
//! connection, nested content union) into one flat list of text items so
//! callers never have to branch on response shape. Total over any JSON
//! value; the envelope is never empty.

use serde::Serialize;
use serde_json::Value;

/// Sentinel text when the remote returned nothing.
const NO_DATA: &str = "No data returned.";

/// The atomic unit of a normalized response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultItem {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub text: String,
}

impl ResultItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: "text",
            text: text.into(),
        }
    }

    fn sentinel() -> Self {
        Self::text(NO_DATA)
    }
}

/// Normalize an arbitrary remote payload into a non-empty item list.
pub fn normalize(raw: &Value) -> Vec<ResultItem> {
    // An upstream error signal passes through as the sole item, never
    // silently swallowed. Re-normalizing such an envelope is a no-op.
    if let Some(error) = raw.get("error") {
        return vec![ResultItem::text(render_scalar(error))];
    }

    if let Some(content) = raw.get("content").and_then(Value::as_array) {
        return items_from(content);
    }

    // Paginated connections carry their elements under `nodes`.
    if let Some(nodes) = raw.get("nodes").and_then(Value::as_array) {
        return items_from(nodes);
    }

    match raw {
        Value::Array(elements) => items_from(elements),
        Value::Null => vec![ResultItem::sentinel()],
        other => vec![ResultItem::text(render_node(other))],
    }
}

fn items_from(elements: &[Value]) -> Vec<ResultItem> {
    if elements.is_empty() {
        return vec![ResultItem::sentinel()];
    }
    elements
        .iter()
        .map(|element| ResultItem::text(render_node(element)))
        .collect()
}

/// Item-conversion rule: nodes with a title become a display line carrying
/// the identifier and state, then the body; other objects keep their
/// canonical JSON form; primitives render as themselves.
fn render_node(node: &Value) -> String {
    if let Some(title) = node.get("title").and_then(Value::as_str) {
        let mut out = String::new();
        if let Some(number) = node.get("number").and_then(Value::as_i64) {
            out.push_str(&format!("#{number} "));
        }
        out.push_str(title);
        if let Some(state) = state_of(node) {
            out.push_str(&format!(" [{state}]"));
        }
        if let Some(id) = node.get("id").and_then(Value::as_str) {
            out.push_str(&format!("\nid: {id}"));
        }
        if let Some(body) = body_of(node) {
            if !body.is_empty() {
                out.push('\n');
                out.push_str(body);
            }
        }
        return out;
    }

    render_scalar(node)
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => NO_DATA.to_string(),
        Value::Object(_) | Value::Array(_) => {
            serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        primitive => primitive.to_string(),
    }
}

fn state_of(node: &Value) -> Option<&str> {
    node.get("state")
        .or_else(|| node.get("status"))
        .and_then(Value::as_str)
}

fn body_of(node: &Value) -> Option<&str> {
    node.get("body")
        .or_else(|| node.get("description"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_empty_normalize_to_sentinel() {
        assert_eq!(normalize(&Value::Null), vec![ResultItem::text(NO_DATA)]);
        assert_eq!(normalize(&json!([])), vec![ResultItem::text(NO_DATA)]);
        assert_eq!(
            normalize(&json!({ "content": [] })),
            vec![ResultItem::text(NO_DATA)]
        );
    }

    #[test]
    fn test_error_key_passes_through_unchanged() {
        let items = normalize(&json!({ "error": "field lookup failed" }));
        assert_eq!(items, vec![ResultItem::text("field lookup failed")]);
    }

    #[test]
    fn test_error_envelope_is_idempotent() {
        let envelope = json!({ "error": "boom" });
        let once = normalize(&envelope);
        let again = normalize(&json!({ "error": once[0].text }));
        assert_eq!(once, again);
    }

    #[test]
    fn test_content_items_render_titles() {
        let items = normalize(&json!({
            "content": [{ "title": "Fix bug", "number": 5, "state": "open" }]
        }));
        assert_eq!(items.len(), 1);
        assert!(items[0].text.contains("Fix bug"));
        assert!(items[0].text.contains("5"));
        assert!(items[0].text.contains("open"));
    }

    #[test]
    fn test_connection_nodes_render_element_wise() {
        let items = normalize(&json!({
            "nodes": [
                { "title": "First", "number": 1, "state": "OPEN" },
                { "title": "Second", "number": 2, "state": "CLOSED" }
            ]
        }));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].text, "#1 First [OPEN]");
        assert_eq!(items[1].text, "#2 Second [CLOSED]");
    }

    #[test]
    fn test_title_node_includes_id_and_body() {
        let items = normalize(&json!([{
            "title": "Draft",
            "id": "PVTI_abc",
            "body": "details here"
        }]));
        assert_eq!(items[0].text, "Draft\nid: PVTI_abc\ndetails here");
    }

    #[test]
    fn test_bare_array_of_primitives() {
        let items = normalize(&json!(["alpha", 2, true]));
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].text, "alpha");
        assert_eq!(items[1].text, "2");
        assert_eq!(items[2].text, "true");
    }

    #[test]
    fn test_plain_object_keeps_canonical_form() {
        let items = normalize(&json!({ "login": "octocat", "repos": 8 }));
        assert_eq!(items.len(), 1);
        assert!(items[0].text.contains("\"login\": \"octocat\""));
    }

    #[test]
    fn test_never_empty_for_any_shape() {
        for raw in [
            Value::Null,
            json!([]),
            json!({}),
            json!(""),
            json!(0),
            json!({ "nodes": [] }),
        ] {
            assert!(!normalize(&raw).is_empty(), "{raw}");
        }
    }
}
