/// Span, span tree node and trace summary types
///
/// Field names serialize in camelCase to match the dashboard's JSON
/// contract. Times are unix milliseconds.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single timed operation within a trace
///
/// Immutable once created; `parent_id` links it to its enclosing span.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Span {
    pub id: String,
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub name: String,
    pub start_time: f64,
    pub end_time: f64,
    pub duration: f64,
    pub service_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<BTreeMap<String, serde_json::Value>>,
}

/// A span plus its time-ordered children; built transiently for rendering
#[derive(Debug, Clone, Serialize)]
pub struct SpanNode {
    #[serde(flatten)]
    pub span: Span,
    pub children: Vec<SpanNode>,
}

impl SpanNode {
    /// Total node count of this subtree including self
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(SpanNode::subtree_len).sum::<usize>()
    }
}

/// Trace summary over an ordered span collection
///
/// `root_span_name` and `timestamp` are derived from the spans at creation
/// time; `total_duration` covers every span, not only roots.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub trace_id: String,
    pub spans: Vec<Span>,
    pub root_span_name: String,
    pub total_duration: f64,
    pub timestamp: f64,
}

impl Trace {
    /// Derive a trace summary from its spans; None for an empty collection
    pub fn from_spans(trace_id: impl Into<String>, spans: Vec<Span>) -> Option<Trace> {
        if spans.is_empty() {
            return None;
        }

        let ids: std::collections::HashSet<&str> = spans.iter().map(|s| s.id.as_str()).collect();

        // Earliest root by start time; input order breaks ties
        let root = spans
            .iter()
            .filter(|s| {
                s.parent_id
                    .as_deref()
                    .map_or(true, |p| !ids.contains(p))
            })
            .reduce(|best, s| if s.start_time < best.start_time { s } else { best })?;

        let root_span_name = root.name.clone();
        let total_duration = super::tree::total_duration(&spans);
        let timestamp = spans
            .iter()
            .map(|s| s.start_time)
            .fold(f64::INFINITY, f64::min);

        Some(Trace {
            trace_id: trace_id.into(),
            spans,
            root_span_name,
            total_duration,
            timestamp,
        })
    }
}

#[cfg(test)]
pub(crate) fn make_span(id: &str, parent: Option<&str>, start: f64, end: f64) -> Span {
    Span {
        id: id.to_string(),
        trace_id: "trace-1".to_string(),
        parent_id: parent.map(str::to_string),
        name: format!("span-{}", id),
        start_time: start,
        end_time: end,
        duration: end - start,
        service_name: "api-gateway".to_string(),
        tags: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_derivation() {
        let spans = vec![
            make_span("root", None, 100.0, 250.0),
            make_span("child", Some("root"), 120.0, 200.0),
        ];

        let trace = Trace::from_spans("trace-1", spans).unwrap();
        assert_eq!(trace.root_span_name, "span-root");
        assert_eq!(trace.total_duration, 150.0);
        assert_eq!(trace.timestamp, 100.0);
    }

    #[test]
    fn test_trace_from_empty_spans() {
        assert!(Trace::from_spans("trace-1", vec![]).is_none());
    }

    #[test]
    fn test_earliest_root_selected() {
        let spans = vec![
            make_span("b", None, 50.0, 60.0),
            make_span("a", None, 10.0, 20.0),
        ];
        let trace = Trace::from_spans("trace-1", spans).unwrap();
        assert_eq!(trace.root_span_name, "span-a");
    }

    #[test]
    fn test_span_serializes_camel_case() {
        let span = make_span("s1", Some("p1"), 1.0, 2.0);
        let json = serde_json::to_string(&span).unwrap();
        assert!(json.contains("\"traceId\""));
        assert!(json.contains("\"parentId\""));
        assert!(json.contains("\"startTime\""));
        assert!(json.contains("\"serviceName\""));
    }
}
