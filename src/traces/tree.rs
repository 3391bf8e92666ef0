/// Span tree reconstruction for the waterfall view
///
/// Pure, stateless transformation of a flat span list into a rooted forest:
/// - A span whose parent id is absent or does not appear in the input is
///   promoted to a root (orphans are indistinguishable from legitimately
///   multi-rooted traces; no error path exists for them)
/// - Children and roots are ordered by start time ascending; the sort is
///   stable, so spans with identical start times keep their input order
/// - Duplicate span ids are not expected and their placement is unspecified
use std::collections::{HashMap, HashSet};

use super::span::{Span, SpanNode};

/// Build the rooted forest for a trace's spans
pub fn build_span_tree(spans: &[Span]) -> Vec<SpanNode> {
    let ids: HashSet<&str> = spans.iter().map(|s| s.id.as_str()).collect();

    let mut children: HashMap<&str, Vec<&Span>> = HashMap::new();
    let mut roots: Vec<&Span> = Vec::new();

    for span in spans {
        match span.parent_id.as_deref().filter(|p| ids.contains(p)) {
            Some(parent) => children.entry(parent).or_default().push(span),
            None => roots.push(span),
        }
    }

    sort_by_start_time(&mut roots);
    roots
        .into_iter()
        .map(|root| build_node(root, &children))
        .collect()
}

fn build_node(span: &Span, children: &HashMap<&str, Vec<&Span>>) -> SpanNode {
    let mut kids: Vec<&Span> = children
        .get(span.id.as_str())
        .cloned()
        .unwrap_or_default();
    sort_by_start_time(&mut kids);

    SpanNode {
        span: span.clone(),
        children: kids
            .into_iter()
            .map(|child| build_node(child, children))
            .collect(),
    }
}

fn sort_by_start_time(spans: &mut [&Span]) {
    // Stable sort: ties keep input order, which fixes the left-to-right
    // order in the waterfall
    spans.sort_by(|a, b| a.start_time.total_cmp(&b.start_time));
}

/// Trace-level duration over all spans
///
/// `max(end_time) - min(start_time)` across the whole collection, not only
/// roots: a child may extend past its parent's declared end and still
/// counts. Zero for an empty collection.
pub fn total_duration(spans: &[Span]) -> f64 {
    if spans.is_empty() {
        return 0.0;
    }

    let min_start = spans
        .iter()
        .map(|s| s.start_time)
        .fold(f64::INFINITY, f64::min);
    let max_end = spans
        .iter()
        .map(|s| s.end_time)
        .fold(f64::NEG_INFINITY, f64::max);

    max_end - min_start
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traces::span::make_span;

    fn forest_len(forest: &[SpanNode]) -> usize {
        forest.iter().map(SpanNode::subtree_len).sum()
    }

    #[test]
    fn test_empty_input() {
        assert!(build_span_tree(&[]).is_empty());
        assert_eq!(total_duration(&[]), 0.0);
    }

    #[test]
    fn test_single_root_span() {
        let spans = vec![make_span("a", None, 0.0, 10.0)];
        let forest = build_span_tree(&spans);
        assert_eq!(forest.len(), 1);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_nested_tree_structure() {
        let spans = vec![
            make_span("root", None, 0.0, 100.0),
            make_span("db", Some("root"), 10.0, 40.0),
            make_span("cache", Some("root"), 5.0, 8.0),
            make_span("query", Some("db"), 12.0, 30.0),
        ];

        let forest = build_span_tree(&spans);
        assert_eq!(forest.len(), 1);

        let root = &forest[0];
        assert_eq!(root.span.id, "root");
        // Children ordered by start time: cache (5) before db (10)
        assert_eq!(root.children[0].span.id, "cache");
        assert_eq!(root.children[1].span.id, "db");
        assert_eq!(root.children[1].children[0].span.id, "query");
    }

    #[test]
    fn test_tree_completeness() {
        // Node count over the forest equals the input span count
        let spans = vec![
            make_span("r1", None, 0.0, 50.0),
            make_span("r2", None, 60.0, 90.0),
            make_span("c1", Some("r1"), 5.0, 10.0),
            make_span("c2", Some("r1"), 11.0, 20.0),
            make_span("c3", Some("r2"), 61.0, 70.0),
            make_span("g1", Some("c1"), 6.0, 9.0),
        ];
        let forest = build_span_tree(&spans);
        assert_eq!(forest_len(&forest), spans.len());
    }

    #[test]
    fn test_orphan_promoted_to_root() {
        let spans = vec![
            make_span("a", None, 0.0, 10.0),
            make_span("lost", Some("never-stored"), 2.0, 4.0),
        ];

        let forest = build_span_tree(&spans);
        assert_eq!(forest.len(), 2);
        assert_eq!(forest_len(&forest), 2);
        assert!(forest.iter().any(|n| n.span.id == "lost"));
    }

    #[test]
    fn test_multiple_roots_ordered_by_start_time() {
        // Spans from unrelated sub-requests merged under one trace id
        let spans = vec![
            make_span("late", None, 200.0, 250.0),
            make_span("early", None, 50.0, 80.0),
        ];
        let forest = build_span_tree(&spans);
        assert_eq!(forest[0].span.id, "early");
        assert_eq!(forest[1].span.id, "late");
    }

    #[test]
    fn test_sibling_ordering_is_stable() {
        // {A: start=10, B: start=5, C: start=5} -> B, C, A with B before C
        let spans = vec![
            make_span("root", None, 0.0, 100.0),
            make_span("a", Some("root"), 10.0, 20.0),
            make_span("b", Some("root"), 5.0, 12.0),
            make_span("c", Some("root"), 5.0, 9.0),
        ];

        let forest = build_span_tree(&spans);
        let order: Vec<&str> = forest[0]
            .children
            .iter()
            .map(|n| n.span.id.as_str())
            .collect();
        assert_eq!(order, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_total_duration_counts_child_past_parent_end() {
        // Child ends after its parent's declared end and must still count
        let spans = vec![
            make_span("root", None, 100.0, 150.0),
            make_span("slow-child", Some("root"), 120.0, 180.0),
        ];
        assert_eq!(total_duration(&spans), 80.0);
    }
}
