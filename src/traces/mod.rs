/// Trace and span data model plus waterfall tree reconstruction
///
/// `tree::build_span_tree` is the pure core: it turns the flat,
/// parent-linked span list stored for a trace into the rooted forest the
/// waterfall view renders.
pub mod span;
pub mod tree;

pub use span::{Span, SpanNode, Trace};
pub use tree::{build_span_tree, total_duration};
