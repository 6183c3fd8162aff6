//! Markdown-to-content-block conversion.
//!
//! Turns the freeform markdown written by people (daily log context) and by
//! the summarizer (weekly/monthly output) into an ordered list of typed
//! [`ContentNode`]s before storage, and renders stored nodes back into
//! markdown when a record is presented to the summarizer.

mod blocks;
mod render;

use tracing::{instrument, trace};

use worklog_shared::ContentNode;

pub use render::render;

/// Convert markdown-like text into content nodes.
///
/// Total and deterministic: anything not recognized as a heading or a list
/// item becomes part of a paragraph. Blank lines never produce nodes.
#[instrument(level = "trace", skip_all, fields(len = text.len()))]
pub fn parse(text: &str) -> Vec<ContentNode> {
    let nodes = blocks::parse_blocks(text);
    trace!(nodes = nodes.len(), "parsed content blocks");
    nodes
}
