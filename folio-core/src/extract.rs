//! Text extraction for the search index.
//!
//! Flattens a content tree into the string stored in a page's
//! `search_text` field. Pure: the same tree always yields the same string.

use crate::node::Node;

/// Concatenate every text node in document order, each followed by a
/// single space. Containers contribute only their children; unknown nodes
/// contribute nothing.
///
/// The walk itself uses an explicit stack, so extraction does not recurse
/// however deep the tree is. Other operations on [`Node`] still recurse:
/// dropping, cloning, serde encoding and [`Node::from_editor_json`].
pub fn extract_text(root: &Node) -> String {
    let mut out = String::new();
    let mut stack = vec![root];

    while let Some(node) = stack.pop() {
        match node {
            Node::Text(text) => {
                out.push_str(text);
                out.push(' ');
            }
            // Reverse so the first child is popped first.
            Node::Container(children) => stack.extend(children.iter().rev()),
            Node::Unknown => {}
        }
    }

    out
}

/// The normalized index string for a page:
/// `lowercase(trim(title + " " + extract_text(content)))`.
pub fn search_text(title: &str, content: &Node) -> String {
    let mut combined = String::with_capacity(title.len() + 1);
    combined.push_str(title);
    combined.push(' ');
    combined.push_str(&extract_text(content));
    combined.trim().to_lowercase()
}
