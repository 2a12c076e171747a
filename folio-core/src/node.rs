//! Rich-text content tree.
//!
//! A page body is an ordered tree: containers (paragraphs, lists, the
//! document root) hold children, leaves carry inline text. The editor speaks
//! ProseMirror-style JSON; storage uses the typed [`Node`] form.
//!
//! ```text
//! {"type":"doc","content":[            Container([
//!   {"type":"paragraph","content":[      Container([
//!     {"type":"text","text":"Hi"}   ──►     Text("Hi"),
//!   ]}                                   ]),
//! ]}                                   ])
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A node of the content tree.
///
/// Externally tagged on purpose: records are bincode-encoded, which cannot
/// drive the self-describing internally tagged form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node {
    /// Leaf carrying inline text.
    Text(String),
    /// Ordered children; may be empty.
    Container(Vec<Node>),
    /// Anything the editor produced that we do not understand.
    Unknown,
}

impl Default for Node {
    fn default() -> Self {
        Node::empty()
    }
}

impl Node {
    /// An empty document body.
    pub fn empty() -> Self {
        Node::Container(Vec::new())
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn container(children: impl IntoIterator<Item = Node>) -> Self {
        Node::Container(children.into_iter().collect())
    }

    /// A document holding one paragraph per entry of `paragraphs`.
    pub fn paragraphs<'a>(paragraphs: impl IntoIterator<Item = &'a str>) -> Self {
        Node::container(
            paragraphs
                .into_iter()
                .map(|p| Node::container([Node::text(p)])),
        )
    }

    /// Convert editor JSON into a content tree.
    ///
    /// Never fails: an object with a string `text` is a text node, an object
    /// with an array `content` is a container, anything else is
    /// [`Node::Unknown`]. A container whose `content` key is absent but whose
    /// `type` is known to be structural is treated as empty.
    pub fn from_editor_json(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            log::trace!("Ignoring non-object editor node: {value}");
            return Node::Unknown;
        };

        if let Some(text) = obj.get("text") {
            return match text.as_str() {
                Some(s) => Node::Text(s.to_owned()),
                None => Node::Unknown,
            };
        }

        match obj.get("content") {
            Some(Value::Array(children)) => {
                Node::Container(children.iter().map(Node::from_editor_json).collect())
            }
            Some(_) => Node::Unknown,
            None if obj.contains_key("type") => Node::Container(Vec::new()),
            None => Node::Unknown,
        }
    }

    /// Convert back into editor JSON. Containers become paragraphs except
    /// at the root, which becomes `doc`; unknown nodes become `null`.
    pub fn to_editor_json(&self) -> Value {
        fn convert(node: &Node, root: bool) -> Value {
            match node {
                Node::Text(text) => json!({ "type": "text", "text": text }),
                Node::Container(children) => json!({
                    "type": if root { "doc" } else { "paragraph" },
                    "content": children.iter().map(|c| convert(c, false)).collect::<Vec<_>>(),
                }),
                Node::Unknown => Value::Null,
            }
        }
        convert(self, true)
    }
}
