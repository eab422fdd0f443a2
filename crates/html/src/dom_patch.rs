//! Incremental DOM patch protocol.
//!
//! Everything that changes a [`DomStore`](crate::DomStore) arrives as a
//! batch of these operations: the initial page load, and every node or
//! attribute an enhancement creates or touches afterwards.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to live keys at the time they are used (except
//!   the `key` in create operations).
//! - `PatchKey::INVALID` is never valid in a patch stream.
//! - A key is never reused within a document, even after removal.
//! - Attribute order and duplicates are preserved; appliers must not dedupe.
//! - Operations must not create cycles; a node has at most one parent.

use crate::types::{Attribute, Id};
use std::sync::Arc;

/// Stable node identity within a document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    pub const INVALID: PatchKey = PatchKey(0);

    pub fn from_id(id: Id) -> Self {
        PatchKey(id.0)
    }

    pub fn to_id(self) -> Id {
        Id(self.0)
    }
}

#[non_exhaustive]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Drop every node. Only valid as the first patch of a batch.
    Clear,
    CreateDocument {
        key: PatchKey,
        doctype: Option<String>,
    },
    CreateElement {
        key: PatchKey,
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    CreateText {
        key: PatchKey,
        text: String,
    },
    CreateComment {
        key: PatchKey,
        text: String,
    },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Insert a child immediately before an existing sibling.
    InsertBefore {
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    },
    /// Remove a node and its entire subtree.
    RemoveNode { key: PatchKey },
    /// Replace all attributes on an element node.
    SetAttributes {
        key: PatchKey,
        attributes: Vec<Attribute>,
    },
    /// Replace the text content of a text node.
    SetText { key: PatchKey, text: String },
}

impl DomPatch {
    /// Patches that build `node` and its subtree, keyed by node ids,
    /// with the root appended to `parent` when given.
    pub fn create_subtree(node: &crate::Node, parent: Option<PatchKey>, out: &mut Vec<DomPatch>) {
        use crate::Node;

        let key = PatchKey::from_id(node.id());
        out.push(match node {
            Node::Document { doctype, .. } => DomPatch::CreateDocument {
                key,
                doctype: doctype.clone(),
            },
            Node::Element {
                name, attributes, ..
            } => DomPatch::CreateElement {
                key,
                name: Arc::clone(name),
                attributes: attributes.clone(),
            },
            Node::Text { text, .. } => DomPatch::CreateText {
                key,
                text: text.clone(),
            },
            Node::Comment { text, .. } => DomPatch::CreateComment {
                key,
                text: text.clone(),
            },
        });
        if let Some(parent) = parent {
            out.push(DomPatch::AppendChild { parent, child: key });
        }
        for child in node.children() {
            Self::create_subtree(child, Some(key), out);
        }
    }
}
