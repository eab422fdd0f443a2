use crate::dom_patch::{DomPatch, PatchKey};
use crate::dom_utils::Selector;
use crate::types::{Attribute, Id, Node};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatchError {
    InvalidKey(PatchKey),
    DuplicateKey(PatchKey),
    MissingKey(PatchKey),
    WrongNodeKind(PatchKey),
    InvalidParent(PatchKey),
    InvalidSibling { parent: PatchKey, before: PatchKey },
    CycleDetected { parent: PatchKey, child: PatchKey },
    MidStreamClear,
    MissingRoot,
}

impl fmt::Display for DomPatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidKey(k) => write!(f, "invalid patch key {}", k.0),
            Self::DuplicateKey(k) => write!(f, "patch key {} was already allocated", k.0),
            Self::MissingKey(k) => write!(f, "patch key {} does not name a live node", k.0),
            Self::WrongNodeKind(k) => write!(f, "node {} has the wrong kind for this patch", k.0),
            Self::InvalidParent(k) => write!(f, "node {} cannot take this parent/child role", k.0),
            Self::InvalidSibling { parent, before } => {
                write!(f, "node {} is not a child of {}", before.0, parent.0)
            }
            Self::CycleDetected { parent, child } => {
                write!(f, "attaching {} under {} would create a cycle", child.0, parent.0)
            }
            Self::MidStreamClear => f.write_str("clear must be the first patch of a batch"),
            Self::MissingRoot => f.write_str("document has no root"),
        }
    }
}

impl std::error::Error for DomPatchError {}

/// A single document, mutated only through [`DomPatch`] batches.
///
/// Besides applying patches the store answers the structural queries an
/// enhancement needs before emitting its own patches: parent of a node,
/// attributes, first match of a selector, and fresh key allocation.
#[derive(Debug, Default)]
pub struct DomStore {
    arena: DomArena,
    root: Option<PatchKey>,
}

impl DomStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole document with `root` and its subtree.
    pub fn load(&mut self, root: &Node) -> Result<(), DomPatchError> {
        let mut patches = vec![DomPatch::Clear];
        DomPatch::create_subtree(root, None, &mut patches);
        self.apply(&patches)
    }

    /// Apply `patches` as one unit. On error the store is left exactly as
    /// it was before the batch.
    pub fn apply(&mut self, patches: &[DomPatch]) -> Result<(), DomPatchError> {
        if patches
            .iter()
            .skip(1)
            .any(|patch| matches!(patch, DomPatch::Clear))
        {
            return Err(DomPatchError::MidStreamClear);
        }
        let saved = (self.arena.clone(), self.root);
        for patch in patches {
            log::trace!(target: "html.dom_store", "apply {patch:?}");
            if let Err(err) = self.apply_one(patch) {
                log::debug!(target: "html.dom_store", "batch rolled back: {err}");
                (self.arena, self.root) = saved;
                return Err(err);
            }
        }
        Ok(())
    }

    /// Number of live nodes, attached or not.
    pub fn len(&self) -> usize {
        self.arena.live.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.live.is_empty()
    }

    /// A key no node has used yet in this document.
    pub fn allocate_key(&mut self) -> PatchKey {
        self.arena.next_key = self.arena.next_key.max(1);
        let key = PatchKey(self.arena.next_key);
        self.arena.next_key += 1;
        key
    }

    pub fn contains(&self, key: PatchKey) -> bool {
        self.arena.live.contains_key(&key)
    }

    pub fn parent(&self, key: PatchKey) -> Option<PatchKey> {
        let index = *self.arena.live.get(&key)?;
        self.arena.nodes[index].parent
    }

    pub fn children(&self, key: PatchKey) -> &[PatchKey] {
        match self.arena.live.get(&key) {
            Some(&index) => &self.arena.nodes[index].children,
            None => &[],
        }
    }

    pub fn attributes(&self, key: PatchKey) -> Option<&[Attribute]> {
        let index = *self.arena.live.get(&key)?;
        match &self.arena.nodes[index].kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    pub fn attr(&self, key: PatchKey, name: &str) -> Option<&str> {
        crate::dom_utils::attr(self.attributes(key)?, name)
    }

    /// Concatenated text of every text node under `key`, in document order.
    pub fn text_content(&self, key: PatchKey) -> String {
        let mut out = String::new();
        self.arena.collect_text(key, &mut out);
        out
    }

    /// First element in document order matching `selector`.
    pub fn find_first(&self, selector: &Selector) -> Option<PatchKey> {
        let root = self.root?;
        let mut stack = vec![root];
        while let Some(key) = stack.pop() {
            let Some(&index) = self.arena.live.get(&key) else {
                continue;
            };
            let record = &self.arena.nodes[index];
            if let NodeKind::Element { name, attributes } = &record.kind
                && selector.matches(name, attributes)
            {
                return Some(key);
            }
            stack.extend(record.children.iter().rev().copied());
        }
        None
    }

    pub fn materialize(&self) -> Result<Node, DomPatchError> {
        let Some(root) = self.root else {
            return Err(DomPatchError::MissingRoot);
        };
        self.arena.materialize(root)
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), DomPatchError> {
        match patch {
            DomPatch::Clear => {
                self.arena = DomArena::default();
                self.root = None;
            }
            DomPatch::CreateDocument { key, doctype } => {
                ensure_key(*key)?;
                self.arena.insert_node(
                    *key,
                    NodeKind::Document {
                        doctype: doctype.clone(),
                    },
                )?;
                self.root = Some(*key);
            }
            DomPatch::CreateElement {
                key,
                name,
                attributes,
            } => {
                ensure_key(*key)?;
                self.arena.insert_node(
                    *key,
                    NodeKind::Element {
                        name: Arc::clone(name),
                        attributes: attributes.clone(),
                    },
                )?;
            }
            DomPatch::CreateText { key, text } => {
                ensure_key(*key)?;
                self.arena
                    .insert_node(*key, NodeKind::Text { text: text.clone() })?;
            }
            DomPatch::CreateComment { key, text } => {
                ensure_key(*key)?;
                self.arena
                    .insert_node(*key, NodeKind::Comment { text: text.clone() })?;
            }
            DomPatch::AppendChild { parent, child } => {
                self.arena.attach(*parent, *child, None)?;
            }
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => {
                self.arena.attach(*parent, *child, Some(*before))?;
            }
            DomPatch::RemoveNode { key } => {
                self.arena.index(*key)?;
                if self.root == Some(*key) {
                    self.root = None;
                }
                self.arena.remove_subtree(*key);
            }
            DomPatch::SetAttributes { key, attributes } => {
                let index = self.arena.index(*key)?;
                match &mut self.arena.nodes[index].kind {
                    NodeKind::Element {
                        attributes: attrs, ..
                    } => {
                        attrs.clear();
                        attrs.extend(attributes.iter().cloned());
                    }
                    _ => return Err(DomPatchError::WrongNodeKind(*key)),
                }
            }
            DomPatch::SetText { key, text } => {
                let index = self.arena.index(*key)?;
                match &mut self.arena.nodes[index].kind {
                    NodeKind::Text { text: existing } => {
                        existing.clear();
                        existing.push_str(text);
                    }
                    _ => return Err(DomPatchError::WrongNodeKind(*key)),
                }
            }
        }
        Ok(())
    }
}

fn ensure_key(key: PatchKey) -> Result<(), DomPatchError> {
    if key == PatchKey::INVALID {
        return Err(DomPatchError::InvalidKey(key));
    }
    Ok(())
}

#[derive(Clone, Debug, Default)]
struct DomArena {
    nodes: Vec<NodeRecord>,
    live: HashMap<PatchKey, usize>,
    allocated: HashSet<PatchKey>,
    /// Lowest key above every key created or handed out so far.
    next_key: u32,
}

impl DomArena {
    fn index(&self, key: PatchKey) -> Result<usize, DomPatchError> {
        ensure_key(key)?;
        self.live
            .get(&key)
            .copied()
            .ok_or(DomPatchError::MissingKey(key))
    }

    fn insert_node(&mut self, key: PatchKey, kind: NodeKind) -> Result<(), DomPatchError> {
        if !self.allocated.insert(key) {
            return Err(DomPatchError::DuplicateKey(key));
        }
        self.next_key = self.next_key.max(key.0.saturating_add(1));
        let index = self.nodes.len();
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.live.insert(key, index);
        Ok(())
    }

    fn attach(
        &mut self,
        parent: PatchKey,
        child: PatchKey,
        before: Option<PatchKey>,
    ) -> Result<(), DomPatchError> {
        let parent_index = self.index(parent)?;
        let child_index = self.index(child)?;
        if parent == child || self.is_descendant(child, parent) {
            return Err(DomPatchError::CycleDetected { parent, child });
        }
        if !self.nodes[parent_index].allows_children() {
            return Err(DomPatchError::InvalidParent(parent));
        }
        if self.nodes[child_index].parent.is_some() {
            return Err(DomPatchError::InvalidParent(child));
        }

        let pos = match before {
            None => self.nodes[parent_index].children.len(),
            Some(before) => {
                let before_index = self.index(before)?;
                if self.nodes[before_index].parent != Some(parent) {
                    return Err(DomPatchError::InvalidSibling { parent, before });
                }
                self.nodes[parent_index]
                    .children
                    .iter()
                    .position(|k| *k == before)
                    .ok_or(DomPatchError::InvalidSibling { parent, before })?
            }
        };
        self.nodes[parent_index].children.insert(pos, child);
        self.nodes[child_index].parent = Some(parent);
        Ok(())
    }

    fn remove_subtree(&mut self, key: PatchKey) {
        let Some(index) = self.live.remove(&key) else {
            return;
        };
        if let Some(parent) = self.nodes[index].parent.take()
            && let Some(&parent_index) = self.live.get(&parent)
        {
            self.nodes[parent_index].children.retain(|k| *k != key);
        }
        let children = std::mem::take(&mut self.nodes[index].children);
        for child in children {
            if let Some(&child_index) = self.live.get(&child) {
                // Detach first so the recursive call does not touch our list.
                self.nodes[child_index].parent = None;
                self.remove_subtree(child);
            }
        }
    }

    fn is_descendant(&self, ancestor: PatchKey, maybe_descendant: PatchKey) -> bool {
        let Some(&index) = self.live.get(&ancestor) else {
            return false;
        };
        let mut stack: Vec<PatchKey> = self.nodes[index].children.clone();
        while let Some(current) = stack.pop() {
            if current == maybe_descendant {
                return true;
            }
            if let Some(&child_index) = self.live.get(&current) {
                stack.extend(self.nodes[child_index].children.iter().copied());
            }
        }
        false
    }

    fn collect_text(&self, key: PatchKey, out: &mut String) {
        let Some(&index) = self.live.get(&key) else {
            return;
        };
        match &self.nodes[index].kind {
            NodeKind::Text { text } => out.push_str(text),
            NodeKind::Comment { .. } => {}
            NodeKind::Document { .. } | NodeKind::Element { .. } => {
                for child in &self.nodes[index].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    fn materialize(&self, key: PatchKey) -> Result<Node, DomPatchError> {
        let index = self.index(key)?;
        let id = Id(key.0);
        let children = self.nodes[index]
            .children
            .iter()
            .map(|child| self.materialize(*child))
            .collect::<Result<Vec<_>, _>>()?;
        let node = match &self.nodes[index].kind {
            NodeKind::Document { doctype } => Node::Document {
                id,
                doctype: doctype.clone(),
                children,
            },
            NodeKind::Element { name, attributes } => Node::Element {
                id,
                name: Arc::clone(name),
                attributes: attributes.clone(),
                children,
            },
            NodeKind::Text { text } => Node::Text {
                id,
                text: text.clone(),
            },
            NodeKind::Comment { text } => Node::Comment {
                id,
                text: text.clone(),
            },
        };
        Ok(node)
    }
}

#[derive(Clone, Debug)]
struct NodeRecord {
    kind: NodeKind,
    parent: Option<PatchKey>,
    children: Vec<PatchKey>,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document { .. } | NodeKind::Element { .. }
        )
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Document {
        doctype: Option<String>,
    },
    Element {
        name: Arc<str>,
        attributes: Vec<Attribute>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}
