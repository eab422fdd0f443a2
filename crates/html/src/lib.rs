//! Minimal document model for hosting form-field enhancements.
//!
//! A document is a tree of [`Node`]s owned by a [`DomStore`]. The store is
//! only ever mutated through [`DomPatch`] batches, so every change an
//! enhancement makes to a page is an explicit, ordered, replayable list.

pub mod dom_patch;
#[cfg(any(test, feature = "dom-snapshot"))]
pub mod dom_snapshot;
pub mod dom_store;
pub mod dom_utils;
mod types;

pub use crate::dom_patch::{DomPatch, PatchKey};
pub use crate::dom_store::{DomPatchError, DomStore};
pub use crate::dom_utils::Selector;
pub use crate::types::{Attribute, Id, Node, NodeId};
