//! Central store for field values, caret positions, selections and focus.
//!
//! The store knows nothing about counting or limits. It edits text the way
//! a host text control would, so that the countdown can observe the result
//! of each edit and correct it afterwards.

use crate::id::FieldId;
use crate::selection::SelectionRange;
use crate::state::FieldState;
use crate::text::{
    clamp_to_char_boundary, filter_single_line, normalize_newlines, prev_cursor_boundary,
};
use std::collections::HashMap;

/// Text state for every field of a document.
///
/// Carets and selections are UTF-8 byte offsets into the stored value.
///
/// # Example
///
/// ```
/// use input_core::{FieldId, FieldValueStore};
///
/// let mut store = FieldValueStore::new();
/// let id = FieldId::from_raw(1);
///
/// store.ensure_initial(id, "Hello".to_string(), false);
/// store.focus(id);
/// store.insert_text(id, " World");
///
/// assert_eq!(store.get(id), Some("Hello World"));
/// assert_eq!(store.caret(id), Some(11));
/// ```
#[derive(Clone, Debug, Default)]
pub struct FieldValueStore {
    values: HashMap<FieldId, FieldState>,
}

impl FieldValueStore {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn has(&self, id: FieldId) -> bool {
        self.values.contains_key(&id)
    }

    /// Returns `(value, caret, selection)` if the field exists.
    pub fn get_state(&self, id: FieldId) -> Option<(&str, usize, Option<SelectionRange>)> {
        self.values.get(&id).map(|s| {
            let sel = selection_range(&s.value, s.selection_anchor, s.caret);
            (s.value.as_str(), s.caret, sel)
        })
    }

    pub fn get(&self, id: FieldId) -> Option<&str> {
        self.values.get(&id).map(|s| s.value.as_str())
    }

    pub fn caret(&self, id: FieldId) -> Option<usize> {
        self.values.get(&id).map(|s| s.caret)
    }

    /// The selection, or a collapsed range at the caret when nothing is selected.
    pub fn selection(&self, id: FieldId) -> Option<SelectionRange> {
        self.values.get(&id).map(|s| {
            selection_range(&s.value, s.selection_anchor, s.caret)
                .unwrap_or(SelectionRange::collapsed(s.caret))
        })
    }

    /// Monotonic revision counter for the field's value.
    pub fn value_revision(&self, id: FieldId) -> u64 {
        self.values.get(&id).map(|s| s.value_rev).unwrap_or(0)
    }

    pub fn is_focused(&self, id: FieldId) -> bool {
        self.values.get(&id).is_some_and(|s| s.focused)
    }

    pub fn is_multiline(&self, id: FieldId) -> bool {
        self.values.get(&id).is_some_and(|s| s.multiline)
    }

    /// Ensure an entry exists; if missing, inserts `initial` with the caret at its end.
    pub fn ensure_initial(&mut self, id: FieldId, initial: String, multiline: bool) {
        let caret = initial.len();
        self.values.entry(id).or_insert(FieldState {
            value: initial,
            caret,
            multiline,
            ..FieldState::default()
        });
    }

    /// Programmatic assignment: stores `value` verbatim, caret to the end,
    /// selection cleared.
    pub fn set(&mut self, id: FieldId, value: String) {
        let st = self.values.entry(id).or_default();
        st.caret = value.len();
        st.value = value;
        st.selection_anchor = None;
        mark_text_dirty(st);
    }

    /// Gives the field focus. Focus is exclusive within the store.
    pub fn focus(&mut self, id: FieldId) {
        for (other, st) in self.values.iter_mut() {
            st.focused = *other == id;
        }
        if let Some(st) = self.values.get_mut(&id) {
            clamp_state(st);
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Insert text at the caret, replacing any selection.
    ///
    /// Multi-line fields normalize line endings to LF; single-line fields
    /// drop them.
    pub fn insert_text(&mut self, id: FieldId, s: &str) {
        let st = self.values.entry(id).or_default();
        clamp_state(st);

        let s = if st.multiline {
            normalize_newlines(s)
        } else {
            filter_single_line(s)
        };
        if s.is_empty() {
            return;
        }

        delete_selection_if_any(st);

        let caret = st.caret;
        st.value.insert_str(caret, &s);
        st.caret = caret + s.len();
        mark_text_dirty(st);
    }

    /// Delete the segment before the caret, or the selection if there is one.
    pub fn backspace(&mut self, id: FieldId) {
        if let Some(st) = self.values.get_mut(&id) {
            clamp_state(st);
            if delete_selection_if_any(st) || st.caret == 0 {
                return;
            }

            let prev = prev_cursor_boundary(&st.value, st.caret);
            st.value.drain(prev..st.caret);
            st.caret = prev;
            mark_text_dirty(st);
        }
    }

    /// Set the caret to a byte position.
    ///
    /// If `selecting` is true, extends the selection from the current caret.
    pub fn set_caret(&mut self, id: FieldId, caret: usize, selecting: bool) {
        let st = self.values.entry(id).or_default();
        clamp_state(st);
        let caret = clamp_to_char_boundary(&st.value, caret);

        if selecting {
            if st.selection_anchor.is_none() {
                st.selection_anchor = Some(st.caret);
            }
            st.caret = caret;
            normalize_selection_anchor(st);
        } else {
            st.caret = caret;
            st.selection_anchor = None;
        }
    }

    /// Select `start..end` (byte offsets), leaving the caret at `end`.
    pub fn select_range(&mut self, id: FieldId, start: usize, end: usize) {
        let st = self.values.entry(id).or_default();
        st.selection_anchor = Some(clamp_to_char_boundary(&st.value, start));
        st.caret = clamp_to_char_boundary(&st.value, end);
        normalize_selection_anchor(st);
    }
}

// --- Internal helper functions ---

fn selection_range(value: &str, anchor: Option<usize>, caret: usize) -> Option<SelectionRange> {
    let anchor = clamp_to_char_boundary(value, anchor?);
    let caret = clamp_to_char_boundary(value, caret);
    (anchor != caret).then(|| SelectionRange::new(anchor, caret))
}

fn normalize_selection_anchor(st: &mut FieldState) {
    let Some(anchor) = st.selection_anchor else {
        return;
    };
    let anchor = clamp_to_char_boundary(&st.value, anchor);
    // A collapsed selection is just a caret.
    st.selection_anchor = (anchor != st.caret).then_some(anchor);
}

fn delete_selection_if_any(st: &mut FieldState) -> bool {
    let Some(sel) = selection_range(&st.value, st.selection_anchor, st.caret) else {
        st.selection_anchor = None;
        return false;
    };

    st.value.drain(sel.start..sel.end);
    st.caret = sel.start;
    st.selection_anchor = None;
    mark_text_dirty(st);
    true
}

fn clamp_state(st: &mut FieldState) {
    st.caret = clamp_to_char_boundary(&st.value, st.caret);
    if let Some(a) = st.selection_anchor {
        st.selection_anchor = Some(clamp_to_char_boundary(&st.value, a));
    }
}

fn mark_text_dirty(st: &mut FieldState) {
    st.value_rev = st.value_rev.wrapping_add(1);
}
