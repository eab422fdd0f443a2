//! In-memory document host.
//!
//! A [`Document`] pairs a patch-driven [`DomStore`] with the
//! [`FieldValueStore`] holding what users typed. Countdowns attached here
//! see their field through a [`Binding`], which turns every attribute,
//! class and counter change into a [`DomPatch`](html::DomPatch) batch.
//!
//! The editing helpers behave like a user at a keyboard: text goes in at
//! the caret, native `maxlength` truncation applies when the profile asks
//! for it, and each keystroke delivers `input` then `keyup`.

mod binding;
mod seed;

pub use binding::Binding;
pub use seed::{TextControl, seed_text_controls, text_control_kind};

use crate::config::CountdownOptions;
use crate::controller::{CharCountdown, EditOutcome};
use crate::counter::CounterState;
use crate::event::EditEvent;
use html::dom_snapshot::DomSnapshot;
use html::{DomPatchError, DomStore, Id, Node, PatchKey};
use input_core::{
    FieldId, FieldValueStore, OffsetUnit, SelectionRange, byte_offset_floor, filter_single_line,
    normalize_newlines, normalized_offset,
};
use std::collections::HashMap;
use std::fmt;

/// Which selection features the simulated host offers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostProfile {
    /// Report numeric selection offsets.
    pub selection_offsets: bool,
    /// Allow setting a selection range.
    pub selection_range: bool,
    /// Unit of reported offsets. Line endings count by their stored form.
    pub unit: OffsetUnit,
    /// Truncate user input at the `maxlength` attribute, counting a line
    /// ending as one character.
    pub enforce_maxlength: bool,
}

impl HostProfile {
    /// A current browser: UTF-16 offsets, settable selection, native maxlength.
    pub const fn modern() -> Self {
        Self {
            selection_offsets: true,
            selection_range: true,
            unit: OffsetUnit::Utf16,
            enforce_maxlength: true,
        }
    }

    /// A host without any numeric selection API.
    pub const fn legacy() -> Self {
        Self {
            selection_offsets: false,
            selection_range: false,
            unit: OffsetUnit::Utf16,
            enforce_maxlength: false,
        }
    }
}

impl Default for HostProfile {
    fn default() -> Self {
        Self::modern()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DocumentError {
    Dom(DomPatchError),
    NotATextControl(Id),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Dom(err) => write!(f, "dom patch failed: {err}"),
            Self::NotATextControl(id) => {
                write!(f, "node {} is not a text input or textarea", id.0)
            }
        }
    }
}

impl std::error::Error for DocumentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Dom(err) => Some(err),
            Self::NotATextControl(_) => None,
        }
    }
}

impl From<DomPatchError> for DocumentError {
    fn from(err: DomPatchError) -> Self {
        Self::Dom(err)
    }
}

/// Nodes of a mounted counter label.
#[derive(Clone, Debug)]
pub(crate) struct CounterNodes {
    pub label: PatchKey,
    pub strong: PatchKey,
    pub count_text: PatchKey,
    pub low_class: String,
}

#[derive(Debug, Default)]
pub struct Document {
    dom: DomStore,
    fields: FieldValueStore,
    controls: HashMap<Id, TextControl>,
    counters: HashMap<Id, CounterNodes>,
    countdowns: HashMap<Id, CharCountdown>,
    profile: HostProfile,
}

#[inline]
pub(crate) fn field_id(id: Id) -> FieldId {
    FieldId::from(id.0)
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(profile: HostProfile) -> Self {
        Self {
            profile,
            ..Self::default()
        }
    }

    /// Replace the document with `root`, seeding every text control's value.
    pub fn load(&mut self, root: &Node) -> Result<(), DocumentError> {
        self.dom.load(root)?;
        self.fields.clear();
        self.counters.clear();
        self.countdowns.clear();
        self.controls = seed_text_controls(&mut self.fields, root);
        log::debug!(
            target: "countdown.document",
            "loaded document with {} text control(s)",
            self.controls.len()
        );
        Ok(())
    }

    pub fn profile(&self) -> HostProfile {
        self.profile
    }

    pub fn dom(&self) -> &DomStore {
        &self.dom
    }

    pub fn fields(&self) -> &FieldValueStore {
        &self.fields
    }

    pub fn is_text_control(&self, id: Id) -> bool {
        self.controls.contains_key(&id)
    }

    /// Attach a countdown to the text control `id`. Attaching again
    /// replaces the previous countdown and its counter; if that fails the
    /// field is left with no countdown at all.
    pub fn attach(
        &mut self,
        id: Id,
        options: CountdownOptions,
    ) -> Result<CounterState, DocumentError> {
        if !self.is_text_control(id) || !self.dom.contains(PatchKey::from_id(id)) {
            return Err(DocumentError::NotATextControl(id));
        }
        self.countdowns.remove(&id);
        let mut binding = Binding::new(
            &mut self.dom,
            &mut self.fields,
            &mut self.counters,
            self.profile,
            id,
        );
        let countdown = CharCountdown::attach(&mut binding, options)?;
        let state = countdown.state();
        self.countdowns.insert(id, countdown);
        Ok(state)
    }

    pub fn countdown(&self, id: Id) -> Option<&CharCountdown> {
        self.countdowns.get(&id)
    }

    /// Deliver `event` to the countdown on `id`. `None` when the field has
    /// no countdown.
    pub fn dispatch(
        &mut self,
        id: Id,
        event: EditEvent,
    ) -> Result<Option<EditOutcome>, DocumentError> {
        let Some(countdown) = self.countdowns.get_mut(&id) else {
            return Ok(None);
        };
        let mut binding = Binding::new(
            &mut self.dom,
            &mut self.fields,
            &mut self.counters,
            self.profile,
            id,
        );
        Ok(Some(countdown.handle(&mut binding, event)?))
    }

    // --- user editing ---

    pub fn focus(&mut self, id: Id) {
        self.fields.focus(field_id(id));
    }

    /// Type `text` one character at a time; each keystroke fires `input`
    /// then `keyup`.
    pub fn type_text(&mut self, id: Id, text: &str) -> Result<(), DocumentError> {
        self.ensure_text_control(id)?;
        self.focus_if_blurred(id);
        let mut buf = [0u8; 4];
        for ch in text.chars() {
            if self.insert_user_text(id, ch.encode_utf8(&mut buf)) {
                self.dispatch(id, EditEvent::Input)?;
            }
            self.dispatch(id, EditEvent::KeyUp)?;
        }
        Ok(())
    }

    /// Paste `text` at the caret with the pointer: `input` then `change`.
    pub fn paste(&mut self, id: Id, text: &str) -> Result<(), DocumentError> {
        self.ensure_text_control(id)?;
        self.focus_if_blurred(id);
        if self.insert_user_text(id, text) {
            self.dispatch(id, EditEvent::Input)?;
            self.dispatch(id, EditEvent::Change)?;
        }
        Ok(())
    }

    pub fn backspace(&mut self, id: Id) -> Result<(), DocumentError> {
        self.ensure_text_control(id)?;
        self.focus_if_blurred(id);
        let fid = field_id(id);
        let before = self.fields.value_revision(fid);
        self.fields.backspace(fid);
        if self.fields.value_revision(fid) != before {
            self.dispatch(id, EditEvent::Input)?;
        }
        self.dispatch(id, EditEvent::KeyUp)?;
        Ok(())
    }

    /// Programmatic assignment. Fires no events.
    pub fn set_value(&mut self, id: Id, value: &str) -> Result<(), DocumentError> {
        self.ensure_text_control(id)?;
        self.fields.set(field_id(id), value.to_string());
        Ok(())
    }

    /// Collapse the caret at normalized offset `units`.
    pub fn set_caret(&mut self, id: Id, units: usize) {
        self.select(id, units, units);
    }

    /// Select normalized offsets `start..end`. Offsets inside a line ending
    /// snap to its start.
    pub fn select(&mut self, id: Id, start: usize, end: usize) {
        let fid = field_id(id);
        let Some(value) = self.fields.get(fid) else {
            return;
        };
        let range = SelectionRange::new(start, end).map(|u| byte_offset_floor(value, u));
        if range.is_empty() {
            self.fields.set_caret(fid, range.start, false);
        } else {
            self.fields.select_range(fid, range.start, range.end);
        }
    }

    // --- queries ---

    pub fn value(&self, id: Id) -> Option<&str> {
        self.fields.get(field_id(id))
    }

    /// Caret in normalized units.
    pub fn caret(&self, id: Id) -> Option<usize> {
        let (value, caret, _) = self.fields.get_state(field_id(id))?;
        Some(normalized_offset(value, caret))
    }

    /// Full text of the counter label for `id`, message included.
    pub fn counter_text(&self, id: Id) -> Option<String> {
        let nodes = self.counters.get(&id)?;
        Some(self.dom.text_content(nodes.label))
    }

    /// Just the number shown by the counter for `id`.
    pub fn counter_count(&self, id: Id) -> Option<String> {
        let nodes = self.counters.get(&id)?;
        Some(self.dom.text_content(nodes.count_text))
    }

    pub fn counter_is_low(&self, id: Id) -> bool {
        self.counters.get(&id).is_some_and(|nodes| {
            self.dom
                .attributes(nodes.strong)
                .is_some_and(|attrs| html::dom_utils::has_class(attrs, &nodes.low_class))
        })
    }

    /// Parent of the counter label for `id`, and its index among the
    /// parent's children.
    pub fn counter_position(&self, id: Id) -> Option<(PatchKey, usize)> {
        let nodes = self.counters.get(&id)?;
        let parent = self.dom.parent(nodes.label)?;
        let index = self
            .dom
            .children(parent)
            .iter()
            .position(|k| *k == nodes.label)?;
        Some((parent, index))
    }

    pub fn snapshot(&self) -> Result<DomSnapshot, DocumentError> {
        Ok(DomSnapshot::new(&self.dom.materialize()?))
    }

    fn ensure_text_control(&self, id: Id) -> Result<(), DocumentError> {
        if self.is_text_control(id) {
            Ok(())
        } else {
            Err(DocumentError::NotATextControl(id))
        }
    }

    fn focus_if_blurred(&mut self, id: Id) {
        let fid = field_id(id);
        if !self.fields.is_focused(fid) {
            self.fields.focus(fid);
        }
    }

    /// Insert at the caret the way the host's text control would. Returns
    /// whether the value changed.
    fn insert_user_text(&mut self, id: Id, text: &str) -> bool {
        let fid = field_id(id);
        let normalized = if self.fields.is_multiline(fid) {
            normalize_newlines(text)
        } else {
            filter_single_line(text)
        };
        let allowed = match self.native_room(id) {
            Some(room) => match normalized.char_indices().nth(room) {
                Some((cut, _)) => &normalized[..cut],
                None => &normalized[..],
            },
            None => &normalized[..],
        };
        if allowed.is_empty() {
            return false;
        }
        let before = self.fields.value_revision(fid);
        self.fields.insert_text(fid, allowed);
        self.fields.value_revision(fid) != before
    }

    /// Characters native `maxlength` enforcement still lets in, counting a
    /// stored line ending as one. `None` when nothing is enforced.
    fn native_room(&self, id: Id) -> Option<usize> {
        if !self.profile.enforce_maxlength {
            return None;
        }
        let max = self
            .dom
            .attr(PatchKey::from_id(id), "maxlength")
            .and_then(crate::config::parse_int_prefix)?;
        let fid = field_id(id);
        let value = self.fields.get(fid)?;
        let selection = self.fields.selection(fid)?;
        let selected = value
            .get(selection.start..selection.end)
            .map_or(0, |s| s.chars().count());
        let kept = value.chars().count() - selected;
        Some(max.saturating_sub(kept))
    }
}

#[cfg(test)]
mod tests;
