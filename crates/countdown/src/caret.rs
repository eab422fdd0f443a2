//! Host capabilities for reading the edit point and placing the caret.
//!
//! A field lives in some host (an in-memory document, a browser page).
//! [`FieldHost`] is the seam: it exposes the field's value, its attributes
//! and whatever selection support the host has. Which strategy is used to
//! read and write the caret is decided once per field, at attach time, by
//! probing what the host actually offers.

use input_core::{
    OffsetUnit, SelectionRange, native_to_normalized, normalized_offset, normalized_to_native,
};
use std::borrow::Cow;

/// A text field as seen by the countdown.
pub trait FieldHost {
    type Error: std::error::Error;

    fn value(&self) -> Cow<'_, str>;

    /// Programmatic assignment. The host decides where its caret ends up.
    fn set_value(&mut self, value: &str) -> Result<(), Self::Error>;

    fn attribute(&self, name: &str) -> Option<String>;

    fn remove_attribute(&mut self, name: &str) -> Result<(), Self::Error>;

    fn add_class(&mut self, class: &str) -> Result<(), Self::Error>;

    fn focus(&mut self) -> Result<(), Self::Error>;

    /// The unit [`native_selection`](Self::native_selection) offsets count in.
    fn offset_unit(&self) -> OffsetUnit;

    /// Current selection in native offsets, if the host exposes them.
    fn native_selection(&self) -> Option<SelectionRange>;

    /// Whether [`set_native_selection`](Self::set_native_selection) does anything.
    fn supports_selection_range(&self) -> bool;

    fn set_native_selection(&mut self, range: SelectionRange) -> Result<(), Self::Error>;
}

/// How the edit point of a field is read.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionProbe {
    /// The host reports numeric offsets; they are converted to normalized units.
    Native,
    /// No numeric offsets: the edit point is the end of the region that
    /// changed between the previous and the current value.
    EditDiff,
}

impl SelectionProbe {
    pub fn detect<H: FieldHost + ?Sized>(host: &H) -> Self {
        if host.native_selection().is_some() {
            SelectionProbe::Native
        } else {
            log::debug!(
                target: "countdown.caret",
                "host exposes no selection offsets; deriving the edit point from value diffs"
            );
            SelectionProbe::EditDiff
        }
    }

    /// Selection start in normalized units. `previous` is the value seen at
    /// the end of the last pass; `current` the value now.
    pub fn caret<H: FieldHost + ?Sized>(self, host: &H, previous: &str, current: &str) -> usize {
        match self {
            SelectionProbe::Native => match host.native_selection() {
                Some(range) => native_to_normalized(current, range.start, host.offset_unit()),
                None => {
                    log::warn!(
                        target: "countdown.caret",
                        "selection offsets unavailable; trimming from offset 0"
                    );
                    0
                }
            },
            SelectionProbe::EditDiff => edit_point(previous, current),
        }
    }
}

/// End of the changed region of `current` relative to `previous`, in
/// normalized units. `0` when nothing changed.
///
/// ```
/// use countdown::caret::edit_point;
///
/// assert_eq!(edit_point("Hello Worl", "Hello World"), 11);
/// assert_eq!(edit_point("abcd", "abXcd"), 3);
/// assert_eq!(edit_point("a", "a\nb"), 4);
/// assert_eq!(edit_point("same", "same"), 0);
/// ```
pub fn edit_point(previous: &str, current: &str) -> usize {
    if previous == current {
        return 0;
    }

    let shared = previous.len().min(current.len());
    let prefix = previous
        .char_indices()
        .zip(current.chars())
        .find(|((_, a), b)| a != b)
        .map_or(shared, |((i, _), _)| i);

    let max_suffix = shared - prefix;
    let mut suffix = 0usize;
    for (a, b) in previous.chars().rev().zip(current.chars().rev()) {
        if a != b || suffix + b.len_utf8() > max_suffix {
            break;
        }
        suffix += b.len_utf8();
    }

    normalized_offset(current, current.len() - suffix)
}

/// How the caret is moved after a corrective rewrite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaretMover {
    /// Focus, then set a collapsed native selection.
    Native,
    /// Focus only; the caret stays wherever the host put it.
    FocusOnly,
}

impl CaretMover {
    pub fn detect<H: FieldHost + ?Sized>(host: &H) -> Self {
        if host.supports_selection_range() {
            CaretMover::Native
        } else {
            log::debug!(
                target: "countdown.caret",
                "host cannot set a selection range; caret placement is skipped"
            );
            CaretMover::FocusOnly
        }
    }

    /// Move the caret to normalized offset `units` and focus the field.
    /// Host failures are logged, never propagated.
    pub fn place<H: FieldHost + ?Sized>(self, host: &mut H, units: usize) {
        if let Err(err) = host.focus() {
            log::warn!(target: "countdown.caret", "focus failed: {err}");
        }
        if self == CaretMover::FocusOnly {
            return;
        }
        let native = normalized_to_native(&host.value(), units, host.offset_unit());
        if let Err(err) = host.set_native_selection(SelectionRange::collapsed(native)) {
            log::warn!(target: "countdown.caret", "caret placement failed: {err}");
        }
    }
}
