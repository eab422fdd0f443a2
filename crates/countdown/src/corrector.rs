//! Overrun correction: cut the excess at the edit point.
//!
//! All offsets here are normalized units. The excess is removed ending at
//! the caret and extending backward, so the text a user just typed or
//! pasted is what goes. An overflow that did not originate next to the
//! caret (a programmatic assignment, say) still loses the text before the
//! caret, not the text that caused it.
//!
//! Line endings are never split: a span boundary that lands inside one
//! widens to cover the whole line ending, so at least `excess` units are
//! always removed. When fewer than `excess` units precede the caret, the
//! rest is taken from after it.

use input_core::{byte_offset_ceil, byte_offset_floor, normalized_offset};

/// Result of one corrective cut.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Trim {
    /// The shortened value.
    pub value: String,
    /// Collapsed caret, at the start of the removed span.
    pub caret: usize,
    /// Normalized units removed. Never less than the requested excess
    /// unless the whole value was shorter.
    pub removed: usize,
}

/// Remove `excess` normalized units from `text` ending at `caret`.
///
/// ```
/// use countdown::corrector::trim_excess;
///
/// let trim = trim_excess("Hello World", 11, 1);
/// assert_eq!(trim.value, "Hello Worl");
/// assert_eq!(trim.caret, 10);
/// assert_eq!(trim.removed, 1);
/// ```
pub fn trim_excess(text: &str, caret: usize, excess: usize) -> Trim {
    let caret_byte = byte_offset_floor(text, caret);
    let caret_units = normalized_offset(text, caret_byte);

    if excess == 0 {
        return Trim {
            value: text.to_string(),
            caret: caret_units,
            removed: 0,
        };
    }

    let start_byte = byte_offset_floor(text, caret_units.saturating_sub(excess));
    let start_units = normalized_offset(text, start_byte);
    let behind = caret_units - start_units;

    let end_byte = if behind >= excess {
        caret_byte
    } else {
        byte_offset_ceil(text, caret_units + (excess - behind))
    };
    let removed = normalized_offset(text, end_byte) - start_units;

    let mut value = String::with_capacity(text.len() - (end_byte - start_byte));
    value.push_str(&text[..start_byte]);
    value.push_str(&text[end_byte..]);

    log::debug!(
        target: "countdown.corrector",
        "trimmed {removed} unit(s) for excess {excess} at caret {caret_units}; caret now {start_units}"
    );

    Trim {
        caret: normalized_offset(&value, start_byte),
        value,
        removed,
    }
}
