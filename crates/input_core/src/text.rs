//! UTF-8 and line-ending unit arithmetic for field values.
//!
//! Field values are split into [`Segment`]s: a line ending (`\r\n`, `\r`
//! or `\n`) is one segment worth two normalized units, every other scalar
//! value is one segment worth one unit. Offsets that fall inside a segment
//! snap to one of its edges, so a line ending is never split.

use std::borrow::Cow;

/// Normalized units occupied by one line ending, whatever its stored form.
pub const LINE_BREAK_UNITS: usize = 2;

/// The unit a host counts native offsets in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OffsetUnit {
    /// UTF-8 bytes (the store's own caret unit).
    #[default]
    Bytes,
    /// Unicode scalar values.
    Chars,
    /// UTF-16 code units (what DOM `selectionStart` reports).
    Utf16,
}

impl OffsetUnit {
    #[inline]
    pub fn measure(self, s: &str) -> usize {
        match self {
            OffsetUnit::Bytes => s.len(),
            OffsetUnit::Chars => s.chars().count(),
            OffsetUnit::Utf16 => s.encode_utf16().count(),
        }
    }
}

/// One indivisible piece of a field value, as a byte range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
    pub line_break: bool,
}

impl Segment {
    #[inline]
    pub fn units(self) -> usize {
        if self.line_break { LINE_BREAK_UNITS } else { 1 }
    }

    #[inline]
    pub fn as_str(self, s: &str) -> &str {
        &s[self.start..self.end]
    }
}

/// Iterate the segments of `s` in order.
///
/// # Examples
///
/// ```
/// use input_core::segments;
///
/// let units: Vec<usize> = segments("a\r\nb\r").map(|s| s.units()).collect();
/// assert_eq!(units, vec![1, 2, 1, 2]);
/// ```
pub fn segments(s: &str) -> Segments<'_> {
    Segments { s, pos: 0 }
}

#[derive(Clone, Debug)]
pub struct Segments<'a> {
    s: &'a str,
    pos: usize,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        let rest = self.s.get(self.pos..)?;
        let ch = rest.chars().next()?;
        let start = self.pos;
        let (len, line_break) = match ch {
            '\r' if rest.as_bytes().get(1) == Some(&b'\n') => (2, true),
            '\r' | '\n' => (1, true),
            _ => (ch.len_utf8(), false),
        };
        self.pos += len;
        Some(Segment {
            start,
            end: self.pos,
            line_break,
        })
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(&['\r', '\n'][..])
}

/// Length of `s` in normalized units: every line ending counts as two.
///
/// This is the length a form submission transmits (`\r\n` per line break),
/// independent of how the host stores the line break.
///
/// # Examples
///
/// ```
/// use input_core::normalized_len;
///
/// assert_eq!(normalized_len("Hello"), 5);
/// assert_eq!(normalized_len("a\nb"), 4);
/// assert_eq!(normalized_len("a\r\nb"), 4);
/// assert_eq!(normalized_len("a\rb"), 4);
/// assert_eq!(normalized_len("€"), 1);
/// ```
pub fn normalized_len(s: &str) -> usize {
    if !has_line_break(s) {
        return s.chars().count();
    }
    segments(s).map(Segment::units).sum()
}

/// Normalized units preceding byte offset `byte`.
///
/// A byte offset inside a segment (mid-character, or between the `\r`
/// and `\n` of a CRLF) counts only the segments that end at or before it.
pub fn normalized_offset(s: &str, byte: usize) -> usize {
    segments(s)
        .take_while(|seg| seg.end <= byte)
        .map(Segment::units)
        .sum()
}

/// Largest segment boundary (in bytes) whose normalized offset is `<= units`.
///
/// # Examples
///
/// ```
/// use input_core::byte_offset_floor;
///
/// let s = "ab\ncd";
/// assert_eq!(byte_offset_floor(s, 2), 2);
/// assert_eq!(byte_offset_floor(s, 3), 2); // inside the line ending
/// assert_eq!(byte_offset_floor(s, 4), 3);
/// assert_eq!(byte_offset_floor(s, 99), s.len());
/// ```
pub fn byte_offset_floor(s: &str, units: usize) -> usize {
    let mut acc = 0usize;
    for seg in segments(s) {
        if acc + seg.units() > units {
            return seg.start;
        }
        acc += seg.units();
    }
    s.len()
}

/// Smallest segment boundary (in bytes) whose normalized offset is `>= units`.
///
/// # Examples
///
/// ```
/// use input_core::byte_offset_ceil;
///
/// let s = "ab\ncd";
/// assert_eq!(byte_offset_ceil(s, 0), 0);
/// assert_eq!(byte_offset_ceil(s, 3), 3); // inside the line ending
/// assert_eq!(byte_offset_ceil(s, 99), s.len());
/// ```
pub fn byte_offset_ceil(s: &str, units: usize) -> usize {
    if units == 0 {
        return 0;
    }
    let mut acc = 0usize;
    for seg in segments(s) {
        acc += seg.units();
        if acc >= units {
            return seg.end;
        }
    }
    s.len()
}

/// Convert a host's native offset into normalized units.
///
/// Native offsets count each stored line ending by its stored length, so a
/// host keeping `\n` reports one unit where the normalized count is two.
///
/// # Examples
///
/// ```
/// use input_core::{OffsetUnit, native_to_normalized};
///
/// // "a\nb": the caret after 'b' is native 3 but normalized 4.
/// assert_eq!(native_to_normalized("a\nb", 3, OffsetUnit::Utf16), 4);
/// // An astral character is two UTF-16 units but one normalized unit.
/// assert_eq!(native_to_normalized("😀x", 3, OffsetUnit::Utf16), 2);
/// ```
pub fn native_to_normalized(s: &str, native: usize, unit: OffsetUnit) -> usize {
    let mut native_acc = 0usize;
    let mut units = 0usize;
    for seg in segments(s) {
        let width = unit.measure(seg.as_str(s));
        if native_acc + width > native {
            break;
        }
        native_acc += width;
        units += seg.units();
    }
    units
}

/// Convert normalized units back into a host's native offset.
///
/// A unit count inside a line ending snaps to the start of that line ending.
///
/// # Examples
///
/// ```
/// use input_core::{OffsetUnit, normalized_to_native};
///
/// assert_eq!(normalized_to_native("a\nb", 4, OffsetUnit::Utf16), 3);
/// assert_eq!(normalized_to_native("a\nb", 2, OffsetUnit::Utf16), 1);
/// ```
pub fn normalized_to_native(s: &str, units: usize, unit: OffsetUnit) -> usize {
    let mut acc = 0usize;
    let mut native = 0usize;
    for seg in segments(s) {
        if acc + seg.units() > units {
            break;
        }
        acc += seg.units();
        native += unit.measure(seg.as_str(s));
    }
    native
}

/// Clamp an arbitrary byte index to a valid UTF-8 character boundary.
///
/// Indices past the end clamp to `s.len()`; indices inside a multi-byte
/// character move back to its first byte.
///
/// ```
/// use input_core::clamp_to_char_boundary;
///
/// let s = "a€b";
/// assert_eq!(clamp_to_char_boundary(s, 2), 1);
/// assert_eq!(clamp_to_char_boundary(s, 100), 5);
/// ```
#[inline]
pub fn clamp_to_char_boundary(s: &str, index: usize) -> usize {
    let mut index = index.min(s.len());
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Byte index of the segment start before `i`, so `\r\n` is stepped over
/// as one piece.
pub fn prev_cursor_boundary(s: &str, i: usize) -> usize {
    let i = clamp_to_char_boundary(s, i);
    segments(s)
        .take_while(|seg| seg.end <= i)
        .last()
        .map(|seg| seg.start)
        .unwrap_or(0)
}

/// Strip CR and LF, for single-line inputs.
pub fn filter_single_line(s: &str) -> Cow<'_, str> {
    if !has_line_break(s) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.chars().filter(|c| *c != '\n' && *c != '\r').collect())
}

/// Normalize line endings to LF (CRLF/CR → LF), the way textareas store them.
///
/// ```
/// use input_core::normalize_newlines;
///
/// assert_eq!(normalize_newlines("a\r\nb\rc"), "a\nb\nc");
/// ```
pub fn normalize_newlines(s: &str) -> Cow<'_, str> {
    if !s.contains('\r') {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    for seg in segments(s) {
        if seg.line_break {
            out.push('\n');
        } else {
            out.push_str(seg.as_str(s));
        }
    }
    Cow::Owned(out)
}
