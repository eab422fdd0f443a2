//! # input_core
//!
//! Host-agnostic field state for the character countdown enhancement.
//!
//! This crate provides the building blocks every host shares:
//! - [`FieldId`]: an opaque identifier for a text field
//! - [`FieldValueStore`]: field text, caret, selection and focus per field
//! - [`SelectionRange`]: a normalized `start <= end` offset pair
//! - line-ending aware unit arithmetic ([`normalized_len`] and friends)
//!
//! ## Units
//!
//! Three offset systems meet here:
//! - **byte offsets** into the stored UTF-8 value (what the store uses);
//! - **native offsets** reported by a host, in the host's [`OffsetUnit`],
//!   counting each line ending by its stored length (`\n` is one unit);
//! - **normalized units**, where every line ending (`\r\n`, `\r` or `\n`)
//!   counts as two units and every other scalar value as one. This is the
//!   length a form submission carries, so counting and trimming use it.
//!
//! The conversion functions in this crate are the only place the three
//! meet; everything above works in normalized units.

mod id;
mod selection;
mod state;
mod store;
mod text;

pub use id::FieldId;
pub use selection::SelectionRange;
pub use store::FieldValueStore;

pub use text::{
    OffsetUnit, Segment, Segments, byte_offset_ceil, byte_offset_floor, clamp_to_char_boundary,
    filter_single_line, native_to_normalized, normalize_newlines, normalized_len,
    normalized_offset, normalized_to_native, prev_cursor_boundary, segments,
};
