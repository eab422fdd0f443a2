//! Per-field state held by the [`FieldValueStore`](crate::FieldValueStore).

#[derive(Clone, Debug, Default)]
pub(crate) struct FieldState {
    pub value: String,

    /// Incremented on every text change.
    pub value_rev: u64,

    /// Caret as a byte index into `value`, always on a char boundary.
    pub caret: usize,

    /// When `Some(anchor)`, the selection is `min(anchor, caret)..max(anchor, caret)`.
    pub selection_anchor: Option<usize>,

    pub focused: bool,

    /// Single-line fields drop line breaks on insertion.
    pub multiline: bool,
}
