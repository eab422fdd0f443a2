//! Host-agnostic identifier for text fields.
//!
//! A plain `u64` keeps this crate free of any DOM type. Hosts provide
//! their own `From` conversions at the boundary.

/// Opaque identifier for a field within a [`FieldValueStore`](crate::FieldValueStore).
///
/// The value carries no meaning inside this crate; it is only a key.
///
/// # Integration
///
/// ```ignore
/// use html::Id;
/// use input_core::FieldId;
///
/// fn field_id(id: Id) -> FieldId {
///     FieldId::from_raw(id.0 as u64)
/// }
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(u64);

impl FieldId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

impl From<u32> for FieldId {
    #[inline]
    fn from(raw: u32) -> Self {
        Self::from_raw(raw as u64)
    }
}

impl From<FieldId> for u64 {
    #[inline]
    fn from(id: FieldId) -> Self {
        id.as_raw()
    }
}
