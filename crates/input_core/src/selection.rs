//! Text selection representation.

/// A selection as an ordered offset pair.
///
/// The range is always normalized so `start <= end`. The unit of the
/// offsets is decided by whoever produces the range: the store hands out
/// byte offsets, the countdown capabilities hand out normalized units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SelectionRange {
    /// Start offset (inclusive).
    pub start: usize,
    /// End offset (exclusive).
    pub end: usize,
}

impl SelectionRange {
    /// Create a new selection range, swapping the ends if needed.
    #[inline]
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A zero-width range, i.e. a plain caret.
    #[inline]
    pub fn collapsed(at: usize) -> Self {
        Self { start: at, end: at }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Apply `f` to both ends, keeping the range normalized.
    #[inline]
    pub fn map(self, mut f: impl FnMut(usize) -> usize) -> Self {
        Self::new(f(self.start), f(self.end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_range_normalizes() {
        let range = SelectionRange::new(10, 5);
        assert_eq!(range, SelectionRange { start: 5, end: 10 });
        assert_eq!(range.len(), 5);
    }

    #[test]
    fn collapsed_range_is_empty() {
        assert!(SelectionRange::collapsed(4).is_empty());
        assert!(!SelectionRange::new(3, 5).is_empty());
    }

    #[test]
    fn map_reorders_when_the_mapping_flips_ends() {
        let range = SelectionRange::new(1, 4).map(|o| 10 - o);
        assert_eq!(range, SelectionRange::new(6, 9));
    }
}
