use std::ops::Range;

/// Structural change notification from an [`EntityCache`](crate::EntityCache).
///
/// Ranges are half-open indices into the sorted sequence. A listener must
/// treat any event as "re-read the affected rows", never as a diff to apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListEvent {
    /// Rows in the range were replaced or reordered.
    ContentsChanged(Range<usize>),
    /// Rows were inserted at the range.
    IntervalAdded(Range<usize>),
    /// Rows that occupied the range before the change were removed.
    IntervalRemoved(Range<usize>),
}

impl ListEvent {
    pub fn range(&self) -> &Range<usize> {
        match self {
            ListEvent::ContentsChanged(range)
            | ListEvent::IntervalAdded(range)
            | ListEvent::IntervalRemoved(range) => range,
        }
    }
}
