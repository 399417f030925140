/// A fixed-position cell holding optional data plus an id tag.
///
/// Emptiness is decided by `data` alone. Once a slot is cleared its id is
/// stale and is never reported, so callers cannot observe a leftover tag.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    data: Option<T>,
    id: u64,
}

impl<T> Slot<T> {
    pub(crate) const fn empty() -> Self {
        Self { data: None, id: 0 }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_none()
    }

    /// Id of the stored value, or `None` when the slot is empty.
    #[inline]
    pub fn id(&self) -> Option<u64> {
        self.data.as_ref().map(|_| self.id)
    }

    #[inline]
    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    #[inline]
    pub fn data_mut(&mut self) -> Option<&mut T> {
        self.data.as_mut()
    }

    /// True iff the slot is occupied by `id`.
    #[inline]
    pub fn holds(&self, id: u64) -> bool {
        self.data.is_some() && self.id == id
    }

    /// Store `value` under `id`, handing back whatever was there before.
    #[inline]
    pub(crate) fn fill(&mut self, id: u64, value: T) -> Option<T> {
        self.id = id;
        self.data.replace(value)
    }

    #[inline]
    pub(crate) fn take(&mut self) -> Option<T> {
        self.data.take()
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Lazy walk over every slot of a pool, empty ones included, in index order.
///
/// The walk can be restarted with [`SlotIter::reset`] without borrowing the
/// pool again.
pub struct SlotIter<'a, T> {
    slots: &'a [Slot<T>],
    cursor: usize,
}

impl<'a, T> SlotIter<'a, T> {
    pub(crate) fn new(slots: &'a [Slot<T>]) -> Self {
        Self { slots, cursor: 0 }
    }

    /// Rewind to the first slot.
    pub fn reset(&mut self) {
        self.cursor = 0;
    }

    /// Index of the slot the next call to `next` will yield.
    #[inline]
    pub fn position(&self) -> usize {
        self.cursor
    }
}

impl<'a, T> Iterator for SlotIter<'a, T> {
    type Item = &'a Slot<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.slots.get(self.cursor)?;
        self.cursor += 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.slots.len().saturating_sub(self.cursor);
        (left, Some(left))
    }
}

impl<T> ExactSizeIterator for SlotIter<'_, T> {}
