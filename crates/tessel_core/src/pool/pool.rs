use crate::pool::slot::{Slot, SlotIter};
use thiserror::Error;
use tracing::trace;

/// Number of slots a growable pool adds each time it runs out of room.
pub const GROWTH_STEP: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    #[error("could not allocate {slots} slots")]
    AllocationFailure { slots: usize },

    #[error("id {id} is already present")]
    DuplicateId { id: u64 },

    #[error("pool is full ({capacity} slots)")]
    CapacityExceeded { capacity: usize },

    #[error("id {id} not found")]
    IdNotFound { id: u64 },

    #[error("slot index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// How a pool reacts when every slot is occupied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Reject the insertion with [`PoolError::CapacityExceeded`].
    Fixed,
    /// Append [`GROWTH_STEP`] empty slots and retry.
    Growable,
}

/// Slotted collection mapping 64-bit ids to values.
///
/// At most one occupied slot holds any given id. Values never move between
/// slots, so a slot index stays valid for as long as the id occupies it;
/// a fixed pool never reallocates at all.
///
/// Lookups are linear scans. Pools are meant for small, bounded sets such as
/// per-component entity storage or a register's attachment list.
pub struct UniquePool<T> {
    slots: Vec<Slot<T>>,
    growth: Growth,
}

impl<T> UniquePool<T> {
    /// Allocate `capacity` empty slots (a capacity of zero becomes one).
    pub fn with_capacity(capacity: usize, growth: Growth) -> Result<Self, PoolError> {
        let capacity = capacity.max(1);
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| PoolError::AllocationFailure { slots: capacity })?;
        slots.extend((0..capacity).map(|_| Slot::empty()));
        Ok(Self { slots, growth })
    }

    pub fn fixed(capacity: usize) -> Result<Self, PoolError> {
        Self::with_capacity(capacity, Growth::Fixed)
    }

    pub fn growable(capacity: usize) -> Result<Self, PoolError> {
        Self::with_capacity(capacity, Growth::Growable)
    }

    #[inline]
    pub fn growth(&self) -> Growth {
        self.growth
    }

    /// Total number of slots, empty or not.
    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Pools always own at least one slot; this reports whether none is occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Slot::is_empty)
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|s| !s.is_empty())
    }

    /// True iff no occupied slot holds `id`.
    pub fn is_unique(&self, id: u64) -> bool {
        !self.contains(id)
    }

    pub fn contains(&self, id: u64) -> bool {
        self.slots.iter().any(|s| s.holds(id))
    }

    /// Slot index currently holding `id`.
    pub fn index_of(&self, id: u64) -> Option<usize> {
        self.slots.iter().position(|s| s.holds(id))
    }

    /// Smallest id in `0..=len` that no slot holds.
    ///
    /// With `len` slots there are at most `len` occupied ids, so the scan
    /// always terminates; running off the end means the pool is corrupt.
    pub fn find_unique(&self) -> u64 {
        let len = self.slots.len() as u64;
        match (0..=len).find(|&id| self.is_unique(id)) {
            Some(id) => id,
            None => panic!("unique id space exhausted for pool of {len} slots"),
        }
    }

    /// Store `value` under `id` in the first empty slot, returning its index.
    pub fn append(&mut self, id: u64, value: T) -> Result<usize, PoolError> {
        if self.contains(id) {
            return Err(PoolError::DuplicateId { id });
        }

        let index = match self.slots.iter().position(Slot::is_empty) {
            Some(index) => index,
            None => match self.growth {
                Growth::Fixed => {
                    return Err(PoolError::CapacityExceeded {
                        capacity: self.slots.len(),
                    })
                }
                Growth::Growable => self.grow()?,
            },
        };

        self.slots[index].fill(id, value);
        trace!(id, index, "pool append");
        Ok(index)
    }

    /// Store `value` under `id` at an explicit slot, overwriting whatever was there.
    ///
    /// The previous occupant (of any id) is returned. `id` must still be
    /// unique across the whole pool, including the target slot.
    pub fn insert_at(&mut self, id: u64, index: usize, value: T) -> Result<Option<T>, PoolError> {
        if self.contains(id) {
            return Err(PoolError::DuplicateId { id });
        }
        let len = self.slots.len();
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(PoolError::IndexOutOfBounds { index, len })?;
        Ok(slot.fill(id, value))
    }

    /// Clear the slot holding `id`. Returns whether a match was found.
    pub fn remove(&mut self, id: u64) -> bool {
        self.take(id).is_some()
    }

    /// Clear the slot holding `id`, handing back its value.
    pub fn take(&mut self, id: u64) -> Option<T> {
        let index = self.index_of(id)?;
        trace!(id, index, "pool remove");
        self.slots[index].take()
    }

    pub fn get(&self, id: u64) -> Result<&T, PoolError> {
        self.slots
            .iter()
            .find(|s| s.holds(id))
            .and_then(Slot::data)
            .ok_or(PoolError::IdNotFound { id })
    }

    pub fn get_mut(&mut self, id: u64) -> Result<&mut T, PoolError> {
        self.slots
            .iter_mut()
            .find(|s| s.holds(id))
            .and_then(Slot::data_mut)
            .ok_or(PoolError::IdNotFound { id })
    }

    /// Value at a known slot index, if that slot is occupied.
    #[inline]
    pub fn get_at(&self, index: usize) -> Option<&T> {
        self.slots.get(index).and_then(Slot::data)
    }

    #[inline]
    pub fn get_at_mut(&mut self, index: usize) -> Option<&mut T> {
        self.slots.get_mut(index).and_then(Slot::data_mut)
    }

    #[inline]
    pub fn slot(&self, index: usize) -> Option<&Slot<T>> {
        self.slots.get(index)
    }

    /// Walk every slot, empty ones included.
    pub fn iter(&self) -> SlotIter<'_, T> {
        SlotIter::new(&self.slots)
    }

    /// Walk occupied slots as `(id, value)` pairs.
    pub fn occupied_iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.slots
            .iter()
            .filter_map(|s| Some((s.id()?, s.data()?)))
    }

    pub fn occupied_iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> + '_ {
        self.slots.iter_mut().filter_map(|s| {
            let id = s.id()?;
            Some((id, s.data_mut()?))
        })
    }

    /// Empty every slot without releasing memory.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.take();
        }
    }

    /// Add [`GROWTH_STEP`] empty slots, returning the index of the first new one.
    fn grow(&mut self) -> Result<usize, PoolError> {
        let first = self.slots.len();
        self.slots
            .try_reserve_exact(GROWTH_STEP)
            .map_err(|_| PoolError::AllocationFailure {
                slots: first + GROWTH_STEP,
            })?;
        self.slots.extend((0..GROWTH_STEP).map(|_| Slot::empty()));
        trace!(from = first, to = self.slots.len(), "pool grow");
        Ok(first)
    }
}

impl<'a, T> IntoIterator for &'a UniquePool<T> {
    type Item = &'a Slot<T>;
    type IntoIter = SlotIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
