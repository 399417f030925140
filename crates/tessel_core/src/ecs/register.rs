// register.rs - An entity's index of attached components
//
// A register never owns component data. Each entry names a component and
// records where it lives: the index of the owning storage inside the world
// and the slot index inside that storage.

use crate::pool::{PoolError, UniquePool};

/// Initial size of a register's attachment list; it grows on demand.
const ATTACHED_HINT: usize = 4;

/// One attached component.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    name: &'static str,
    storage: usize,
    slot: usize,
}

impl Entry {
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Position of the owning storage in the world's declaration order.
    #[inline]
    pub fn storage(&self) -> usize {
        self.storage
    }

    /// Slot index inside the owning storage.
    #[inline]
    pub fn slot(&self) -> usize {
        self.slot
    }
}

/// Entity handle plus the list of components attached to it.
pub struct Register {
    id: u64,
    attached: UniquePool<Entry>,
}

impl Register {
    pub(crate) fn new(id: u64) -> Result<Self, PoolError> {
        Ok(Self {
            id,
            attached: UniquePool::growable(ATTACHED_HINT)?,
        })
    }

    /// Entity id; identical to the id the register is stored under.
    #[inline]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn entry(&self, name: &str) -> Option<&Entry> {
        self.attached
            .occupied_iter()
            .map(|(_, entry)| entry)
            .find(|entry| entry.name == name)
    }

    #[inline]
    pub fn has(&self, name: &str) -> bool {
        self.entry(name).is_some()
    }

    /// True iff every listed component is attached.
    pub fn has_these(&self, names: &[&str]) -> bool {
        names.iter().all(|name| self.has(name))
    }

    pub fn entries(&self) -> impl Iterator<Item = &Entry> + '_ {
        self.attached.occupied_iter().map(|(_, entry)| entry)
    }

    pub fn attached_count(&self) -> usize {
        self.attached.occupied()
    }

    /// Record an attachment under a fresh list-local key.
    pub(crate) fn record(
        &mut self,
        name: &'static str,
        storage: usize,
        slot: usize,
    ) -> Result<(), PoolError> {
        let key = self.attached.find_unique();
        self.attached.append(key, Entry { name, storage, slot })?;
        Ok(())
    }

    /// Drop the attachment named `name`, returning it.
    pub(crate) fn forget(&mut self, name: &str) -> Option<Entry> {
        let key = self
            .attached
            .occupied_iter()
            .find(|(_, entry)| entry.name == name)
            .map(|(key, _)| key)?;
        self.attached.take(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_forget() {
        let mut register = Register::new(12).unwrap();
        assert_eq!(register.id(), 12);

        register.record("position", 0, 3).unwrap();
        register.record("velocity", 1, 0).unwrap();
        assert!(register.has_these(&["position", "velocity"]));
        assert!(!register.has_these(&["position", "sprite"]));
        assert!(register.has_these(&[]));

        let entry = register.entry("velocity").copied().unwrap();
        assert_eq!((entry.storage(), entry.slot()), (1, 0));

        assert_eq!(register.forget("position").map(|e| e.slot()), Some(3));
        assert!(register.forget("position").is_none());
        assert_eq!(register.attached_count(), 1);
    }

    #[test]
    fn attachment_list_grows() {
        let mut register = Register::new(0).unwrap();
        let names = ["a", "b", "c", "d", "e", "f"];
        for (i, &name) in names.iter().enumerate() {
            register.record(name, i, i).unwrap();
        }
        assert_eq!(register.attached_count(), names.len());
        assert!(register.has_these(&names));
    }
}
