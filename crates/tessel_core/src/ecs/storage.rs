// storage.rs - Per-component-type storage keyed by entity id
//
// Each declared component type gets one fixed-capacity pool. Capacity never
// changes after construction, so a slot index handed out by `add` stays
// valid until that entity's component is removed.

use crate::pool::{PoolError, UniquePool};
use std::any::{type_name, Any};

/// Storage for one component type, indexed by entity id.
pub struct ComponentStorage<T> {
    name: &'static str,
    slots: UniquePool<T>,
}

impl<T: 'static> ComponentStorage<T> {
    /// Allocate storage for up to `max_entities` components up front.
    pub fn new(name: &'static str, max_entities: usize) -> Result<Self, PoolError> {
        Ok(Self {
            name,
            slots: UniquePool::fixed(max_entities)?,
        })
    }

    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of entities currently holding this component.
    pub fn len(&self) -> usize {
        self.slots.occupied()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Store `value` for `entity`, returning the slot index it landed in.
    pub fn add(&mut self, entity: u64, value: T) -> Result<usize, PoolError> {
        self.slots.append(entity, value)
    }

    pub fn get(&self, entity: u64) -> Result<&T, PoolError> {
        self.slots.get(entity)
    }

    pub fn get_mut(&mut self, entity: u64) -> Result<&mut T, PoolError> {
        self.slots.get_mut(entity)
    }

    /// Component at a previously returned slot index, checked against `entity`.
    ///
    /// Returns `None` if the slot has since been cleared or reused by
    /// another entity.
    pub fn get_at(&self, index: usize, entity: u64) -> Option<&T> {
        self.slots
            .slot(index)
            .filter(|slot| slot.holds(entity))
            .and_then(|slot| slot.data())
    }

    pub fn get_at_mut(&mut self, index: usize, entity: u64) -> Option<&mut T> {
        if !self.slots.slot(index)?.holds(entity) {
            return None;
        }
        self.slots.get_at_mut(index)
    }

    /// True iff some slot already holds `entity`.
    #[inline]
    pub fn has(&self, entity: u64) -> bool {
        !self.slots.is_unique(entity)
    }

    pub fn remove(&mut self, entity: u64) -> bool {
        self.slots.remove(entity)
    }

    /// Iterate `(entity, component)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &T)> + '_ {
        self.slots.occupied_iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u64, &mut T)> + '_ {
        self.slots.occupied_iter_mut()
    }
}

/// Type-erased view of a [`ComponentStorage`], used by the world to hold
/// storages of different component types side by side.
pub trait AnyStorage {
    fn name(&self) -> &'static str;
    fn component_type(&self) -> &'static str;
    fn has(&self, entity: u64) -> bool;
    fn remove(&mut self, entity: u64) -> bool;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: 'static> AnyStorage for ComponentStorage<T> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn component_type(&self) -> &'static str {
        type_name::<T>()
    }

    fn has(&self, entity: u64) -> bool {
        ComponentStorage::has(self, entity)
    }

    fn remove(&mut self, entity: u64) -> bool {
        ComponentStorage::remove(self, entity)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
