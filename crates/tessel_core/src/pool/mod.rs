//! Slotted unique-id pools
//!
//! Generic storage underneath component storages, register attachment
//! lists, the register registry and the asset manager.

#[allow(clippy::module_inception)]
mod pool;
mod slot;

pub use pool::{Growth, PoolError, UniquePool, GROWTH_STEP};
pub use slot::{Slot, SlotIter};
