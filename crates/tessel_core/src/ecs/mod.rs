//! Entity Component System
//!
//! A world owns one fixed-capacity storage per declared component type and
//! a registry of registers. A register is an entity handle plus an index of
//! which components are attached to it; the components themselves live in
//! the storages and are reached through `(storage, slot)` indices.

mod error;
mod macros;
mod register;
mod storage;
mod world;

pub use error::EcsError;
pub use register::{Entry, Register};
pub use storage::{AnyStorage, ComponentStorage};
pub use world::{View, World, WorldBuilder};
