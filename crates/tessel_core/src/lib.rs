//! Tessel Engine Core
//!
//! Contains the fundamental runtime building blocks:
//! - Slotted unique-id pools
//! - Entity Component System (ECS)
//! - 2D math and geometry
//! - Fixed-timestep time

pub mod ecs;
pub mod math;
pub mod pool;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
