//! Convenience macros for declaring worlds

/// Build a [`World`](crate::ecs::World) from a list of component storages.
///
/// Each entry is `"name": Type => max_entities`. Evaluates to
/// `Result<World, EcsError>`.
///
/// # Examples
///
/// ```ignore
/// let mut world = world!(
///     "position": Position => 256,
///     "velocity": Velocity => 256,
/// )?;
/// ```
#[macro_export]
macro_rules! world {
    ($($name:literal : $ty:ty => $max:expr),* $(,)?) => {
        $crate::ecs::World::builder()
            $(.storage::<$ty>($name, $max))*
            .build()
    };
}
