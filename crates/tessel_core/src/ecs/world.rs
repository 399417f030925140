// world.rs - ECS world: declared component storages plus the register registry

use crate::ecs::{AnyStorage, ComponentStorage, EcsError, Register};
use crate::pool::{PoolError, SlotIter, UniquePool};
use tracing::{debug, trace};

/// Initial register slots; the registry grows on demand.
const REGISTER_HINT: usize = 16;

type StorageFactory = fn(&'static str, usize) -> Result<Box<dyn AnyStorage>, PoolError>;

fn make_storage<T: 'static>(
    name: &'static str,
    max_entities: usize,
) -> Result<Box<dyn AnyStorage>, PoolError> {
    Ok(Box::new(ComponentStorage::<T>::new(name, max_entities)?))
}

struct StorageDecl {
    name: &'static str,
    max_entities: usize,
    make: StorageFactory,
}

/// Declares the closed set of component storages a world owns.
///
/// The set is frozen by [`WorldBuilder::build`]; components of undeclared
/// types can never be attached afterwards.
pub struct WorldBuilder {
    decls: Vec<StorageDecl>,
    register_hint: usize,
}

impl WorldBuilder {
    /// Declare a storage named `name` for components of type `T`.
    pub fn storage<T: 'static>(mut self, name: &'static str, max_entities: usize) -> Self {
        self.decls.push(StorageDecl {
            name,
            max_entities,
            make: make_storage::<T>,
        });
        self
    }

    /// Initial number of register slots.
    pub fn register_capacity(mut self, hint: usize) -> Self {
        self.register_hint = hint;
        self
    }

    /// Allocate every declared storage eagerly.
    pub fn build(self) -> Result<World, EcsError> {
        let mut storages: Vec<Box<dyn AnyStorage>> = Vec::with_capacity(self.decls.len());
        for decl in self.decls {
            if storages.iter().any(|s| s.name() == decl.name) {
                return Err(EcsError::DuplicateStorage { name: decl.name });
            }
            storages.push((decl.make)(decl.name, decl.max_entities)?);
            debug!(
                storage = decl.name,
                capacity = decl.max_entities,
                "component storage allocated"
            );
        }

        Ok(World {
            storages,
            registers: UniquePool::growable(self.register_hint)?,
        })
    }
}

/// Owns one storage per declared component type and every register.
///
/// Register ids and entity ids are the same number: a component attached
/// through register `n` is stored under entity id `n`.
pub struct World {
    storages: Vec<Box<dyn AnyStorage>>,
    registers: UniquePool<Register>,
}

impl World {
    pub fn builder() -> WorldBuilder {
        WorldBuilder {
            decls: Vec::new(),
            register_hint: REGISTER_HINT,
        }
    }

    /// Names of the declared storages, in declaration order.
    pub fn storage_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.storages.iter().map(|s| s.name())
    }

    /// Position of the storage declared as `name` for type `T`.
    fn storage_index<T: 'static>(&self, name: &str) -> Option<usize> {
        self.storages
            .iter()
            .position(|s| s.name() == name && s.as_any().is::<ComponentStorage<T>>())
    }

    /// Read-only access to a declared storage. Occupancy only changes
    /// through `attach`, `detach` and `remove_register`.
    pub fn storage<T: 'static>(&self, name: &str) -> Option<&ComponentStorage<T>> {
        let index = self.storage_index::<T>(name)?;
        self.storages[index].as_any().downcast_ref()
    }

    /// Create an empty register under `id`.
    pub fn create_register(&mut self, id: u64) -> Result<(), EcsError> {
        let register = Register::new(id)?;
        self.registers.append(id, register)?;
        debug!(id, "register created");
        Ok(())
    }

    /// Create a register under the smallest free id and return that id.
    pub fn create_register_unique(&mut self) -> Result<u64, EcsError> {
        let id = self.registers.find_unique();
        self.create_register(id)?;
        Ok(id)
    }

    /// Remove `id` from every storage, then drop its register.
    pub fn remove_register(&mut self, id: u64) -> Result<(), EcsError> {
        for storage in &mut self.storages {
            if storage.remove(id) {
                trace!(id, storage = storage.name(), "component dropped with register");
            }
        }
        if !self.registers.remove(id) {
            return Err(EcsError::UnknownRegister { id });
        }
        debug!(id, "register removed");
        Ok(())
    }

    pub fn register(&self, id: u64) -> Option<&Register> {
        self.registers.get(id).ok()
    }

    pub fn has_register(&self, id: u64) -> bool {
        self.registers.contains(id)
    }

    pub fn register_count(&self) -> usize {
        self.registers.occupied()
    }

    /// Iterate live registers.
    pub fn registers(&self) -> impl Iterator<Item = &Register> + '_ {
        self.registers.occupied_iter().map(|(_, register)| register)
    }

    /// Attach `component` to register `id` through the storage declared as
    /// `name` for type `T`.
    pub fn attach<T: 'static>(
        &mut self,
        id: u64,
        name: &str,
        component: T,
    ) -> Result<(), EcsError> {
        let storage_index = self
            .storage_index::<T>(name)
            .ok_or_else(|| EcsError::unknown_component(name))?;
        let register = self
            .registers
            .get_mut(id)
            .map_err(|_| EcsError::UnknownRegister { id })?;
        let storage = self.storages[storage_index]
            .as_any_mut()
            .downcast_mut::<ComponentStorage<T>>()
            .ok_or_else(|| EcsError::unknown_component(name))?;

        let slot = storage.add(id, component)?;
        if let Err(err) = register.record(storage.name(), storage_index, slot) {
            storage.remove(id);
            return Err(err.into());
        }
        trace!(id, component = name, slot, "component attached");
        Ok(())
    }

    /// Detach the component named `name` from register `id`.
    pub fn detach(&mut self, id: u64, name: &str) -> Result<(), EcsError> {
        let register = self
            .registers
            .get_mut(id)
            .map_err(|_| EcsError::UnknownRegister { id })?;
        let entry = *register
            .entry(name)
            .ok_or_else(|| EcsError::unknown_component(name))?;

        let removed = self
            .storages
            .get_mut(entry.storage())
            .is_some_and(|storage| storage.remove(id));
        if !removed {
            return Err(EcsError::unknown_component(name));
        }
        register.forget(name);
        trace!(id, component = name, "component detached");
        Ok(())
    }

    /// True iff register `id` has `name` attached.
    pub fn has(&self, id: u64, name: &str) -> bool {
        self.register(id).is_some_and(|register| register.has(name))
    }

    /// Borrow the component named `name` on register `id` as a `T`.
    ///
    /// Fails with [`EcsError::UnknownComponent`] when nothing is attached
    /// under that name or the attached storage does not hold `T`.
    pub fn get<T: 'static>(&self, id: u64, name: &str) -> Result<&T, EcsError> {
        let register = self
            .registers
            .get(id)
            .map_err(|_| EcsError::UnknownRegister { id })?;
        let entry = register
            .entry(name)
            .ok_or_else(|| EcsError::unknown_component(name))?;

        self.storages
            .get(entry.storage())
            .and_then(|storage| storage.as_any().downcast_ref::<ComponentStorage<T>>())
            .and_then(|storage| storage.get_at(entry.slot(), id))
            .ok_or_else(|| EcsError::unknown_component(name))
    }

    pub fn get_mut<T: 'static>(&mut self, id: u64, name: &str) -> Result<&mut T, EcsError> {
        let register = self
            .registers
            .get(id)
            .map_err(|_| EcsError::UnknownRegister { id })?;
        let entry = *register
            .entry(name)
            .ok_or_else(|| EcsError::unknown_component(name))?;

        self.storages
            .get_mut(entry.storage())
            .and_then(|storage| storage.as_any_mut().downcast_mut::<ComponentStorage<T>>())
            .and_then(|storage| storage.get_at_mut(entry.slot(), id))
            .ok_or_else(|| EcsError::unknown_component(name))
    }

    /// Names of the components attached to register `id`.
    pub fn components_of(&self, id: u64) -> Result<Vec<&'static str>, EcsError> {
        let register = self
            .registers
            .get(id)
            .map_err(|_| EcsError::UnknownRegister { id })?;
        Ok(register.entries().map(|entry| entry.name()).collect())
    }

    /// Walk the whole register range, yielding registers that carry every
    /// component in `filter`.
    pub fn view<'w, 'f>(&'w self, filter: &'f [&'f str]) -> View<'w, 'f> {
        View {
            slots: self.registers.iter(),
            filter,
        }
    }

    /// Ids of the registers that carry every component in `filter`.
    ///
    /// Collecting first lets callers mutate components while walking them.
    pub fn matching_ids(&self, filter: &[&str]) -> Vec<u64> {
        self.view(filter)
            .filter_map(|(register, _)| register.map(Register::id))
            .collect()
    }
}

/// Lazy pass over every register slot.
///
/// Yields `(register, index)` for each slot in order. `register` is `None`
/// when the slot is empty or the register lacks a filtered component.
pub struct View<'w, 'f> {
    slots: SlotIter<'w, Register>,
    filter: &'f [&'f str],
}

impl View<'_, '_> {
    /// Restart the pass from the first slot.
    pub fn reset(&mut self) {
        self.slots.reset();
    }
}

impl<'w> Iterator for View<'w, '_> {
    type Item = (Option<&'w Register>, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.slots.position();
        let slot = self.slots.next()?;
        let filter = self.filter;
        let register = slot.data().filter(|register| register.has_these(filter));
        Some((register, index))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world;

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Velocity {
        x: f32,
        y: f32,
    }

    fn test_world() -> World {
        world!(
            "position": Position => 8,
            "velocity": Velocity => 8,
        )
        .unwrap()
    }

    #[test]
    fn attach_and_query() {
        let mut world = test_world();
        world.create_register(1).unwrap();
        world
            .attach(1, "position", Position { x: 1.0, y: 2.0 })
            .unwrap();

        assert!(world.has(1, "position"));
        assert_eq!(
            world.get::<Position>(1, "position"),
            Ok(&Position { x: 1.0, y: 2.0 })
        );

        world.get_mut::<Position>(1, "position").unwrap().x = 5.0;
        assert_eq!(world.get::<Position>(1, "position").unwrap().x, 5.0);
        assert!(world.storage::<Position>("position").unwrap().has(1));
    }

    #[test]
    fn attach_unknown_name_fails() {
        let mut world = test_world();
        world.create_register(0).unwrap();
        assert_eq!(
            world.attach(0, "health", Position { x: 0.0, y: 0.0 }),
            Err(EcsError::UnknownComponent {
                name: "health".into()
            })
        );
    }

    #[test]
    fn attach_mismatched_type_fails() {
        let mut world = test_world();
        world.create_register(0).unwrap();
        assert_eq!(
            world.attach(0, "position", Velocity { x: 0.0, y: 0.0 }),
            Err(EcsError::UnknownComponent {
                name: "position".into()
            })
        );
        assert!(!world.has(0, "position"));
    }

    #[test]
    fn attach_to_missing_register_fails() {
        let mut world = test_world();
        assert_eq!(
            world.attach(4, "position", Position { x: 0.0, y: 0.0 }),
            Err(EcsError::UnknownRegister { id: 4 })
        );
        assert!(!world.storage::<Position>("position").unwrap().has(4));
    }

    #[test]
    fn attaching_twice_is_a_duplicate() {
        let mut world = test_world();
        world.create_register(2).unwrap();
        world.attach(2, "velocity", Velocity { x: 1.0, y: 0.0 }).unwrap();
        assert_eq!(
            world.attach(2, "velocity", Velocity { x: 2.0, y: 0.0 }),
            Err(EcsError::Pool(PoolError::DuplicateId { id: 2 }))
        );
        assert_eq!(world.get::<Velocity>(2, "velocity").unwrap().x, 1.0);
    }

    #[test]
    fn get_with_wrong_type_fails() {
        let mut world = test_world();
        world.create_register(0).unwrap();
        world.attach(0, "position", Position { x: 0.0, y: 0.0 }).unwrap();
        assert!(matches!(
            world.get::<Velocity>(0, "position"),
            Err(EcsError::UnknownComponent { .. })
        ));
    }

    #[test]
    fn detach_removes_from_register_and_storage() {
        let mut world = test_world();
        world.create_register(3).unwrap();
        world.attach(3, "position", Position { x: 0.0, y: 0.0 }).unwrap();
        world.attach(3, "velocity", Velocity { x: 1.0, y: 1.0 }).unwrap();

        world.detach(3, "position").unwrap();
        assert!(!world.has(3, "position"));
        assert!(!world.storage::<Position>("position").unwrap().has(3));
        assert_eq!(world.components_of(3).unwrap(), vec!["velocity"]);

        assert_eq!(
            world.detach(3, "position"),
            Err(EcsError::UnknownComponent {
                name: "position".into()
            })
        );
    }

    #[test]
    fn remove_register_clears_every_storage() {
        let mut world = test_world();
        world.create_register(1).unwrap();
        world.attach(1, "position", Position { x: 0.0, y: 0.0 }).unwrap();
        world.attach(1, "velocity", Velocity { x: 0.0, y: 0.0 }).unwrap();

        world.remove_register(1).unwrap();
        assert!(!world.has_register(1));
        assert!(!world.storage::<Position>("position").unwrap().has(1));
        assert!(!world.storage::<Velocity>("velocity").unwrap().has(1));

        assert_eq!(
            world.remove_register(1),
            Err(EcsError::UnknownRegister { id: 1 })
        );
    }

    #[test]
    fn recreated_register_does_not_see_old_components() {
        let mut world = test_world();
        world.create_register(0).unwrap();
        world.attach(0, "position", Position { x: 9.0, y: 9.0 }).unwrap();
        world.remove_register(0).unwrap();

        world.create_register(0).unwrap();
        assert!(!world.has(0, "position"));
        assert!(world.get::<Position>(0, "position").is_err());
    }

    #[test]
    fn unique_register_ids_fill_gaps() {
        let mut world = test_world();
        assert_eq!(world.create_register_unique().unwrap(), 0);
        assert_eq!(world.create_register_unique().unwrap(), 1);
        assert_eq!(world.create_register_unique().unwrap(), 2);
        world.remove_register(1).unwrap();
        assert_eq!(world.create_register_unique().unwrap(), 1);
        assert_eq!(world.register_count(), 3);
        assert_eq!(
            world.create_register(2),
            Err(EcsError::Pool(PoolError::DuplicateId { id: 2 }))
        );
    }

    #[test]
    fn view_walks_every_slot() {
        let mut world = world!("position": Position => 4, "velocity": Velocity => 4).unwrap();
        for id in 0..3 {
            world.create_register(id).unwrap();
            world.attach(id, "position", Position { x: 0.0, y: 0.0 }).unwrap();
        }
        world.attach(2, "velocity", Velocity { x: 1.0, y: 0.0 }).unwrap();
        world.remove_register(0).unwrap();

        let filter = ["position", "velocity"];
        let mut view = world.view(&filter);
        let seen: Vec<(Option<u64>, usize)> = view
            .by_ref()
            .map(|(register, index)| (register.map(Register::id), index))
            .collect();
        assert_eq!(seen.len(), REGISTER_HINT);
        assert_eq!(seen[0], (None, 0));
        assert_eq!(seen[1], (None, 1));
        assert_eq!(seen[2], (Some(2), 2));

        view.reset();
        assert_eq!(view.filter(|(register, _)| register.is_some()).count(), 1);
        assert_eq!(world.matching_ids(&["position"]), vec![1, 2]);
    }

    #[test]
    fn duplicate_storage_names_rejected() {
        let result = World::builder()
            .storage::<Position>("position", 2)
            .storage::<Velocity>("position", 2)
            .build();
        assert!(matches!(
            result,
            Err(EcsError::DuplicateStorage { name: "position" })
        ));
    }

    #[test]
    fn storage_capacity_surfaces_as_pool_error() {
        let mut world = World::builder()
            .storage::<Position>("position", 1)
            .build()
            .unwrap();
        world.create_register(0).unwrap();
        world.create_register(1).unwrap();
        world.attach(0, "position", Position { x: 0.0, y: 0.0 }).unwrap();
        assert_eq!(
            world.attach(1, "position", Position { x: 0.0, y: 0.0 }),
            Err(EcsError::Pool(PoolError::CapacityExceeded { capacity: 1 }))
        );
        assert!(!world.has(1, "position"));
    }
    fn assert_index_matches_storage(world: &World) {
        let mut stored: Vec<u64> = world
            .storage::<Position>("position")
            .unwrap()
            .iter()
            .map(|(id, _)| id)
            .collect();
        stored.sort_unstable();
        assert_eq!(stored, world.matching_ids(&["position"]));
        for id in stored {
            assert!(world.get::<Position>(id, "position").is_ok());
        }
    }

    #[test]
    fn storage_occupancy_follows_register_index() {
        let mut world = test_world();
        let origin = Position { x: 0.0, y: 0.0 };
        for id in 0..4 {
            world.create_register(id).unwrap();
            world.attach(id, "position", origin).unwrap();
        }
        assert_index_matches_storage(&world);

        world.detach(1, "position").unwrap();
        assert_index_matches_storage(&world);

        world.remove_register(2).unwrap();
        assert_index_matches_storage(&world);

        world.create_register(2).unwrap();
        world.attach(2, "position", origin).unwrap();
        world.attach(1, "position", origin).unwrap();
        assert_index_matches_storage(&world);
        assert_eq!(world.storage::<Position>("position").unwrap().len(), 4);
    }
}
