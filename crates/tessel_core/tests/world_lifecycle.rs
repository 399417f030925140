use tessel_core::ecs::{EcsError, World};
use tessel_core::pool::PoolError;
use tessel_core::world;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Health(i32);

#[derive(Debug, Clone, PartialEq)]
struct Name(String);

fn world(max: usize) -> World {
    world!("health": Health => max, "name": Name => max).unwrap()
}

#[test]
fn attach_detach_round_trip() {
    let mut world = world(4);
    world.create_register(10).unwrap();
    world.attach(10, "health", Health(3)).unwrap();
    world.attach(10, "name", Name("orc".into())).unwrap();

    assert_eq!(world.components_of(10).unwrap(), vec!["health", "name"]);

    world.detach(10, "health").unwrap();
    assert!(!world.has(10, "health"));
    assert!(!world.storage::<Health>("health").unwrap().has(10));
    assert!(matches!(
        world.detach(10, "health"),
        Err(EcsError::UnknownComponent { .. })
    ));
    assert_eq!(world.get::<Name>(10, "name").unwrap().0, "orc");
}

#[test]
fn mismatched_names_and_types() {
    let mut world = world(4);
    world.create_register(1).unwrap();

    assert!(matches!(
        world.attach(1, "mana", Health(1)),
        Err(EcsError::UnknownComponent { .. })
    ));
    assert!(matches!(
        world.attach(1, "health", Name("wrong".into())),
        Err(EcsError::UnknownComponent { .. })
    ));
    assert!(matches!(
        world.attach(2, "health", Health(1)),
        Err(EcsError::UnknownRegister { id: 2 })
    ));
    assert_eq!(world.register(1).unwrap().attached_count(), 0);
}

#[test]
fn storage_capacity_is_fixed() {
    let mut world = world(2);
    for id in 0..3 {
        world.create_register(id).unwrap();
    }
    world.attach(0, "health", Health(1)).unwrap();
    world.attach(1, "health", Health(1)).unwrap();
    assert_eq!(
        world.attach(2, "health", Health(1)),
        Err(EcsError::Pool(PoolError::CapacityExceeded { capacity: 2 }))
    );
    assert!(!world.has(2, "health"));
}

#[test]
fn recreated_register_starts_clean() {
    let mut world = world(4);
    world.create_register(5).unwrap();
    world.attach(5, "health", Health(9)).unwrap();
    world.remove_register(5).unwrap();

    world.create_register(5).unwrap();
    assert!(!world.has(5, "health"));
    assert!(world.get::<Health>(5, "health").is_err());
    assert!(world.storage::<Health>("health").unwrap().is_empty());
}

#[test]
fn view_skips_registers_missing_components() {
    let mut world = world(8);
    for id in 0..4 {
        world.create_register(id).unwrap();
        world.attach(id, "health", Health(id as i32)).unwrap();
    }
    world.attach(1, "name", Name("a".into())).unwrap();
    world.attach(3, "name", Name("b".into())).unwrap();

    let mut view = world.view(&["health", "name"]);
    let hits: Vec<u64> = view
        .by_ref()
        .filter_map(|(register, _)| register.map(|r| r.id()))
        .collect();
    assert_eq!(hits, vec![1, 3]);

    view.reset();
    assert!(view.next().is_some());
    assert_eq!(world.matching_ids(&["health"]).len(), 4);
}
