use ember_world::prelude::*;

fn streamer() -> GridStreamer {
    let config = StreamingConfig::default().with_radii(1, 2).without_enemies();
    GridStreamer::new(config, EnemyConfig::default()).unwrap()
}

fn cells_around(x: i32, z: i32, radius: i32) -> Vec<CellKey> {
    let mut keys = Vec::new();
    for dz in -radius..=radius {
        for dx in -radius..=radius {
            keys.push(CellKey::new(x + dx, z + dz));
        }
    }
    keys.sort();
    keys
}

#[test]
fn initial_reconcile_activates_neighbourhood() {
    let mut store = EntityStore::new();
    let mut grid = streamer();

    let update = grid.reconcile(&mut store, Vec3::new(10.0, 0.0, 10.0));

    assert_eq!(update.activated.len(), 9);
    assert!(update.deactivated.is_empty());
    assert_eq!(grid.active_cells(), cells_around(0, 0, 1));
    // One ground plane per cell at least
    assert!(store.len() >= 9);
}

#[test]
fn moving_far_swaps_the_active_set() {
    let mut store = EntityStore::new();
    let mut grid = streamer();
    grid.reconcile(&mut store, Vec3::new(10.0, 0.0, 10.0));

    let update = grid.reconcile(&mut store, Vec3::new(110.0, 0.0, 110.0));

    assert_eq!(update.activated.len(), 9);
    assert_eq!(update.deactivated.len(), 9);
    assert_eq!(grid.active_cells(), cells_around(5, 5, 1));

    // Everything from the old cells is flagged, nothing new is
    store.reap();
    for (_, entity) in store.iter() {
        let cell = CellKey::containing(entity.position(), 20.0);
        assert!(cell.distance(&CellKey::new(5, 5)) <= 1, "leftover entity in {}", cell);
    }
    assert_eq!(grid.stats().cells_destroyed, 9);
}

#[test]
fn reconcile_is_idempotent() {
    let mut store = EntityStore::new();
    let mut grid = streamer();
    let reference = Vec3::new(-33.0, 0.0, 47.0);

    grid.reconcile(&mut store, reference);
    let count = store.len();
    let cells = grid.active_cells();

    let update = grid.reconcile(&mut store, reference);

    assert!(!update.has_updates());
    assert_eq!(store.len(), count);
    assert_eq!(grid.active_cells(), cells);
}

#[test]
fn oscillating_over_a_cell_edge_does_not_thrash() {
    let mut store = EntityStore::new();
    let mut grid = streamer();

    grid.reconcile(&mut store, Vec3::new(19.9, 0.0, 10.0));
    grid.reconcile(&mut store, Vec3::new(20.1, 0.0, 10.0));
    store.reap();
    let generated = grid.stats().cells_generated;
    let destroyed = grid.stats().cells_destroyed;
    assert_eq!(generated, 12);
    assert_eq!(destroyed, 0);

    for i in 0..20 {
        let x = if i % 2 == 0 { 19.9 } else { 20.1 };
        let update = grid.reconcile(&mut store, Vec3::new(x, 0.0, 10.0));
        assert!(!update.has_updates());
    }
    assert_eq!(grid.stats().cells_generated, generated);
    assert_eq!(grid.stats().cells_destroyed, destroyed);
}

#[test]
fn regenerated_cell_matches_first_generation() {
    let mut store = EntityStore::new();
    let mut grid = streamer();
    let key = CellKey::new(7, -2);

    grid.generate(&mut store, key);
    let mut first: Vec<[f32; 3]> = store.iter().map(|(_, e)| e.position().to_array()).collect();

    grid.destroy(&mut store, key);
    store.reap();
    assert!(store.is_empty());

    grid.generate(&mut store, key);
    let mut second: Vec<[f32; 3]> = store.iter().map(|(_, e)| e.position().to_array()).collect();

    first.sort_by(|a, b| a.partial_cmp(b).unwrap());
    second.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(first, second);
}

#[test]
fn persistent_entities_survive_cell_destruction() {
    let mut store = EntityStore::new();
    let mut grid = streamer();
    let key = CellKey::new(0, 0);
    grid.generate(&mut store, key);

    let player = store.spawn(PlayerState::spawn(
        Vec3::new(5.0, 0.0, 5.0),
        &PlayerConfig::default(),
    ));
    let enemy = store.spawn(EnemyState::spawn(
        Vec3::new(6.0, 0.0, 6.0),
        &EnemyConfig::default(),
        Material::default(),
    ));

    grid.destroy(&mut store, key);
    store.reap();

    assert!(store.contains(player));
    assert!(!store.contains(enemy));
    assert_eq!(store.len(), 1);
    assert!(store.index().iter().all(|h| store.live().contains(&h)));
}

#[test]
fn spawner_waits_for_grace_period() {
    let mut store = EntityStore::new();
    let mut config = StreamingConfig::default();
    config.spawn_point_chance = 1.0;
    config.min_spawn_distance = 0.0;
    config.enemy_spawn_grace = 1.0;
    config.enemy_spawn_interval = 0.5;
    let mut grid = GridStreamer::new(config, EnemyConfig::default()).unwrap();
    grid.reconcile(&mut store, Vec3::ZERO);
    assert!(grid.spawn_points().count() > 0);

    assert!(grid.update_spawner(&mut store, 0.5, Vec3::ZERO).is_none());
    let first = grid.update_spawner(&mut store, 0.5, Vec3::ZERO);
    assert!(first.is_some());
    // Interval not yet elapsed
    assert!(grid.update_spawner(&mut store, 0.25, Vec3::ZERO).is_none());
    assert!(grid.update_spawner(&mut store, 0.25, Vec3::ZERO).is_some());
    assert_eq!(store.count_kind(EntityKind::Enemy), 2);
    assert_eq!(grid.stats().enemies_spawned, 2);
}
