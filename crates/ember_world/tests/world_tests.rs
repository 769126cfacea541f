//! World tick tests
//!
//! Each test builds a small world by hand with streaming off unless the test
//! is about streaming.

use approx::assert_relative_eq;
use ember_physics::AABB;
use ember_world::prelude::*;

const DT: f32 = 1.0 / 60.0;

fn world() -> World {
    World::new(SimConfig::default().without_streaming()).unwrap()
}

/// 20 x 1 x 20 slab whose top face is y = 0
fn floor() -> Entity {
    let transform = Mat4::from_translation(Vec3::new(0.0, -0.5, 0.0))
        * Mat4::from_scale(Vec3::new(20.0, 1.0, 20.0));
    Entity::fixed(RenderInfo::new(ShapeKind::Cube, Material::default()), transform)
        .with_collider(Collider::new(AABB::CUBE_UNIT.transform(&transform)))
}

fn assert_reap_safe(world: &World) {
    for handle in world.collision_index().iter() {
        assert!(
            world.live_handles().contains(&handle),
            "collision handle {} outlived its entity",
            handle
        );
    }
}

#[test]
fn player_at_rest_on_floor_is_grounded_after_one_tick() {
    let mut world = world();
    world.spawn(floor());
    let player = world.spawn_player(Vec3::ZERO);
    let start = world.get(player).unwrap().position();

    world.tick(DT);

    let entity = world.get(player).unwrap();
    let state = entity.behavior().as_player().unwrap();
    assert!(state.is_grounded());
    assert_eq!(entity.position().y, start.y);

    // And it stays put
    for _ in 0..30 {
        world.tick(DT);
    }
    let entity = world.get(player).unwrap();
    assert!(entity.behavior().as_player().unwrap().is_grounded());
    assert_relative_eq!(entity.position().y, start.y, epsilon = 1e-5);
}

#[test]
fn player_falls_and_lands() {
    let mut world = world();
    world.spawn(floor());
    let player = world.spawn_player(Vec3::new(0.0, 2.0, 0.0));

    for _ in 0..120 {
        world.tick(DT);
    }

    let entity = world.get(player).unwrap();
    assert!(entity.behavior().as_player().unwrap().is_grounded());
    let bounds = entity.bounds().unwrap();
    assert!(bounds.min.y >= -1e-3, "sank into the floor: {}", bounds.min.y);
    assert!(bounds.min.y < 0.05, "still floating: {}", bounds.min.y);
}

#[test]
fn player_walks_forward_under_input() {
    let mut world = world();
    world.spawn(floor());
    let player = world.spawn_player(Vec3::ZERO);
    world.input_mut().key_down(Action::MoveForward);

    for _ in 0..60 {
        world.tick(DT);
    }

    let entity = world.get(player).unwrap();
    // Default look is -z
    assert!(entity.position().z < -1.0);
    let speed = entity.behavior().as_player().unwrap().velocity();
    assert!(Vec3::new(speed.x, 0.0, speed.z).length() <= 5.0 + 1e-4);
}

#[test]
fn enemy_with_three_hit_points_dies_on_third_hit() {
    let mut world = world();
    world.spawn(floor());
    let enemy = world.spawn_enemy(Vec3::ZERO);

    assert!(!world.hit(enemy).unwrap());
    assert!(!world.hit(enemy).unwrap());
    assert!(!world.get(enemy).unwrap().is_pending_removal());
    assert!(world.hit(enemy).unwrap());
    assert!(world.get(enemy).unwrap().is_pending_removal());

    world.tick(DT);

    assert!(world.get(enemy).is_none());
    assert!(!world.live_handles().contains(&enemy));
    assert!(!world.collision_index().contains(enemy));
}

#[test]
fn enemy_walking_into_damaging_projectile_takes_hits() {
    let mut world = world();
    world.spawn(floor());
    world.spawn_player(Vec3::new(8.0, 0.0, 0.0));
    let enemy = world.spawn_enemy(Vec3::ZERO);

    // A parked fragment just in front of the enemy's +x face
    let transform =
        Mat4::from_translation(Vec3::new(0.75, 0.5, 0.0)) * Mat4::from_scale(Vec3::splat(0.5));
    world.spawn(
        ProjectileState::new(Vec3::X, 0.0, 100.0)
            .with_hit_effect(HitEffect::PassThrough)
            .spawn(transform, true),
    );

    world.tick(DT);
    let state = world.get(enemy).unwrap().behavior().as_enemy().unwrap();
    assert_eq!(state.health.current, 2.0);
    assert!(state.is_flashing());

    world.tick(DT);
    world.tick(DT);
    assert!(world.get(enemy).is_none());
    assert_reap_safe(&world);
}

#[test]
fn enemy_walks_towards_player() {
    let mut world = world();
    world.spawn(floor());
    world.spawn_player(Vec3::new(-6.0, 0.0, 0.0));
    let enemy = world.spawn_enemy(Vec3::new(4.0, 0.0, 0.0));

    for _ in 0..60 {
        world.tick(DT);
    }

    let x = world.get(enemy).unwrap().position().x;
    assert!(x < 3.0 && x > 1.5, "enemy at x = {}", x);
}

#[test]
fn projectile_expires_at_max_range() {
    let mut world = world();
    let shot = world.spawn(ProjectileState::new(Vec3::X, 5.0, 10.0).spawn(Mat4::IDENTITY, false));

    // 7 x 0.25 s = 1.75 s, 8.75 units
    for _ in 0..7 {
        world.tick(0.25);
    }
    assert!(world.get(shot).is_some());

    world.tick(0.25);
    assert!(world.get(shot).is_none());
}

#[test]
fn projectile_expires_after_two_seconds_at_sixty_hertz() {
    let mut world = world();
    let shot = world.spawn(ProjectileState::new(Vec3::X, 5.0, 10.0).spawn(Mat4::IDENTITY, false));

    for _ in 0..119 {
        world.tick(DT);
    }
    assert!(world.get(shot).is_some());

    world.tick(DT);
    assert!(world.get(shot).is_none());
}

#[test]
fn two_pass_tick_updates_twice() {
    let config = SimConfig::default().without_streaming().with_two_pass_tick(true);
    let mut world = World::new(config).unwrap();
    let shot = world.spawn(ProjectileState::new(Vec3::X, 5.0, 10.0).spawn(Mat4::IDENTITY, false));

    world.tick(0.25);
    let traveled = world.get(shot).unwrap().behavior().as_projectile().unwrap().traveled();
    assert_eq!(traveled, 2.5);

    for _ in 0..3 {
        world.tick(0.25);
    }
    assert!(world.get(shot).is_none());
}

#[test]
fn bursting_bullet_spawns_fragments_on_impact() {
    let mut config = SimConfig::default().without_streaming();
    config.projectile.burst.count = 10;
    let burst = config.projectile.burst.clone();
    let mut world = World::new(config).unwrap();

    let wall_transform = Mat4::from_translation(Vec3::new(4.75, 0.5, 0.0));
    world.spawn(
        Entity::fixed(RenderInfo::new(ShapeKind::Cube, Material::default()), wall_transform)
            .with_collider(Collider::new(AABB::CUBE_UNIT.transform(&wall_transform))),
    );
    let bullet_transform =
        Mat4::from_translation(Vec3::new(4.0, 0.5, 0.0)) * Mat4::from_scale(Vec3::splat(0.2));
    let bullet = world.spawn(
        ProjectileState::new(Vec3::X, 20.0, 50.0)
            .with_hit_effect(HitEffect::Burst(burst))
            .spawn(bullet_transform, true),
    );

    world.tick(DT);

    assert!(world.get(bullet).is_none());
    assert_eq!(world.store().count_kind(EntityKind::Projectile), 10);
    assert_reap_safe(&world);
}

#[test]
fn firing_spawns_a_bullet() {
    let mut world = world();
    world.spawn(floor());
    world.spawn_player(Vec3::ZERO);

    world.input_mut().key_down(Action::Fire);
    world.tick(DT);
    world.tick(DT);
    // Holding fire does not auto-repeat
    assert_eq!(world.store().count_kind(EntityKind::Projectile), 1);

    world.input_mut().key_up(Action::Fire);
    world.tick(DT);
    world.input_mut().key_down(Action::Fire);
    world.tick(DT);
    assert_eq!(world.store().count_kind(EntityKind::Projectile), 2);
}

#[test]
fn pending_shape_aborts_only_that_entity() {
    let mut world = world();
    world.spawn(
        Entity::fixed(RenderInfo::new(ShapeKind::Sphere, Material::default()), Mat4::IDENTITY)
            .with_collider(Collider::pending()),
    );
    let right = Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0));
    let left = Mat4::from_translation(Vec3::new(-5.0, 0.0, 0.0));
    let shot = world.spawn(ProjectileState::new(Vec3::Z, 1.0, 100.0).spawn(right, true));
    let ghost = world.spawn(ProjectileState::new(Vec3::Z, 1.0, 100.0).spawn(left, false));

    world.tick(0.5);

    // The colliding projectile hit the uncomputed shape and did not move
    assert_eq!(world.get(shot).unwrap().position().z, 0.0);
    // The other one carried on
    assert_eq!(world.get(ghost).unwrap().position().z, 0.5);
}

#[test]
fn static_entities_refuse_to_move() {
    let mut world = world();
    let slab = world.spawn(floor());
    let result = world.get_mut(slab).unwrap().translate(Vec3::Y);
    assert!(matches!(result, Err(ember_physics::PhysicsError::StaticBodyMoved(_))));
}

#[test]
fn load_scene_spawns_static_shapes() {
    let mut world = world();
    let scene = StaticScene::new()
        .with_shape(SceneShape::new(ShapeKind::Cube, Mat4::IDENTITY, Material::default()))
        .with_shape(SceneShape::new(
            ShapeKind::Cone,
            Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)),
            Material::default(),
        ))
        .with_shape(SceneShape::new(ShapeKind::SkyCube, Mat4::IDENTITY, Material::default()));

    assert_eq!(world.load_scene(&scene, &IdealBounds), 3);
    assert_eq!(world.len(), 3);
    assert_eq!(world.collision_index().len(), 2);
    assert_eq!(world.render_snapshot().len(), 3);
}

#[test]
fn load_scene_keeps_globals_and_camera_look() {
    let mut world = world();
    let mut scene = StaticScene::new().with_shape(SceneShape::new(
        ShapeKind::Cube,
        Mat4::IDENTITY,
        Material::default(),
    ));
    scene.globals.ka = 0.3;
    scene.globals.camera_look = Vec3::new(0.0, 0.0, 4.0);

    world.load_scene(&scene, &IdealBounds);

    assert_eq!(world.scene_globals().ka, 0.3);
    assert_eq!(world.input().look(), Vec3::Z);
}

#[test]
fn skybox_tracks_player() {
    let mut world = world();
    world.spawn(floor());
    world.spawn_player(Vec3::new(2.0, 0.0, 3.0));
    let sky = world.spawn_skybox(100.0);
    world.input_mut().key_down(Action::MoveForward);

    for _ in 0..10 {
        world.tick(DT);
    }

    let player = world.player_position().unwrap();
    let sky = world.get(sky).unwrap().position();
    assert_relative_eq!(sky.x, player.x, epsilon = 1e-4);
    assert_relative_eq!(sky.y, player.y, epsilon = 1e-4);
    assert_relative_eq!(sky.z, player.z, epsilon = 1e-4);
}

#[test]
fn reap_safety_with_streaming_and_enemies() {
    let mut config = SimConfig::default();
    config.streaming.enemy_spawn_grace = 0.5;
    config.streaming.enemy_spawn_interval = 0.25;
    config.streaming.min_spawn_distance = 0.0;
    config.streaming.spawn_point_chance = 1.0;
    let mut world = World::new(config).unwrap();
    world.spawn_player(Vec3::ZERO);
    world.input_mut().key_down(Action::MoveForward);

    for i in 0..600 {
        if i % 40 == 0 {
            world.input_mut().key_down(Action::Fire);
        } else if i % 40 == 1 {
            world.input_mut().key_up(Action::Fire);
        }
        world.tick(DT);
        assert_reap_safe(&world);
    }

    let stats = world.streaming_stats().unwrap();
    assert!(stats.cells_generated >= 9);
    assert!(stats.active_cells >= 9);
    assert!(stats.enemies_spawned > 0);
}
