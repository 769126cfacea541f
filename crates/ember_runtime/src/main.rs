//! Ember headless runner
//!
//! Boots a world, spawns the player and skybox, and drives the simulation at a
//! fixed step with scripted input: the player walks forward, sweeps the view
//! and fires once a second. Progress is reported through the log.
//!
//! Run with: cargo run -p ember_runtime -- --ticks 1200
//!       or: RUST_LOG=debug cargo run --bin ember

mod boot;

use boot::BootOptions;
use ember_world::prelude::*;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let options = match BootOptions::load(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(2);
        }
    };
    options.print_summary();

    let config = match &options.config_path {
        Some(path) => SimConfig::load(path),
        None => Ok(SimConfig::default()),
    };
    let result = config.and_then(|config| run(&options, config));

    if let Err(e) = result {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run(options: &BootOptions, config: SimConfig) -> Result<()> {
    let mut world = World::new(config)?;
    let player = world.spawn_player(Vec3::ZERO);
    world.spawn_skybox(500.0);
    log::info!("Player {} spawned", player);

    let step = options.step();
    let fire_every = options.rate as u64;
    world.input_mut().key_down(Action::MoveForward);

    for tick in 0..options.ticks {
        drive_input(world.input_mut(), tick, fire_every);
        world.tick(step);

        if world.player().is_none() {
            log::warn!("Player is gone after {} ticks", world.ticks());
            break;
        }
        if (tick + 1) % options.report_every == 0 {
            report(&world);
        }
    }

    report(&world);
    log::info!("Done: {} ticks, {:.2}s simulated", world.ticks(), world.elapsed());
    Ok(())
}

/// Scripted input: a slow yaw sweep and a tap of fire every `fire_every` ticks
fn drive_input(input: &mut InputState, tick: u64, fire_every: u64) {
    let sweep = (tick as f32 * 0.02).sin() * 200.0;
    input.pointer_moved(sweep, 0.0);

    if tick % fire_every == 0 {
        input.key_down(Action::Fire);
    } else {
        input.key_up(Action::Fire);
    }
}

fn report(world: &World) {
    let position = world.player_position().unwrap_or(Vec3::ZERO);
    let enemies = world.store().count_kind(EntityKind::Enemy);
    let projectiles = world.store().count_kind(EntityKind::Projectile);

    match world.streaming_stats() {
        Some(stats) => log::info!(
            "t={:.1}s player=({:.1}, {:.1}, {:.1}) entities={} enemies={} projectiles={} \
             cells={} (generated {}, destroyed {})",
            world.elapsed(),
            position.x,
            position.y,
            position.z,
            world.len(),
            enemies,
            projectiles,
            stats.active_cells,
            stats.cells_generated,
            stats.cells_destroyed
        ),
        None => log::info!(
            "t={:.1}s player=({:.1}, {:.1}, {:.1}) entities={} enemies={} projectiles={}",
            world.elapsed(),
            position.x,
            position.y,
            position.z,
            world.len(),
            enemies,
            projectiles
        ),
    }
}
