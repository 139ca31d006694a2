use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use bevy::prelude::*;
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shoal::{
    creature_bundle, init_logging, CreatureController, CreatureRng, CreatureTraits,
    FingertipProxy, HandProxy, InteractionCamera, LandmarkBuffer, RoundRestart, SessionState,
    ShoalConfig, ShoalPlugin, SwimArea, SyntheticDetector, SyntheticHand,
};

/// Headless hand-and-creature interaction loop fed by a synthetic detector
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON configuration file; defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
    /// Number of creatures to spawn
    #[arg(long, default_value_t = 8)]
    creatures: usize,
    /// Seed for spawn placement and per-creature randomness
    #[arg(long, default_value_t = 7)]
    seed: u64,
    /// Frames to simulate before exiting
    #[arg(long, default_value_t = 1800)]
    ticks: u32,
    /// Target frame rate
    #[arg(long, default_value_t = 60.0)]
    tick_hz: f32,
    /// Detector publish rate
    #[arg(long, default_value_t = 30.0)]
    detector_hz: f32,
    /// Start a new round every this many frames
    #[arg(long)]
    round_ticks: Option<u32>,
}

fn spawn_scene(world: &mut World, config: &ShoalConfig, count: usize, seed: u64) -> Result<()> {
    let tank = config.tank_volume()?;
    let anchor = world.spawn(Transform::IDENTITY).id();
    world.spawn((Transform::from_xyz(0.0, 0.0, 6.0), InteractionCamera));
    world.spawn((Transform::from_translation(config.pose.offset), HandProxy));
    if config.pose.track_fingertips {
        for tip in 0..5 {
            world.spawn((Transform::IDENTITY, FingertipProxy(tip)));
        }
    }

    let controller = world.resource::<CreatureController>().clone();
    let mut placement = StdRng::seed_from_u64(seed);
    let (lo, hi) = (tank.inner_min(), tank.inner_max());
    for i in 0..count {
        let position = Vec3::new(
            placement.gen_range(lo.x..=hi.x),
            placement.gen_range(lo.y..=hi.y),
            placement.gen_range(lo.z..=hi.z),
        );
        let mut rng = CreatureRng::seeded(seed.wrapping_add(1 + i as u64));
        let forward = Vec3::new(placement.gen_range(-1.0..1.0), 0.0, -1.0);
        let state = controller.spawn_state(position, forward, &mut rng.0, 0.0);
        world.spawn(creature_bundle(
            state,
            CreatureTraits::default(),
            rng,
            SwimArea::anchored(tank, anchor),
            config.contacts.creature_radius,
        ));
    }
    info!("spawned {count} creatures");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = match &args.config {
        Some(path) => ShoalConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => ShoalConfig::default(),
    };
    config.validate().context("invalid configuration")?;

    let buffer = LandmarkBuffer::default();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .insert_resource(buffer.clone())
        .add_plugins(ShoalPlugin::new(config));
    app.finish();
    app.cleanup();
    spawn_scene(app.world_mut(), &config, args.creatures, args.seed)?;

    let mut detector = SyntheticDetector::spawn(buffer.clone(), SyntheticHand::default(), args.detector_hz)
        .context("starting detector thread")?;

    let frame = Duration::from_secs_f32(1.0 / args.tick_hz.max(1.0));
    let report_every = args.tick_hz.max(1.0).round() as u32;
    for tick in 1..=args.ticks {
        app.update();
        if args.round_ticks.is_some_and(|n| n > 0 && tick % n == 0) {
            app.world_mut().trigger(RoundRestart);
        }
        if tick % report_every == 0 {
            let snapshot = app.world().resource::<SessionState>().snapshot();
            info!(
                "round {} score {} hand {}",
                snapshot.round,
                snapshot.score,
                if snapshot.hand_visible { "visible" } else { "hidden" }
            );
        }
        thread::sleep(frame);
    }

    let published = detector.stop();
    let stats = buffer.stats();
    let session = app.world().resource::<SessionState>().snapshot();
    info!(
        "finished: score {} over {} rounds; {published} samples published, {} superseded",
        session.score,
        session.round + 1,
        stats.superseded
    );
    Ok(())
}
