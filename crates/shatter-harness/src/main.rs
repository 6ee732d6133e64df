//! Headless driver: plays a scripted rotation against the training dummy
//! and reports the damage meter.

mod rotation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use shatter_core::EntityId;
use shatter_core::classes::ClassId;
use shatter_core::config::GameConfig;
use shatter_core::frame::FrameTimer;
use shatter_core::game::{Game, GameEvent};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Simulated display rate.
const FRAME_RATE: f64 = 60.0;
/// Seconds between progress reports.
const REPORT_INTERVAL: f32 = 10.0;

#[derive(Parser)]
#[command(name = "shatter-harness", about = "Runs a scripted arena session headless")]
struct Args {
    /// Class to play; overrides the config.
    #[arg(short, long)]
    class: Option<ClassId>,

    /// Simulated seconds to run.
    #[arg(short, long, default_value_t = 60.0)]
    seconds: f32,

    /// JSON config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// RNG seed; overrides the config.
    #[arg(long)]
    seed: Option<u64>,

    /// Drop a hazard on the player every this many seconds.
    #[arg(long)]
    hazard_interval: Option<f32>,

    /// Print the final HUD state as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Default)]
struct Tally {
    projectiles: u32,
    hits: u32,
    melee: u32,
    hazards: u32,
    hazard_hits: u32,
}

impl Tally {
    fn observe(&mut self, event: &GameEvent, player: EntityId) {
        match event {
            GameEvent::ProjectileSpawned { .. } => self.projectiles += 1,
            GameEvent::DamageDealt { .. } => self.hits += 1,
            GameEvent::MeleeAttack(_) => self.melee += 1,
            GameEvent::HazardTriggered { caught, .. } => {
                self.hazards += 1;
                if caught.contains(&player) {
                    self.hazard_hits += 1;
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(class) = args.class {
        config.starting_class = class;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut timer = FrameTimer::new(config.timing.max_frame_delta, config.timing.fps_smoothing);
    let mut game = Game::new(config).context("building game")?;
    info!(class = %game.class().id(), seconds = args.seconds, "starting session");

    let mut tally = Tally::default();
    let mut simulated = 0.0_f32;
    let mut next_report = REPORT_INTERVAL;
    let mut next_hazard = args.hazard_interval;
    let mut frame = 0_u32;

    while simulated < args.seconds {
        let step = timer.step(f64::from(frame) / FRAME_RATE);
        frame += 1;

        let input = rotation::choose(&game.hud_state(), game.player_position(), game.boss_position());
        game.update(step.delta, &input);
        simulated += step.delta;

        if let (Some(interval), Some(at)) = (args.hazard_interval, next_hazard) {
            if simulated >= at {
                let hazard = game.spawn_hazard(game.player_position());
                debug!(%hazard, "hazard dropped");
                next_hazard = Some(at + interval);
            }
        }

        for event in game.drain_events() {
            tally.observe(&event, game.player());
        }

        if simulated >= next_report {
            let state = game.tracker_state();
            info!(
                elapsed = state.elapsed,
                total = state.total_damage,
                dps = state.dps,
                "progress"
            );
            next_report += REPORT_INTERVAL;
        }
    }

    let state = game.tracker_state();
    info!(
        class = %game.class().id(),
        total = state.total_damage,
        dps = state.dps,
        locked = state.locked,
        projectiles = tally.projectiles,
        hits = tally.hits,
        melee = tally.melee,
        hazards = tally.hazards,
        hazard_hits = tally.hazard_hits,
        "session complete"
    );

    if args.json {
        let hud = serde_json::to_string_pretty(&game.hud_state())?;
        println!("{hud}");
    }
    Ok(())
}
