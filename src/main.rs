//! Skulk - headless runner
//!
//! Streams a world from a seed and walks the player along a scripted route
//! toward the nearest settlement, shooting at guards that get close. Prints
//! a summary (or the final snapshot as JSON) at the end.

use std::path::PathBuf;

use clap::Parser;
use glam::Vec2;

use skulk::core::config::{set_config, SimulationConfig};
use skulk::core::error::Result;
use skulk::entity::PlayerInput;
use skulk::simulation::{Simulation, SimulationEvent};

/// Headless Skulk runner
#[derive(Parser, Debug)]
#[command(name = "skulk")]
#[command(about = "Run the stealth simulation headless along a scripted route")]
struct Args {
    /// World seed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of fixed steps to run
    #[arg(long, default_value_t = 1200)]
    ticks: u64,

    /// TOML file overriding configuration defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the final snapshot as JSON instead of a summary
    #[arg(long)]
    json: bool,
}

const STEP_DT: f32 = 1.0 / 60.0;
/// Guards closer than this get shot at
const ENGAGE_DISTANCE: f32 = 260.0;
const INTERACT_EVERY: u64 = 90;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("skulk=info")),
        )
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)?,
        None => SimulationConfig::default(),
    };
    if set_config(config.clone()).is_err() {
        tracing::warn!("global config already initialised");
    }

    let mut sim = Simulation::new(args.seed, config)?;
    let mut kills = 0;
    for tick in 0..args.ticks {
        let input = scripted_input(&sim, tick);
        for event in sim.step(STEP_DT, &input) {
            match event {
                SimulationEvent::Settlement {
                    event: skulk::world::SettlementEvent::AgentKilled { .. },
                    ..
                } => kills += 1,
                SimulationEvent::PlayerDied => tracing::warn!(tick, "player died"),
                _ => {}
            }
        }
        if !sim.player().is_alive() {
            break;
        }
    }

    let snapshot = sim.snapshot();
    if args.json {
        println!("{}", snapshot.to_json()?);
        return Ok(());
    }

    println!("=== SKULK ===");
    println!("seed {}  ticks {}  elapsed {:.1}s", args.seed, snapshot.tick, snapshot.elapsed);
    println!(
        "player at ({:.0}, {:.0}) floor {}  health {:.0}/{:.0}  ammo {}  score {}",
        snapshot.player.position.x,
        snapshot.player.position.y,
        snapshot.player.floor,
        snapshot.player.health,
        snapshot.player.max_health,
        snapshot.player.ammo,
        snapshot.player.score,
    );
    println!(
        "chunks loaded {}  settlements {} ({} cleared)  kills {}",
        snapshot.loaded_chunks, snapshot.settlements, snapshot.cleared_settlements, kills
    );
    for (state, count) in snapshot.state_counts() {
        println!("  {:<8} {}", state, count);
    }
    Ok(())
}

/// Sneak toward the nearest settlement; shoot the closest guard in range
fn scripted_input(sim: &Simulation, tick: u64) -> PlayerInput {
    let player = sim.player();
    let position = player.position();

    let destination = sim
        .world()
        .settlements()
        .filter(|s| !s.cleared)
        .map(|s| s.center)
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)))
        .unwrap_or(position + Vec2::X * 1000.0);

    let target = sim
        .world()
        .settlements()
        .flat_map(|s| s.agents.iter())
        .filter(|a| a.current_floor == player.floor)
        .map(|a| a.position())
        .filter(|p| p.distance(position) < ENGAGE_DISTANCE)
        .min_by(|a, b| a.distance_squared(position).total_cmp(&b.distance_squared(position)));

    PlayerInput {
        movement: (destination - position).normalize_or_zero(),
        aim: target.map_or(Vec2::ZERO, |t| (t - position).normalize_or_zero()),
        sneak: target.is_none(),
        dash: false,
        attack: target.is_some(),
        interact: tick % INTERACT_EVERY == 0,
    }
}
