//! Nation Sim - command line entry point
//!
//! Founds a set of demo nations (or loads a save), runs the requested number
//! of years, prints a summary and writes the final world to disk.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;

use nation_sim::core::config::SimulationConfig;
use nation_sim::core::error::Result;
use nation_sim::engine::runner::SimulationRunner;
use nation_sim::engine::setup;
use nation_sim::engine::tick::simulate_years;
use nation_sim::persistence;
use nation_sim::World;

/// Run a nation simulation for a number of years
#[derive(Parser, Debug)]
#[command(name = "nation-sim")]
#[command(about = "Simulate sovereign nations year by year")]
struct Args {
    /// Years to simulate
    #[arg(long, default_value_t = 50)]
    years: u32,

    /// Demo nations to found (ignored with --load)
    #[arg(long, default_value_t = 6)]
    nations: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with configuration overrides
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the final save
    #[arg(long, default_value = "world.json")]
    output: PathBuf,

    /// Continue from an existing save instead of founding nations
    #[arg(long)]
    load: Option<PathBuf>,

    /// Tick on a real-time interval (milliseconds per year) instead of as fast as possible
    #[arg(long)]
    interval_ms: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("nation_sim=info")),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => SimulationConfig::load_from_toml(path)?,
        None => SimulationConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let mut world = match &args.load {
        Some(path) => persistence::load_from_path(path, config)?,
        None => {
            let mut world = World::new(config)?;
            setup::populate(&mut world, args.nations);
            world
        }
    };

    println!("Nation Sim");
    println!("==========");
    println!("{}", world.summary());
    println!();
    println!("Simulating {} years...", args.years);

    let start = Instant::now();
    match args.interval_ms {
        Some(ms) => world = run_realtime(world, args.years, Duration::from_millis(ms)).await,
        None => {
            simulate_years(&mut world, args.years);
        }
    }
    let elapsed = start.elapsed();

    println!();
    println!("{}", world.summary());
    println!("Actual time: {:.2}ms", elapsed.as_secs_f64() * 1000.0);

    println!("\n--- Latest notifications ---");
    for n in world.notifications().latest(10) {
        println!("[{}] {}: {}", n.year, n.kind, n.message);
    }

    persistence::save_to_path(&world, &args.output)?;
    println!("\nWorld written to {}", args.output.display());
    Ok(())
}

/// Tick on the async runner, one year per `interval`, for exactly `years` years
async fn run_realtime(world: World, years: u32, interval: Duration) -> World {
    let mut runner = SimulationRunner::new(world);
    runner.start_for(interval, years);
    runner.finish().await;
    runner.into_world().await
}
