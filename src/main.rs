use std::time::Instant;

use argh::FromArgs;
use parking_sim::{Simulation, SimulationConfig};

/// Runs the parking simulation headless until the vehicle parks or gives up
#[derive(Debug, FromArgs)]
struct Args {
    /// path to a JSON simulation config; missing fields take their defaults
    #[argh(option, short = 'c')]
    config: Option<String>,

    /// seed for the parking lot layout, overriding the config
    #[argh(option, short = 's')]
    seed: Option<u64>,

    /// the maximum number of ticks to simulate
    #[argh(option, short = 't', default = "100_000")]
    ticks: usize,

    /// print the final frame as JSON
    #[argh(switch, short = 'f')]
    frame: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args: Args = argh::from_env();

    let mut config = match &args.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config = config.with_seed(seed);
    }

    let mut sim = Simulation::new(config)?;
    println!(
        "Simulating {} vacant spots, {} parked cars...",
        sim.world().spots().len(),
        sim.world().obstacles().len()
    );

    let start = Instant::now();
    sim.start();
    while sim.outcome().is_none() && sim.tick() < args.ticks {
        sim.step();
    }
    let elapsed = start.elapsed();

    println!(
        "{} (tick {}, {} attempts, {:?} per tick)",
        sim.status(),
        sim.tick(),
        sim.attempts(),
        elapsed / sim.tick().max(1) as u32,
    );
    if args.frame {
        println!("{}", serde_json::to_string_pretty(&sim.frame())?);
    }
    Ok(())
}
