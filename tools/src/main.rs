//! traffic-runner: headless synthetic-traffic runner.
//!
//! Usage:
//!   traffic-runner --duration 30 --rps 10
//!   traffic-runner --config data/simulation.json --flags data/flags.json
//!   traffic-runner --db warehouse.db --seed 12345

use anyhow::Result;
use gravity_core::{
    config::SimConfig,
    engine::{SimulationEngine, SimulationObserver},
    flags::{FlagClient, StaticFlagClient},
    results::{SimulationProgress, SimulationResults},
    rng::SimRng,
    sink::{EventSink, NullSink, WarehouseSink},
    store::MetricStore,
};
use std::env;
use std::sync::Arc;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 0u64);
    let config_path = str_arg(&args, "--config");
    let flags_path = str_arg(&args, "--flags");
    let db_path = str_arg(&args, "--db");

    let mut config = match config_path {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::bundled()?,
    };
    if let Some(duration) = opt_arg::<u64>(&args, "--duration") {
        config.duration_secs = duration;
    }
    if let Some(rps) = opt_arg::<u32>(&args, "--rps") {
        config.records_per_second = rps;
    }
    config.validate()?;

    let flag_client: Arc<dyn FlagClient> = match flags_path {
        Some(path) => Arc::new(StaticFlagClient::from_file(path)?),
        None => Arc::new(StaticFlagClient::new()),
    };

    let sink: Arc<dyn EventSink> = match db_path {
        Some(path) => {
            let store = MetricStore::open(path)?;
            store.migrate()?;
            Arc::new(WarehouseSink::new(store))
        }
        None => Arc::new(NullSink),
    };

    println!("Gravity Farms traffic-runner");
    println!("  duration:  {}s", config.duration_secs);
    println!("  rate:      {} users/s", config.records_per_second);
    println!("  records:   {}", config.total_records());
    println!("  seed:      {}", if seed == 0 { "entropy".into() } else { seed.to_string() });
    println!("  warehouse: {}", db_path.unwrap_or("(none)"));
    println!();

    let rng = if seed == 0 {
        SimRng::from_entropy()
    } else {
        SimRng::seeded(seed)
    };
    let mut engine =
        SimulationEngine::with_rng(config, Arc::clone(&flag_client), sink, rng)?;

    let mut observer = ConsoleObserver;
    let results = engine.run_to_completion(&mut observer)?;
    flag_client.close();
    print_summary(&results);
    Ok(())
}

struct ConsoleObserver;

impl SimulationObserver for ConsoleObserver {
    fn on_progress(&mut self, progress: &SimulationProgress) {
        println!(
            "  [{:>5.1}%] {}/{} users, {} events",
            progress.percentage,
            progress.current_record,
            progress.total_records,
            progress.results.events.values().sum::<u64>()
        );
    }
}

fn print_summary(results: &SimulationResults) {
    println!();
    println!("=== RUN SUMMARY ===");
    println!("  users:     {}", results.total_users);
    println!("  elapsed:   {}ms", results.duration_ms);
    println!();
    println!("  events:");
    for (event, count) in &results.events {
        let rate = count * 100 / results.total_users.max(1);
        println!("    {event:<26} {count:>6}  ({rate}%)");
    }
    println!();
    println!("  flag evaluations:");
    for (flag, by_value) in &results.flag_evaluations {
        println!("    {flag}:");
        for (value, count) in by_value {
            println!("      {value:<24} {count:>6}");
        }
    }
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    opt_arg(args, flag).unwrap_or(default)
}

fn opt_arg<T: std::str::FromStr>(args: &[String], flag: &str) -> Option<T> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
}

fn str_arg<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}
