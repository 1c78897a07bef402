//! skytower: headless airport tower simulation runner.
//!
//! Usage:
//!   skytower run --config tower.toml --duration 600
//!   skytower run --seed 7 --duration 120 --dt 0.1

use std::path::PathBuf;
use std::process;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use skytower_atc::RuleBasedOracle;
use skytower_core::config::SimConfig;
use skytower_core::events::SimEvent;
use skytower_sim::{EngineConfig, SimulationEngine};

fn main() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    match args[1].as_str() {
        "run" => cmd_run(&args[2..]),
        "help" | "--help" | "-h" => print_usage(),
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    }
}

fn print_usage() {
    eprintln!(
        "skytower: headless airport control tower simulation\n\
         \n\
         Commands:\n\
         \n\
         run       Run the simulation with the built-in rule-based controller\n\
         \n\
           --config <path>    TOML configuration file (optional)\n\
           --seed <n>         Override the RNG seed\n\
           --duration <secs>  Simulated seconds to run (default: 600)\n\
           --dt <secs>        Tick length in simulated seconds (default: 0.1)\n\
         \n\
         Examples:\n\
         \n\
           skytower run --config tower.toml --duration 600\n\
           skytower run --seed 7 --duration 120\n"
    );
}

fn parse_path(args: &[String], flag: &str) -> Option<PathBuf> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
    }
    None
}

fn parse_f64(args: &[String], flag: &str, default: f64) -> f64 {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            if let Ok(v) = args[i + 1].parse::<f64>() {
                return v;
            }
            eprintln!("Error: {flag} expects a number, got {}", args[i + 1]);
            process::exit(1);
        }
    }
    default
}

fn parse_u64(args: &[String], flag: &str) -> Option<u64> {
    for i in 0..args.len() {
        if args[i] == flag && i + 1 < args.len() {
            match args[i + 1].parse::<u64>() {
                Ok(v) => return Some(v),
                Err(_) => {
                    eprintln!("Error: {flag} expects an integer, got {}", args[i + 1]);
                    process::exit(1);
                }
            }
        }
    }
    None
}

fn load_config(args: &[String]) -> SimConfig {
    let Some(path) = parse_path(args, "--config") else {
        return SimConfig::default();
    };
    let text = match std::fs::read_to_string(&path) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            process::exit(1);
        }
    };
    match toml::from_str(&text) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error parsing {}: {e}", path.display());
            process::exit(1);
        }
    }
}

fn cmd_run(args: &[String]) {
    let mut config = load_config(args);
    if let Some(seed) = parse_u64(args, "--seed") {
        config.simulation.seed = seed;
    }
    let duration = parse_f64(args, "--duration", 600.0);
    let dt = parse_f64(args, "--dt", 0.1);
    if dt <= 0.0 {
        eprintln!("Error: --dt must be positive");
        process::exit(1);
    }

    let seed = config.simulation.seed;
    let oracle = Box::new(RuleBasedOracle::new(seed));
    let mut engine = SimulationEngine::new(EngineConfig::from(config), oracle);

    info!(seed, duration, dt, "starting simulation");

    let ticks = (duration / dt).ceil() as u64;
    let status_every = (60.0 / dt).ceil() as u64;
    let mut departed = 0u32;
    let mut spawned = 0u32;

    for tick in 1..=ticks {
        let snapshot = engine.update(dt);

        for event in engine.take_events() {
            match event {
                SimEvent::AircraftSpawned { callsign, is_arrival, .. } => {
                    spawned += 1;
                    info!(%callsign, is_arrival, "aircraft spawned");
                }
                SimEvent::Departed { callsign, .. } => {
                    departed += 1;
                    info!(%callsign, "aircraft departed");
                }
                SimEvent::Crashed { callsign, reason, .. } => {
                    warn!(%callsign, %reason, "aircraft crashed");
                }
                SimEvent::FuelEmergency { aircraft_id, fuel } => {
                    warn!(aircraft_id, fuel, "fuel emergency declared");
                }
                SimEvent::EmergencySeparation { aircraft_id, other_id, distance } => {
                    warn!(aircraft_id, other_id, distance, "emergency separation");
                }
                SimEvent::GoAround { aircraft_id, reason } => {
                    info!(aircraft_id, %reason, "go-around");
                }
            }
        }

        if tick % status_every == 0 {
            info!(
                time = snapshot.current_time,
                active = snapshot.aircraft.len(),
                warnings = snapshot.collision_warnings.len(),
                crashes = snapshot.total_crashes,
                "status"
            );
        }
    }

    let airport = engine.airport();
    println!("Simulated {:.0}s over {ticks} ticks", engine.time().elapsed_secs);
    println!("Spawned:  {spawned}");
    println!("Departed: {departed}");
    println!("Active:   {}", airport.active_count());
    println!("Crashes:  {}", airport.total_crashes);
    if !airport.crashed_callsigns.is_empty() {
        println!("Crashed:  {}", airport.crashed_callsigns.join(", "));
    }
}
