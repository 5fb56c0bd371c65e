//! SURGECAST: hospital surge-planning CLI
//!
//! Runs a scenario through the standard six-agent pipeline and prints the
//! resulting actions and recommendations, or emits them as JSON.
//!
//! Usage:
//!   cargo run -p demo -- run
//!   cargo run -p demo -- run --season winter --hazard pollution_spike --json
//!   cargo run -p demo -- run --config configs/aiims-delhi.toml --live-aqi 410
//!   cargo run -p demo -- detect --live-aqi 320 --run
//!   cargo run -p demo -- festivals
//!   cargo run -p demo -- config

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use surgecast_contracts::{
    config::{HazardType, HospitalConfig, Season},
    environment::WeatherReading,
    error::SurgeResult,
    execution::{AgentOutputs, Scenario, DEFAULT_RISK_MULTIPLIER},
};
use surgecast_core::Toolkit;
use surgecast_hospital::{
    config,
    forecasting::festival::{upcoming_festivals, FESTIVAL_WINDOW_DAYS},
    providers::StaticEnvironment,
    detect_scenario, run_scenario,
};

// ── CLI definition ────────────────────────────────────────────────────────────

/// SURGECAST: Perception-Reasoning-Action surge planning for hospitals.
#[derive(Parser)]
#[command(
    name = "surgecast",
    about = "Hospital surge-planning agent pipeline",
    long_about = "Runs the SURGECAST agent pipeline (perception → reasoning → action)\n\
                  against a hospital configuration and prints capacity recommendations."
)]
struct Cli {
    /// Hospital configuration TOML. Defaults to the bundled AIIMS Delhi profile.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one scenario through the full pipeline.
    Run(RunArgs),
    /// Detect a scenario from live readings and the festival calendar.
    Detect(DetectArgs),
    /// List festivals in the next 30 days.
    Festivals,
    /// Print the effective hospital configuration as JSON.
    Config,
}

#[derive(Args)]
struct RunArgs {
    /// Scenario label recorded in logs and agent episodes.
    #[arg(long, default_value = "baseline")]
    name: String,

    /// Force a season (winter, summer, monsoon, post_monsoon) instead of today's.
    #[arg(long, value_parser = parse_season)]
    season: Option<Season>,

    #[arg(long, default_value_t = DEFAULT_RISK_MULTIPLIER)]
    risk_multiplier: f64,

    /// Hazard driving the scenario (pollution_spike, heatwave, dengue_outbreak, influenza_surge).
    #[arg(long, value_parser = parse_hazard)]
    hazard: Option<HazardType>,

    /// Emit the full agent outputs as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    live: LiveArgs,
}

#[derive(Args)]
struct DetectArgs {
    /// Run the detected scenario (or the baseline if none) through the pipeline.
    #[arg(long)]
    run: bool,

    /// Emit the detection, and pipeline outputs with --run, as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    live: LiveArgs,
}

/// Operator-entered readings standing in for live feeds.
#[derive(Args)]
struct LiveArgs {
    /// Observed AQI, used instead of the seasonal simulation.
    #[arg(long)]
    live_aqi: Option<f64>,

    /// Observed temperature in °C.
    #[arg(long)]
    live_temperature: Option<f64>,

    #[arg(long, requires = "live_temperature")]
    live_humidity: Option<f64>,

    /// Free-text weather conditions, e.g. "Haze" or "Light rain".
    #[arg(long, requires = "live_temperature")]
    live_conditions: Option<String>,
}

fn parse_season(s: &str) -> Result<Season, String> {
    Season::parse(s).ok_or_else(|| format!("unknown season '{}'", s))
}

fn parse_hazard(s: &str) -> Result<HazardType, String> {
    HazardType::parse(s).ok_or_else(|| format!("unknown hazard '{}'", s))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=info to follow the pipeline phase by phase.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config.as_ref()).and_then(|hospital| match cli.command {
        Command::Run(args) => run(hospital, args),
        Command::Detect(args) => detect(hospital, args),
        Command::Festivals => list_festivals(hospital),
        Command::Config => print_config(&hospital),
    });

    if let Err(e) = result {
        eprintln!("surgecast error: {}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&PathBuf>) -> SurgeResult<HospitalConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading hospital config");
            config::from_file(path)
        }
        None => Ok(config::default_config()),
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run(hospital: HospitalConfig, args: RunArgs) -> SurgeResult<()> {
    let mut scenario = Scenario::new(args.name.as_str()).with_risk_multiplier(args.risk_multiplier);
    if let Some(season) = args.season {
        scenario = scenario.with_season(season);
    }
    if let Some(hazard) = args.hazard {
        scenario = scenario.with_hazard(hazard);
    }

    let toolkit = live_toolkit(hospital, args.live);
    let outputs = run_scenario(toolkit.clone(), &scenario)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outputs)?);
    } else {
        print_report(&toolkit, &scenario, &outputs);
    }
    Ok(())
}

fn detect(hospital: HospitalConfig, args: DetectArgs) -> SurgeResult<()> {
    let toolkit = live_toolkit(hospital, args.live);
    let detected = detect_scenario(&toolkit);

    if !args.run {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&detected)?);
        } else {
            match &detected {
                Some(d) => println!("{}\n  Severity: {}\n  {}", d.summary(), d.severity, d.description),
                None => println!("No surge scenario detected; conditions are normal."),
            }
        }
        return Ok(());
    }

    let scenario = detected
        .as_ref()
        .map(|d| d.scenario.clone())
        .unwrap_or_else(|| Scenario::new("auto-normal"));
    let outputs = run_scenario(toolkit.clone(), &scenario)?;

    if args.json {
        let report = serde_json::json!({ "detected": detected, "outputs": outputs });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        match &detected {
            Some(d) => println!("{}", d.summary()),
            None => println!("No surge scenario detected; running the baseline."),
        }
        print_report(&toolkit, &scenario, &outputs);
    }
    Ok(())
}

fn live_toolkit(hospital: HospitalConfig, live: LiveArgs) -> Toolkit {
    let mut environment = StaticEnvironment::new();
    if let Some(aqi) = live.live_aqi {
        environment = environment.with_aqi(aqi);
    }
    if let Some(temperature_c) = live.live_temperature {
        environment = environment.with_weather(WeatherReading {
            temperature_c,
            humidity_pct: live.live_humidity.unwrap_or(60.0),
            conditions: live.live_conditions.unwrap_or_else(|| "Unknown".to_string()),
            aqi: None,
            alert: None,
        });
    }

    let toolkit = Toolkit::new(hospital);
    if environment.is_empty() {
        toolkit
    } else {
        toolkit.with_environment(Arc::new(environment))
    }
}

fn list_festivals(hospital: HospitalConfig) -> SurgeResult<()> {
    let toolkit = Toolkit::new(hospital);
    let festivals = upcoming_festivals(toolkit.now(), FESTIVAL_WINDOW_DAYS);

    if festivals.is_empty() {
        println!("No festivals in the next {} days.", FESTIVAL_WINDOW_DAYS);
        return Ok(());
    }
    println!("Festivals in the next {} days:", FESTIVAL_WINDOW_DAYS);
    for f in festivals {
        println!(
            "  {}  {:<18} in {:>2} days  surge {}x",
            f.festival.date, f.festival.name, f.days_until, f.festival.surge_multiplier
        );
    }
    Ok(())
}

fn print_config(hospital: &HospitalConfig) -> SurgeResult<()> {
    println!("{}", serde_json::to_string_pretty(hospital)?);
    Ok(())
}

// ── Report ────────────────────────────────────────────────────────────────────

fn print_report(toolkit: &Toolkit, scenario: &Scenario, outputs: &AgentOutputs) {
    let hospital = toolkit.hospital_config();

    println!();
    println!("SURGECAST — Surge Planning Report");
    println!("=================================");
    println!("  Hospital:        {} ({})", hospital.name, hospital.hospital_id);
    println!("  Scenario:        {}", scenario.name);
    println!("  Risk multiplier: {}x", scenario.risk_multiplier);
    if let Some(hazard) = scenario.hazard {
        println!("  Hazard:          {}", hazard);
    }
    println!();

    println!("Agent actions:");
    for action in &outputs.actions {
        println!("  [{}] {}", action.kind, action.agent_id);
        println!("      {}", action.explanation);
    }
    println!();

    println!("Reasoning trace:");
    for trace in &outputs.reasoning_traces {
        println!("  {:<22} {:?}  {}", trace.agent_name, trace.step, truncate(&trace.thought, 100));
    }
    println!();

    println!("{} recommendation(s) produced.", outputs.recommendations.len());
    println!();
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let cut: String = s.chars().take(max_chars).collect();
    format!("{}…", cut)
}
