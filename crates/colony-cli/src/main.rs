//! Colony CLI - headless task simulation.
//!
//! - `colony run <scenario>` - simulate a scenario until its orders are done
//! - `colony status` - show engine configuration and recent task events
//! - `colony init` - write a default engine config and an example scenario

use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

use colony_cli::{run, Scenario};
use task_engine::{EngineConfig, JsonlEventSink};

#[derive(Parser)]
#[command(name = "colony")]
#[command(about = "Headless colony task simulation", version)]
struct Cli {
    /// Project root directory
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario file
    Run {
        scenario: PathBuf,

        /// Override the scenario's tick budget
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Show configuration and recent task events
    Status {
        /// Number of events to show
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Initialize a new project
    Init,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    let project_root = match cli.project {
        Some(root) => root,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Run { scenario, ticks } => run_scenario(&project_root, &scenario, ticks),
        Commands::Status { limit } => show_status(&project_root, limit),
        Commands::Init => init_project(&project_root),
    }
}

fn load_config(project_root: &Path) -> Result<EngineConfig> {
    let mut config = EngineConfig::load_from_project(project_root)?;
    config.resolve_paths(project_root);
    Ok(config)
}

fn run_scenario(project_root: &Path, scenario_path: &Path, ticks: Option<u64>) -> Result<()> {
    let config = load_config(project_root)?;
    let scenario = Scenario::load(scenario_path)?;
    tracing::info!(scenario = %scenario_path.display(), "Loaded scenario");

    let report = run(&scenario, &config, ticks)?;

    println!("Simulation finished after {} ticks", report.ticks);
    println!();
    println!("Tasks completed:   {}", report.completed);
    println!("Tasks deleted:     {}", report.deleted);
    println!("Tasks outstanding: {}", report.outstanding);
    println!("Items built:       {}", report.built);
    println!();
    println!("Stockpile:");
    for amount in &report.stock {
        println!("  {:<12} {}", amount.resource, amount.count);
    }
    if !report.announcements.is_empty() {
        println!();
        println!("Announcements:");
        for message in &report.announcements {
            println!("  {message}");
        }
    }

    Ok(())
}

fn show_status(project_root: &Path, limit: usize) -> Result<()> {
    let config = load_config(project_root)?;

    println!("Colony Engine Status");
    println!("====================");
    println!();
    println!("Project: {}", project_root.display());
    println!("Re-check every: {} tick(s)", config.recheck_every_ticks);
    match config.max_consecutive_retries {
        Some(max) => println!("Retry budget:   {max}"),
        None => println!("Retry budget:   unlimited"),
    }
    println!("Priority floor: {:?}", config.priority_floor);
    println!();

    let Some(log) = &config.event_log else {
        println!("No event log configured.");
        return Ok(());
    };
    let events = JsonlEventSink::read_recent(log, limit);
    println!("Recent events ({}):", log.display());
    for event in &events {
        println!(
            "  [{:>5}] agent {} {} {} {:?}",
            event.tick, event.agent, event.task, event.task_name, event.kind
        );
    }

    Ok(())
}

fn init_project(project_root: &Path) -> Result<()> {
    let colony_dir = project_root.join(".colony");
    std::fs::create_dir_all(&colony_dir)?;

    let config_path = colony_dir.join("engine.yaml");
    if !config_path.exists() {
        let default_config = r#"# Colony engine configuration

recheck_every_ticks: 1
max_consecutive_retries: 8
priority_floor: eventually
announce_cancellations: true
event_log: .colony/events.jsonl
"#;
        std::fs::write(&config_path, default_config)?;
    }

    let scenario_path = project_root.join("scenario.yaml");
    if !scenario_path.exists() {
        let example = r#"ticks: 200

agents:
  - name: Urist
    faction: dwarves
    position: { x: 0, y: 0, z: 0 }

stations:
  - tag: stove
    at: { x: 3, y: 0, z: 0 }

stockpile:
  - resource: Grain
    tags: [grain]
    count: 4

solids:
  - at: { x: 0, y: 4, z: 0 }

orders:
  - dig:
      at: { x: 0, y: 4, z: 0 }
  - craft_resource:
      item:
        name: Bread
        required_resources:
          - { resource: grain, count: 1 }
        craft_location: stove
        num_repeats: 2
        edible: true
"#;
        std::fs::write(&scenario_path, example)?;
    }

    println!("Initialized colony project at {}", project_root.display());
    println!();
    println!("Created:");
    println!("  .colony/engine.yaml - engine configuration");
    println!("  scenario.yaml       - example scenario");
    println!();
    println!("Next steps:");
    println!("  colony run scenario.yaml");

    Ok(())
}
