mod plant;

use clap::{Parser, Subcommand};
use lk_controls::{
    ControlResult, Controller, ControllerKind, ControllersFile, Introspect, Steppable,
    attributes_json,
};
use std::path::{Path, PathBuf};

use crate::plant::FirstOrderPlant;

#[derive(Parser)]
#[command(name = "lk-cli")]
#[command(about = "loopkit CLI - run periodic controllers against a simulated process", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a controllers file
    Validate {
        /// Path to the controllers YAML file
        config_path: PathBuf,
    },
    /// Step every controller for a number of ticks
    Run {
        /// Path to the controllers YAML file
        config_path: PathBuf,
        /// Number of ticks to run
        #[arg(long, default_value_t = 100)]
        ticks: u64,
        /// Gain of the simulated process driven by each PID controller
        #[arg(long, default_value_t = 1.0)]
        plant_gain: f64,
        /// Time constant of the simulated process in seconds
        #[arg(long, default_value_t = 1.0)]
        plant_tau: f64,
    },
    /// Print the attribute snapshot of each PID and level controller
    Attributes {
        /// Path to the controllers YAML file
        config_path: PathBuf,
    },
}

fn main() -> ControlResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config_path } => cmd_validate(&config_path),
        Commands::Run {
            config_path,
            ticks,
            plant_gain,
            plant_tau,
        } => cmd_run(&config_path, ticks, plant_gain, plant_tau),
        Commands::Attributes { config_path } => cmd_attributes(&config_path),
    }
}

fn cmd_validate(config_path: &Path) -> ControlResult<()> {
    println!("Validating controllers: {}", config_path.display());
    let file = ControllersFile::load_yaml(config_path)?;
    let controllers = file.build_all()?;
    for spec in &file.controllers {
        let kind = match spec.kind {
            ControllerKind::Pid(_) => "pid",
            ControllerKind::Level(_) => "level",
            ControllerKind::TimeInterval(_) => "time_interval",
        };
        println!("  {} ({})", spec.name, kind);
    }
    println!("✓ {} controller(s) valid", controllers.len());
    Ok(())
}

fn cmd_run(config_path: &Path, ticks: u64, plant_gain: f64, plant_tau: f64) -> ControlResult<()> {
    let file = ControllersFile::load_yaml(config_path)?;
    let mut controllers = file.build_all()?;

    let mut plants = Vec::with_capacity(controllers.len());
    for controller in &mut controllers {
        let plant = match controller {
            Controller::Pid(pid) => Some(FirstOrderPlant::new(
                plant_gain,
                plant_tau,
                pid.state().input(),
            )?),
            _ => None,
        };
        plants.push(plant);
        controller.start();
    }

    println!("tick,controller,input,output");
    for tick in 0..ticks {
        for (controller, plant) in controllers.iter_mut().zip(plants.iter_mut()) {
            match (controller, plant) {
                (Controller::Pid(pid), Some(plant)) => {
                    pid.set_input(plant.value);
                    pid.step();
                    let dt = pid.state().sample_time().seconds();
                    plant.step(dt, pid.output());
                    println!("{},{},{},{}", tick, pid.name(), pid.state().input(), pid.output());
                }
                (Controller::Level(level), _) => {
                    level.step();
                    println!(
                        "{},{},{},{}",
                        tick,
                        level.name(),
                        level.input(),
                        level.check_level()
                    );
                }
                (Controller::TimeInterval(interval), _) => {
                    interval.step();
                    println!("{},{},,{}", tick, interval.name(), interval.in_interval());
                }
                (Controller::Pid(pid), None) => {
                    tracing::warn!(controller = pid.name(), "no simulated process attached");
                }
            }
        }
    }
    Ok(())
}

fn cmd_attributes(config_path: &Path) -> ControlResult<()> {
    let file = ControllersFile::load_yaml(config_path)?;
    for controller in file.build_all()? {
        let (attributes, commands) = match &controller {
            Controller::Pid(pid) => (attributes_json(pid)?, pid.command_names()),
            Controller::Level(level) => (attributes_json(level)?, level.command_names()),
            Controller::TimeInterval(_) => continue,
        };
        println!("{}:", controller.name());
        println!("  attributes: {}", serde_json::to_string(&attributes)?);
        println!("  commands: {}", commands.join(", "));
    }
    Ok(())
}
