//! Exercise Pose CLI Entry Point
//!
//! This is the main entry point for the exercise-pose command-line tool.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use exercise_pose_cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze(args) => commands::execute_analyze(args)?,
        Commands::Validate(args) => {
            if !commands::execute_validate(args)? {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Config(args) => commands::execute_config(args)?,
        Commands::Version => {
            println!("exercise-pose {}", env!("CARGO_PKG_VERSION"));
            println!("Core library version: {}", exercise_pose_core::VERSION);
        }
    }

    Ok(ExitCode::SUCCESS)
}
