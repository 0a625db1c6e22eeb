//! Exercise Pose CLI
//!
//! Command-line interface over `exercise-pose-core` for analyzing pose
//! capture files.
//!
//! # Features
//!
//! - **analyze**: Run the full analysis pipeline and print session statistics
//! - **validate**: Report structural and domain problems in a capture
//! - **config**: Print or write the default configuration
//! - **version**: Display version information
//!
//! # Usage
//!
//! ```bash
//! # Analyze a capture with the default configuration
//! exercise-pose analyze session.json
//!
//! # Emit machine-readable output with a custom configuration
//! exercise-pose analyze session.json --config pose.toml --format json
//!
//! # Check a capture; exits non-zero if it is invalid
//! exercise-pose validate session.json
//! ```

use clap::{Parser, Subcommand};

pub mod commands;
pub mod config;

/// Exercise Pose Command Line Interface
#[derive(Parser, Debug)]
#[command(name = "exercise-pose")]
#[command(author, version, about = "Keypoint validation and joint analysis for exercise captures")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze a pose capture
    Analyze(commands::AnalyzeArgs),

    /// Validate a pose capture without scoring it
    Validate(commands::ValidateArgs),

    /// Print the default configuration as TOML
    Config(commands::ConfigArgs),

    /// Display version information
    Version,
}
