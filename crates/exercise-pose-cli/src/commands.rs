//! Subcommand arguments and execution

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::{debug, info};

use exercise_pose_core::ingest::Decoded;
use exercise_pose_core::{
    series_from_json_str, FrameAggregator, FrameAnalysis, IssueCategory, JointKind, PoseSeries,
    QualityBucket, SessionAnalysis, SessionAnalyzer, ValidationIssue, ValidationReport,
};

use crate::config::{Config, OutputConfig};

/// Output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum OutputFormat {
    /// Pretty table output
    #[default]
    Table,
    /// JSON output
    Json,
}

/// Arguments for the analyze command
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// JSON capture file
    pub input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "EXERCISE_POSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Include a per-frame table
    #[arg(long)]
    pub frames: bool,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// JSON capture file
    pub input: PathBuf,

    /// TOML configuration file
    #[arg(short, long, env = "EXERCISE_POSE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Write the configuration to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

// ============================================================================
// Display Structs
// ============================================================================

/// Joint average row for tables
#[derive(Tabled)]
struct JointRow {
    #[tabled(rename = "Joint")]
    joint: String,
    #[tabled(rename = "Average (deg)")]
    average: String,
}

/// Per-frame row for tables
#[derive(Tabled)]
struct FrameRow {
    #[tabled(rename = "Index")]
    index: u64,
    #[tabled(rename = "Time (s)")]
    time: String,
    #[tabled(rename = "Quality")]
    quality: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Knee")]
    knee: String,
    #[tabled(rename = "Hip")]
    hip: String,
    #[tabled(rename = "Back")]
    back: String,
    #[tabled(rename = "Valid")]
    valid: String,
}

/// Issue count row for tables
#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Errors")]
    errors: usize,
    #[tabled(rename = "Warnings")]
    warnings: usize,
}

/// JSON document produced by `analyze`
#[derive(Serialize)]
struct AnalyzeOutput<'a> {
    generated_at: DateTime<Utc>,
    input: String,
    valid: bool,
    ingest: &'a ValidationReport,
    analysis: &'a SessionAnalysis,
}

/// JSON document produced by `validate`
#[derive(Serialize)]
struct ValidateOutput<'a> {
    generated_at: DateTime<Utc>,
    input: String,
    frames: usize,
    #[serde(flatten)]
    report: &'a ValidationReport,
}

// ============================================================================
// Command Execution
// ============================================================================

/// Execute the analyze command
pub fn execute_analyze(args: AnalyzeArgs) -> Result<()> {
    let config = Config::load(args.config)?;
    apply_output_config(&config.output);

    let decoded = load_series(&args.input)?;
    let Some(series) = decoded.value else {
        print_report(&decoded.report, &config.output);
        bail!("{} does not contain a usable pose series", args.input.display());
    };

    let analyzer = SessionAnalyzer::new(config.analysis).context("Invalid analysis configuration")?;
    let analysis = analyzer.analyze(&series);
    let valid = decoded.report.is_valid() && analysis.report.is_valid();

    match args.format {
        OutputFormat::Json => {
            let output = AnalyzeOutput {
                generated_at: Utc::now(),
                input: args.input.display().to_string(),
                valid,
                ingest: &decoded.report,
                analysis: &analysis,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            print_analysis(&series, &analysis, valid);
            if args.frames {
                println!();
                print_frames(&analysis.frames);
            }

            let mut report = decoded.report;
            report.merge("", analysis.report);
            if !report.is_clean() {
                println!();
                print_report(&report, &config.output);
            }
        }
    }

    Ok(())
}

/// Execute the validate command
///
/// Returns whether the capture is valid.
pub fn execute_validate(args: ValidateArgs) -> Result<bool> {
    let config = Config::load(args.config)?;
    apply_output_config(&config.output);

    let decoded = load_series(&args.input)?;
    let mut report = decoded.report;
    let frames = decoded.value.as_ref().map_or(0, PoseSeries::len);
    if let Some(series) = &decoded.value {
        let aggregator = FrameAggregator::new(&config.analysis);
        report.merge("", aggregator.validate_pose_series(series));
    }
    info!(
        frames,
        errors = report.errors().len(),
        warnings = report.warnings().len(),
        "Capture validated"
    );

    match args.format {
        OutputFormat::Json => {
            let output = ValidateOutput {
                generated_at: Utc::now(),
                input: args.input.display().to_string(),
                frames,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Table => {
            println!("{}", "Capture Validation".bold().cyan());
            println!("{}", "=".repeat(50));
            println!("  {} {}", "File:".dimmed(), args.input.display());
            println!("  {} {}", "Frames:".dimmed(), frames);
            println!();
            print_report(&report, &config.output);
        }
    }

    Ok(report.is_valid())
}

/// Execute the config command
pub fn execute_config(args: ConfigArgs) -> Result<()> {
    let config = Config::default();
    match args.output {
        Some(path) => {
            config.save(&path)?;
            println!(
                "{} Configuration written to {}",
                "[OK]".green().bold(),
                path.display()
            );
        }
        None => print!("{}", config.to_toml()?),
    }
    Ok(())
}

/// Read and decode a capture file.
pub fn load_series(path: &Path) -> Result<Decoded<PoseSeries>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read capture file {}", path.display()))?;
    let decoded = series_from_json_str(&content)
        .with_context(|| format!("Failed to parse capture file {}", path.display()))?;
    debug!(
        path = %path.display(),
        decoded = decoded.value.is_some(),
        "Capture loaded"
    );
    Ok(decoded)
}

fn apply_output_config(output: &OutputConfig) {
    if !output.colors {
        colored::control::set_override(false);
    }
}

// ============================================================================
// Formatting Helpers
// ============================================================================

fn print_analysis(series: &PoseSeries, analysis: &SessionAnalysis, valid: bool) {
    let stats = &analysis.statistics;
    let quality = &analysis.series_quality;

    println!("{}", "Session Analysis".bold().cyan());
    println!("{}", "=".repeat(50));
    println!(
        "  {} {}",
        "Valid:".dimmed(),
        if valid { "yes".green() } else { "no".red().bold() }
    );
    println!(
        "  {} {} ({} scored)",
        "Frames:".dimmed(),
        stats.total_frames,
        analysis.scored_frames()
    );
    println!("  {} {}", "Frame rate:".dimmed(), series.fps);
    println!("  {} {:.3} s", "Duration:".dimmed(), stats.duration_secs);
    println!(
        "  {} {} ({:.3})",
        "Quality:".dimmed(),
        format_bucket(quality.bucket),
        quality.average_confidence
    );
    let invalid = stats.total_frames.saturating_sub(quality.frame_count);
    if invalid > 0 {
        println!(
            "  {} {}",
            "Invalid frames (excluded):".dimmed(),
            invalid.to_string().red().bold()
        );
    }
    if quality.unusable_frames > 0 {
        println!(
            "  {} {}",
            "Unusable frames:".dimmed(),
            quality.unusable_frames.to_string().yellow().bold()
        );
    }
    println!();

    let rows: Vec<JointRow> = JointKind::ALL
        .into_iter()
        .map(|kind| JointRow {
            joint: kind.to_string(),
            average: format_angle(stats.average_angles_by_kind.get(kind)),
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
}

fn print_frames(frames: &[FrameAnalysis]) {
    let rows: Vec<FrameRow> = frames
        .iter()
        .map(|frame| FrameRow {
            index: frame.index,
            time: format!("{:.3}", frame.timestamp_secs),
            quality: format_bucket(frame.quality.bucket),
            confidence: format!("{:.2}", frame.quality.average_confidence),
            knee: format_angle(frame.angles.get(JointKind::Knee)),
            hip: format_angle(frame.angles.get(JointKind::Hip)),
            back: format_angle(frame.angles.get(JointKind::Back)),
            valid: if frame.valid {
                "yes".green().to_string()
            } else {
                "no".red().to_string()
            },
        })
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());
}

fn print_report(report: &ValidationReport, output: &OutputConfig) {
    if report.is_clean() {
        println!("{} No issues found", "[OK]".green().bold());
        return;
    }

    let rows: Vec<CategoryRow> = IssueCategory::ALL
        .into_iter()
        .map(|category| CategoryRow {
            category: category.to_string(),
            errors: report.error_count(category),
            warnings: report.warning_count(category),
        })
        .filter(|row| row.errors + row.warnings > 0)
        .collect();
    println!("{}", Table::new(rows).with(Style::rounded()).to_string());

    let error_label = "[ERROR]".red().bold().to_string();
    let warn_label = "[WARN]".yellow().to_string();
    print_issues(&error_label, report.errors(), output.max_issues);
    print_issues(&warn_label, report.warnings(), output.max_issues);

    if report.is_valid() {
        println!("{} Capture is valid", "[OK]".green().bold());
    } else {
        println!("{} Capture is invalid", "[FAIL]".red().bold());
    }
}

fn print_issues(label: &str, issues: &[ValidationIssue], limit: usize) {
    for issue in issues.iter().take(limit) {
        println!("{label} {issue}");
    }
    if issues.len() > limit {
        println!("{label} ... {} more", issues.len() - limit);
    }
}

/// Format quality bucket with color
fn format_bucket(bucket: QualityBucket) -> String {
    match bucket {
        QualityBucket::Good => "Good".green().bold().to_string(),
        QualityBucket::Fair => "Fair".yellow().to_string(),
        QualityBucket::Poor => "Poor".red().to_string(),
    }
}

fn format_angle(angle: Option<f64>) -> String {
    angle.map_or_else(|| "-".to_string(), |a| format!("{a:.1}"))
}
