use std::{io::Read, path::PathBuf, time::Instant};

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::{Detector, DetectorConfig, InputNormalizer, VerdictResult};

const BAR_WIDTH: usize = 30;

#[derive(Parser, Debug)]
#[command(name = "is-it-ai")]
#[command(about = "Detect AI-generated English text", long_about = None)]
pub struct Cli {
    /// Text to analyze (if not provided, reads from stdin)
    #[arg(value_name = "TEXT")]
    pub text: Option<String>,

    /// Read text from file
    #[arg(short, long, value_name = "PATH", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Also print the classifier's raw output (human format)
    #[arg(long)]
    pub raw: bool,

    /// Model directory (overrides configuration)
    #[arg(short, long, value_name = "DIR")]
    pub model_dir: Option<PathBuf>,

    /// Extra configuration file
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Verbose mode (debug logging and timing)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Probabilities as percentages with bars, plus the verdict (default)
    Human,
    /// Output just the verdict tier
    Verdict,
    /// Output AI probability as a float 0-1
    Probability,
    /// Output as JSON
    Json,
}

#[derive(Clone, Copy)]
enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Verbosity {
    const fn default_filter(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "debug",
        }
    }
}

fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_filter()));
    // Ignore the error if a subscriber is already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Determine input text from CLI args. Priority: text arg > file > stdin.
fn read_input(cli: &Cli) -> Result<String> {
    if let Some(text) = &cli.text {
        return Ok(text.clone());
    }

    if let Some(path) = &cli.file {
        return std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display()));
    }

    let mut buffer = String::new();
    std::io::stdin()
        .read_to_string(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

fn load_config(cli: &Cli) -> Result<DetectorConfig> {
    let mut config = match &cli.config {
        Some(path) => DetectorConfig::load_with_file(path),
        None => DetectorConfig::load(),
    }
    .context("Failed to load configuration")?;

    if let Some(dir) = &cli.model_dir {
        config.model.dir.clone_from(dir);
    }
    Ok(config)
}

pub fn run(cli: &Cli) -> Result<()> {
    let verbosity = match (cli.quiet, cli.verbose) {
        (true, _) => Verbosity::Quiet,
        (_, true) => Verbosity::Verbose,
        _ => Verbosity::Normal,
    };
    init_logging(verbosity);

    let text = read_input(cli)?;
    // Checked before the model is loaded so blank input costs nothing
    if InputNormalizer::is_blank(&text) {
        bail!("No input text: pass TEXT, --file, or pipe text on stdin");
    }

    let config = load_config(cli)?;
    let detector = Detector::load(&config.model).with_context(|| {
        format!(
            "Could not load the classifier from {}",
            config.model.dir.display()
        )
    })?;

    let start = matches!(verbosity, Verbosity::Verbose).then(Instant::now);
    let verdict = detector.analyze(&text)?;
    if let Some(start_time) = start {
        eprintln!("Inference time: {:?}", start_time.elapsed());
    }

    println!("{}", render(&verdict, cli.format, cli.raw)?);
    Ok(())
}

/// Render a verdict in the requested format.
///
/// # Errors
///
/// Fails only if the verdict cannot be serialized to JSON.
pub fn render(verdict: &VerdictResult, format: OutputFormat, show_raw: bool) -> Result<String> {
    let rendered = match format {
        OutputFormat::Verdict => verdict.tier.to_string(),
        OutputFormat::Probability => format!("{:.4}", verdict.ai_probability),
        OutputFormat::Json => serde_json::to_string(verdict)?,
        OutputFormat::Human => {
            let mut lines = vec![
                format!(
                    "AI-generated:  {:>7.2}%  {}",
                    verdict.ai_probability * 100.0,
                    bar(verdict.ai_probability)
                ),
                format!(
                    "Human-written: {:>7.2}%  {}",
                    verdict.human_probability * 100.0,
                    bar(verdict.human_probability)
                ),
                String::new(),
                format!("Verdict: {}", verdict.tier.message()),
            ];
            if show_raw {
                lines.push(String::new());
                lines.push("Raw classifier output:".to_owned());
                lines.push(serde_json::to_string_pretty(&verdict.raw_payload)?);
            }
            lines.join("\n")
        }
    };
    Ok(rendered)
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn bar(probability: f64) -> String {
    let filled = (probability.clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{ClassifierOutput, ScoredLabel};

    fn verdict(ai: f64, human: f64) -> VerdictResult {
        VerdictResult::from_output(ClassifierOutput::Flat(vec![
            ScoredLabel::new("Fake", ai),
            ScoredLabel::new("Real", human),
        ]))
    }

    #[test]
    fn test_bar_bounds() {
        assert_eq!(bar(0.0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(bar(1.0), format!("[{}]", "#".repeat(BAR_WIDTH)));
        assert_eq!(bar(0.5).matches('#').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_render_probability() {
        let out = render(&verdict(0.9312, 0.0688), OutputFormat::Probability, false)
            .expect("renders");
        assert_eq!(out, "0.9312");
    }

    #[test]
    fn test_render_verdict() {
        let out = render(&verdict(0.6, 0.4), OutputFormat::Verdict, false).expect("renders");
        assert_eq!(out, "mixed_or_uncertain");
    }

    #[test]
    fn test_render_human_shows_percentages_and_message() {
        let out = render(&verdict(0.25, 0.75), OutputFormat::Human, false).expect("renders");
        assert!(out.contains("25.00%"));
        assert!(out.contains("75.00%"));
        assert!(out.contains("human-written"));
        assert!(!out.contains("Raw classifier output"));
    }

    #[test]
    fn test_render_human_with_raw_payload() {
        let out = render(&verdict(0.95, 0.05), OutputFormat::Human, true).expect("renders");
        assert!(out.contains("Raw classifier output:"));
        assert!(out.contains("\"label\": \"Fake\""));
    }

    #[test]
    fn test_render_json() {
        let out = render(&verdict(0.95, 0.05), OutputFormat::Json, false).expect("renders");
        let json: serde_json::Value = serde_json::from_str(&out).expect("valid json");
        assert_eq!(json["tier"], "strong_ai");
        assert_eq!(json["raw_payload"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn test_cli_parses_format_and_overrides() {
        let cli = Cli::parse_from([
            "is-it-ai",
            "--format",
            "json",
            "--model-dir",
            "/models/detector",
            "hello there",
        ]);
        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.model_dir, Some(PathBuf::from("/models/detector")));
        assert_eq!(cli.text.as_deref(), Some("hello there"));
    }

    #[test]
    fn test_cli_text_and_file_conflict() {
        let parsed = Cli::try_parse_from(["is-it-ai", "--file", "a.txt", "some text"]);
        assert!(parsed.is_err());
    }
}
