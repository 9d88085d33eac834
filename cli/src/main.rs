//! `minutes`: turn a meeting transcript into formatted minutes.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use tokio::io::AsyncReadExt;
use tokio::sync::broadcast;
use tracing::{debug, error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter};

use minutes::config::{load_or_default, LlmProvider};
use minutes::model::Metadata;
use minutes::pipeline::{BroadcastProgress, RunProgressEvent};
use minutes::render::{export_as_text, MinutesStatistics};
use minutes::{samples, MinutesGenerator, OverallStatus, PipelineState};

#[derive(Parser, Debug)]
#[command(name = "minutes")]
#[command(about = "Generate meeting minutes from a transcript")]
#[command(version)]
struct Args {
    /// Transcript file. Reads stdin when omitted or "-".
    input: Option<PathBuf>,

    /// Run a built-in sample transcript instead of reading input
    #[arg(long, conflicts_with = "input")]
    sample: Option<String>,

    /// List the built-in samples and exit
    #[arg(long)]
    list_samples: bool,

    /// Config file (JSON or YAML)
    #[arg(short, long, env = "MINUTES_CONFIG")]
    config: Option<PathBuf>,

    /// Skip the LLM and use heuristics for every stage
    #[arg(long)]
    offline: bool,

    /// Meeting metadata, e.g. --meta date=2024-05-01 --meta attendees="Ann, Bo"
    #[arg(long = "meta", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    meta: Vec<(String, String)>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Markdown)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print stage progress to stderr
    #[arg(long)]
    progress: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Markdown,
    Text,
    Json,
    Stats,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.trim().to_string()))
}

fn init_logging(verbose: u8) -> Result<()> {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr));
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to install tracing subscriber")?;
    tracing_log::LogTracer::init().context("Failed to bridge log records")?;
    Ok(())
}

async fn read_input(path: Option<&Path>) -> Result<(String, &'static str)> {
    match path {
        Some(p) if p != Path::new("-") => {
            let text = tokio::fs::read_to_string(p)
                .await
                .with_context(|| format!("Failed to read transcript {}", p.display()))?;
            Ok((text, "file"))
        }
        _ => {
            let mut text = String::new();
            tokio::io::stdin()
                .read_to_string(&mut text)
                .await
                .context("Failed to read transcript from stdin")?;
            Ok((text, "stdin"))
        }
    }
}

fn render_output(state: &PipelineState, format: OutputFormat) -> Result<String> {
    let minutes = state.formatted_minutes().unwrap_or_default();
    Ok(match format {
        OutputFormat::Markdown => minutes.to_string(),
        OutputFormat::Text => export_as_text(minutes),
        OutputFormat::Json => serde_json::to_string_pretty(state)?,
        OutputFormat::Stats => serde_json::to_string_pretty(&serde_json::json!({
            "statistics": MinutesStatistics::from_state(state),
            "processing": state.processing_summary(),
        }))?,
    })
}

async fn run_generator(
    generator: &MinutesGenerator,
    transcript: &str,
    metadata: Metadata,
    input_method: &str,
    show_progress: bool,
) -> PipelineState {
    if !show_progress {
        return generator.run(transcript, metadata, input_method).await;
    }

    let (tx, mut rx) = broadcast::channel::<RunProgressEvent>(32);
    let printer = tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            eprintln!("[{:>3}%] {}", event.progress, event.message);
            if let Some(err) = event.error {
                eprintln!("       {}", err);
            }
        }
    });

    let reporter = BroadcastProgress::new(Arc::new(tx));
    let state = generator
        .run_with_progress(transcript, metadata, input_method, &reporter)
        .await;

    // Dropping the last sender ends the printer loop.
    drop(reporter);
    if let Err(e) = printer.await {
        debug!("Progress printer stopped: {}", e);
    }
    state
}

async fn run(args: Args) -> Result<ExitCode> {
    if args.list_samples {
        for sample in samples::SAMPLES {
            println!("{:<18} {}", sample.key, sample.title);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut config =
        load_or_default(args.config.as_deref()).context("Failed to load configuration")?;
    if args.offline {
        config.llm.provider = LlmProvider::Offline;
    }
    let generator =
        MinutesGenerator::from_config(&config).context("Failed to set up the LLM gateway")?;

    let (transcript, mut metadata, input_method) = match &args.sample {
        Some(key) => {
            let sample = samples::get(key).with_context(|| {
                format!(
                    "Unknown sample '{}' (available: {})",
                    key,
                    samples::keys().join(", ")
                )
            })?;
            (sample.transcript.to_string(), sample.metadata(), "sample")
        }
        None => {
            if args.input.is_none() && std::io::IsTerminal::is_terminal(&std::io::stdin()) {
                bail!("No transcript given: pass a file, pipe text on stdin, or use --sample");
            }
            let (text, method) = read_input(args.input.as_deref()).await?;
            (text, Metadata::new(), method)
        }
    };
    metadata.extend(args.meta.iter().cloned());

    let state = run_generator(&generator, &transcript, metadata, input_method, args.progress).await;
    let rendered = render_output(&state, args.format)?;

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, rendered.as_bytes())
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Minutes written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    let summary = state.processing_summary();
    info!(
        run_id = %state.run_id,
        status = %summary.status,
        progress = summary.progress,
        warnings = summary.warning_count,
        total_secs = summary.total_time,
        "Run finished"
    );

    if state.status == OverallStatus::Error {
        for err in &state.errors {
            error!(origin = %err.origin, kind = %err.kind, "{}", err.message);
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("Error: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
