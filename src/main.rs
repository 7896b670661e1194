//! tutor-viz CLI: offline inspection of diagram classification, building,
//! validation and evolution. Every command prints JSON to stdout.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use tutor_viz::analysis::{QuestionAnalysis, Subject};
use tutor_viz::classify::{self, DiagramKind};
use tutor_viz::config::TutorConfig;
use tutor_viz::diagram::DiagramState;
use tutor_viz::division;
use tutor_viz::evolution;
use tutor_viz::pipeline::DiagramEngine;
use tutor_viz::validate;

#[derive(Parser)]
#[command(name = "tutor-viz", version, about = "Step-revealed teaching diagrams")]
struct Cli {
    /// TOML config file. Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect the diagram kind for a question.
    Classify {
        /// Problem text.
        text: String,

        #[arg(long, default_value = "")]
        topic: String,

        /// math, science, history, language or other.
        #[arg(long, default_value = "other")]
        subject: String,
    },

    /// Build the diagram for a question.
    Build {
        /// Problem text.
        text: String,

        /// Skip classification and build this kind (e.g. `long_division`).
        #[arg(long)]
        kind: Option<String>,

        #[arg(long, default_value = "")]
        topic: String,

        #[arg(long, default_value = "other")]
        subject: String,
    },

    /// Print the long-division trace for two integers.
    Divide { dividend: u64, divisor: u64 },

    /// Validate a diagram JSON document and print the repaired state.
    Validate {
        /// JSON file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Category the diagram is expected to have.
        #[arg(long)]
        kind: Option<String>,
    },

    /// Advance a diagram JSON document by one step.
    Advance {
        #[arg(long)]
        file: Option<PathBuf>,

        /// Conversation turn to stamp on the result.
        #[arg(long, default_value = "1")]
        turn: u32,
    },

    /// Recover a long-division diagram from a message that draws one in ASCII.
    Rescue {
        /// Message text file; reads stdin when omitted.
        #[arg(long)]
        file: Option<PathBuf>,

        #[arg(long)]
        turn: Option<u32>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TutorConfig::load(path)?,
        None => TutorConfig::default(),
    };
    let engine = DiagramEngine::new(config);

    match cli.command {
        Commands::Classify {
            text,
            topic,
            subject,
        } => {
            let kind = classify::classify(&text, &topic, parse_subject(&subject));
            print_json(&serde_json::json!({
                "kind": kind,
                "domain": kind.map(DiagramKind::domain),
            }))?;
        }

        Commands::Build {
            text,
            kind,
            topic,
            subject,
        } => {
            let diagram = match kind {
                Some(name) => engine.generate_kind(parse_kind(&name)?, &text),
                None => engine.generate(&QuestionAnalysis::new(
                    text,
                    topic,
                    parse_subject(&subject),
                )),
            };
            print_json(&diagram)?;
        }

        Commands::Divide { dividend, divisor } => {
            let trace = division::simulate(dividend, divisor)?;
            print_json(&trace)?;
        }

        Commands::Validate { file, kind } => {
            let category = kind.as_deref().map(parse_kind).transpose()?;
            let json = read_input(file.as_deref())?;
            let diagram = validate::validate_json(&json, category)?;
            print_json(&diagram)?;
        }

        Commands::Advance { file, turn } => {
            let json = read_input(file.as_deref())?;
            let Some(previous) = validate::validate_json(&json, None)? else {
                miette::bail!("the input diagram did not pass validation");
            };
            let next: Option<DiagramState> = evolution::continue_diagram(&previous, turn);
            print_json(&serde_json::json!({
                "continuation": evolution::continuation(&previous),
                "diagram": next,
            }))?;
        }

        Commands::Rescue { file, turn } => {
            let message = read_input(file.as_deref())?;
            let rescue = if engine.config().evolution.rescue_enabled {
                evolution::rescue_from_message(&message, turn)
            } else {
                None
            };
            print_json(&rescue)?;
        }
    }

    Ok(())
}

fn parse_subject(name: &str) -> Subject {
    name.parse().unwrap_or_default()
}

fn parse_kind(name: &str) -> Result<DiagramKind> {
    DiagramKind::from_wire(name).ok_or_else(|| {
        let known: Vec<&str> = DiagramKind::ALL.iter().map(|k| k.as_str()).collect();
        miette::miette!(
            help = format!("Known kinds: {}", known.join(", ")),
            "unknown diagram kind `{name}`"
        )
    })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path).into_diagnostic(),
        None => std::io::read_to_string(std::io::stdin()).into_diagnostic(),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}
