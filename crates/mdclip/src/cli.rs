//! Command line interface wiring the copy flow together.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use serde::Serialize;

use crate::app::copy::Copier;
use crate::app::document;
use crate::app::notify::ConsoleNotifier;
use crate::app::selection::{EngineAvailability, EngineMode, SelectionService};
use crate::domain::model::SelectionState;
use crate::infra::clipboard::{Clipboard, StdoutClipboard, SystemClipboard};
use crate::infra::config::Config;
use crate::infra::platform::{self, EnvSnapshot};

#[derive(Parser, Debug)]
#[command(
    name = "mdclip",
    version,
    about = "Copy a section of a Markdown document to the system clipboard"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Copy the rendered text of one section to the clipboard
    Copy {
        /// Markdown document to read
        file: PathBuf,
        /// Section id: an explicit `{#id}` attribute or the heading slug
        id: String,
        /// Selection engine override
        #[arg(long, value_enum)]
        engine: Option<EngineMode>,
        /// Write the payload to stdout instead of the clipboard
        #[arg(long)]
        stdout: bool,
        /// Suppress the degraded-terminal warning
        #[arg(long)]
        no_warn: bool,
        /// Print a JSON report of the attempt
        #[arg(long)]
        json: bool,
    },
    /// List the addressable section ids of a document
    List {
        /// Markdown document to read
        file: PathBuf,
        /// Print the listing as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

pub fn run(cli: Cli) -> Result<ExitCode> {
    match cli.command {
        Commands::Copy {
            file,
            id,
            engine,
            stdout,
            no_warn,
            json,
        } => {
            let config = Config::load()?;
            run_copy(&config, &file, &id, engine, stdout, no_warn, json)
        }
        Commands::List { file, json } => run_list(&file, json),
        Commands::Completions { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "mdclip", &mut io::stdout());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn run_copy(
    config: &Config,
    file: &Path,
    id: &str,
    engine: Option<EngineMode>,
    to_stdout: bool,
    no_warn: bool,
    json: bool,
) -> Result<ExitCode> {
    let doc = document::load(file)?;

    let snapshot = EnvSnapshot::capture();
    let degraded = platform::is_degraded(&snapshot);

    let mode =
        engine.unwrap_or_else(|| config.defaults.engine.parse().unwrap_or(EngineMode::Auto));
    let availability = EngineAvailability {
        modern: config.selection.modern(),
        legacy: config.selection.legacy(),
    };
    let selection = SelectionService::from_parts(mode, availability, degraded).ok();
    tracing::debug!(
        mode = mode.as_str(),
        degraded,
        available = selection.is_some(),
        "selection service constructed"
    );

    let mut clipboard: Box<dyn Clipboard> = if to_stdout {
        Box::new(StdoutClipboard)
    } else {
        Box::new(SystemClipboard::new(config.clipboard.allow_fallback()))
    };
    let mut notifier = ConsoleNotifier;

    let mut state = SelectionState::new();
    let warn = config.notifications.warn_on_degraded() && !no_warn;
    let mut copier = Copier::new(
        selection.as_ref(),
        clipboard.as_mut(),
        &mut notifier,
        degraded,
        warn,
    );
    let report = copier.copy_section(&doc, id, &mut state);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize copy report")?
        );
    }

    if report.outcome.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[derive(Serialize)]
struct SectionListing<'a> {
    id: &'a str,
    heading: &'a str,
    level: u8,
    characters: usize,
}

fn run_list(file: &Path, json: bool) -> Result<ExitCode> {
    let doc = document::load(file)?;

    if json {
        let listing: Vec<SectionListing<'_>> = doc
            .sections()
            .iter()
            .map(|section| SectionListing {
                id: &section.id,
                heading: &section.heading,
                level: section.level,
                characters: section.text.chars().count(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&listing).context("failed to serialize listing")?
        );
    } else {
        for section in doc.sections() {
            println!("{}\t{}", section.id, section.heading);
        }
    }

    Ok(ExitCode::SUCCESS)
}
