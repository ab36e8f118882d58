//! CLI interface for rehearse.
//!
//! - `rehearse import <file>` loads stacks and content from a TOML file.
//! - `rehearse stacks` lists what can be studied.
//! - `rehearse run --stack <key>…` starts an interactive study run.
//! - `rehearse sessions list|show` reviews past runs.
//!
//! Study output goes to stdout; logs go to stderr.

mod console;
mod format;
mod import;
mod sessions;
mod stacks;
mod study;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use rehearse::config::Config;
use rehearse::model::Mode;
use rehearse::storage::Storage;

/// Rehearse: study what you want to keep.
#[derive(Debug, Parser)]
#[command(name = "rehearse", after_long_help = STUDY_HELP)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

const STUDY_HELP: &str = r"Keys during a run:
  n  next        p  previous     f  flip
  1  easy        2  medium       3  hard
  i  progress    q  quit (the session stays open)

Example:
  rehearse import rust.toml
  rehearse run --stack RUST --difficulty hard --mode recall";

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import stacks, flashcards, notes, and questions from a TOML file.
    ///
    /// Re-importing updates text, difficulty, and priority but keeps the
    /// schedule of content already studied.
    Import {
        /// The file to import.
        file: PathBuf,
    },

    /// List stacks with their content and sub-stacks.
    Stacks,

    /// Start an interactive study run.
    Run(RunArgs),

    /// Review past sessions.
    Sessions {
        #[command(subcommand)]
        command: SessionsCommand,
    },
}

#[derive(Debug, clap::Args)]
pub struct RunArgs {
    /// Stack to study. Sub-stacks are included. Can be given multiple times.
    #[arg(long = "stack", required = true)]
    stacks: Vec<String>,

    /// Only study content of this difficulty (e.g. `hard`). Repeatable.
    #[arg(long)]
    difficulty: Vec<String>,

    /// Only study content of this priority (e.g. `highest`). Repeatable.
    #[arg(long)]
    priority: Vec<String>,

    /// How content is presented. Defaults to `default-mode` from the config.
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Shuffle the content before presenting it.
    #[arg(long)]
    shuffle: bool,

    /// Don't bring content rated medium or hard back during the run.
    #[arg(long)]
    no_spaced_review: bool,
}

#[derive(Debug, Subcommand)]
pub enum SessionsCommand {
    /// List sessions, oldest first.
    List,

    /// Show the summary of one session.
    Show {
        /// Session ID: full UUID or unambiguous prefix (e.g. `a3b`).
        session: String,
    },
}

/// CLI-facing mode, mapped to the domain `Mode`.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// Show content as is.
    Default,
    /// Ask for a recall attempt before every reveal.
    Recall,
    /// Ask for a recall attempt on a coin flip.
    RecallAtRandom,
    /// Not yet supported; presented as default.
    SpeedTest,
    /// Not yet supported; presented as default.
    SpacedRepetition,
}

impl ModeArg {
    fn to_domain(self) -> Mode {
        match self {
            Self::Default => Mode::Default,
            Self::Recall => Mode::Recall,
            Self::RecallAtRandom => Mode::RecallAtRandom,
            Self::SpeedTest => Mode::SpeedTest,
            Self::SpacedRepetition => Mode::SpacedRepetition,
        }
    }
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config, storage: &Storage) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Import { file } => import::cmd_import(storage, &file),
        Command::Stacks => stacks::cmd_list(storage),
        Command::Run(args) => study::cmd_run(config, storage, &args),
        Command::Sessions { command } => match command {
            SessionsCommand::List => sessions::cmd_list(storage),
            SessionsCommand::Show { session } => sessions::cmd_show(storage, &session),
        },
    }
}
