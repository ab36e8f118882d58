//! The interactive study loop.

use std::io::{BufRead, Write};

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::debug;

use rehearse::clock::SystemClock;
use rehearse::config::Config;
use rehearse::filter::Selection;
use rehearse::gateway::Lookup;
use rehearse::model::{DifficultyLevel, Presented};
use rehearse::runner::{RunPlan, RunState, Runner};
use rehearse::storage::Storage;

use super::console::Console;
use super::format::{format_presented, format_progress, format_reveal, short_id};
use super::{ModeArg, RunArgs};

pub(super) fn cmd_run(config: &Config, storage: &Storage, args: &RunArgs) -> Result<(), String> {
    let plan = RunPlan {
        selection: selection(storage, config, args)?,
        mode: args.mode.map_or(config.default_mode, ModeArg::to_domain),
        spaced_review: config.spaced_review && !args.no_spaced_review,
    };
    let pacing = config.pacing()?;

    let console = Console::stdio(storage);
    let clock = SystemClock;
    let mut runner = Runner::new(
        &console,
        &clock,
        Box::new(StdRng::from_entropy()),
        pacing,
        &plan,
    );

    study(&console, &mut runner)?;

    let open = runner.is_running();
    if let Some(session) = runner.finish()
        && open
    {
        console
            .say(&format!("Session {} left open.", short_id(&session)))
            .map_err(|e| format!("failed to write to terminal: {e}"))?;
    }
    Ok(())
}

/// Resolves stack keys and weight names from the command line.
fn selection(storage: &Storage, config: &Config, args: &RunArgs) -> Result<Selection, String> {
    let stacks = args
        .stacks
        .iter()
        .map(|key| {
            storage
                .load_stack(key)
                .map_err(|e| format!("stack {key}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let difficulties = args
        .difficulty
        .iter()
        .map(|name| {
            storage
                .difficulty(Lookup::Name(name))
                .map_err(|e| format!("difficulty {name:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let priorities = args
        .priority
        .iter()
        .map(|name| {
            storage
                .priority(Lookup::Name(name))
                .map_err(|e| format!("priority {name:?}: {e}"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Selection {
        stacks,
        difficulties,
        priorities,
        shuffle: args.shuffle || config.shuffle,
    })
}

/// Reads keys until the user quits, input ends, or the run ends.
fn study<R: BufRead, W: Write>(
    console: &Console<'_, R, W>,
    runner: &mut Runner<'_, Console<'_, R, W>>,
) -> Result<(), String> {
    let io = |e: std::io::Error| format!("terminal: {e}");
    let mut shown: Option<Presented> = None;

    console
        .say(&format!(
            "{} item(s) selected. n: next, q: quit.",
            runner.progress().limit
        ))
        .map_err(io)?;

    while runner.state() != RunState::Ended {
        let Some(key) = console.ask("> ").map_err(io)? else {
            break;
        };
        debug!(key = %key, "study command");

        match key.as_str() {
            "n" | "p" => {
                let next = if key == "n" {
                    runner.load_next()
                } else {
                    runner.load_previous()
                };
                match next.map_err(|e| e.to_string())? {
                    Some(presented) => {
                        console.say(&format_presented(&presented)).map_err(io)?;
                        shown = Some(presented);
                    }
                    None if runner.state() == RunState::Ended => {}
                    None => console.say("Nothing to show.").map_err(io)?,
                }
            }
            "f" => match &shown {
                Some(presented) => {
                    console.say(&format_reveal(presented)).map_err(io)?;
                    runner.on_flashcard_flipped(presented.content());
                }
                None => console.say("Nothing to flip yet.").map_err(io)?,
            },
            "1" | "2" | "3" => {
                let level = match key.as_str() {
                    "1" => DifficultyLevel::Easy,
                    "2" => DifficultyLevel::Medium,
                    _ => DifficultyLevel::Hard,
                };
                if runner.current().is_none() {
                    console.say("Nothing to rate yet.").map_err(io)?;
                    continue;
                }
                runner
                    .on_difficulty_feedback(level)
                    .map_err(|e| e.to_string())?;
                console.say(&format!("Rated {}.", level.name())).map_err(io)?;
            }
            "i" => console
                .say(&format_progress(runner.progress(), runner.queue().len()))
                .map_err(io)?,
            "q" => break,
            "" => {}
            other => console
                .say(&format!("Unknown key {other:?}. See `rehearse --help`."))
                .map_err(io)?,
        }
    }
    Ok(())
}
