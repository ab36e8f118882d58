//! The terminal side of a run: repository calls go to storage, prompts and
//! views go to the terminal.

use std::cell::RefCell;
use std::io::{self, BufRead, Write};

use rehearse::gateway::{Confirmation, Gateway, GatewayError, Lookup, Navigation, Result, View};
use rehearse::model::{Action, Answer, Content, Difficulty, Item, Priority, Session, Stack, Status};
use rehearse::storage::Storage;
use rehearse::summary::SessionSummary;

use super::format::format_summary;

/// A [`Gateway`] backed by [`Storage`] and a line-oriented terminal.
pub(super) struct Console<'a, R, W> {
    storage: &'a Storage,
    input: RefCell<R>,
    output: RefCell<W>,
}

impl<'a> Console<'a, io::StdinLock<'static>, io::Stdout> {
    pub(super) fn stdio(storage: &'a Storage) -> Self {
        Self::new(storage, io::stdin().lock(), io::stdout())
    }
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub(super) fn new(storage: &'a Storage, input: R, output: W) -> Self {
        Self {
            storage,
            input: RefCell::new(input),
            output: RefCell::new(output),
        }
    }

    /// Writes `text` followed by a newline.
    pub(super) fn say(&self, text: &str) -> io::Result<()> {
        let mut out = self.output.borrow_mut();
        writeln!(out, "{text}")?;
        out.flush()
    }

    /// Prints `prompt` and reads one trimmed line. `None` at end of input.
    pub(super) fn ask(&self, prompt: &str) -> io::Result<Option<String>> {
        {
            let mut out = self.output.borrow_mut();
            write!(out, "{prompt}")?;
            out.flush()?;
        }
        let mut line = String::new();
        if self.input.borrow_mut().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    #[cfg(test)]
    pub(super) fn into_output(self) -> W {
        self.output.into_inner()
    }

    fn recall(&self, entity: Option<&Content>, navigation: &Navigation<'_>) -> io::Result<()> {
        let Some(content) = entity else {
            return self.say("Nothing to recall.");
        };
        self.say(&format!("Recall: {}", content.front))?;
        let Some(attempt) = self.ask("Your answer> ")? else {
            return Ok(());
        };
        if content.back.is_empty() {
            return self.say("Nothing to compare against; answer the question below.");
        }
        let comparison = navigation.comparer.compare(&content.back, &attempt);
        self.say(&format!(
            "Match {:.0}%: {}",
            comparison.score * 100.0,
            comparison.confidence.explanation()
        ))
    }

    fn results(&self, session: &Session) -> core::result::Result<(), GatewayError> {
        let items = self.storage.load_items(session.id)?;
        let actions = self.storage.load_actions(session.id)?;
        let summary = SessionSummary::new(session, &items, &actions);
        self.say(&format_summary(&summary))
            .map_err(|e| unavailable(&e))
    }
}

fn unavailable(e: &io::Error) -> GatewayError {
    GatewayError::Unavailable(format!("terminal: {e}"))
}

impl<R: BufRead, W: Write> Gateway for Console<'_, R, W> {
    fn difficulty(&self, lookup: Lookup<'_>) -> Result<Difficulty> {
        Ok(self.storage.difficulty(lookup)?)
    }

    fn priority(&self, lookup: Lookup<'_>) -> Result<Priority> {
        Ok(self.storage.priority(lookup)?)
    }

    fn status(&self, lookup: Lookup<'_>) -> Result<Status> {
        Ok(self.storage.status(lookup)?)
    }

    fn stack(&self, key: &str) -> Result<Stack> {
        Ok(self.storage.load_stack(key)?)
    }

    fn get_by_key(&self, key: &str) -> Result<Content> {
        Ok(self.storage.load_content(key)?)
    }

    fn get_by_keys(&self, keys: &[String]) -> Result<Vec<Content>> {
        Ok(self.storage.load_contents(keys)?)
    }

    fn answers(&self, question: &str) -> Result<Vec<Answer>> {
        Ok(self.storage.load_answers(question)?)
    }

    fn update_content(&self, content: &Content) -> Result<Content> {
        self.storage.update_content(content)?;
        Ok(content.clone())
    }

    fn create_session(&self, session: &Session) -> Result<Session> {
        self.storage.create_session(session)?;
        Ok(session.clone())
    }

    fn update_session(&self, session: &Session) -> Result<Session> {
        self.storage.update_session(session)?;
        Ok(session.clone())
    }

    fn create_item(&self, item: &Item) -> Result<Item> {
        self.storage.create_item(item)?;
        Ok(item.clone())
    }

    fn update_item(&self, item: &Item) -> Result<Item> {
        self.storage.update_item(item)?;
        Ok(item.clone())
    }

    fn create_action(&self, action: &Action) -> Result<Action> {
        self.storage.create_action(action)?;
        Ok(action.clone())
    }

    /// Reads `y`/`yes` or `n`/`no`. Anything else, or end of input, cancels.
    fn confirm(&self, prompt: &str) -> Confirmation {
        match self.ask(&format!("{prompt} [y/n] ")) {
            Ok(Some(answer)) => match answer.to_lowercase().as_str() {
                "y" | "yes" => Confirmation::Yes,
                "n" | "no" => Confirmation::No,
                _ => Confirmation::Cancel,
            },
            Ok(None) | Err(_) => Confirmation::Cancel,
        }
    }

    fn navigate(&self, navigation: Navigation<'_>) -> Result<()> {
        match navigation.view {
            View::Recall => self
                .recall(navigation.entity, &navigation)
                .map_err(|e| unavailable(&e)),
            View::Results => self.results(navigation.session),
        }
    }
}
