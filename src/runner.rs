//! Driving a study run: what the learner sees next.
//!
//! A [`Runner`] is built once per run. Construction resolves the content to
//! study and opens a session. From then on the embedding UI calls the
//! handlers below, one at a time, in response to the learner:
//!
//! - [`Runner::load_next`] / [`Runner::load_previous`] navigate,
//! - [`Runner::progress`] reports position and limit,
//! - [`Runner::on_flashcard_flipped`] and [`Runner::on_difficulty_feedback`]
//!   record what the learner did.
//!
//! Moving forward first offers any intrasession review that has come due;
//! otherwise it advances through the filtered content. Running off the end
//! asks the learner to confirm before the session is closed.
//!
//! Lookup and persistence failures are logged and observed as "nothing
//! happened". Only a corrupted scheduling precondition is returned as an
//! error.

use jiff::Timestamp;
use rand::{Rng, RngCore};
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::filter::{self, Selection};
use crate::gateway::{Confirmation, Gateway, Lookup, Navigation, View};
use crate::interval::{self, IntervalError, Unit};
use crate::model::{
    ActionType, Content, DifficultyLevel, Filters, Mode, Presented, Session, Settings, Status,
};
use crate::recall::RecallComparer;
use crate::recorder::Recorder;
use crate::review::{Pacing, ReviewQueue};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("cannot schedule content: {0}")]
    Interval(#[from] IntervalError),
}

/// Logs a scheduling failure that must not be ignored and converts it.
fn fatal(e: IntervalError) -> RunnerError {
    error!(error = %e, "scheduling precondition violated");
    RunnerError::Interval(e)
}

/// What to study and how.
#[derive(Debug, Clone, Default)]
pub struct RunPlan {
    pub selection: Selection,
    pub mode: Mode,

    /// Bring content rated medium or hard back later in the same run.
    pub spaced_review: bool,
}

/// Where a run stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing has been shown yet.
    BeforeStart,
    Running,
    /// The session was closed at the end of the run.
    Ended,
}

/// Position in the filtered content and its length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// `None` before the first content is shown.
    pub index: Option<usize>,
    pub limit: usize,
}

/// Drives one study run.
pub struct Runner<'g, G: Gateway + ?Sized> {
    gateway: &'g G,
    clock: &'g dyn Clock,
    rng: Box<dyn RngCore>,
    pacing: Pacing,
    mode: Mode,
    settings: Settings,
    contents: Vec<String>,
    content_index: Option<usize>,
    current: Option<Content>,
    queue: ReviewQueue,
    recorder: Option<Recorder>,
    comparer: RecallComparer,
    ended: bool,
}

impl<'g, G: Gateway + ?Sized> Runner<'g, G> {
    /// Resolves the content for `plan` and opens a session for the run.
    ///
    /// If the session cannot be created the run still navigates, but
    /// nothing is recorded.
    pub fn new(
        gateway: &'g G,
        clock: &'g dyn Clock,
        mut rng: Box<dyn RngCore>,
        pacing: Pacing,
        plan: &RunPlan,
    ) -> Self {
        let contents = filter::resolve(gateway, &plan.selection, rng.as_mut());
        let settings = Settings {
            enable_randomisation: plan.selection.shuffle,
            enable_spaced_review: plan.spaced_review,
        };
        let recorder = begin_session(gateway, clock.now(), plan, &contents, settings);

        info!(
            contents = contents.len(),
            mode = plan.mode.as_str(),
            spaced_review = plan.spaced_review,
            "study run ready"
        );

        Self {
            gateway,
            clock,
            rng,
            pacing,
            mode: plan.mode,
            settings,
            contents,
            content_index: None,
            current: None,
            queue: ReviewQueue::new(),
            recorder,
            comparer: RecallComparer,
            ended: false,
        }
    }

    // ── Navigation ──

    /// Presents the next content.
    ///
    /// A due intrasession review wins over advancing. Returns `Ok(None)` when
    /// nothing could be shown, including at the end of the run.
    pub fn load_next(&mut self) -> Result<Option<Presented>, RunnerError> {
        if self.ended {
            warn!("run has ended, nothing more to load");
            return Ok(None);
        }
        let now = self.clock.now();

        if self.settings.enable_spaced_review
            && let Some(key) = self.current.as_ref().map(|c| c.key.clone())
        {
            self.queue
                .schedule(self.gateway, &self.pacing, now, &key)
                .map_err(fatal)?;

            if let Some(entry) = self.queue.pop_ready(now) {
                debug!(key = %entry.key, due_at = %entry.due_at, "presenting intrasession review");
                let presented = self.show(&entry.key, now)?;
                if presented.is_none() {
                    self.queue.restore(entry);
                }
                return Ok(presented);
            }
        }

        let next = self.content_index.map_or(0, |i| i + 1);
        let Some(key) = self.contents.get(next).cloned() else {
            warn!(
                index = next,
                limit = self.contents.len(),
                "content index out of bounds, clamping to the last content"
            );
            self.content_index = self.contents.len().checked_sub(1);
            self.end_of_run();
            return Ok(None);
        };

        let presented = self.show(&key, now)?;
        if presented.is_some() {
            self.content_index = Some(next);
        }
        Ok(presented)
    }

    /// Presents the previous content. Never consults the review queue.
    ///
    /// Returns `Ok(None)` at the first content; the index stays in bounds.
    pub fn load_previous(&mut self) -> Result<Option<Presented>, RunnerError> {
        let now = self.clock.now();
        let Some(previous) = self.content_index.and_then(|i| i.checked_sub(1)) else {
            warn!(index = ?self.content_index, "already at the first content");
            return Ok(None);
        };
        let Some(key) = self.contents.get(previous).cloned() else {
            warn!(
                index = previous,
                limit = self.contents.len(),
                "content index out of bounds"
            );
            return Ok(None);
        };

        let content = match self.gateway.get_by_key(&key) {
            Ok(c) => c,
            Err(e) => {
                warn!(%key, error = %e, "failed to load previous content");
                return Ok(None);
            }
        };
        if !self.open_item(&key, now) {
            return Ok(None);
        }
        self.content_index = Some(previous);
        self.current = Some(content.clone());
        Ok(Some(self.present(content)))
    }

    /// Current position and the number of contents in the run.
    pub fn progress(&self) -> Progress {
        Progress {
            index: self.content_index,
            limit: self.contents.len(),
        }
    }

    // ── Feedback ──

    /// Records that the learner flipped `flashcard`.
    pub fn on_flashcard_flipped(&mut self, flashcard: &Content) {
        let now = self.clock.now();
        let Some(recorder) = self.recorder.as_mut() else {
            warn!(key = %flashcard.key, "no session is being recorded, flip dropped");
            return;
        };
        if let Err(e) = recorder.record_action(
            self.gateway,
            now,
            ActionType::FlashcardFlipped,
            &flashcard.key,
            |_| {},
        ) {
            warn!(key = %flashcard.key, error = %e, "failed to record flip");
        }
    }

    /// Applies the learner's difficulty rating to the current content.
    ///
    /// The new difficulty is persisted and recorded, the long-term due date
    /// is recomputed, and content rated medium or hard is queued for another
    /// look when spaced review is on.
    pub fn on_difficulty_feedback(&mut self, level: DifficultyLevel) -> Result<(), RunnerError> {
        let now = self.clock.now();
        let Some(key) = self.current.as_ref().map(|c| c.key.clone()) else {
            warn!(
                level = level.name(),
                "difficulty rated with nothing on screen"
            );
            return Ok(());
        };

        let difficulty = match self.gateway.difficulty(Lookup::Name(level.name())) {
            Ok(d) => d,
            Err(e) => {
                warn!(%key, level = level.name(), error = %e, "difficulty lookup failed");
                return Ok(());
            }
        };
        let mut content = match self.gateway.get_by_key(&key) {
            Ok(c) => c,
            Err(e) => {
                warn!(%key, error = %e, "failed to load rated content");
                return Ok(());
            }
        };

        let before = content.difficulty;
        content.difficulty = difficulty.id;
        content = match self.gateway.update_content(&content) {
            Ok(c) => c,
            Err(e) => {
                warn!(%key, error = %e, "failed to persist difficulty");
                return Ok(());
            }
        };

        if let Some(recorder) = self.recorder.as_mut()
            && let Err(e) = recorder.record_action(
                self.gateway,
                now,
                ActionType::DifficultyChanged,
                &key,
                |meta| {
                    meta.before = Some(json!({ "difficulty": before }));
                    meta.after = Some(json!({
                        "difficulty": difficulty.id,
                        "name": difficulty.name,
                    }));
                },
            )
        {
            warn!(%key, error = %e, "failed to record difficulty change");
        }

        self.refresh_due_date(&mut content, now)?;
        self.current = Some(content);

        if level.wants_review() && self.settings.enable_spaced_review {
            self.queue
                .schedule(self.gateway, &self.pacing, now, &key)
                .map_err(fatal)?;
        }
        Ok(())
    }

    // ── State ──

    pub fn state(&self) -> RunState {
        if self.ended {
            RunState::Ended
        } else if self.content_index.is_none() {
            RunState::BeforeStart
        } else {
            RunState::Running
        }
    }

    /// Whether the session is still open, according to its status.
    pub fn is_running(&self) -> bool {
        let Some(recorder) = &self.recorder else {
            return false;
        };
        match self.gateway.status(Lookup::Name(Status::COMPLETED)) {
            Ok(completed) => recorder.session().status != completed.id,
            Err(e) => {
                warn!(error = %e, "failed to look up completed status");
                false
            }
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.recorder.as_ref().map(Recorder::session)
    }

    /// The content last handed to the UI.
    pub fn current(&self) -> Option<&Content> {
        self.current.as_ref()
    }

    /// Reviews still waiting in this run.
    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    /// Ends the runner, closing any open item.
    ///
    /// The session itself is left as it is: only the end-of-run prompt
    /// closes it.
    pub fn finish(mut self) -> Option<Session> {
        let now = self.clock.now();
        let mut recorder = self.recorder.take()?;
        if let Err(e) = recorder.close(self.gateway, now) {
            warn!(error = %e, "failed to close the open item");
        }
        Some(recorder.session().clone())
    }

    // ── Internals ──

    /// Loads `key`, reschedules it, opens an item for it, and presents it.
    fn show(&mut self, key: &str, now: Timestamp) -> Result<Option<Presented>, RunnerError> {
        let mut content = match self.gateway.get_by_key(key) {
            Ok(c) => c,
            Err(e) => {
                warn!(key, error = %e, "failed to load content");
                return Ok(None);
            }
        };

        self.refresh_due_date(&mut content, now)?;
        if !self.open_item(key, now) {
            return Ok(None);
        }
        self.current = Some(content.clone());
        self.handle_mode();

        content.last_viewed_at = Some(now);
        match self.gateway.update_content(&content) {
            Ok(updated) => content = updated,
            Err(e) => warn!(key, error = %e, "failed to stamp last viewed time"),
        }
        self.current = Some(content.clone());
        Ok(Some(self.present(content)))
    }

    /// Attaches the answer set when `content` is a question.
    fn present(&self, content: Content) -> Presented {
        if !content.is_question() {
            return Presented::Content(content);
        }
        let answers = self.gateway.answers(&content.key).unwrap_or_else(|e| {
            warn!(key = %content.key, error = %e, "failed to load answers");
            Vec::new()
        });
        Presented::Question {
            question: content,
            answers,
        }
    }

    /// Recomputes and persists the long-term interval and due date.
    fn refresh_due_date(&self, content: &mut Content, now: Timestamp) -> Result<(), RunnerError> {
        let Some(days) =
            interval::resolve(self.gateway, &self.pacing.intervals, content, Unit::Days)
                .map_err(fatal)?
        else {
            return Ok(());
        };
        let mut updated = content.clone();
        updated.interval = Some(days);
        updated.due_by = Some(interval::after(now, days, Unit::Days).map_err(fatal)?);

        match self.gateway.update_content(&updated) {
            Ok(c) => *content = c,
            Err(e) => warn!(key = %content.key, error = %e, "failed to persist due date"),
        }
        Ok(())
    }

    /// Opens an item for `key`. `false` means navigation must not proceed.
    fn open_item(&mut self, key: &str, now: Timestamp) -> bool {
        let Some(recorder) = self.recorder.as_mut() else {
            warn!(key, "no session is being recorded, item not opened");
            return true;
        };
        match recorder.open(self.gateway, key, now) {
            Ok(_) => true,
            Err(e) => {
                warn!(key, error = %e, "failed to open item");
                false
            }
        }
    }

    fn handle_mode(&mut self) {
        match self.mode {
            Mode::Default => {}
            Mode::Recall => self.hand_off(View::Recall),
            Mode::RecallAtRandom => {
                if self.rng.gen_bool(0.5) {
                    self.hand_off(View::Recall);
                } else {
                    debug!("coin flip says no recall this time");
                }
            }
            other => warn!(
                mode = other.as_str(),
                "unsupported mode, presenting as default"
            ),
        }
    }

    fn hand_off(&self, view: View) {
        let Some(recorder) = &self.recorder else {
            warn!(?view, "no session to hand off");
            return;
        };
        let navigation = Navigation {
            view,
            session: recorder.session(),
            entity: self.current.as_ref(),
            comparer: &self.comparer,
        };
        if let Err(e) = self.gateway.navigate(navigation) {
            warn!(?view, error = %e, "navigation failed");
        }
    }

    /// Asks the learner to end the run and closes the session if they agree.
    ///
    /// The prompt is shown in every mode, `Mode::Default` included, so a
    /// plain run can close its session too. Declining leaves the session
    /// open; the learner can go back or run off the end again to be asked
    /// once more.
    fn end_of_run(&mut self) {
        let now = self.clock.now();
        let Some(recorder) = self.recorder.as_mut() else {
            warn!("end of run reached with no session to close");
            self.ended = true;
            return;
        };
        if recorder.session().is_closed() {
            self.ended = true;
            return;
        }

        let prompt = format!(
            "You have reached the end of this run ({} item(s)). End the session now?",
            self.contents.len()
        );
        let answer = self.gateway.confirm(&prompt);
        if answer != Confirmation::Yes {
            info!(?answer, "end of run declined, session stays open");
            return;
        }

        let completed = match self.gateway.status(Lookup::Name(Status::COMPLETED)) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "failed to look up completed status");
                return;
            }
        };
        if let Err(e) = recorder.close_session(self.gateway, now, &completed) {
            warn!(error = %e, "failed to close session");
            return;
        }

        self.ended = true;
        info!(session = %recorder.session().id, "session completed");
        self.hand_off(View::Results);
    }
}

/// Creates the session record for a run, or logs why it could not.
fn begin_session<G: Gateway + ?Sized>(
    gateway: &G,
    now: Timestamp,
    plan: &RunPlan,
    contents: &[String],
    settings: Settings,
) -> Option<Recorder> {
    let status = match gateway.status(Lookup::Name(Status::NEW)) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to create session: status lookup failed");
            return None;
        }
    };
    let draft = Session {
        id: Uuid::new_v4(),
        contents: contents.to_vec(),
        filters: Filters {
            difficulty: plan.selection.difficulty_ids(),
            priority: plan.selection.priority_ids(),
        },
        mode: plan.mode,
        settings,
        stacks: plan.selection.stack_keys(),
        start: now,
        end: None,
        duration: None,
        status: status.id,
        children: Vec::new(),
    };
    match Recorder::begin(gateway, &draft) {
        Ok(recorder) => Some(recorder),
        Err(e) => {
            warn!(error = %e, "failed to create session");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use jiff::{civil, tz::TimeZone};
    use rand::rngs::mock::StepRng;

    use crate::clock::manual::ManualClock;
    use crate::gateway::memory::{HARD, LOWEST, MEDIUM, MemoryGateway, flashcard};
    use crate::interval::Intervals;
    use crate::model::{Answer, ContentKind};
    use crate::review::Cutoff;

    /// 2024-01-01T09:00:00Z.
    const MORNING: i64 = 1_704_099_600;

    fn pacing() -> Pacing {
        Pacing {
            intervals: Intervals::default(),
            cutoff: Cutoff {
                time: civil::time(23, 59, 59, 0),
                time_zone: TimeZone::UTC,
            },
        }
    }

    fn plan(gateway: &MemoryGateway, mode: Mode, spaced_review: bool) -> RunPlan {
        RunPlan {
            selection: Selection {
                stacks: gateway.stack_list(&["STACK_1"]),
                ..Selection::default()
            },
            mode,
            spaced_review,
        }
    }

    /// A runner whose coin always lands on "recall".
    fn runner<'g>(
        gateway: &'g MemoryGateway,
        clock: &'g ManualClock,
        mode: Mode,
        spaced_review: bool,
    ) -> Runner<'g, MemoryGateway> {
        let plan = plan(gateway, mode, spaced_review);
        Runner::new(
            gateway,
            clock,
            Box::new(StepRng::new(0, 0)),
            pacing(),
            &plan,
        )
    }

    fn key(presented: Option<Presented>) -> String {
        presented.expect("expected content").key().to_string()
    }

    /// Makes FLASHCARD_1 as hard (1.0) and unimportant (0.0) as possible.
    fn hardest_card(gateway: &MemoryGateway) {
        gateway.difficulties.borrow_mut()[2].value = 1.0;
        let mut card = gateway.content("FLASHCARD_1");
        card.priority = LOWEST;
        gateway.add_content(card);
    }

    #[test]
    fn walks_contents_in_order_then_ends() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);
        assert_eq!(runner.state(), RunState::BeforeStart);

        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
        assert_eq!(gateway.items.borrow().len(), 1);

        clock.advance(10);
        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_2");
        assert_eq!(gateway.items.borrow().len(), 2);
        assert_eq!(gateway.open_items(), 1);
        assert_eq!(runner.state(), RunState::Running);

        clock.advance(10);
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(gateway.prompts.borrow().len(), 1);
        assert_eq!(runner.state(), RunState::Ended);
        assert_eq!(
            runner.progress(),
            Progress {
                index: Some(1),
                limit: 2
            }
        );

        let session = gateway.only_session();
        assert_eq!(session.children.len(), 2);
        assert_eq!(session.status, 2);
        assert_eq!(session.duration, Some(20.0));
        assert_eq!(gateway.open_items(), 0);
        assert_eq!(
            gateway.navigations.borrow().last().unwrap().0,
            View::Results
        );
        assert!(!runner.is_running());
    }

    #[test]
    fn declining_the_end_keeps_the_session_open() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        gateway.reply.set(Confirmation::No);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        runner.load_next().unwrap();
        runner.load_next().unwrap();
        assert_eq!(runner.load_next().unwrap(), None);

        assert_ne!(runner.state(), RunState::Ended);
        assert!(runner.is_running());
        assert!(!gateway.only_session().is_closed());
        assert_eq!(key(runner.load_previous().unwrap()), "FLASHCARD_1");

        gateway.reply.set(Confirmation::Yes);
        runner.load_next().unwrap();
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.state(), RunState::Ended);
        assert_eq!(gateway.prompts.borrow().len(), 2);
    }

    #[test]
    fn cancelling_the_end_keeps_the_session_open() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        gateway.reply.set(Confirmation::Cancel);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        runner.load_next().unwrap();
        assert_eq!(runner.load_next().unwrap(), None);

        assert_eq!(runner.state(), RunState::Running);
        assert!(runner.is_running());
        assert!(!gateway.only_session().is_closed());
        assert!(gateway.navigations.borrow().is_empty());
    }

    #[test]
    fn failed_session_close_does_not_end_the_run() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);
        runner.load_next().unwrap();

        gateway.fail("update_session");
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.state(), RunState::Running);
        assert!(runner.is_running());
        assert!(!gateway.only_session().is_closed());
        assert!(gateway.navigations.borrow().is_empty());

        gateway.recover("update_session");
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.state(), RunState::Ended);
        assert!(gateway.only_session().is_closed());
    }

    #[test]
    fn previous_never_goes_below_the_first_content() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        assert_eq!(runner.load_previous().unwrap(), None);
        assert_eq!(runner.progress().index, None);

        runner.load_next().unwrap();
        assert_eq!(runner.load_previous().unwrap(), None);
        assert_eq!(runner.progress().index, Some(0));
        assert_eq!(gateway.items.borrow().len(), 1);
    }

    #[test]
    fn previous_opens_a_new_item_without_touching_the_queue() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, true);

        runner.load_next().unwrap();
        runner.load_next().unwrap();
        let queued = runner.queue().len();

        assert_eq!(key(runner.load_previous().unwrap()), "FLASHCARD_1");
        assert_eq!(runner.progress().index, Some(0));
        assert_eq!(gateway.items.borrow().len(), 3);
        assert_eq!(gateway.open_items(), 1);
        assert_eq!(runner.queue().len(), queued);
    }

    #[test]
    fn showing_content_stamps_due_date_and_last_view() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        runner.load_next().unwrap();

        let card = gateway.content("FLASHCARD_1");
        assert_eq!(card.interval, Some(1.0));
        assert_eq!(card.due_by.unwrap().as_second(), MORNING + 86_400);
        assert_eq!(card.last_viewed_at.unwrap().as_second(), MORNING);
    }

    #[test]
    fn hard_feedback_queues_a_review_two_minutes_out() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        hardest_card(&gateway);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, true);

        runner.load_next().unwrap();
        runner.on_difficulty_feedback(DifficultyLevel::Hard).unwrap();

        let entries: Vec<_> = runner.queue().iter().cloned().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key, "FLASHCARD_1");
        assert_eq!(entries[0].due_at.as_second(), MORNING + 120);

        let card = gateway.content("FLASHCARD_1");
        assert_eq!(card.difficulty, HARD);

        let actions = gateway.actions.borrow();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::DifficultyChanged);
        assert_eq!(
            actions[0].action_metadata.before,
            Some(json!({ "difficulty": MEDIUM }))
        );
    }

    #[test]
    fn failed_difficulty_write_records_and_queues_nothing() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, true);
        runner.load_next().unwrap();

        gateway.fail("update_content");
        runner.on_difficulty_feedback(DifficultyLevel::Hard).unwrap();

        assert!(gateway.actions.borrow().is_empty());
        assert!(runner.queue().is_empty());
        assert_eq!(gateway.content("FLASHCARD_1").difficulty, MEDIUM);
        assert_eq!(runner.current().unwrap().difficulty, MEDIUM);
    }

    #[test]
    fn easy_feedback_does_not_queue() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, true);

        runner.load_next().unwrap();
        runner.on_difficulty_feedback(DifficultyLevel::Easy).unwrap();

        assert!(runner.queue().is_empty());
        assert_eq!(gateway.actions.borrow().len(), 1);
    }

    #[test]
    fn feedback_without_spaced_review_does_not_queue() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        runner.load_next().unwrap();
        runner.on_difficulty_feedback(DifficultyLevel::Hard).unwrap();

        assert!(runner.queue().is_empty());
    }

    #[test]
    fn due_review_is_shown_before_advancing() {
        let gateway =
            MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2", "FLASHCARD_3"]);
        hardest_card(&gateway);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, true);

        runner.load_next().unwrap();
        runner.on_difficulty_feedback(DifficultyLevel::Hard).unwrap();

        clock.advance(150);
        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
        assert_eq!(runner.progress().index, Some(0));

        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_2");
        assert_eq!(runner.progress().index, Some(1));
        assert_eq!(gateway.items.borrow().len(), 3);
    }

    #[test]
    fn recall_mode_hands_off_every_time() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Recall, false);

        runner.load_next().unwrap();
        runner.load_next().unwrap();

        let navigations = gateway.navigations.borrow();
        assert_eq!(
            *navigations,
            [
                (View::Recall, Some("FLASHCARD_1".to_string())),
                (View::Recall, Some("FLASHCARD_2".to_string())),
            ]
        );
    }

    #[test]
    fn recall_at_random_follows_the_coin() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);

        let heads = Box::new(StepRng::new(0, 0));
        let heads_plan = plan(&gateway, Mode::RecallAtRandom, false);
        let mut runner = Runner::new(&gateway, &clock, heads, pacing(), &heads_plan);
        runner.load_next().unwrap();
        assert_eq!(gateway.navigations.borrow().len(), 1);

        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let tails = Box::new(StepRng::new(u64::MAX, 0));
        let tails_plan = plan(&gateway, Mode::RecallAtRandom, false);
        let mut runner = Runner::new(&gateway, &clock, tails, pacing(), &tails_plan);
        runner.load_next().unwrap();
        runner.load_next().unwrap();
        assert!(gateway.navigations.borrow().is_empty());
    }

    #[test]
    fn unsupported_mode_presents_as_default() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::SpeedTest, false);

        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
        assert!(gateway.navigations.borrow().is_empty());
    }

    #[test]
    fn questions_come_with_their_answers() {
        let gateway = MemoryGateway::new();
        let mut question = flashcard("QUESTION_1");
        question.kind = ContentKind::Question;
        question.back = String::new();
        gateway.add_content(question);
        for (n, correct) in [(1, true), (2, false)] {
            gateway.answers.borrow_mut().push(Answer {
                key: format!("ANSWER_{n}"),
                question: "QUESTION_1".into(),
                text: format!("answer {n}"),
                correct,
            });
        }
        gateway.add_stack("STACK_1", &["QUESTION_1"], &[]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        match runner.load_next().unwrap() {
            Some(Presented::Question { question, answers }) => {
                assert_eq!(question.key, "QUESTION_1");
                assert_eq!(answers.len(), 2);
            }
            other => panic!("expected a question, got {other:?}"),
        }
    }

    #[test]
    fn flip_is_recorded_on_the_open_item() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        let card = runner.load_next().unwrap().unwrap().content().clone();
        clock.advance(4);
        runner.on_flashcard_flipped(&card);

        let actions = gateway.actions.borrow();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].action_type, ActionType::FlashcardFlipped);
        let elapsed = actions[0].action_metadata.elapsed;
        assert!((elapsed - 4.0).abs() < f64::EPSILON);

        let items = gateway.items.borrow();
        let item = items.values().next().unwrap();
        assert_eq!(item.actions, [actions[0].id]);
    }

    #[test]
    fn flip_before_anything_is_shown_records_nothing() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        runner.on_flashcard_flipped(&gateway.content("FLASHCARD_1"));
        assert!(gateway.actions.borrow().is_empty());
    }

    #[test]
    fn vanished_content_does_not_advance() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);
        gateway.contents.borrow_mut().remove("FLASHCARD_1");

        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.progress().index, None);
    }

    #[test]
    fn failed_item_creation_rolls_back_the_advance() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        gateway.fail("create_item");
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.progress().index, None);

        gateway.recover("create_item");
        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
    }

    #[test]
    fn unlinked_item_rolls_back_the_advance() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        gateway.fail("update_session");
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.progress().index, None);
        assert_eq!(gateway.open_items(), 0);

        gateway.recover("update_session");
        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
        assert_eq!(gateway.only_session().children.len(), 1);
    }

    #[test]
    fn run_without_a_session_still_navigates() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1", "FLASHCARD_2"]);
        gateway.fail("create_session");
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        assert!(runner.session().is_none());
        assert!(!runner.is_running());

        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_1");
        assert_eq!(key(runner.load_next().unwrap()), "FLASHCARD_2");
        assert!(gateway.items.borrow().is_empty());

        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.state(), RunState::Ended);
        assert!(gateway.prompts.borrow().is_empty());
        assert!(runner.finish().is_none());
    }

    #[test]
    fn corrupted_weights_surface_as_errors() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        gateway.difficulties.borrow_mut()[1].value = 2.0;
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        let err = runner.load_next().unwrap_err();
        assert!(matches!(err, RunnerError::Interval(_)));
    }

    #[test]
    fn empty_run_goes_straight_to_the_end() {
        let gateway = MemoryGateway::new();
        gateway.add_stack("STACK_1", &[], &[]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);

        assert_eq!(runner.progress().limit, 0);
        assert_eq!(runner.load_next().unwrap(), None);
        assert_eq!(runner.progress().index, None);
        assert_eq!(runner.state(), RunState::Ended);
    }

    #[test]
    fn session_records_the_plan() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let runner = runner(&gateway, &clock, Mode::Recall, true);

        let session = runner.session().unwrap();
        assert_eq!(session.contents, ["FLASHCARD_1"]);
        assert_eq!(session.stacks, ["STACK_1"]);
        assert_eq!(session.mode, Mode::Recall);
        assert!(session.settings.enable_spaced_review);
        assert_eq!(session.status, 1);
        assert!(runner.is_running());
    }

    #[test]
    fn finish_closes_the_open_item() {
        let gateway = MemoryGateway::with_flashcards(&["FLASHCARD_1"]);
        let clock = ManualClock::at(MORNING);
        let mut runner = runner(&gateway, &clock, Mode::Default, false);
        runner.load_next().unwrap();

        clock.advance(12);
        let session = runner.finish().unwrap();

        assert!(!session.is_closed());
        assert_eq!(gateway.open_items(), 0);
        let items = gateway.items.borrow();
        assert_eq!(items.values().next().unwrap().duration, Some(12.0));
    }
}
