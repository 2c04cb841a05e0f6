//! Application state machine.
//!
//! `App` consumes [`JudgeEvent`]s and returns the [`Command`] (if any) the
//! event calls for. It never touches the network itself, so every flow can be
//! driven headless.

use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio_util::sync::CancellationToken;

use crate::api::{SubmissionId, SubmissionStatus};
use crate::config::Config;
use crate::editor::Editor;
use crate::effects::{Command, NetworkEvent};
use crate::error::ClientError;
use crate::journal::SubmissionJournal;
use crate::poller::PollProgress;
use crate::profile::{FormAction, GateDecision, ProfileForm};
use crate::runtime::JudgeEvent;
use crate::submission::{prepare_submission, BlankCodePolicy};
use crate::telemetry::TelemetryRecorder;
use crate::verdict::ResultPanel;

pub const SUBMITTING: &str = "Submitting code...";
pub const SUBMITTED: &str = "Submission successful. Polling for results...";
pub const SUBMIT_FAILED: &str = "Submission failed.";
pub const POLL_FAILED: &str = "Error fetching submission status.";
pub const CLIPBOARD_DISABLED: &str = "Copy, cut and paste are disabled.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitControl {
    Enabled,
    /// A submission or its poll is in flight.
    Busy,
    CoolingDown { until: Instant },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Empty,
    Message(String),
    Error(String),
    Result(ResultPanel),
}

#[derive(Debug)]
struct ActivePoll {
    id: SubmissionId,
    cancel: CancellationToken,
}

#[derive(Debug)]
pub struct App {
    pub problem_id: String,
    pub editor: Editor,
    pub telemetry: TelemetryRecorder,
    pub output: Output,
    pub control: SubmitControl,
    pub modal: Option<ProfileForm>,
    /// One-line hint shown under the editor, replaced by the next one.
    pub notice: Option<String>,
    poll: Option<ActivePoll>,
    policy: BlankCodePolicy,
    cooldown: Duration,
    journal: Option<SubmissionJournal>,
    should_quit: bool,
}

impl App {
    pub fn new(problem_id: impl Into<String>, config: &Config) -> Self {
        Self {
            problem_id: problem_id.into(),
            editor: Editor::new(config.default_language, config.theme),
            telemetry: TelemetryRecorder::new(),
            output: Output::Empty,
            control: SubmitControl::Enabled,
            modal: None,
            notice: None,
            poll: None,
            policy: BlankCodePolicy::from(config.reject_blank_code),
            cooldown: config.resubmit_cooldown(),
            journal: None,
            should_quit: false,
        }
    }

    pub fn with_journal(mut self, journal: Option<SubmissionJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Commands to issue once the UI is up.
    pub fn start(&mut self) -> Option<Command> {
        tracing::info!(problem_id = %self.problem_id, "session started");
        Some(Command::CheckProfile)
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn submit_enabled(&self) -> bool {
        self.control == SubmitControl::Enabled
    }

    pub fn is_polling(&self) -> bool {
        self.poll.is_some()
    }

    pub fn on_event(&mut self, event: JudgeEvent) -> Option<Command> {
        self.on_event_at(event, Instant::now())
    }

    pub fn on_event_at(&mut self, event: JudgeEvent, now: Instant) -> Option<Command> {
        self.expire_cooldown(now);
        match event {
            JudgeEvent::Key(key) => {
                self.telemetry.record_key(&key);
                if key.kind == KeyEventKind::Press {
                    return self.on_key(key, now);
                }
                None
            }
            JudgeEvent::Paste(text) => {
                tracing::debug!(chars = text.chars().count(), "blocked paste");
                self.notice = Some(CLIPBOARD_DISABLED.to_string());
                None
            }
            JudgeEvent::FocusLost => {
                self.telemetry.focus_lost();
                None
            }
            JudgeEvent::FocusGained => {
                self.telemetry.focus_gained();
                None
            }
            JudgeEvent::Resize | JudgeEvent::Tick => None,
            JudgeEvent::Network(ev) => self.on_network(ev, now),
        }
    }

    fn expire_cooldown(&mut self, now: Instant) {
        if let SubmitControl::CoolingDown { until } = self.control {
            if now >= until {
                self.control = SubmitControl::Enabled;
            }
        }
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) -> Option<Command> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('q') if ctrl => {
                self.quit();
                return None;
            }
            KeyCode::Char('c' | 'x' | 'v') if ctrl => {
                self.notice = Some(CLIPBOARD_DISABLED.to_string());
                return None;
            }
            _ => {}
        }

        if self.modal.is_some() {
            return self.on_modal_key(key);
        }

        match key.code {
            KeyCode::Esc => {
                self.quit();
                None
            }
            KeyCode::Char('s') if ctrl => self.request_submit(now),
            KeyCode::F(2) => {
                let language = self.editor.language().next();
                self.editor.set_language(language);
                self.notice = Some(format!("Language: {}", language.label()));
                None
            }
            KeyCode::F(3) => {
                let theme = self.editor.theme().next();
                self.editor.set_theme(theme);
                self.notice = Some(format!("Theme: {theme}"));
                None
            }
            _ => {
                self.editor.handle_key(key);
                None
            }
        }
    }

    fn on_modal_key(&mut self, key: KeyEvent) -> Option<Command> {
        let form = self.modal.as_mut()?;
        if form.handle_key(key) != FormAction::Submit {
            return None;
        }
        match form.validate() {
            Ok(upload) => {
                form.begin_submit();
                Some(Command::CompleteProfile(upload))
            }
            Err(err) => {
                form.fail(err.to_string());
                None
            }
        }
    }

    /// Disables the control and builds the submission, or explains why not.
    pub fn request_submit(&mut self, now: Instant) -> Option<Command> {
        if self.modal.is_some() {
            self.notice = Some("Complete your profile before submitting.".to_string());
            return None;
        }
        if self.poll.is_some() {
            tracing::warn!("submit requested while a poll is active");
            return None;
        }
        match self.control {
            SubmitControl::Enabled => {}
            SubmitControl::Busy => return None,
            SubmitControl::CoolingDown { until } => {
                let secs = until.saturating_duration_since(now).as_secs_f64().ceil();
                self.notice = Some(format!("Please wait {secs} seconds before submitting again."));
                return None;
            }
        }

        self.control = SubmitControl::Busy;
        self.output = Output::Message(SUBMITTING.to_string());

        match prepare_submission(
            &self.problem_id,
            &self.editor.text(),
            self.editor.language(),
            self.telemetry.snapshot(),
            self.policy,
        ) {
            Ok(request) => Some(Command::Submit(request)),
            Err(err) => {
                self.output = Output::Error(err.to_string());
                self.control = SubmitControl::Enabled;
                None
            }
        }
    }

    /// Starts the single allowed poll. Refuses while another one runs.
    pub fn begin_poll(&mut self, id: SubmissionId) -> Option<Command> {
        if let Some(active) = &self.poll {
            tracing::warn!(active = %active.id, requested = %id, "refusing a second poll");
            return None;
        }
        let cancel = CancellationToken::new();
        self.poll = Some(ActivePoll {
            id: id.clone(),
            cancel: cancel.clone(),
        });
        self.control = SubmitControl::Busy;
        Some(Command::Poll { id, cancel })
    }

    fn on_network(&mut self, event: NetworkEvent, now: Instant) -> Option<Command> {
        match event {
            NetworkEvent::ProfileChecked(GateDecision::ShowForm) => {
                self.modal = Some(ProfileForm::new());
                None
            }
            NetworkEvent::ProfileChecked(_) => None,
            NetworkEvent::ProfileSaved(result) => {
                match result {
                    Ok(()) => {
                        self.modal = None;
                        self.notice = Some("Profile saved.".to_string());
                    }
                    Err(err) => {
                        if let Some(form) = self.modal.as_mut() {
                            form.fail(profile_error_message(&err));
                        }
                    }
                }
                None
            }
            NetworkEvent::Submitted(Ok(id)) => {
                self.output = Output::Message(SUBMITTED.to_string());
                self.journal_submission(&id);
                self.begin_poll(id)
            }
            NetworkEvent::Submitted(Err(ClientError::RateLimited(message))) => {
                self.output = Output::Message(message);
                self.control = SubmitControl::Enabled;
                None
            }
            NetworkEvent::Submitted(Err(err)) => {
                self.output = Output::Error(format!("{SUBMIT_FAILED} {err}"));
                self.control = SubmitControl::Enabled;
                None
            }
            NetworkEvent::PollProgress(progress) => {
                self.on_poll_progress(progress);
                None
            }
            NetworkEvent::PollFinished(result) => {
                self.on_poll_finished(result, now);
                None
            }
        }
    }

    fn on_poll_progress(&mut self, progress: PollProgress) {
        if self.poll.is_some() {
            self.output = Output::Message(progress.message());
        }
    }

    fn on_poll_finished(&mut self, result: Result<SubmissionStatus, ClientError>, now: Instant) {
        let Some(active) = self.poll.take() else {
            return;
        };

        match result {
            Ok(status) => {
                self.journal_verdict(&active.id, &status);
                self.output = Output::Result(ResultPanel::from_status(&status));
                self.control = if self.cooldown.is_zero() {
                    SubmitControl::Enabled
                } else {
                    SubmitControl::CoolingDown {
                        until: now + self.cooldown,
                    }
                };
            }
            Err(ClientError::PollCancelled) => {
                self.control = SubmitControl::Enabled;
            }
            Err(err @ ClientError::PollTimedOut(_)) => {
                self.output = Output::Error(err.to_string());
                self.control = SubmitControl::Enabled;
            }
            Err(_) => {
                self.output = Output::Error(POLL_FAILED.to_string());
                self.control = SubmitControl::Enabled;
            }
        }
    }

    fn journal_submission(&self, id: &SubmissionId) {
        if let Some(journal) = &self.journal {
            let language = self.editor.language().to_string();
            if let Err(err) = journal.record_submission(id, &self.problem_id, &language, Utc::now()) {
                tracing::warn!(error = %err, "could not journal submission");
            }
        }
    }

    fn journal_verdict(&self, id: &SubmissionId, status: &SubmissionStatus) {
        if let Some(journal) = &self.journal {
            if let Err(err) = journal.record_verdict(id, status) {
                tracing::warn!(error = %err, "could not journal verdict");
            }
        }
    }

    pub fn quit(&mut self) {
        if let Some(active) = &self.poll {
            active.cancel.cancel();
        }
        self.should_quit = true;
    }
}

fn profile_error_message(err: &ClientError) -> String {
    match err {
        ClientError::Http { message, .. } => message.clone(),
        other => format!("Could not save your profile: {other}"),
    }
}
