//! The wizard state machine.
//!
//! ```text
//! Configuring --choose(n)--> Editing(1) --save-and-continue--> Editing(2) ... Editing(n) --> Finished
//!      ^                                                                                    |
//!      +------------------------------------- restart --------------------------------------+
//! ```
//!
//! [`WizardFlow::handle`] is pure: it returns the next flow together with the
//! [`Command`]s a driver must carry out (persistence writes and messages for
//! the author). Nothing here touches storage.

use serde::Serialize;

use crate::draft::QuestionDraft;
use crate::error::{CommitError, FlowError, ValidationError};
use crate::question::TriviaQuestion;
use crate::session::{QuestionCount, Session};

/// Where the author is in the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "step", content = "index", rename_all = "snake_case")]
pub enum Step {
    /// Choosing how many questions to write
    Configuring,
    /// Editing question `i` (1-based)
    Editing(usize),
    /// Every question written; ready to export
    Finished,
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Configuring => write!(f, "configuring"),
            Step::Editing(i) => write!(f, "editing question {}", i),
            Step::Finished => write!(f, "finished"),
        }
    }
}

/// Input to the state machine
#[derive(Debug, Clone)]
pub enum WizardEvent {
    /// Pick the number of questions for a new session
    ChooseCount(i64),
    /// Navigate to a question
    Open(usize),
    /// Replace the draft being edited
    Edit(QuestionDraft),
    /// Commit the draft and stay on the current question
    Save,
    /// Commit the draft and move to the next question (or finish)
    SaveAndContinue,
    /// Show the completion step
    Finish,
    /// Discard the session and start over
    Restart,
}

/// Severity of a message for the author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A single message for the author (one toast per attempt)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Side effects requested by a transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SaveCount(QuestionCount),
    SaveQuestions(Vec<Option<TriviaQuestion>>),
    ClearStorage,
    Notify(Notice),
}

/// Result of handling one event
#[derive(Debug, Clone)]
pub struct Transition {
    pub flow: WizardFlow,
    pub commands: Vec<Command>,
    /// Set when the event was refused for input the author can fix; `flow`
    /// is then unchanged
    pub rejection: Option<ValidationError>,
}

impl Transition {
    fn to(flow: WizardFlow, commands: Vec<Command>) -> Self {
        Self {
            flow,
            commands,
            rejection: None,
        }
    }

    fn rejected(flow: WizardFlow, error: ValidationError) -> Self {
        Self {
            flow,
            commands: vec![Command::Notify(Notice::error(error.to_string()))],
            rejection: Some(error),
        }
    }

    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }
}

/// Wizard position plus the data it operates on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardFlow {
    step: Step,
    session: Option<Session>,
    draft: Option<QuestionDraft>,
}

impl Default for WizardFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl WizardFlow {
    /// A wizard with no session
    pub fn new() -> Self {
        Self {
            step: Step::Configuring,
            session: None,
            draft: None,
        }
    }

    /// Pick up a stored session at its first unfilled question, or at the
    /// completion step when nothing is missing.
    pub fn resume(session: Option<Session>) -> Self {
        let Some(session) = session else {
            return Self::new();
        };

        match session.missing_steps().first() {
            Some(&step) => Self {
                step: Step::Editing(step),
                draft: Some(QuestionDraft::load(&session, step)),
                session: Some(session),
            },
            None => Self {
                step: Step::Finished,
                session: Some(session),
                draft: None,
            },
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// The draft for the current question, when editing
    pub fn draft(&self) -> Option<&QuestionDraft> {
        self.draft.as_ref()
    }

    /// Display-only progress of the current question
    pub fn progress(&self) -> Option<u8> {
        match (self.step, &self.session) {
            (Step::Editing(i), Some(session)) => Some(session.progress(i)),
            (Step::Finished, Some(_)) => Some(100),
            _ => None,
        }
    }

    /// Whether the current question is the final one
    pub fn is_last_step(&self) -> bool {
        match (self.step, &self.session) {
            (Step::Editing(i), Some(session)) => i == session.question_count().get(),
            _ => false,
        }
    }

    /// Apply an event.
    ///
    /// Returns `Err` for requests that make no sense in the current state
    /// (unknown question, no session). Input the author can fix yields an
    /// `Ok` transition with [`Transition::rejection`] set.
    pub fn handle(&self, event: WizardEvent) -> Result<Transition, FlowError> {
        match event {
            WizardEvent::ChooseCount(n) => self.choose_count(n),
            WizardEvent::Open(step) => self.open(step),
            WizardEvent::Edit(draft) => self.edit(draft),
            WizardEvent::Save => self.save(false),
            WizardEvent::SaveAndContinue => self.save(true),
            WizardEvent::Finish => self.finish(),
            WizardEvent::Restart => Ok(Transition::to(
                WizardFlow::new(),
                vec![Command::ClearStorage],
            )),
        }
    }

    fn choose_count(&self, n: i64) -> Result<Transition, FlowError> {
        if let Some(session) = &self.session {
            return Err(FlowError::AlreadyConfigured(session.question_count().get()));
        }

        let count = match QuestionCount::new(n) {
            Ok(count) => count,
            Err(e) => return Ok(Transition::rejected(self.clone(), e)),
        };

        let session = Session::new(count);
        let flow = WizardFlow {
            step: Step::Editing(1),
            draft: Some(QuestionDraft::load(&session, 1)),
            session: Some(session),
        };

        // Count last: a stored count is what makes the session exist
        Ok(Transition::to(
            flow,
            vec![
                Command::SaveQuestions(Vec::new()),
                Command::SaveCount(count),
            ],
        ))
    }

    fn open(&self, step: usize) -> Result<Transition, FlowError> {
        let session = self.session.as_ref().ok_or(FlowError::NotConfigured)?;
        let count = session.question_count();
        if !count.contains(step) {
            return Err(FlowError::StepOutOfRange {
                step,
                count: count.get(),
            });
        }

        let flow = WizardFlow {
            step: Step::Editing(step),
            draft: Some(QuestionDraft::load(session, step)),
            session: Some(session.clone()),
        };
        Ok(Transition::to(flow, Vec::new()))
    }

    fn edit(&self, draft: QuestionDraft) -> Result<Transition, FlowError> {
        let Step::Editing(current) = self.step else {
            return Err(FlowError::NotEditing);
        };
        if draft.step() != current {
            let count = self
                .session
                .as_ref()
                .map(|s| s.question_count().get())
                .unwrap_or(0);
            return Err(FlowError::StepOutOfRange {
                step: draft.step(),
                count,
            });
        }

        let mut flow = self.clone();
        flow.draft = Some(draft);
        Ok(Transition::to(flow, Vec::new()))
    }

    fn save(&self, advance: bool) -> Result<Transition, FlowError> {
        let Step::Editing(current) = self.step else {
            return Err(FlowError::NotEditing);
        };
        let session = self.session.as_ref().ok_or(FlowError::NotConfigured)?;
        let draft = self
            .draft
            .clone()
            .unwrap_or_else(|| QuestionDraft::empty(current));

        let committed = match draft.commit(session) {
            Ok(committed) => committed,
            Err(CommitError::Invalid(field)) => {
                return Ok(Transition::rejected(self.clone(), field.into()))
            }
            Err(CommitError::Flow(e)) => return Err(e),
        };

        let commands = vec![
            Command::SaveQuestions(committed.slots().to_vec()),
            Command::Notify(Notice::success("Question saved successfully")),
        ];

        let count = committed.question_count().get();
        let flow = if !advance {
            WizardFlow {
                step: Step::Editing(current),
                draft: Some(draft),
                session: Some(committed),
            }
        } else if current < count {
            WizardFlow {
                step: Step::Editing(current + 1),
                draft: Some(QuestionDraft::load(&committed, current + 1)),
                session: Some(committed),
            }
        } else {
            // Earlier steps may have been skipped by navigating directly
            let missing = committed.missing_steps();
            if let Some(&step) = missing.first() {
                tracing::debug!(?missing, "Last question saved with gaps remaining");
                WizardFlow {
                    step: Step::Editing(step),
                    draft: Some(QuestionDraft::load(&committed, step)),
                    session: Some(committed),
                }
            } else {
                WizardFlow {
                    step: Step::Finished,
                    draft: None,
                    session: Some(committed),
                }
            }
        };

        Ok(Transition::to(flow, commands))
    }

    fn finish(&self) -> Result<Transition, FlowError> {
        let session = self.session.as_ref().ok_or(FlowError::NotConfigured)?;
        let missing = session.missing_steps();
        if !missing.is_empty() {
            return Err(FlowError::Incomplete { missing });
        }

        let flow = WizardFlow {
            step: Step::Finished,
            session: Some(session.clone()),
            draft: None,
        };
        Ok(Transition::to(flow, Vec::new()))
    }
}
