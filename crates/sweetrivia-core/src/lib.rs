//! # sweetrivia-core
//!
//! The authoring wizard for a batch of multiple-choice trivia questions.
//!
//! ## Key Types
//!
//! - [`TriviaQuestion`] - A question with four options and a correct answer
//! - [`Session`] - The question count plus the questions written so far
//! - [`QuestionDraft`] - The question being edited, with validation
//! - [`WizardFlow`] - Pure state machine over the wizard steps
//! - [`Wizard`] - Runs the state machine against a [`DraftStore`]
//!
//! Export to CSV lives in [`export`].

mod draft;
mod error;
pub mod export;
mod flow;
mod question;
mod session;
mod store;
mod wizard;

pub use draft::QuestionDraft;
pub use error::{CommitError, DraftError, ExportError, FieldError, FlowError, ValidationError};
pub use flow::{Command, Notice, NoticeLevel, Step, Transition, WizardEvent, WizardFlow};
pub use question::{AnswerKey, TriviaQuestion};
pub use session::{progress_percent, QuestionCount, Session, MAX_QUESTIONS, MIN_QUESTIONS};
pub use store::{DraftStore, KeyValueArea, MemoryArea, COUNT_KEY, QUESTIONS_KEY};
pub use wizard::{Dispatched, Wizard};
