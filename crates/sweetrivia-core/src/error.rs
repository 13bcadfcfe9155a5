use thiserror::Error;

use crate::question::AnswerKey;
use crate::session::MAX_QUESTIONS;

/// A single required field that failed validation.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    #[error("Please enter a question")]
    EmptyQuestion,

    #[error("Please enter option {0}")]
    EmptyOption(AnswerKey),

    #[error("Please select the correct answer")]
    MissingCorrectAnswer,
}

/// Input the user can correct; never changes state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0}")]
    Field(FieldError),

    #[error("Please enter at least one question")]
    CountTooSmall(i64),

    #[error("Please enter at most {} questions", MAX_QUESTIONS)]
    CountTooLarge(i64),
}

impl From<FieldError> for ValidationError {
    fn from(err: FieldError) -> Self {
        ValidationError::Field(err)
    }
}

/// Failures of the persistent draft area.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// The store cannot be read or written; progress cannot be saved
    #[error("Draft storage unavailable: {0}")]
    Unavailable(String),

    /// A stored value does not decode; the session must be restarted
    #[error("Stored value for '{key}' is corrupt: {reason}")]
    Corrupt { key: String, reason: String },
}

impl DraftError {
    pub fn corrupt(key: &str, reason: impl std::fmt::Display) -> Self {
        DraftError::Corrupt {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Message suitable for showing to the author
    pub fn user_message(&self) -> &str {
        match self {
            DraftError::Unavailable(_) => {
                "Your progress cannot be saved because local storage is unavailable."
            }
            DraftError::Corrupt { .. } => {
                "Saved questions could not be read. Please start again."
            }
        }
    }
}

/// Requests the wizard cannot honor from its current state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlowError {
    #[error("No question count has been chosen yet")]
    NotConfigured,

    #[error("Question count is already set to {0} for this session")]
    AlreadyConfigured(usize),

    #[error("Question {step} does not exist (session has {count} questions)")]
    StepOutOfRange { step: usize, count: usize },

    #[error("Not editing a question")]
    NotEditing,

    #[error("Questions still missing: {missing:?}")]
    Incomplete { missing: Vec<usize> },

    #[error(transparent)]
    Store(#[from] DraftError),
}

impl FlowError {
    pub fn user_message(&self) -> String {
        match self {
            FlowError::NotConfigured => "No questions found. Please start again.".to_string(),
            FlowError::Store(err) => err.user_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Why a draft could not be merged into the session.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommitError {
    /// First failing field; the draft is left as it was
    #[error("{0}")]
    Invalid(FieldError),

    #[error(transparent)]
    Flow(#[from] FlowError),
}

/// Failures while turning questions into a CSV artifact.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No questions to export")]
    Empty,

    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
}
