//! The question currently being edited.
//!
//! A [`QuestionDraft`] is bound to one wizard step. Edits go through the
//! `with_*` setters, which hand back a new draft, so callers can hold on to
//! the previous value for comparison or undo.

use serde::{Deserialize, Serialize};

use crate::error::{CommitError, FieldError, FlowError};
use crate::question::{AnswerKey, TriviaQuestion};
use crate::session::Session;

/// An in-progress question for a 1-based wizard step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDraft {
    step: usize,
    question: TriviaQuestion,
}

impl QuestionDraft {
    /// Create an empty draft for `step`
    pub fn empty(step: usize) -> Self {
        Self {
            step,
            question: TriviaQuestion::new(),
        }
    }

    /// Load the committed question for `step`, or start empty
    pub fn load(session: &Session, step: usize) -> Self {
        match session.question(step) {
            Some(question) => Self::from_question(step, question.clone()),
            None => Self::empty(step),
        }
    }

    pub fn from_question(step: usize, question: TriviaQuestion) -> Self {
        Self { step, question }
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn question(&self) -> &TriviaQuestion {
        &self.question
    }

    pub fn with_question(mut self, text: impl Into<String>) -> Self {
        self.question.question = text.into();
        self
    }

    pub fn with_option(mut self, key: AnswerKey, text: impl Into<String>) -> Self {
        *self.question.option_mut(key) = text.into();
        self
    }

    pub fn with_correct_answer(mut self, key: Option<AnswerKey>) -> Self {
        self.question.correct_answer = key;
        self
    }

    /// Check every required field, in declaration order.
    ///
    /// Returns all failures; callers show the first one per attempt.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.question.question.trim().is_empty() {
            errors.push(FieldError::EmptyQuestion);
        }
        for key in AnswerKey::ALL {
            if self.question.option(key).trim().is_empty() {
                errors.push(FieldError::EmptyOption(key));
            }
        }
        if self.question.correct_answer.is_none() {
            errors.push(FieldError::MissingCorrectAnswer);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Merge this draft into `session` at its step, returning the new session.
    ///
    /// Does not touch storage and does not advance the wizard.
    pub fn commit(&self, session: &Session) -> Result<Session, CommitError> {
        if let Err(errors) = self.validate() {
            if let Some(first) = errors.first() {
                return Err(CommitError::Invalid(*first));
            }
        }

        let index = self.step.checked_sub(1).ok_or(FlowError::StepOutOfRange {
            step: self.step,
            count: session.question_count().get(),
        })?;

        Ok(session.with_question(index, self.question.clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::QuestionCount;

    fn filled(step: usize) -> QuestionDraft {
        QuestionDraft::empty(step)
            .with_question("Largest planet?")
            .with_option(AnswerKey::A, "Jupiter")
            .with_option(AnswerKey::B, "Saturn")
            .with_option(AnswerKey::C, "Mars")
            .with_option(AnswerKey::D, "Venus")
            .with_correct_answer(Some(AnswerKey::A))
    }

    #[test]
    fn test_filled_draft_is_valid() {
        assert_eq!(filled(1).validate(), Ok(()));
    }

    #[test]
    fn test_each_missing_field_reported_alone() {
        let cases = [
            (filled(1).with_question(""), FieldError::EmptyQuestion),
            (
                filled(1).with_option(AnswerKey::A, ""),
                FieldError::EmptyOption(AnswerKey::A),
            ),
            (
                filled(1).with_option(AnswerKey::B, ""),
                FieldError::EmptyOption(AnswerKey::B),
            ),
            (
                filled(1).with_option(AnswerKey::C, ""),
                FieldError::EmptyOption(AnswerKey::C),
            ),
            (
                filled(1).with_option(AnswerKey::D, ""),
                FieldError::EmptyOption(AnswerKey::D),
            ),
            (
                filled(1).with_correct_answer(None),
                FieldError::MissingCorrectAnswer,
            ),
        ];

        for (draft, expected) in cases {
            assert_eq!(draft.validate(), Err(vec![expected]));
        }
    }

    #[test]
    fn test_whitespace_counts_as_empty() {
        let draft = filled(1).with_option(AnswerKey::C, "   \n");
        assert_eq!(
            draft.validate(),
            Err(vec![FieldError::EmptyOption(AnswerKey::C)])
        );
    }

    #[test]
    fn test_errors_in_declaration_order() {
        let errors = QuestionDraft::empty(1).validate().unwrap_err();
        assert_eq!(
            errors,
            vec![
                FieldError::EmptyQuestion,
                FieldError::EmptyOption(AnswerKey::A),
                FieldError::EmptyOption(AnswerKey::B),
                FieldError::EmptyOption(AnswerKey::C),
                FieldError::EmptyOption(AnswerKey::D),
                FieldError::MissingCorrectAnswer,
            ]
        );
        assert_eq!(errors[0].to_string(), "Please enter a question");
        assert_eq!(errors[3].to_string(), "Please enter option C");
    }

    #[test]
    fn test_setters_leave_original_untouched() {
        let before = filled(1);
        let after = before.clone().with_question("Smallest planet?");
        assert_eq!(before.question().question, "Largest planet?");
        assert_eq!(after.question().question, "Smallest planet?");
    }

    #[test]
    fn test_commit_replaces_slot() {
        let session = Session::new(QuestionCount::new(2).unwrap());
        let committed = filled(2).commit(&session).unwrap();

        assert!(committed.question(1).is_none());
        assert_eq!(committed.question(2).unwrap().option_a, "Jupiter");
    }

    #[test]
    fn test_commit_rejects_invalid_draft() {
        let session = Session::new(QuestionCount::new(2).unwrap());
        let result = filled(1).with_option(AnswerKey::D, "").commit(&session);
        assert_eq!(
            result,
            Err(CommitError::Invalid(FieldError::EmptyOption(AnswerKey::D)))
        );
    }

    #[test]
    fn test_commit_rejects_out_of_range_step() {
        let session = Session::new(QuestionCount::new(2).unwrap());
        assert_eq!(
            filled(3).commit(&session),
            Err(CommitError::Flow(FlowError::StepOutOfRange { step: 3, count: 2 }))
        );
        assert_eq!(
            filled(0).commit(&session),
            Err(CommitError::Flow(FlowError::StepOutOfRange { step: 0, count: 2 }))
        );
    }

    #[test]
    fn test_load_existing_question() {
        let session = Session::new(QuestionCount::new(2).unwrap());
        let committed = filled(1).commit(&session).unwrap();

        assert_eq!(QuestionDraft::load(&committed, 1), filled(1));
        assert_eq!(QuestionDraft::load(&committed, 2), QuestionDraft::empty(2));
    }
}
