//! The authoring session: a fixed question count plus the questions filled
//! in so far.

use serde::{Deserialize, Serialize};

use crate::error::{FlowError, ValidationError};
use crate::question::TriviaQuestion;

/// Smallest batch a session may hold
pub const MIN_QUESTIONS: usize = 1;
/// Largest batch a session may hold
pub const MAX_QUESTIONS: usize = 50;

/// A question count already checked against [`MIN_QUESTIONS`]..=[`MAX_QUESTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct QuestionCount(usize);

impl QuestionCount {
    pub fn new(n: i64) -> Result<Self, ValidationError> {
        if n < MIN_QUESTIONS as i64 {
            return Err(ValidationError::CountTooSmall(n));
        }
        if n > MAX_QUESTIONS as i64 {
            return Err(ValidationError::CountTooLarge(n));
        }
        Ok(Self(n as usize))
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Whether `step` (1-based) names one of this session's questions
    pub fn contains(self, step: usize) -> bool {
        (1..=self.0).contains(&step)
    }
}

impl TryFrom<i64> for QuestionCount {
    type Error = ValidationError;

    fn try_from(n: i64) -> Result<Self, Self::Error> {
        Self::new(n)
    }
}

impl From<QuestionCount> for i64 {
    fn from(count: QuestionCount) -> Self {
        count.0 as i64
    }
}

impl std::fmt::Display for QuestionCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Questions for one wizard run. Slots stay `None` until committed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    question_count: QuestionCount,
    questions: Vec<Option<TriviaQuestion>>,
}

impl Session {
    /// Create a session with no questions filled in
    pub fn new(question_count: QuestionCount) -> Self {
        Self {
            question_count,
            questions: Vec::new(),
        }
    }

    /// Rebuild a session from stored slots. Slots past the count are dropped.
    pub fn from_parts(question_count: QuestionCount, mut questions: Vec<Option<TriviaQuestion>>) -> Self {
        if questions.len() > question_count.get() {
            tracing::debug!(
                stored = questions.len(),
                count = question_count.get(),
                "Dropping stored questions beyond the session count"
            );
            questions.truncate(question_count.get());
        }
        Self {
            question_count,
            questions,
        }
    }

    pub fn question_count(&self) -> QuestionCount {
        self.question_count
    }

    /// Stored slots, possibly shorter than the count
    pub fn slots(&self) -> &[Option<TriviaQuestion>] {
        &self.questions
    }

    /// The committed question for a 1-based step, if any
    pub fn question(&self, step: usize) -> Option<&TriviaQuestion> {
        step.checked_sub(1)
            .and_then(|index| self.questions.get(index))
            .and_then(Option::as_ref)
    }

    /// Return a copy of this session with slot `index` (0-based) replaced.
    pub fn with_question(&self, index: usize, question: TriviaQuestion) -> Result<Self, FlowError> {
        if index >= self.question_count.get() {
            return Err(FlowError::StepOutOfRange {
                step: index + 1,
                count: self.question_count.get(),
            });
        }

        let mut questions = self.questions.clone();
        if questions.len() <= index {
            questions.resize(index + 1, None);
        }
        questions[index] = Some(question);

        Ok(Self {
            question_count: self.question_count,
            questions,
        })
    }

    /// 1-based steps that have no committed question
    pub fn missing_steps(&self) -> Vec<usize> {
        (1..=self.question_count.get())
            .filter(|step| self.question(*step).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_steps().is_empty()
    }

    /// Every question in order, or the steps still missing
    pub fn completed_questions(&self) -> Result<Vec<TriviaQuestion>, FlowError> {
        let missing = self.missing_steps();
        if !missing.is_empty() {
            return Err(FlowError::Incomplete { missing });
        }
        Ok(self.questions.iter().flatten().cloned().collect())
    }

    /// Display-only progress for a step, as a rounded percentage
    pub fn progress(&self, step: usize) -> u8 {
        progress_percent(step, self.question_count)
    }
}

/// `round(step / count * 100)`, clamped to 100.
pub fn progress_percent(step: usize, count: QuestionCount) -> u8 {
    let pct = (step as f64 / count.get() as f64 * 100.0).round();
    pct.min(100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> TriviaQuestion {
        TriviaQuestion {
            question: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_question_count_bounds() {
        assert!(QuestionCount::new(1).is_ok());
        assert!(QuestionCount::new(50).is_ok());
        assert_eq!(
            QuestionCount::new(0),
            Err(ValidationError::CountTooSmall(0))
        );
        assert_eq!(
            QuestionCount::new(51),
            Err(ValidationError::CountTooLarge(51))
        );
        assert!(QuestionCount::new(-3).is_err());
    }

    #[test]
    fn test_count_messages() {
        assert_eq!(
            QuestionCount::new(0).unwrap_err().to_string(),
            "Please enter at least one question"
        );
        assert_eq!(
            QuestionCount::new(99).unwrap_err().to_string(),
            "Please enter at most 50 questions"
        );
    }

    #[test]
    fn test_with_question_fills_sparse_slots() {
        let session = Session::new(QuestionCount::new(3).unwrap());
        let updated = session.with_question(2, question("third")).unwrap();

        assert_eq!(updated.slots().len(), 3);
        assert!(updated.question(1).is_none());
        assert_eq!(updated.question(3).unwrap().question, "third");
        assert_eq!(updated.missing_steps(), vec![1, 2]);

        // original untouched
        assert!(session.slots().is_empty());
    }

    #[test]
    fn test_with_question_out_of_range() {
        let session = Session::new(QuestionCount::new(2).unwrap());
        assert_eq!(
            session.with_question(2, question("x")),
            Err(FlowError::StepOutOfRange { step: 3, count: 2 })
        );
    }

    #[test]
    fn test_question_step_zero_is_none() {
        let session = Session::new(QuestionCount::new(2).unwrap())
            .with_question(0, question("first"))
            .unwrap();
        assert!(session.question(0).is_none());
        assert!(session.question(1).is_some());
    }

    #[test]
    fn test_completed_questions() {
        let count = QuestionCount::new(2).unwrap();
        let partial = Session::new(count).with_question(0, question("a")).unwrap();
        assert_eq!(
            partial.completed_questions(),
            Err(FlowError::Incomplete { missing: vec![2] })
        );

        let full = partial.with_question(1, question("b")).unwrap();
        let questions = full.completed_questions().unwrap();
        assert_eq!(questions.len(), 2);
        assert_eq!(questions[1].question, "b");
    }

    #[test]
    fn test_from_parts_truncates() {
        let count = QuestionCount::new(1).unwrap();
        let session = Session::from_parts(count, vec![Some(question("a")), Some(question("b"))]);
        assert_eq!(session.slots().len(), 1);
    }

    #[test]
    fn test_progress() {
        let count = QuestionCount::new(3).unwrap();
        assert_eq!(progress_percent(1, count), 33);
        assert_eq!(progress_percent(2, count), 67);
        assert_eq!(progress_percent(3, count), 100);

        let seven = QuestionCount::new(7).unwrap();
        assert_eq!(progress_percent(1, seven), 14);
    }
}
