//! Persistence of the wizard's progress.
//!
//! Progress lives in a string key-value area under two keys:
//!
//! - `numberOfQuestions` - decimal question count
//! - `triviaQuestions` - JSON array of questions, `null` for unfilled slots
//!
//! Any [`KeyValueArea`] is a [`DraftStore`]. Values that fail to decode are
//! reported as [`DraftError::Corrupt`] rather than guessed at.

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::error::DraftError;
use crate::question::TriviaQuestion;
use crate::session::{QuestionCount, Session};

/// Key holding the chosen question count
pub const COUNT_KEY: &str = "numberOfQuestions";
/// Key holding the JSON question list
pub const QUESTIONS_KEY: &str = "triviaQuestions";

/// A persistent area of string values.
pub trait KeyValueArea {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError>;

    fn set(&self, key: &str, value: &str) -> Result<(), DraftError>;

    fn remove(&self, key: &str) -> Result<(), DraftError>;

    /// Remove several keys. Backends that can should do this in one write.
    fn remove_all(&self, keys: &[&str]) -> Result<(), DraftError> {
        for key in keys {
            self.remove(key)?;
        }
        Ok(())
    }
}

/// Reads and writes the session's count and question list.
pub trait DraftStore {
    fn load_count(&self) -> Result<Option<QuestionCount>, DraftError>;

    fn save_count(&self, count: QuestionCount) -> Result<(), DraftError>;

    /// Stored question slots; empty when nothing is stored
    fn load_questions(&self) -> Result<Vec<Option<TriviaQuestion>>, DraftError>;

    /// Replace the whole stored list
    fn save_questions(&self, questions: &[Option<TriviaQuestion>]) -> Result<(), DraftError>;

    /// Remove the count and the question list
    fn clear(&self) -> Result<(), DraftError>;

    /// The stored session, or `None` if no count has been chosen
    fn load_session(&self) -> Result<Option<Session>, DraftError> {
        let Some(count) = self.load_count()? else {
            return Ok(None);
        };
        let questions = self.load_questions()?;
        Ok(Some(Session::from_parts(count, questions)))
    }
}

impl<T: KeyValueArea + ?Sized> DraftStore for T {
    fn load_count(&self) -> Result<Option<QuestionCount>, DraftError> {
        self.get(COUNT_KEY)?.map(|raw| decode_count(&raw)).transpose()
    }

    fn save_count(&self, count: QuestionCount) -> Result<(), DraftError> {
        self.set(COUNT_KEY, &count.to_string())
    }

    fn load_questions(&self) -> Result<Vec<Option<TriviaQuestion>>, DraftError> {
        match self.get(QUESTIONS_KEY)? {
            Some(raw) => decode_questions(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save_questions(&self, questions: &[Option<TriviaQuestion>]) -> Result<(), DraftError> {
        let json = serde_json::to_string(questions)
            .map_err(|e| DraftError::Unavailable(format!("Failed to encode questions: {}", e)))?;
        self.set(QUESTIONS_KEY, &json)
    }

    fn clear(&self) -> Result<(), DraftError> {
        self.remove_all(&[COUNT_KEY, QUESTIONS_KEY])
    }
}

fn decode_count(raw: &str) -> Result<QuestionCount, DraftError> {
    let n: i64 = raw
        .trim()
        .parse()
        .map_err(|e| DraftError::corrupt(COUNT_KEY, format!("'{}' is not an integer: {}", raw, e)))?;
    QuestionCount::new(n).map_err(|e| DraftError::corrupt(COUNT_KEY, e))
}

fn decode_questions(raw: &str) -> Result<Vec<Option<TriviaQuestion>>, DraftError> {
    serde_json::from_str(raw).map_err(|e| DraftError::corrupt(QUESTIONS_KEY, e))
}

/// In-memory key-value area.
#[derive(Debug, Default)]
pub struct MemoryArea {
    values: Mutex<BTreeMap<String, String>>,
    disabled: bool,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }

    /// An area that refuses every read and write, like a browser with
    /// storage turned off.
    pub fn disabled() -> Self {
        Self {
            values: Mutex::new(BTreeMap::new()),
            disabled: true,
        }
    }

    fn values(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, String>>, DraftError> {
        if self.disabled {
            return Err(DraftError::Unavailable("storage is disabled".to_string()));
        }
        self.values
            .lock()
            .map_err(|_| DraftError::Unavailable("Lock error".to_string()))
    }
}

impl KeyValueArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<String>, DraftError> {
        Ok(self.values()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), DraftError> {
        self.values()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), DraftError> {
        self.values()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerKey;

    fn sample() -> TriviaQuestion {
        TriviaQuestion {
            question: "2 + 2?".to_string(),
            option_a: "3".to_string(),
            option_b: "4".to_string(),
            option_c: "5".to_string(),
            option_d: "22".to_string(),
            correct_answer: Some(AnswerKey::B),
        }
    }

    #[test]
    fn test_absent_keys() {
        let store = MemoryArea::new();
        assert_eq!(store.load_count().unwrap(), None);
        assert!(store.load_questions().unwrap().is_empty());
        assert_eq!(store.load_session().unwrap(), None);
    }

    #[test]
    fn test_count_round_trip() {
        let store = MemoryArea::new();
        store.save_count(QuestionCount::new(12).unwrap()).unwrap();
        assert_eq!(store.get(COUNT_KEY).unwrap().as_deref(), Some("12"));
        assert_eq!(store.load_count().unwrap(), Some(QuestionCount::new(12).unwrap()));
    }

    #[test]
    fn test_sparse_questions_use_null() {
        let store = MemoryArea::new();
        store.save_questions(&[None, Some(sample())]).unwrap();

        let raw = store.get(QUESTIONS_KEY).unwrap().unwrap();
        assert!(raw.starts_with("[null,{"));

        assert_eq!(store.load_questions().unwrap(), vec![None, Some(sample())]);
    }

    #[test]
    fn test_reads_browser_written_list() {
        let store = MemoryArea::new();
        store
            .set(
                QUESTIONS_KEY,
                r#"[{"question":"Q","optionA":"a","optionB":"b","optionC":"c","optionD":"d","correctAnswer":"c"}]"#,
            )
            .unwrap();

        let questions = store.load_questions().unwrap();
        assert_eq!(questions[0].as_ref().unwrap().correct_answer, Some(AnswerKey::C));
    }

    #[test]
    fn test_malformed_json_is_corrupt() {
        let store = MemoryArea::new();
        store.set(QUESTIONS_KEY, "[{not json").unwrap();
        assert!(matches!(
            store.load_questions(),
            Err(DraftError::Corrupt { ref key, .. }) if key == QUESTIONS_KEY
        ));

        store.set(QUESTIONS_KEY, r#"{"question":"not a list"}"#).unwrap();
        assert!(matches!(store.load_questions(), Err(DraftError::Corrupt { .. })));
    }

    #[test]
    fn test_bad_count_is_corrupt() {
        let store = MemoryArea::new();
        store.set(COUNT_KEY, "five").unwrap();
        assert!(matches!(store.load_count(), Err(DraftError::Corrupt { .. })));

        store.set(COUNT_KEY, "80").unwrap();
        assert!(matches!(store.load_count(), Err(DraftError::Corrupt { .. })));
    }

    #[test]
    fn test_clear_removes_both_keys() {
        let store = MemoryArea::new();
        store.save_count(QuestionCount::new(1).unwrap()).unwrap();
        store.save_questions(&[Some(sample())]).unwrap();

        store.clear().unwrap();

        assert_eq!(store.get(COUNT_KEY).unwrap(), None);
        assert_eq!(store.get(QUESTIONS_KEY).unwrap(), None);
    }

    #[test]
    fn test_disabled_area_surfaces_failure() {
        let store = MemoryArea::disabled();
        assert!(matches!(
            store.save_count(QuestionCount::new(3).unwrap()),
            Err(DraftError::Unavailable(_))
        ));
        assert!(matches!(store.load_questions(), Err(DraftError::Unavailable(_))));
    }
}
