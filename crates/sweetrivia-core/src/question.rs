//! The trivia question record.
//!
//! Serialized with the same camelCase keys the question list has always been
//! stored under, so lists written by earlier clients keep loading.

use serde::{Deserialize, Serialize};

/// One of the four answer slots of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnswerKey {
    A,
    B,
    C,
    D,
}

impl AnswerKey {
    /// All keys in display order.
    pub const ALL: [AnswerKey; 4] = [AnswerKey::A, AnswerKey::B, AnswerKey::C, AnswerKey::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            AnswerKey::A => "A",
            AnswerKey::B => "B",
            AnswerKey::C => "C",
            AnswerKey::D => "D",
        }
    }
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AnswerKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(AnswerKey::A),
            "B" => Ok(AnswerKey::B),
            "C" => Ok(AnswerKey::C),
            "D" => Ok(AnswerKey::D),
            _ => Err(format!("Unknown answer key: {}", s)),
        }
    }
}

/// A multiple-choice trivia question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriviaQuestion {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Unset until the author picks one; stored as `""` when unset
    #[serde(default, with = "blank_answer")]
    pub correct_answer: Option<AnswerKey>,
}

impl TriviaQuestion {
    /// Create an empty question
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the option behind `key`
    pub fn option(&self, key: AnswerKey) -> &str {
        match key {
            AnswerKey::A => &self.option_a,
            AnswerKey::B => &self.option_b,
            AnswerKey::C => &self.option_c,
            AnswerKey::D => &self.option_d,
        }
    }

    pub(crate) fn option_mut(&mut self, key: AnswerKey) -> &mut String {
        match key {
            AnswerKey::A => &mut self.option_a,
            AnswerKey::B => &mut self.option_b,
            AnswerKey::C => &mut self.option_c,
            AnswerKey::D => &mut self.option_d,
        }
    }
}

/// `Option<AnswerKey>` encoded as a plain string, `""` meaning unset.
mod blank_answer {
    use serde::{Deserialize, Deserializer, Serializer};

    use super::AnswerKey;

    pub fn serialize<S: Serializer>(value: &Option<AnswerKey>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(value.map(|k| k.as_str()).unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<AnswerKey>, D::Error> {
        let raw: Option<String> = Option::deserialize(d)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => s.parse().map(Some).map_err(serde::de::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_key_parse() {
        assert_eq!("a".parse::<AnswerKey>().unwrap(), AnswerKey::A);
        assert_eq!(" D ".parse::<AnswerKey>().unwrap(), AnswerKey::D);
        assert!("E".parse::<AnswerKey>().is_err());
        assert!("".parse::<AnswerKey>().is_err());
    }

    #[test]
    fn test_serializes_with_camel_case_keys() {
        let q = TriviaQuestion {
            question: "Capital of France?".to_string(),
            option_a: "Paris".to_string(),
            option_b: "Lyon".to_string(),
            option_c: "Nice".to_string(),
            option_d: "Lille".to_string(),
            correct_answer: Some(AnswerKey::A),
        };

        let json = serde_json::to_value(&q).unwrap();
        assert_eq!(json["optionA"], "Paris");
        assert_eq!(json["optionD"], "Lille");
        assert_eq!(json["correctAnswer"], "A");
    }

    #[test]
    fn test_unset_answer_is_blank_string() {
        let q = TriviaQuestion::new();
        let json = serde_json::to_string(&q).unwrap();
        assert!(json.contains(r#""correctAnswer":"""#));

        let parsed: TriviaQuestion = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.correct_answer, None);
    }

    #[test]
    fn test_rejects_unknown_answer() {
        let json = r#"{"question":"q","optionA":"a","optionB":"b","optionC":"c","optionD":"d","correctAnswer":"Z"}"#;
        assert!(serde_json::from_str::<TriviaQuestion>(json).is_err());
    }
}
