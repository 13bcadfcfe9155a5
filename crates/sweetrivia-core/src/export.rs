//! CSV export of a finished question list.
//!
//! Layout: a bare header row, then one row per question with every field
//! double-quoted and embedded quotes doubled. Rows are separated by `\n`
//! and there is no trailing terminator.

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::question::TriviaQuestion;

/// Header row, in column order
pub const CSV_HEADERS: [&str; 6] = [
    "Question",
    "Option A",
    "Option B",
    "Option C",
    "Option D",
    "Correct Answer",
];

/// File name used when saving to disk
pub const DEFAULT_FILENAME: &str = "trivia_questions.csv";

/// File name for a published export created at `timestamp_millis`
pub fn publish_filename(timestamp_millis: i64) -> String {
    format!("trivia_questions_{}.csv", timestamp_millis)
}

/// Render `questions` as CSV text.
pub fn to_csv(questions: &[TriviaQuestion]) -> Result<String, ExportError> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(CSV_HEADERS)?;
    let buf = header.into_inner().map_err(|e| e.into_error())?;

    let mut rows = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    for q in questions {
        rows.write_record([
            q.question.as_str(),
            q.option_a.as_str(),
            q.option_b.as_str(),
            q.option_c.as_str(),
            q.option_d.as_str(),
            q.correct_answer.map(|k| k.as_str()).unwrap_or(""),
        ])?;
    }
    let mut buf = rows.into_inner().map_err(|e| e.into_error())?;

    if buf.last() == Some(&b'\n') {
        buf.pop();
    }

    String::from_utf8(buf)
        .map_err(|e| ExportError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}

/// Write `csv` to [`DEFAULT_FILENAME`] inside `dir`, replacing any earlier
/// export. Returns the written path.
pub fn save_locally(dir: &Path, csv: &str) -> Result<PathBuf, ExportError> {
    if csv.is_empty() {
        return Err(ExportError::Empty);
    }
    std::fs::create_dir_all(dir)?;
    let path = dir.join(DEFAULT_FILENAME);
    std::fs::write(&path, csv)?;
    tracing::info!(path = %path.display(), bytes = csv.len(), "Saved CSV export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::AnswerKey;

    fn question(text: &str, answer: AnswerKey) -> TriviaQuestion {
        TriviaQuestion {
            question: text.to_string(),
            option_a: "A".to_string(),
            option_b: "B".to_string(),
            option_c: "C".to_string(),
            option_d: "D".to_string(),
            correct_answer: Some(answer),
        }
    }

    #[test]
    fn test_quotes_are_doubled() {
        let csv = to_csv(&[question(r#"Q1 "special""#, AnswerKey::A)]).unwrap();
        assert_eq!(
            csv,
            "Question,Option A,Option B,Option C,Option D,Correct Answer\n\"Q1 \"\"special\"\"\",\"A\",\"B\",\"C\",\"D\",\"A\""
        );
    }

    #[test]
    fn test_rows_in_list_order() {
        let csv = to_csv(&[
            question("first", AnswerKey::B),
            question("second", AnswerKey::C),
        ])
        .unwrap();

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("\"first\""));
        assert!(lines[1].ends_with("\"B\""));
        assert!(lines[2].starts_with("\"second\""));
    }

    #[test]
    fn test_commas_and_newlines_kept_verbatim() {
        let csv = to_csv(&[question("one, two\nthree", AnswerKey::D)]).unwrap();
        assert!(csv.contains("\"one, two\nthree\""));
    }

    #[test]
    fn test_empty_list_is_header_only() {
        let csv = to_csv(&[]).unwrap();
        assert_eq!(csv, CSV_HEADERS.join(","));
    }

    #[test]
    fn test_save_locally() {
        let dir = tempfile::tempdir().unwrap();
        let csv = to_csv(&[question("q", AnswerKey::A)]).unwrap();

        let path = save_locally(dir.path(), &csv).unwrap();
        assert_eq!(path.file_name().unwrap(), DEFAULT_FILENAME);
        assert_eq!(std::fs::read_to_string(path).unwrap(), csv);
    }

    #[test]
    fn test_publish_filename() {
        assert_eq!(
            publish_filename(1_700_000_000_123),
            "trivia_questions_1700000000123.csv"
        );
    }
}
