//! `export` and `publish` commands, also used by the terminal wizard.

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};

use sweetrivia_core::export;
use sweetrivia_core::{DraftStore, TriviaQuestion, Wizard, WizardEvent};
use sweetrivia_db::Database;
use sweetrivia_logging::{LogEvent, Logger};
use sweetrivia_publish::{PublishReceipt, Publisher};

const NOTHING_TO_DOWNLOAD: &str = "No questions to download";
const NOTHING_TO_UPLOAD: &str = "No questions to upload";

/// Every question of a finished session. `empty` is the message reported
/// when there is nothing to hand out.
pub fn finished_questions<S: DraftStore>(store: S, empty: &str) -> Result<Vec<TriviaQuestion>> {
    let mut wizard = Wizard::open(store).map_err(|e| anyhow!(e.user_message()))?;
    wizard
        .dispatch(WizardEvent::Finish)
        .map_err(|e| anyhow!(e.user_message()))?;
    let questions = wizard
        .completed_questions()
        .map_err(|e| anyhow!(e.user_message()))?;

    if questions.is_empty() {
        anyhow::bail!("{}", empty);
    }
    Ok(questions)
}

/// Write the session's CSV into `dir`.
pub fn export_session(db: &Database, session: &str, dir: &Path, logger: &Logger) -> Result<PathBuf> {
    let questions = finished_questions(db.area(session), NOTHING_TO_DOWNLOAD)?;
    let csv = export::to_csv(&questions)?;
    let path = export::save_locally(dir, &csv)?;

    logger.log(&LogEvent::ExportWritten {
        session: session.to_string(),
        path: path.clone(),
        questions: questions.len(),
    });
    Ok(path)
}

/// Print the session's CSV to stdout.
pub fn print_session(db: &Database, session: &str) -> Result<()> {
    let questions = finished_questions(db.area(session), NOTHING_TO_DOWNLOAD)?;
    println!("{}", export::to_csv(&questions)?);
    Ok(())
}

/// Upload the session's CSV through `publisher`.
pub async fn publish_session(
    db: &Database,
    publisher: &Publisher,
    session: &str,
    logger: &Logger,
) -> Result<PublishReceipt> {
    let questions = finished_questions(db.area(session), NOTHING_TO_UPLOAD)?;
    let csv = export::to_csv(&questions)?;

    match publisher.publish(session, &csv).await {
        Ok(receipt) => {
            logger.log(&LogEvent::PublishCompleted {
                session: session.to_string(),
                filename: receipt.filename.clone(),
                download_url: receipt.download_url.clone(),
                metadata_error: receipt.metadata_error.clone(),
            });
            Ok(receipt)
        }
        Err(e) => {
            logger.log(&LogEvent::PublishFailed {
                session: session.to_string(),
                error: e.to_string(),
            });
            let message = e.user_message().to_string();
            Err(anyhow::Error::new(e).context(message))
        }
    }
}

pub fn handle_export_command(
    db: &Database,
    session: &str,
    dir: Option<PathBuf>,
    stdout: bool,
    logger: &Logger,
) -> Result<()> {
    if stdout {
        return print_session(db, session);
    }
    let dir = match dir {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };
    export_session(db, session, &dir, logger)?;
    Ok(())
}

pub async fn handle_publish_command(
    db: &Database,
    publisher: &Publisher,
    session: &str,
    json: bool,
    logger: &Logger,
) -> Result<()> {
    let receipt = publish_session(db, publisher, session, logger).await?;
    if json {
        println!("{}", serde_json::to_string_pretty(&receipt)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweetrivia_core::{AnswerKey, MemoryArea, QuestionDraft};
    use sweetrivia_logging::LogFormat;
    use sweetrivia_publish::LocalStorage;
    use std::sync::Arc;

    fn write_batch(db: &Database, session: &str, count: usize) {
        let mut wizard = Wizard::open(db.area(session)).unwrap();
        wizard
            .dispatch(WizardEvent::ChooseCount(count as i64))
            .unwrap();
        for step in 1..=count {
            let draft = QuestionDraft::empty(step)
                .with_question(format!("Question {}", step))
                .with_option(AnswerKey::A, "a")
                .with_option(AnswerKey::B, "b")
                .with_option(AnswerKey::C, "c")
                .with_option(AnswerKey::D, "d")
                .with_correct_answer(Some(AnswerKey::A));
            wizard.dispatch(WizardEvent::Edit(draft)).unwrap();
            wizard.dispatch(WizardEvent::SaveAndContinue).unwrap();
        }
    }

    #[test]
    fn test_unfinished_session_cannot_export() {
        let err = finished_questions(MemoryArea::new(), NOTHING_TO_DOWNLOAD).unwrap_err();
        assert_eq!(err.to_string(), "No questions found. Please start again.");
    }

    #[test]
    fn test_export_writes_csv_file() {
        let db = Database::open_in_memory().unwrap();
        write_batch(&db, "s1", 2);
        let dir = tempfile::tempdir().unwrap();

        let path = export_session(&db, "s1", dir.path(), &Logger::new(LogFormat::Json)).unwrap();

        assert_eq!(path, dir.path().join("trivia_questions.csv"));
        let content = std::fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().count(), 3);
        assert!(!content.ends_with('\n'));
    }

    #[tokio::test]
    async fn test_publish_session_to_local_bucket() {
        let db = Database::open_in_memory().unwrap();
        write_batch(&db, "s1", 1);
        let bucket = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(bucket.path()));
        let publisher = Publisher::new(storage.clone(), storage);

        let receipt = publish_session(&db, &publisher, "s1", &Logger::new(LogFormat::Json))
            .await
            .unwrap();

        assert!(bucket.path().join(&receipt.filename).exists());
    }

    #[tokio::test]
    async fn test_publish_empty_session() {
        let db = Database::open_in_memory().unwrap();
        let bucket = tempfile::tempdir().unwrap();
        let storage = Arc::new(LocalStorage::new(bucket.path()));
        let publisher = Publisher::new(storage.clone(), storage);

        let err = publish_session(&db, &publisher, "s1", &Logger::new(LogFormat::Json))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No questions found. Please start again.");
    }
}
