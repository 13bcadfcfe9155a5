//! `status` and `reset` commands.

use anyhow::{anyhow, Result};
use colored::Colorize;
use serde::Serialize;

use sweetrivia_core::{Step, Wizard, WizardEvent};
use sweetrivia_db::{Database, ScopeSummary};
use sweetrivia_logging::{LogEvent, Logger};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionStatus {
    session: String,
    #[serde(flatten)]
    step: Step,
    question_count: Option<usize>,
    saved: usize,
    missing: Vec<usize>,
}

pub fn handle_status_command(db: &Database, session: &str, all: bool, json: bool) -> Result<()> {
    if all {
        let scopes = db
            .scopes()
            .and_then(|s| s.list())
            .map_err(|e| {
                let message = e.user_message().to_string();
                anyhow::Error::new(e).context(message)
            })?;
        if json {
            println!("{}", serde_json::to_string_pretty(&scopes)?);
        } else if scopes.is_empty() {
            println!("{}", "No sessions found.".dimmed());
        } else {
            print_scopes_table(&scopes);
        }
        return Ok(());
    }

    let wizard = Wizard::open(db.area(session)).map_err(|e| anyhow!(e.user_message()))?;
    let flow = wizard.flow();
    let status = SessionStatus {
        session: session.to_string(),
        step: flow.step(),
        question_count: flow.session().map(|s| s.question_count().get()),
        saved: flow
            .session()
            .map(|s| s.slots().iter().flatten().count())
            .unwrap_or(0),
        missing: flow
            .session()
            .map(|s| s.missing_steps())
            .unwrap_or_default(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{} {}", "Session:".dimmed(), status.session.bold());
    println!("{} {}", "Step:".dimmed(), status.step);
    match status.question_count {
        Some(count) => {
            println!("{} {}/{}", "Saved:".dimmed(), status.saved, count);
            if !status.missing.is_empty() {
                let missing: Vec<String> = status.missing.iter().map(|s| s.to_string()).collect();
                println!("{} {}", "Missing:".dimmed(), missing.join(", "));
            }
        }
        None => println!("{}", "No question count chosen yet.".dimmed()),
    }
    Ok(())
}

pub fn handle_reset_command(db: &Database, session: &str, logger: &Logger) -> Result<()> {
    // A corrupt session is exactly what reset is for
    let mut wizard =
        Wizard::open(db.area(session)).unwrap_or_else(|_| Wizard::fresh(db.area(session)));
    wizard
        .dispatch(WizardEvent::Restart)
        .map_err(|e| anyhow!(e.user_message()))?;

    logger.log(&LogEvent::SessionCleared {
        session: session.to_string(),
    });
    Ok(())
}

fn print_scopes_table(scopes: &[ScopeSummary]) {
    println!(
        "{:<44} {:>9}  {}",
        "SESSION".bold(),
        "QUESTIONS".bold(),
        "UPDATED".bold()
    );
    for scope in scopes {
        println!(
            "{:<44} {:>9}  {}",
            scope.scope,
            scope.question_count.as_deref().unwrap_or("-"),
            scope.updated_at.format("%Y-%m-%d %H:%M").to_string().dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sweetrivia_core::{DraftStore, KeyValueArea, COUNT_KEY};
    use sweetrivia_logging::LogFormat;

    #[test]
    fn test_reset_clears_corrupt_session() {
        let db = Database::open_in_memory().unwrap();
        db.area("s1").set(COUNT_KEY, "lots").unwrap();

        handle_reset_command(&db, "s1", &Logger::new(LogFormat::Json)).unwrap();

        assert_eq!(db.area("s1").load_count().unwrap(), None);
    }

    #[test]
    fn test_status_of_empty_session() {
        let db = Database::open_in_memory().unwrap();
        handle_status_command(&db, "s1", false, true).unwrap();
        handle_status_command(&db, "s1", true, false).unwrap();
    }
}
