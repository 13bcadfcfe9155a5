//! Interactive terminal wizard.
//!
//! Walks the author through choosing a count, writing each question and
//! exporting the batch. Progress is written after every save, so quitting
//! and running the wizard again picks up where it stopped.

use anyhow::Result;
use colored::Colorize;
use dialoguer::{Input, Select};

use sweetrivia_core::{
    AnswerKey, DraftError, FlowError, QuestionDraft, Step, Wizard, WizardEvent,
};
use sweetrivia_db::{Database, ScopedArea};
use sweetrivia_logging::{LogEvent, Logger};
use sweetrivia_publish::Publisher;

use crate::export::{export_session, publish_session};

/// What to do after the draft fields were entered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EditAction {
    SaveAndContinue,
    Save,
    GoTo,
    StartOver,
    Quit,
}

/// Choices on the completion screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishAction {
    SaveCsv,
    Publish,
    CreateNew,
    Quit,
}

pub async fn handle_wizard_command(
    db: &Database,
    publisher: &Publisher,
    session: &str,
    logger: &Logger,
) -> Result<()> {
    let mut wizard = match open_or_recover(db, session)? {
        Some(wizard) => wizard,
        None => return Ok(()),
    };

    logger.log(&LogEvent::WizardStarted {
        session: session.to_string(),
        question_count: wizard
            .flow()
            .session()
            .map(|s| s.question_count().get()),
    });

    loop {
        match wizard.step() {
            Step::Configuring => configure(&mut wizard, session, logger)?,
            Step::Editing(step) => {
                if !edit(&mut wizard, step, session, logger)? {
                    eprintln!("{}", "Progress saved. Run the wizard again to continue.".dimmed());
                    return Ok(());
                }
            }
            Step::Finished => {
                if !finish(&mut wizard, db, publisher, session, logger).await? {
                    return Ok(());
                }
            }
        }
    }
}

/// Resume the session. A session whose stored values are corrupt can only
/// be started over; `None` means the author declined.
fn open_or_recover<'db>(db: &'db Database, session: &str) -> Result<Option<Wizard<ScopedArea<'db>>>> {
    match Wizard::open(db.area(session)) {
        Ok(wizard) => Ok(Some(wizard)),
        Err(FlowError::Store(err @ DraftError::Corrupt { .. })) => {
            eprintln!("{} {}", "✗".bright_red(), err.user_message().bright_red());
            let choice = Select::new()
                .with_prompt("What would you like to do?")
                .items(&["Start again", "Quit"])
                .default(0)
                .interact()?;
            if choice != 0 {
                return Ok(None);
            }
            let mut wizard = Wizard::fresh(db.area(session));
            wizard.dispatch(WizardEvent::Restart)?;
            Ok(Some(wizard))
        }
        Err(e) => Err(anyhow::anyhow!(e.user_message())),
    }
}

fn configure(wizard: &mut Wizard<ScopedArea<'_>>, session: &str, logger: &Logger) -> Result<()> {
    eprintln!();
    eprintln!("{}", "Create a new trivia batch".bold());

    let raw: String = Input::new()
        .with_prompt("How many questions? (1-50)")
        .interact_text()?;

    let Ok(count) = raw.trim().parse::<i64>() else {
        reject(session, "Please enter a number", logger);
        return Ok(());
    };

    let out = wizard.dispatch(WizardEvent::ChooseCount(count))?;
    match out.rejection {
        Some(rejection) => reject(session, &rejection.to_string(), logger),
        None => logger.log(&LogEvent::CountChosen {
            session: session.to_string(),
            question_count: count as usize,
        }),
    }
    Ok(())
}

/// Edit one question. Returns `false` when the author quits.
fn edit(
    wizard: &mut Wizard<ScopedArea<'_>>,
    step: usize,
    session: &str,
    logger: &Logger,
) -> Result<bool> {
    let flow = wizard.flow();
    let count = flow
        .session()
        .map(|s| s.question_count().get())
        .unwrap_or(step);
    logger.log(&LogEvent::StepEntered {
        session: session.to_string(),
        step,
        question_count: count,
        progress: flow.progress().unwrap_or(0),
    });

    let is_last = flow.is_last_step();
    let current = flow
        .draft()
        .cloned()
        .unwrap_or_else(|| QuestionDraft::empty(step));
    let draft = prompt_draft(current)?;
    wizard.dispatch(WizardEvent::Edit(draft))?;

    let mut actions = vec![
        (
            if is_last { "Finish" } else { "Save and continue" },
            EditAction::SaveAndContinue,
        ),
        ("Save", EditAction::Save),
    ];
    if count > 1 {
        actions.push(("Go to question...", EditAction::GoTo));
    }
    actions.push(("Start over", EditAction::StartOver));
    actions.push(("Quit", EditAction::Quit));

    let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();
    let selection = Select::new()
        .with_prompt("Next")
        .items(&labels)
        .default(0)
        .interact()?;

    match actions[selection].1 {
        EditAction::SaveAndContinue | EditAction::Save => {
            let event = if actions[selection].1 == EditAction::Save {
                WizardEvent::Save
            } else {
                WizardEvent::SaveAndContinue
            };
            let out = wizard.dispatch(event)?;
            match out.rejection {
                Some(rejection) => reject(session, &rejection.to_string(), logger),
                None => logger.log(&LogEvent::QuestionSaved {
                    session: session.to_string(),
                    step,
                }),
            }
        }
        EditAction::GoTo => {
            let target: usize = Input::new()
                .with_prompt(format!("Question number (1-{})", count))
                .interact_text()?;
            if let Err(e) = wizard.dispatch(WizardEvent::Open(target)) {
                reject(session, &e.user_message(), logger);
            }
        }
        EditAction::StartOver => restart(wizard, session, logger)?,
        EditAction::Quit => return Ok(false),
    }
    Ok(true)
}

/// Ask for every field, prefilled with the draft's current values.
fn prompt_draft(draft: QuestionDraft) -> Result<QuestionDraft> {
    let text: String = Input::new()
        .with_prompt("Question")
        .with_initial_text(draft.question().question.clone())
        .allow_empty(true)
        .interact_text()?;
    let mut draft = draft.with_question(text);

    for key in AnswerKey::ALL {
        let option: String = Input::new()
            .with_prompt(format!("Option {}", key))
            .with_initial_text(draft.question().option(key).to_string())
            .allow_empty(true)
            .interact_text()?;
        draft = draft.with_option(key, option);
    }

    let labels: Vec<String> = AnswerKey::ALL
        .iter()
        .map(|key| format!("{}: {}", key, draft.question().option(*key)))
        .collect();
    let default = draft
        .question()
        .correct_answer
        .and_then(|k| AnswerKey::ALL.iter().position(|a| *a == k))
        .unwrap_or(0);
    let selection = Select::new()
        .with_prompt("Correct answer")
        .items(&labels)
        .default(default)
        .interact()?;

    Ok(draft.with_correct_answer(Some(AnswerKey::ALL[selection])))
}

/// Completion screen. Returns `false` when the author quits.
async fn finish(
    wizard: &mut Wizard<ScopedArea<'_>>,
    db: &Database,
    publisher: &Publisher,
    session: &str,
    logger: &Logger,
) -> Result<bool> {
    let questions = wizard.completed_questions()?;
    logger.log(&LogEvent::Finished {
        session: session.to_string(),
        questions: questions.len(),
    });

    eprintln!();
    eprintln!("{}", "All Done!".bold().bright_green());
    eprintln!("You've created {} trivia questions.", questions.len());
    for (i, q) in questions.iter().enumerate() {
        eprintln!();
        eprintln!("  {}. {}", i + 1, q.question.bold());
        for key in AnswerKey::ALL {
            eprintln!("     {}: {}", key, q.option(key));
        }
        if let Some(answer) = q.correct_answer {
            eprintln!("     {} {}", "Correct:".bright_magenta(), answer);
        }
    }
    eprintln!();

    let actions = [
        ("Save CSV", FinishAction::SaveCsv),
        ("Publish", FinishAction::Publish),
        ("Create new trivia", FinishAction::CreateNew),
        ("Quit", FinishAction::Quit),
    ];
    let labels: Vec<&str> = actions.iter().map(|(label, _)| *label).collect();

    loop {
        let selection = Select::new()
            .with_prompt("What next?")
            .items(&labels)
            .default(0)
            .interact()?;

        match actions[selection].1 {
            FinishAction::SaveCsv => {
                let dir = std::env::current_dir()?;
                if let Err(e) = export_session(db, session, &dir, logger) {
                    reject(session, &e.to_string(), logger);
                }
            }
            FinishAction::Publish => {
                eprintln!("{}", "Uploading...".dimmed());
                // Failures were already reported through the logger
                let _ = publish_session(db, publisher, session, logger).await;
            }
            FinishAction::CreateNew => {
                restart(wizard, session, logger)?;
                return Ok(true);
            }
            FinishAction::Quit => return Ok(false),
        }
    }
}

fn restart(wizard: &mut Wizard<ScopedArea<'_>>, session: &str, logger: &Logger) -> Result<()> {
    wizard.dispatch(WizardEvent::Restart)?;
    logger.log(&LogEvent::SessionCleared {
        session: session.to_string(),
    });
    Ok(())
}

fn reject(session: &str, message: &str, logger: &Logger) {
    logger.log(&LogEvent::InputRejected {
        session: session.to_string(),
        message: message.to_string(),
    });
}
