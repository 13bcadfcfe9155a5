use sweetrivia_core::export::to_csv;
use sweetrivia_core::{
    AnswerKey, DraftStore, FlowError, KeyValueArea, MemoryArea, QuestionCount, QuestionDraft,
    Session, Step, TriviaQuestion, Wizard, WizardEvent, COUNT_KEY, QUESTIONS_KEY,
};

/// Helper: a fully filled draft for `step`.
fn draft(step: usize, text: &str, answer: AnswerKey) -> QuestionDraft {
    QuestionDraft::empty(step)
        .with_question(text)
        .with_option(AnswerKey::A, "Alpha")
        .with_option(AnswerKey::B, "Bravo")
        .with_option(AnswerKey::C, "Charlie")
        .with_option(AnswerKey::D, "Delta")
        .with_correct_answer(Some(answer))
}

// ============================================================
// Draft store round trips
// ============================================================

#[test]
fn test_session_round_trip_through_store() {
    let store = MemoryArea::new();
    let count = QuestionCount::new(3).unwrap();
    let session = Session::new(count);
    let session = draft(1, "first", AnswerKey::A).commit(&session).unwrap();
    let session = draft(3, "third", AnswerKey::C).commit(&session).unwrap();

    store.save_count(session.question_count()).unwrap();
    store.save_questions(session.slots()).unwrap();

    let loaded = store.load_session().unwrap().unwrap();
    assert_eq!(loaded, session);
    assert_eq!(loaded.question(3).unwrap().question, "third");
    assert!(loaded.question(2).is_none());
}

#[test]
fn test_restart_leaves_nothing_behind() {
    let mut wizard = Wizard::open(MemoryArea::new()).unwrap();
    wizard.dispatch(WizardEvent::ChooseCount(2)).unwrap();
    wizard
        .dispatch(WizardEvent::Edit(draft(1, "q", AnswerKey::B)))
        .unwrap();
    wizard.dispatch(WizardEvent::Save).unwrap();

    wizard.dispatch(WizardEvent::Restart).unwrap();

    let store = wizard.into_store();
    assert_eq!(store.load_count().unwrap(), None);
    assert!(store.load_questions().unwrap().is_empty());
    assert_eq!(store.get(COUNT_KEY).unwrap(), None);
    assert_eq!(store.get(QUESTIONS_KEY).unwrap(), None);
}

// ============================================================
// Full wizard runs
// ============================================================

#[test]
fn test_wizard_to_csv() {
    let mut wizard = Wizard::open(MemoryArea::new()).unwrap();
    wizard.dispatch(WizardEvent::ChooseCount(2)).unwrap();

    wizard
        .dispatch(WizardEvent::Edit(draft(1, "Who said \"hi\"?", AnswerKey::A)))
        .unwrap();
    wizard.dispatch(WizardEvent::SaveAndContinue).unwrap();
    assert!(wizard.flow().is_last_step());

    wizard
        .dispatch(WizardEvent::Edit(draft(2, "Second", AnswerKey::D)))
        .unwrap();
    wizard.dispatch(WizardEvent::SaveAndContinue).unwrap();
    assert_eq!(wizard.step(), Step::Finished);

    let csv = to_csv(&wizard.completed_questions().unwrap()).unwrap();
    let expected = [
        "Question,Option A,Option B,Option C,Option D,Correct Answer",
        "\"Who said \"\"hi\"\"?\",\"Alpha\",\"Bravo\",\"Charlie\",\"Delta\",\"A\"",
        "\"Second\",\"Alpha\",\"Bravo\",\"Charlie\",\"Delta\",\"D\"",
    ]
    .join("\n");
    assert_eq!(csv, expected);
}

#[test]
fn test_out_of_range_navigation_is_rejected() {
    let mut wizard = Wizard::open(MemoryArea::new()).unwrap();
    wizard.dispatch(WizardEvent::ChooseCount(5)).unwrap();

    let err = wizard.dispatch(WizardEvent::Open(6)).unwrap_err();
    assert_eq!(err, FlowError::StepOutOfRange { step: 6, count: 5 });
    assert_eq!(wizard.step(), Step::Editing(1));
}

#[test]
fn test_editing_a_saved_question_keeps_others() {
    let mut wizard = Wizard::open(MemoryArea::new()).unwrap();
    wizard.dispatch(WizardEvent::ChooseCount(2)).unwrap();
    wizard
        .dispatch(WizardEvent::Edit(draft(1, "original", AnswerKey::A)))
        .unwrap();
    wizard.dispatch(WizardEvent::SaveAndContinue).unwrap();
    wizard
        .dispatch(WizardEvent::Edit(draft(2, "second", AnswerKey::B)))
        .unwrap();
    wizard.dispatch(WizardEvent::Save).unwrap();

    wizard.dispatch(WizardEvent::Open(1)).unwrap();
    let reworded = wizard.flow().draft().unwrap().clone().with_question("reworded");
    wizard.dispatch(WizardEvent::Edit(reworded)).unwrap();
    wizard.dispatch(WizardEvent::Save).unwrap();

    let questions: Vec<TriviaQuestion> = wizard
        .store()
        .load_questions()
        .unwrap()
        .into_iter()
        .flatten()
        .collect();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].question, "reworded");
    assert_eq!(questions[1].question, "second");
}
