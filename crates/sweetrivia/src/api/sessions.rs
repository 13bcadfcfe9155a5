//! # Wizard API
//!
//! Every request resumes the wizard from the session's stored drafts, applies
//! one event and writes the result back. Nothing is kept in memory between
//! requests.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sweetrivia_core::{
    AnswerKey, Dispatched, Notice, QuestionDraft, Step, TriviaQuestion, Wizard, WizardEvent,
};
use sweetrivia_db::{ScopeSummary, ScopedArea};

use super::error::ApiError;
use super::AppState;

// ============================================================================
// Types
// ============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: String,
}

/// Where a session stands, plus any messages from the last action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub session_id: String,
    #[serde(flatten)]
    pub step: Step,
    pub question_count: Option<usize>,
    pub progress: Option<u8>,
    pub is_last_step: bool,
    /// Steps without a saved question
    pub missing: Vec<usize>,
    pub notices: Vec<Notice>,
}

#[derive(Debug, Deserialize)]
pub struct ChooseCountRequest {
    pub count: i64,
}

/// The draft shown for one step
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionView {
    pub step: usize,
    pub question_count: usize,
    pub progress: u8,
    pub is_last_step: bool,
    pub question: TriviaQuestion,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveQuestionRequest {
    pub question: String,
    pub option_a: String,
    pub option_b: String,
    pub option_c: String,
    pub option_d: String,
    /// Anything other than A-D is treated as no answer selected
    pub correct_answer: Option<String>,
    /// Move on to the next question after saving
    pub advance: bool,
}

impl SaveQuestionRequest {
    /// Missing or unreadable fields come through blank so the draft
    /// validation names them.
    fn into_question(self) -> TriviaQuestion {
        TriviaQuestion {
            question: self.question,
            option_a: self.option_a,
            option_b: self.option_b,
            option_c: self.option_c,
            option_d: self.option_d,
            correct_answer: self
                .correct_answer
                .and_then(|raw| raw.parse::<AnswerKey>().ok()),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishView {
    pub question_count: usize,
    pub questions: Vec<TriviaQuestion>,
}

// ============================================================================
// Handlers
// ============================================================================

pub async fn create_session() -> (StatusCode, Json<CreateSessionResponse>) {
    let session_id = format!("session-{}", Uuid::new_v4());
    tracing::info!(session = %session_id, "Created session");
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

pub async fn list_sessions(
    State(state): State<AppState>,
) -> Result<Json<Vec<ScopeSummary>>, ApiError> {
    let scopes = state
        .db
        .scopes()
        .and_then(|s| s.list())
        .map_err(sweetrivia_core::FlowError::from)?;
    Ok(Json(scopes))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let wizard = Wizard::open(state.db.area(&id))?;
    Ok(Json(view(&id, &wizard, Vec::new())))
}

pub async fn choose_count(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<ChooseCountRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let mut wizard = Wizard::open(state.db.area(&id))?;
    let notices = accepted(wizard.dispatch(WizardEvent::ChooseCount(request.count))?)?;
    Ok(Json(view(&id, &wizard, notices)))
}

pub async fn get_question(
    State(state): State<AppState>,
    Path((id, step)): Path<(String, usize)>,
) -> Result<Json<QuestionView>, ApiError> {
    let mut wizard = Wizard::open(state.db.area(&id))?;
    wizard.dispatch(WizardEvent::Open(step))?;
    question_view(&wizard, step).map(Json)
}

pub async fn save_question(
    State(state): State<AppState>,
    Path((id, step)): Path<(String, usize)>,
    Json(request): Json<SaveQuestionRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let advance = request.advance;
    let mut wizard = Wizard::open(state.db.area(&id))?;
    wizard.dispatch(WizardEvent::Open(step))?;
    wizard.dispatch(WizardEvent::Edit(QuestionDraft::from_question(
        step,
        request.into_question(),
    )))?;

    let event = if advance {
        WizardEvent::SaveAndContinue
    } else {
        WizardEvent::Save
    };
    let notices = accepted(wizard.dispatch(event)?)?;
    Ok(Json(view(&id, &wizard, notices)))
}

pub async fn finish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FinishView>, ApiError> {
    let mut wizard = Wizard::open(state.db.area(&id))?;
    wizard.dispatch(WizardEvent::Finish)?;
    let questions = wizard.completed_questions()?;
    Ok(Json(FinishView {
        question_count: questions.len(),
        questions,
    }))
}

pub async fn restart(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    // Corrupt stored values must not block a restart
    let mut wizard = match Wizard::open(state.db.area(&id)) {
        Ok(wizard) => wizard,
        Err(_) => Wizard::fresh(state.db.area(&id)),
    };
    let out = wizard.dispatch(WizardEvent::Restart)?;
    tracing::info!(session = %id, "Session restarted");
    Ok(Json(view(&id, &wizard, out.notices)))
}

// ============================================================================
// Helpers
// ============================================================================

/// Turn a refused event into a 422 carrying its single message.
fn accepted(out: Dispatched) -> Result<Vec<Notice>, ApiError> {
    match out.rejection {
        Some(rejection) => Err(rejection.into()),
        None => Ok(out.notices),
    }
}

fn view(id: &str, wizard: &Wizard<ScopedArea<'_>>, notices: Vec<Notice>) -> SessionView {
    let flow = wizard.flow();
    let session = flow.session();
    SessionView {
        session_id: id.to_string(),
        step: flow.step(),
        question_count: session.map(|s| s.question_count().get()),
        progress: flow.progress(),
        is_last_step: flow.is_last_step(),
        missing: session.map(|s| s.missing_steps()).unwrap_or_default(),
        notices,
    }
}

fn question_view(wizard: &Wizard<ScopedArea<'_>>, step: usize) -> Result<QuestionView, ApiError> {
    let flow = wizard.flow();
    let session = flow.session().ok_or(sweetrivia_core::FlowError::NotConfigured)?;
    let question = flow
        .draft()
        .map(|d| d.question().clone())
        .unwrap_or_default();

    Ok(QuestionView {
        step,
        question_count: session.question_count().get(),
        progress: session.progress(step),
        is_last_step: flow.is_last_step(),
        question,
    })
}
