use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Json};

use sweetrivia_core::export::{self, DEFAULT_FILENAME};
use sweetrivia_core::{ExportError, Wizard, WizardEvent};
use sweetrivia_publish::PublishReceipt;

use super::error::ApiError;
use super::AppState;

pub async fn export_csv(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let csv = finished_csv(&state, &id)?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", DEFAULT_FILENAME),
            ),
        ],
        csv,
    ))
}

pub async fn publish(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PublishReceipt>, ApiError> {
    let csv = finished_csv(&state, &id)?;
    let receipt = state.publisher.publish(&id, &csv).await?;
    Ok(Json(receipt))
}

/// CSV of a session whose questions are all written.
fn finished_csv(state: &AppState, id: &str) -> Result<String, ApiError> {
    let mut wizard = Wizard::open(state.db.area(id))?;
    wizard.dispatch(WizardEvent::Finish)?;

    let questions = wizard.completed_questions()?;
    if questions.is_empty() {
        return Err(ExportError::Empty.into());
    }
    Ok(export::to_csv(&questions)?)
}
