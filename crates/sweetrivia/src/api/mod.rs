mod error;
mod export;
mod sessions;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use sweetrivia_db::Database;
use sweetrivia_publish::Publisher;

#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Database>,
    pub publisher: Arc<Publisher>,
}

pub fn create_router(db: Arc<Database>, publisher: Arc<Publisher>) -> Router {
    let state = AppState { db, publisher };

    Router::new()
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route("/api/sessions/{id}", get(sessions::get_session))
        .route("/api/sessions/{id}/count", post(sessions::choose_count))
        .route(
            "/api/sessions/{id}/questions/{n}",
            get(sessions::get_question).put(sessions::save_question),
        )
        .route("/api/sessions/{id}/finish", get(sessions::finish))
        .route("/api/sessions/{id}/restart", post(sessions::restart))
        .route("/api/sessions/{id}/export.csv", get(export::export_csv))
        .route("/api/sessions/{id}/publish", post(export::publish))
        .layer(CorsLayer::permissive())
        .with_state(state)
}
