use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ParticipantId, RuleId};
use super::engine::DrawFailure;
use super::notify::Notifier;
use super::repository::ExchangeStore;
use super::service::{ExchangeServiceError, NewParticipant, NewRule, SecretSantaService};
use crate::import::{ImportError, ParticipantImporter};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventNameRequest {
    #[serde(default)]
    pub(crate) event_name: Option<String>,
}

/// Router builder exposing the organizer workflow over HTTP.
pub fn exchange_router<S, N>(service: Arc<SecretSantaService<S, N>>) -> Router
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    Router::new()
        .route(
            "/api/v1/exchange",
            get(snapshot_handler::<S, N>).delete(reset_handler::<S, N>),
        )
        .route("/api/v1/exchange/name", put(event_name_handler::<S, N>))
        .route(
            "/api/v1/exchange/participants",
            post(add_participant_handler::<S, N>),
        )
        .route(
            "/api/v1/exchange/participants/import",
            post(import_handler::<S, N>),
        )
        .route(
            "/api/v1/exchange/participants/:participant_id",
            delete(remove_participant_handler::<S, N>),
        )
        .route(
            "/api/v1/exchange/participants/:participant_id/organizer",
            post(toggle_organizer_handler::<S, N>),
        )
        .route("/api/v1/exchange/rules", post(add_rule_handler::<S, N>))
        .route(
            "/api/v1/exchange/rules/:rule_id",
            delete(remove_rule_handler::<S, N>),
        )
        .route("/api/v1/exchange/draw", post(draw_handler::<S, N>))
        .route(
            "/api/v1/exchange/assignments",
            delete(clear_assignments_handler::<S, N>),
        )
        .route("/api/v1/exchange/notify", post(notify_handler::<S, N>))
        .with_state(service)
}

pub(crate) async fn snapshot_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.snapshot() {
        Ok(record) => (StatusCode::OK, axum::Json(record)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn reset_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.reset() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn event_name_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    axum::Json(request): axum::Json<EventNameRequest>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.set_event_name(request.event_name) {
        Ok(event_name) => {
            (StatusCode::OK, axum::Json(json!({ "eventName": event_name }))).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn add_participant_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    axum::Json(new): axum::Json<NewParticipant>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.add_participant(new) {
        Ok(participant) => (StatusCode::CREATED, axum::Json(participant)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn import_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    body: String,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    let participants = match ParticipantImporter::from_reader(Cursor::new(body.into_bytes())) {
        Ok(participants) => participants,
        Err(error) => return import_error_response(&error),
    };

    match service.import_participants(participants) {
        Ok(imported) => (StatusCode::CREATED, axum::Json(imported)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn remove_participant_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    Path(participant_id): Path<String>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.remove_participant(&ParticipantId(participant_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn toggle_organizer_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    Path(participant_id): Path<String>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.toggle_organizer(&ParticipantId(participant_id)) {
        Ok(participant) => (StatusCode::OK, axum::Json(participant)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn add_rule_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    axum::Json(new): axum::Json<NewRule>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.add_rule(new) {
        Ok(rule) => (StatusCode::CREATED, axum::Json(rule)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn remove_rule_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
    Path(rule_id): Path<String>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.remove_rule(&RuleId(rule_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn draw_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.draw(&mut rand::thread_rng()) {
        Ok(assignments) => {
            (StatusCode::OK, axum::Json(json!({ "assignments": assignments }))).into_response()
        }
        Err(other) => error_response(other),
    }
}

pub(crate) async fn clear_assignments_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.clear_assignments() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) async fn notify_handler<S, N>(
    State(service): State<Arc<SecretSantaService<S, N>>>,
) -> Response
where
    S: ExchangeStore + 'static,
    N: Notifier + 'static,
{
    match service.notify() {
        Ok(report) => (StatusCode::OK, axum::Json(report)).into_response(),
        Err(other) => error_response(other),
    }
}

pub(crate) fn draw_failure_response(failure: &DrawFailure) -> Response {
    let payload = json!({
        "error": failure.to_string(),
        "details": failure.details(),
        "failure": failure,
    });
    (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
}

fn import_error_response(error: &ImportError) -> Response {
    let status = match error {
        ImportError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, axum::Json(json!({ "error": error.to_string() }))).into_response()
}

fn error_response(error: ExchangeServiceError) -> Response {
    let status = match &error {
        ExchangeServiceError::Draw(failure) => return draw_failure_response(failure),
        ExchangeServiceError::ParticipantNotFound(_) | ExchangeServiceError::RuleNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        ExchangeServiceError::InvalidParticipant(_)
        | ExchangeServiceError::InvalidRule(_)
        | ExchangeServiceError::Notify(super::notify::NotifyError::UnknownParticipant(_)) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ExchangeServiceError::NoAssignments => StatusCode::CONFLICT,
        ExchangeServiceError::Notify(_) => StatusCode::BAD_GATEWAY,
        ExchangeServiceError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}
