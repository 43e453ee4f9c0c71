use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::allocation::{AllocationState, OverrideIntent, OverrideStatus};
use super::charge::PlayerCharge;
use super::domain::Roster;
use super::report::CapReport;
use super::rules::PoolTotals;
use super::service::{CapComplianceService, CapServiceError};
use super::session::{SessionError, SessionId, SessionRepository};
use super::signing::{RosterSlotStatus, SigningCandidate};

#[derive(Debug, Deserialize)]
pub(crate) struct ChargesRequest {
    pub(crate) roster: Roster,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChargesResponse {
    pub(crate) charges: Vec<PlayerCharge>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OpenSessionRequest {
    pub(crate) roster: Roster,
    #[serde(default)]
    pub(crate) pools: Option<PoolTotals>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SessionView {
    pub(crate) session_id: SessionId,
    pub(crate) report: CapReport,
}

#[derive(Debug, Serialize)]
pub(crate) struct OverrideResponse {
    pub(crate) session_id: SessionId,
    pub(crate) status: OverrideStatus,
    pub(crate) summary: String,
    pub(crate) report: CapReport,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SigningRequest {
    pub(crate) candidate: SigningCandidate,
    #[serde(default)]
    pub(crate) slots: RosterSlotStatus,
}

/// Router builder exposing charge, allocation and signing endpoints.
pub fn cap_router<S>(service: Arc<CapComplianceService<S>>) -> Router
where
    S: SessionRepository + 'static,
{
    Router::new()
        .route("/api/v1/cap/charges", post(charges_handler::<S>))
        .route("/api/v1/cap/sessions", post(open_session_handler::<S>))
        .route("/api/v1/cap/sessions/:session_id", get(session_handler::<S>))
        .route(
            "/api/v1/cap/sessions/:session_id/overrides",
            post(override_handler::<S>),
        )
        .route(
            "/api/v1/cap/sessions/:session_id/reset",
            post(reset_handler::<S>),
        )
        .route(
            "/api/v1/cap/sessions/:session_id/signings",
            post(signing_handler::<S>),
        )
        .with_state(service)
}

fn report_for(state: &AllocationState) -> CapReport {
    state.report(Local::now().date_naive())
}

fn error_response(error: CapServiceError) -> Response {
    let status = match &error {
        CapServiceError::Session(SessionError::NotFound) => StatusCode::NOT_FOUND,
        CapServiceError::Session(SessionError::Conflict) => StatusCode::CONFLICT,
        CapServiceError::Rules(_) | CapServiceError::Session(SessionError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn charges_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    axum::Json(request): axum::Json<ChargesRequest>,
) -> Response
where
    S: SessionRepository + 'static,
{
    let charges = service.charges(&request.roster);
    (StatusCode::OK, axum::Json(ChargesResponse { charges })).into_response()
}

pub(crate) async fn open_session_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    axum::Json(request): axum::Json<OpenSessionRequest>,
) -> Response
where
    S: SessionRepository + 'static,
{
    let pools = request
        .pools
        .unwrap_or_else(|| service.default_pools().clone());
    match service.open_session(request.roster, pools) {
        Ok(session) => {
            let view = SessionView {
                report: report_for(&session.state),
                session_id: session.id,
            };
            (StatusCode::CREATED, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn session_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionRepository + 'static,
{
    match service.session(&SessionId(session_id)) {
        Ok(session) => {
            let view = SessionView {
                report: report_for(&session.state),
                session_id: session.id,
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn override_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(intent): axum::Json<OverrideIntent>,
) -> Response
where
    S: SessionRepository + 'static,
{
    let id = SessionId(session_id);
    match service.override_allocation(&id, &intent) {
        Ok(outcome) => {
            let status = if outcome.is_applied() {
                StatusCode::OK
            } else {
                StatusCode::UNPROCESSABLE_ENTITY
            };
            let body = OverrideResponse {
                session_id: id,
                summary: outcome.status.summary(),
                report: report_for(&outcome.state),
                status: outcome.status,
            };
            (status, axum::Json(body)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn reset_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    Path(session_id): Path<String>,
) -> Response
where
    S: SessionRepository + 'static,
{
    let id = SessionId(session_id);
    match service.reset(&id) {
        Ok(state) => {
            let view = SessionView {
                session_id: id,
                report: report_for(&state),
            };
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn signing_handler<S>(
    State(service): State<Arc<CapComplianceService<S>>>,
    Path(session_id): Path<String>,
    axum::Json(request): axum::Json<SigningRequest>,
) -> Response
where
    S: SessionRepository + 'static,
{
    match service.assess_signing(&SessionId(session_id), &request.candidate, &request.slots) {
        Ok(assessment) => (StatusCode::OK, axum::Json(assessment)).into_response(),
        Err(err) => error_response(err),
    }
}
