//! Research event handlers
//!
//! Engine failures come back as an error screen with status 200; only
//! malformed requests produce an [`ApiError`].

use crate::api::rest::extract::ApiJson;
use crate::api::rest::state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::ui::{EventResponse, ResearchFailure, Screen, UiEvent};
use axum::{extract::State, Json};
use research_types::SessionId;
use serde::Deserialize;

/// Slider range for the analyst count
pub const MAX_ANALYSTS_RANGE: std::ops::RangeInclusive<u32> = 1..=5;

fn default_max_analysts() -> u32 {
    3
}

/// Start research request
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub topic: String,
    #[serde(default = "default_max_analysts")]
    pub max_analysts: u32,
    /// Session this page held before, retired on start
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// Continue with feedback request
#[derive(Debug, Deserialize)]
pub struct ContinueRequest {
    #[serde(default)]
    pub session_id: Option<SessionId>,
    #[serde(default)]
    pub feedback: String,
}

/// Reset request
#[derive(Debug, Default, Deserialize)]
pub struct ResetRequest {
    #[serde(default)]
    pub session_id: Option<SessionId>,
}

/// Start a research session and run it to the first pause
pub async fn start_research(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<StartRequest>,
) -> ApiResult<Json<EventResponse>> {
    if req.topic.trim().is_empty() {
        return Err(ApiError::BadRequest("topic must not be blank".to_string()));
    }
    if !MAX_ANALYSTS_RANGE.contains(&req.max_analysts) {
        return Err(ApiError::Validation(format!(
            "max_analysts must be between {} and {}, got {}",
            MAX_ANALYSTS_RANGE.start(),
            MAX_ANALYSTS_RANGE.end(),
            req.max_analysts
        )));
    }

    let opened = state
        .sessions
        .begin_session(req.session_id.as_ref(), &req.topic, req.max_analysts)
        .await;
    if let Some(retired) = &opened.retired {
        state.gateway.release(retired).await;
    }
    let session = opened.id;

    let outcome = state
        .gateway
        .start(&session, &req.topic, req.max_analysts)
        .await;
    let screen = Screen::after_segment(outcome);
    state.sessions.record_screen(&session, screen.kind()).await;

    Ok(Json(EventResponse::project(
        UiEvent::Start,
        Some(session),
        screen.render(),
    )))
}

/// Forward feedback to the paused session and resume it
pub async fn continue_research(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ContinueRequest>,
) -> Json<EventResponse> {
    let live = match &req.session_id {
        Some(id) => state.sessions.contains(id).await,
        None => false,
    };
    let session = match req.session_id {
        Some(id) if live => id,
        other => {
            tracing::warn!(
                session = ?other.as_ref().map(SessionId::short),
                "feedback for unknown session"
            );
            let screen = Screen::Error(ResearchFailure::NoSession);
            return Json(EventResponse::project(
                UiEvent::Continue,
                None,
                screen.render(),
            ));
        }
    };

    let outcome = state.gateway.submit_feedback(&session, &req.feedback).await;
    let screen = Screen::after_segment(outcome);
    state.sessions.record_screen(&session, screen.kind()).await;

    Json(EventResponse::project(
        UiEvent::Continue,
        Some(session),
        screen.render(),
    ))
}

/// Drop the session and its engine thread, returning the page to its start screen.
///
/// The body is optional; a missing or unreadable one resets the page only.
pub async fn reset_research(
    State(state): State<AppState>,
    body: Option<ApiJson<ResetRequest>>,
) -> Json<EventResponse> {
    let req = body.map(|ApiJson(req)| req).unwrap_or_default();
    if let Some(id) = &req.session_id {
        if state.sessions.end_session(id).await {
            tracing::info!(session = %id.short(), "session reset");
            state.gateway.release(id).await;
        }
    }

    Json(EventResponse::project(
        UiEvent::Reset,
        None,
        Screen::Start.render(),
    ))
}
