// @awa-component: API-SessionsHandler
//
//! Session inspection and clearing.

use axum::Json;
use axum::extract::{Path, Query, State};
use mentor_core::Category;

use crate::AppState;
use crate::models::{ClearSessionQuery, ClearSessionResponse, SessionsResponse, timestamp_now};

/// Category assumed when `DELETE` omits `userType`.
const CLEAR_DEFAULT_USER_TYPE: &str = "aspiring";

/// `DELETE /api/chat/{sessionId}` — clear one conversation. Succeeds whether
/// or not it existed.
pub async fn clear_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<ClearSessionQuery>,
) -> Json<ClearSessionResponse> {
    let category = Category::parse_or_default(Some(
        query.user_type.as_deref().unwrap_or(CLEAR_DEFAULT_USER_TYPE),
    ));
    state.relay.clear_session(category, &session_id);

    Json(ClearSessionResponse {
        message: "Chat session cleared".into(),
        session_id,
    })
}

/// `GET /api/sessions` — list active conversation keys for monitoring.
pub async fn list_sessions_handler(State(state): State<AppState>) -> Json<SessionsResponse> {
    let active = state.relay.list_active_sessions();
    Json(SessionsResponse {
        active_sessions: active.count,
        sessions: active.sessions,
        timestamp: timestamp_now(),
    })
}
