//! Route path constants.

/// POST /api/chat — send a message to the session's conversation
pub const POST_API_CHAT: &str = "/api/chat";

/// DELETE /api/chat/{sessionId} — clear one conversation
pub const DELETE_API_CHAT_SESSIONID: &str = "/api/chat/{sessionId}";

/// GET /api/health — liveness check
pub const GET_API_HEALTH: &str = "/api/health";

/// GET /api/sessions — list active conversation keys
pub const GET_API_SESSIONS: &str = "/api/sessions";
