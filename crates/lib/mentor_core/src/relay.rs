// @awa-component: RELAY-ChatRelay
//
//! Session-scoped chat relay.
//!
//! Resolves a conversation for each `(category, session id)` pair, creating
//! it on first use, and forwards messages to it under a deadline.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::category::{Category, ConversationKey};
use crate::config::RelayConfig;
use crate::error::ChatError;
use crate::model::ChatModel;
use crate::store::{MemorySessionStore, Session, SessionStore};

/// Longest accepted message, in characters, after trimming.
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// A successful exchange.
#[derive(Debug, Clone)]
pub struct Reply {
    pub reply: String,
    pub category: Category,
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
}

/// Snapshot of stored conversation keys. Never carries conversation content.
#[derive(Debug, Clone)]
pub struct ActiveSessions {
    pub count: usize,
    /// Keys rendered as `category_sessionId`, sorted.
    pub sessions: Vec<String>,
}

/// Relay between callers and an upstream [`ChatModel`].
pub struct ChatRelay {
    model: Arc<dyn ChatModel>,
    store: Arc<dyn SessionStore>,
    config: RelayConfig,
}

impl ChatRelay {
    /// Create a relay with an in-memory session store.
    pub fn new(model: Arc<dyn ChatModel>, config: RelayConfig) -> Self {
        Self::with_store(model, Arc::new(MemorySessionStore::new()), config)
    }

    pub fn with_store(
        model: Arc<dyn ChatModel>,
        store: Arc<dyn SessionStore>,
        config: RelayConfig,
    ) -> Self {
        Self {
            model,
            store,
            config,
        }
    }

    /// Forward `message` to the conversation for `(category, session_id)`.
    ///
    /// An absent or unknown category falls back to [`Category::General`]; an
    /// absent session id falls back to `"default"`. The session survives any
    /// send failure, timeouts included.
    ///
    /// Waiting for an earlier turn on the same session and the upstream call
    /// are each bounded by `request_timeout`.
    pub async fn submit_message(
        &self,
        message: &str,
        category: Option<&str>,
        session_id: Option<&str>,
    ) -> Result<Reply, ChatError> {
        let text = validate_message(message)?;
        let key = ConversationKey::resolve(category, session_id);

        let (session, created) = self
            .store
            .get_or_try_insert_with(&key, &mut || self.start_session(&key))?;
        if created {
            info!(session = %key, model = self.model.name(), "new chat session created");
        }

        session.touch();
        let deadline = self.config.request_timeout;
        let mut conversation = tokio::time::timeout(deadline, session.conversation())
            .await
            .map_err(|_| {
                warn!(session = %key, ?deadline, "timed out waiting for previous turn");
                ChatError::Timeout(deadline)
            })?;
        session.touch();

        // On timeout the send future is dropped, so a late reply is never
        // appended to history.
        let outcome = tokio::time::timeout(deadline, conversation.send_message(text)).await;
        drop(conversation);
        session.touch();

        let reply = match outcome {
            Err(_) => {
                warn!(session = %key, ?deadline, "upstream request timed out");
                return Err(ChatError::Timeout(deadline));
            }
            Ok(Err(e)) => {
                let err = ChatError::from_upstream(e, deadline);
                error!(session = %key, error = %err, "error sending message");
                return Err(err);
            }
            Ok(Ok(reply)) => reply,
        };

        info!(session = %key, category = %key.category, "chat interaction");

        Ok(Reply {
            reply: reply.trim().to_string(),
            category: key.category,
            session_id: key.session_id,
            timestamp: Utc::now(),
        })
    }

    /// Remove the session for `(category, session_id)` if present.
    ///
    /// Returns whether a session was removed; clearing an absent session is
    /// not an error.
    pub fn clear_session(&self, category: Category, session_id: &str) -> bool {
        let key = ConversationKey::new(category, session_id);
        let removed = self.store.remove(&key).is_some();
        if removed {
            info!(session = %key, "chat session cleared");
        }
        removed
    }

    pub fn list_active_sessions(&self) -> ActiveSessions {
        let mut sessions: Vec<String> = self.store.keys().iter().map(ToString::to_string).collect();
        sessions.sort();
        ActiveSessions {
            count: sessions.len(),
            sessions,
        }
    }

    pub fn session(&self, key: &ConversationKey) -> Option<Arc<Session>> {
        self.store.get(key)
    }

    /// Evict sessions idle past the configured TTL. Returns how many were removed.
    pub fn evict_idle(&self) -> usize {
        let Some(ttl) = self.config.session_idle_ttl else {
            return 0;
        };
        let evicted = self.store.evict_idle(ttl);
        for key in &evicted {
            info!(session = %key, "idle chat session evicted");
        }
        evicted.len()
    }

    /// Drop every session. Returns how many were held.
    pub fn clear_all(&self) -> usize {
        let count = self.store.len();
        self.store.clear();
        count
    }

    /// Spawn the periodic idle sweeper. Returns `None` when eviction is disabled.
    pub fn spawn_idle_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> Option<JoinHandle<()>> {
        self.config.session_idle_ttl?;
        let relay = Arc::clone(self);
        let period = self.config.sweep_interval;
        Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = interval.tick() => {
                        relay.evict_idle();
                    }
                }
            }
            debug!("idle session sweeper stopped");
        }))
    }

    fn start_session(&self, key: &ConversationKey) -> Result<Session, ChatError> {
        let conversation = self
            .model
            .start_chat(key.category.instruction(), &self.config.generation)
            .map_err(|e| {
                error!(session = %key, error = %e, "failed to create chat session");
                ChatError::ModelInit(e.to_string())
            })?;
        Ok(Session::new(key.clone(), conversation))
    }
}

fn validate_message(message: &str) -> Result<&str, ChatError> {
    let text = message.trim();
    if text.is_empty() {
        return Err(ChatError::Validation("Message cannot be empty".into()));
    }
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(ChatError::Validation(format!(
            "Message must be at most {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(text)
}
