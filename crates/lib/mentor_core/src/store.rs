// @awa-component: RELAY-SessionStore
//
//! Session table — maps a [`ConversationKey`] to its live upstream conversation.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::MutexGuard;

use crate::category::ConversationKey;
use crate::error::ChatError;
use crate::model::Conversation;

/// A stored conversation handle.
///
/// Turns on one session are serialized by the inner async mutex so history
/// order always matches arrival order.
pub struct Session {
    key: ConversationKey,
    conversation: tokio::sync::Mutex<Box<dyn Conversation>>,
    created_at: Instant,
    last_active: Mutex<Instant>,
}

impl Session {
    pub fn new(key: ConversationKey, conversation: Box<dyn Conversation>) -> Self {
        let now = Instant::now();
        Self {
            key,
            conversation: tokio::sync::Mutex::new(conversation),
            created_at: now,
            last_active: Mutex::new(now),
        }
    }

    pub fn key(&self) -> &ConversationKey {
        &self.key
    }

    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Mark the session as used now.
    pub fn touch(&self) {
        *self.last_active.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    /// Wait for exclusive access to the upstream conversation.
    pub async fn conversation(&self) -> MutexGuard<'_, Box<dyn Conversation>> {
        self.conversation.lock().await
    }

    /// Whether a turn currently holds the conversation.
    pub fn is_busy(&self) -> bool {
        self.conversation.try_lock().is_err()
    }

    /// Number of turns recorded by the upstream conversation.
    pub async fn history_len(&self) -> usize {
        self.conversation.lock().await.history_len()
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("key", &self.key)
            .field("age", &self.age())
            .field("idle_for", &self.idle_for())
            .finish()
    }
}

/// Storage for live sessions.
///
/// Implementations must make [`SessionStore::get_or_try_insert_with`] atomic
/// per key: concurrent callers for the same absent key observe exactly one
/// inserted session, and a failed `init` leaves no entry behind.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &ConversationKey) -> Option<Arc<Session>>;

    /// Return the session for `key`, creating it with `init` if absent.
    ///
    /// The boolean is `true` when this call created the session.
    fn get_or_try_insert_with(
        &self,
        key: &ConversationKey,
        init: &mut dyn FnMut() -> Result<Session, ChatError>,
    ) -> Result<(Arc<Session>, bool), ChatError>;

    /// Remove the session for `key`, returning it if it existed.
    fn remove(&self, key: &ConversationKey) -> Option<Arc<Session>>;

    /// Point-in-time snapshot of stored keys.
    fn keys(&self) -> Vec<ConversationKey>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle for longer than `max_idle`, returning their keys.
    /// Sessions with a turn in flight are kept.
    fn evict_idle(&self, max_idle: Duration) -> Vec<ConversationKey>;

    fn clear(&self);
}

/// In-process [`SessionStore`] backed by a sharded concurrent map.
///
/// Keys in different shards never contend; the entry API holds the shard
/// lock across lookup and insert.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: DashMap<ConversationKey, Arc<Session>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, key: &ConversationKey) -> Option<Arc<Session>> {
        self.sessions.get(key).map(|s| Arc::clone(s.value()))
    }

    fn get_or_try_insert_with(
        &self,
        key: &ConversationKey,
        init: &mut dyn FnMut() -> Result<Session, ChatError>,
    ) -> Result<(Arc<Session>, bool), ChatError> {
        match self.sessions.entry(key.clone()) {
            Entry::Occupied(e) => Ok((Arc::clone(e.get()), false)),
            Entry::Vacant(e) => {
                let session = Arc::new(init()?);
                e.insert(Arc::clone(&session));
                Ok((session, true))
            }
        }
    }

    fn remove(&self, key: &ConversationKey) -> Option<Arc<Session>> {
        self.sessions.remove(key).map(|(_, s)| s)
    }

    fn keys(&self) -> Vec<ConversationKey> {
        self.sessions.iter().map(|e| e.key().clone()).collect()
    }

    fn len(&self) -> usize {
        self.sessions.len()
    }

    fn evict_idle(&self, max_idle: Duration) -> Vec<ConversationKey> {
        let stale: Vec<ConversationKey> = self
            .sessions
            .iter()
            .filter(|e| is_evictable(e.value(), max_idle))
            .map(|e| e.key().clone())
            .collect();

        // Re-check under the shard lock: a request may have touched the
        // session since the scan.
        stale
            .into_iter()
            .filter(|key| {
                self.sessions
                    .remove_if(key, |_, s| is_evictable(s, max_idle))
                    .is_some()
            })
            .collect()
    }

    fn clear(&self) {
        self.sessions.clear();
    }
}

fn is_evictable(session: &Session, max_idle: Duration) -> bool {
    session.idle_for() > max_idle && !session.is_busy()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::config::GenerationParams;
    use crate::model::ChatModel;
    use crate::model::local::LocalModel;

    fn session(key: &ConversationKey) -> Result<Session, ChatError> {
        let conversation = LocalModel::new()
            .start_chat(key.category.instruction(), &GenerationParams::default())
            .map_err(|e| ChatError::ModelInit(e.to_string()))?;
        Ok(Session::new(key.clone(), conversation))
    }

    #[test]
    fn insert_then_reuse() {
        let store = MemorySessionStore::new();
        let key = ConversationKey::new(Category::Aspiring, "s1");

        let (first, created) = store.get_or_try_insert_with(&key, &mut || session(&key)).unwrap();
        assert!(created);
        let (second, created) = store.get_or_try_insert_with(&key, &mut || session(&key)).unwrap();
        assert!(!created);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn failed_init_leaves_no_entry() {
        let store = MemorySessionStore::new();
        let key = ConversationKey::new(Category::General, "s1");

        let result = store.get_or_try_insert_with(&key, &mut || {
            Err::<Session, _>(ChatError::ModelInit("boom".into()))
        });

        assert!(matches!(result, Err(ChatError::ModelInit(_))));
        assert!(store.is_empty());
        assert!(store.get(&key).is_none());
    }

    #[test]
    fn remove_is_idempotent() {
        let store = MemorySessionStore::new();
        let key = ConversationKey::new(Category::Existing, "s1");
        store.get_or_try_insert_with(&key, &mut || session(&key)).unwrap();

        assert!(store.remove(&key).is_some());
        assert!(store.remove(&key).is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn keys_is_a_snapshot() {
        let store = MemorySessionStore::new();
        for sid in ["a", "b"] {
            let key = ConversationKey::new(Category::General, sid);
            store.get_or_try_insert_with(&key, &mut || session(&key)).unwrap();
        }
        let snapshot = store.keys();
        store.clear();

        assert_eq!(snapshot.len(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn evict_idle_removes_only_stale_sessions() {
        let store = MemorySessionStore::new();
        let old = ConversationKey::new(Category::General, "old");
        let fresh = ConversationKey::new(Category::General, "fresh");
        store.get_or_try_insert_with(&old, &mut || session(&old)).unwrap();

        std::thread::sleep(Duration::from_millis(200));
        store.get_or_try_insert_with(&fresh, &mut || session(&fresh)).unwrap();

        let evicted = store.evict_idle(Duration::from_millis(100));
        assert_eq!(evicted, vec![old.clone()]);
        assert!(store.get(&old).is_none());
        assert!(store.get(&fresh).is_some());
    }

    #[test]
    fn busy_session_survives_eviction() {
        let store = MemorySessionStore::new();
        let key = ConversationKey::new(Category::General, "busy");
        let (s, _) = store.get_or_try_insert_with(&key, &mut || session(&key)).unwrap();
        std::thread::sleep(Duration::from_millis(200));

        let guard = s.conversation.try_lock().unwrap();
        assert!(s.is_busy());
        assert!(store.evict_idle(Duration::from_millis(100)).is_empty());

        drop(guard);
        assert_eq!(store.evict_idle(Duration::from_millis(100)), vec![key]);
    }

    #[test]
    fn touch_resets_idle_time() {
        let key = ConversationKey::new(Category::General, "s");
        let s = session(&key).unwrap();
        std::thread::sleep(Duration::from_millis(50));
        assert!(s.idle_for() >= Duration::from_millis(50));
        s.touch();
        assert!(s.idle_for() < Duration::from_millis(50));
    }
}
