use super::message::{GroundingUrl, Message};
use super::model::{DEFAULT_SESSION_TITLE, Session, derive_title};
use crate::attachment::Attachment;
use crate::chat::RemoteReply;
use crate::composer;
use crate::error::Result;
use crate::storage::{KeyValueStore, SESSIONS_KEY};
use std::sync::Arc;

/// Where a user message should go, decided before the message is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionTarget {
    /// Append to this existing session.
    Existing(String),
    /// No usable session; one must be created first.
    NeedsCreation,
}

/// Owns every chat session and the "current" pointer.
///
/// `SessionStore` is responsible for:
/// - Creating, selecting and deleting sessions
/// - Appending user and assistant messages
/// - Mirroring the full session list into a [`KeyValueStore`] after every
///   mutation
///
/// Sessions are kept newest-first. The current pointer is not persisted; on
/// startup the newest session becomes current.
pub struct SessionStore {
    sessions: Vec<Session>,
    current_session_id: Option<String>,
    storage: Arc<dyn KeyValueStore>,
    key: String,
}

impl SessionStore {
    /// Loads the persisted sessions, or starts empty.
    ///
    /// Missing, unreadable and unparseable snapshots all yield an empty store;
    /// the failure is logged and otherwise ignored.
    pub fn init(storage: Arc<dyn KeyValueStore>) -> Self {
        Self::init_with_key(storage, SESSIONS_KEY)
    }

    /// Same as [`SessionStore::init`] with a custom storage key.
    pub fn init_with_key(storage: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        let key = key.into();
        let sessions = Self::load_snapshot(storage.as_ref(), &key);
        let current_session_id = sessions.first().map(|s| s.id.clone());

        tracing::info!(
            "[SessionStore] Loaded {} session(s) from '{}'",
            sessions.len(),
            key
        );

        Self {
            sessions,
            current_session_id,
            storage,
            key,
        }
    }

    fn load_snapshot(storage: &dyn KeyValueStore, key: &str) -> Vec<Session> {
        let raw = match storage.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to read saved sessions: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Session>>(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::warn!("[SessionStore] Failed to load sessions: {}", e);
                Vec::new()
            }
        }
    }

    /// Writes the full session list. Write failures are logged; the
    /// in-memory state stays authoritative.
    fn persist(&self) {
        if let Err(e) = self.try_persist() {
            tracing::error!("[SessionStore] Failed to persist sessions: {}", e);
        }
    }

    fn try_persist(&self) -> Result<()> {
        let snapshot = serde_json::to_string(&self.sessions)?;
        self.storage.set(&self.key, &snapshot)
    }

    // ============================================================================
    // Queries
    // ============================================================================

    /// All sessions, newest first.
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn get(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.get(session_id).is_some()
    }

    pub fn current_session_id(&self) -> Option<&str> {
        self.current_session_id.as_deref()
    }

    pub fn current_session(&self) -> Option<&Session> {
        self.current_session_id
            .as_deref()
            .and_then(|id| self.get(id))
    }

    /// Decides whether a send can reuse `session_id` or needs a new session.
    ///
    /// An id that no longer exists (deleted in the meantime) needs creation.
    pub fn resolve_target(&self, session_id: Option<&str>) -> SessionTarget {
        match session_id {
            Some(id) if self.contains(id) => SessionTarget::Existing(id.to_string()),
            Some(id) => {
                tracing::debug!(
                    "[SessionStore] Session {} no longer exists, a new one will be created",
                    id
                );
                SessionTarget::NeedsCreation
            }
            None => SessionTarget::NeedsCreation,
        }
    }

    // ============================================================================
    // Mutations
    // ============================================================================

    /// Creates an empty session with the default title and makes it current.
    pub fn create_session(&mut self) -> String {
        let id = self.insert_session(DEFAULT_SESSION_TITLE.to_string());
        self.persist();
        id
    }

    fn insert_session(&mut self, title: String) -> String {
        let mut session = Session::new(title);
        while self.contains(&session.id) {
            session = Session::new(session.title);
        }

        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.current_session_id = Some(id.clone());

        tracing::debug!("[SessionStore] Created session {}", id);
        id
    }

    /// Makes `session_id` current. Unknown ids are ignored.
    ///
    /// Returns whether the pointer moved to `session_id`.
    pub fn select_session(&mut self, session_id: &str) -> bool {
        if !self.contains(session_id) {
            tracing::debug!("[SessionStore] Ignoring selection of unknown session {}", session_id);
            return false;
        }
        self.current_session_id = Some(session_id.to_string());
        true
    }

    /// Removes a session.
    ///
    /// When the deleted session was current, the newest remaining session
    /// becomes current, or none if the store is now empty.
    /// Returns whether a session was removed.
    pub fn delete_session(&mut self, session_id: &str) -> bool {
        let Some(index) = self.sessions.iter().position(|s| s.id == session_id) else {
            tracing::debug!("[SessionStore] Ignoring deletion of unknown session {}", session_id);
            return false;
        };

        self.sessions.remove(index);
        if self.current_session_id.as_deref() == Some(session_id) {
            self.current_session_id = self.sessions.first().map(|s| s.id.clone());
        }

        tracing::debug!("[SessionStore] Deleted session {}", session_id);
        self.persist();
        true
    }

    /// Appends a user message, creating the target session when needed.
    ///
    /// The first message of a session also fixes its title. The resolved
    /// session becomes current and its id is returned.
    pub fn append_user_message(
        &mut self,
        session_id: Option<&str>,
        text: &str,
        attachments: Vec<Attachment>,
    ) -> String {
        let id = match self.resolve_target(session_id) {
            SessionTarget::Existing(id) => id,
            SessionTarget::NeedsCreation => self.insert_session(derive_title(text)),
        };

        let message = composer::build_user_message(text, attachments);
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == id) {
            if session.messages.is_empty() {
                session.title = derive_title(text);
            }
            session.messages.push(message);
        }

        self.current_session_id = Some(id.clone());
        self.persist();
        id
    }

    /// Appends an assistant message to `session_id`.
    ///
    /// Returns `false` without touching anything when the session is gone,
    /// which happens when it was deleted while a reply was pending.
    pub fn append_assistant_message(
        &mut self,
        session_id: &str,
        text: impl Into<String>,
        thinking: Option<String>,
        grounding_urls: Option<Vec<GroundingUrl>>,
    ) -> bool {
        self.push_message(session_id, Message::assistant(text, thinking, grounding_urls))
    }

    /// Appends the assistant message built from a remote reply.
    pub fn append_reply(&mut self, session_id: &str, reply: RemoteReply) -> bool {
        self.push_message(session_id, composer::build_reply_message(reply))
    }

    fn push_message(&mut self, session_id: &str, message: Message) -> bool {
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == session_id) else {
            tracing::warn!(
                "[SessionStore] Dropping reply for missing session {}",
                session_id
            );
            return false;
        };

        session.messages.push(message);
        self.persist();
        true
    }
}
