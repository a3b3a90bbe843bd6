//! Chat use case.
//!
//! `ChatUseCase` owns the control flow of a conversation turn: it consumes the
//! staged attachments, records the user message, calls the remote adapter
//! without holding the store lock and records the reply.

use crate::pending_attachments::PendingAttachments;
use parley_core::attachment::Attachment;
use parley_core::chat::{ChatMode, ChatOptions, ChatRequest, RemoteChatAdapter, RemoteReply};
use parley_core::composer;
use parley_core::session::{Session, SessionStore};
use parley_core::{ParleyError, Result};
use parley_infrastructure::{AttachmentReader, IngestReport};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Result of a completed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    /// Session the turn was recorded in
    pub session_id: String,
    /// Reply as returned by the remote service
    pub reply: RemoteReply,
    /// `false` when the session was deleted while the reply was pending
    pub stored: bool,
}

/// Clears the loading flag on every exit path of a send.
struct LoadingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> LoadingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ParleyError::Busy)?;
        Ok(Self { flag })
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

pub struct ChatUseCase {
    store: Mutex<SessionStore>,
    adapter: Arc<dyn RemoteChatAdapter>,
    attachment_reader: AttachmentReader,
    pending: Mutex<PendingAttachments>,
    options: RwLock<ChatOptions>,
    loading: AtomicBool,
}

impl ChatUseCase {
    pub fn new(
        store: SessionStore,
        adapter: Arc<dyn RemoteChatAdapter>,
        options: ChatOptions,
    ) -> Self {
        Self {
            store: Mutex::new(store),
            adapter,
            attachment_reader: AttachmentReader::new(),
            pending: Mutex::new(PendingAttachments::new()),
            options: RwLock::new(options),
            loading: AtomicBool::new(false),
        }
    }

    /// Whether a reply is currently being generated.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    // ============================================================================
    // Sessions
    // ============================================================================

    /// Snapshot of all sessions, newest first.
    pub async fn sessions(&self) -> Vec<Session> {
        self.store.lock().await.sessions().to_vec()
    }

    pub async fn current_session(&self) -> Option<Session> {
        self.store.lock().await.current_session().cloned()
    }

    pub async fn current_session_id(&self) -> Option<String> {
        self.store
            .lock()
            .await
            .current_session_id()
            .map(str::to_string)
    }

    pub async fn new_session(&self) -> String {
        self.store.lock().await.create_session()
    }

    pub async fn select_session(&self, session_id: &str) -> Result<()> {
        if self.store.lock().await.select_session(session_id) {
            Ok(())
        } else {
            Err(ParleyError::not_found("Session", session_id))
        }
    }

    pub async fn delete_session(&self, session_id: &str) -> Result<()> {
        if self.store.lock().await.delete_session(session_id) {
            Ok(())
        } else {
            Err(ParleyError::not_found("Session", session_id))
        }
    }

    // ============================================================================
    // Options
    // ============================================================================

    pub async fn options(&self) -> ChatOptions {
        *self.options.read().await
    }

    /// Flips deep thinking and returns the new value.
    pub async fn toggle_deep_thinking(&self) -> bool {
        let mut options = self.options.write().await;
        options.deep_thinking = !options.deep_thinking;
        options.deep_thinking
    }

    /// Flips web search and returns the new value.
    pub async fn toggle_web_search(&self) -> bool {
        let mut options = self.options.write().await;
        options.web_search = !options.web_search;
        options.web_search
    }

    pub async fn set_mode(&self, mode: ChatMode) {
        self.options.write().await.mode = mode;
    }

    // ============================================================================
    // Attachments
    // ============================================================================

    /// Reads and validates `paths`, staging every accepted file.
    pub async fn attach_files<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let report = self.attachment_reader.ingest(paths).await;
        self.pending
            .lock()
            .await
            .stage(report.accepted.iter().cloned());
        report
    }

    pub async fn stage_attachments(&self, attachments: Vec<Attachment>) {
        self.pending.lock().await.stage(attachments);
    }

    pub async fn remove_pending(&self, index: usize) -> Option<Attachment> {
        self.pending.lock().await.remove(index)
    }

    pub async fn pending_attachments(&self) -> Vec<Attachment> {
        self.pending.lock().await.list().to_vec()
    }

    // ============================================================================
    // Send
    // ============================================================================

    /// Sends `text` plus the staged attachments in the current session.
    ///
    /// A session is created when none is selected. A remote failure leaves
    /// the user message in place and adds no reply.
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let mut pending = self.pending.lock().await;
        if text.trim().is_empty() && pending.is_empty() {
            return Err(ParleyError::validation(
                "Type a message or attach a file before sending",
            ));
        }

        let _loading = LoadingGuard::acquire(&self.loading)?;
        let attachments = pending.take();
        drop(pending);

        let options = self.options().await;
        let current = composer::build_current_turn(text, &attachments);

        let (session_id, request) = {
            let mut store = self.store.lock().await;
            let target = store.current_session_id().map(str::to_string);
            let session_id = store.append_user_message(target.as_deref(), text, attachments);

            let session = store
                .get(&session_id)
                .ok_or_else(|| ParleyError::internal("session vanished after append"))?;
            let prior = &session.messages[..session.messages.len().saturating_sub(1)];

            let request = ChatRequest {
                history: composer::build_history_from(prior),
                current,
                options,
            };
            (session_id, request)
        };

        tracing::info!(
            "[ChatUseCase] Sending turn in session {} ({} history turn(s))",
            session_id,
            request.history.len()
        );

        let reply = match self.adapter.send(request).await {
            Ok(reply) => reply,
            Err(e) => {
                tracing::error!("[ChatUseCase] Remote call failed: {}", e);
                return Err(e.into());
            }
        };

        let stored = self
            .store
            .lock()
            .await
            .append_reply(&session_id, reply.clone());

        Ok(SendOutcome {
            session_id,
            reply,
            stored,
        })
    }
}
