#[cfg(test)]
mod tests {
    use crate::attachment::Attachment;
    use crate::chat::RemoteReply;
    use crate::error::{ParleyError, Result};
    use crate::session::{
        ATTACHMENT_ONLY_TITLE, DEFAULT_SESSION_TITLE, GroundingUrl, MessageRole, Session,
        SessionStore, SessionTarget,
    };
    use crate::storage::{InMemoryKeyValueStore, KeyValueStore, SESSIONS_KEY};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    // Counts writes so tests can check the one-write-per-mutation rule
    struct CountingKeyValueStore {
        inner: InMemoryKeyValueStore,
        writes: AtomicUsize,
    }

    impl CountingKeyValueStore {
        fn new() -> Self {
            Self {
                inner: InMemoryKeyValueStore::new(),
                writes: AtomicUsize::new(0),
            }
        }

        fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }
    }

    impl KeyValueStore for CountingKeyValueStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.writes.fetch_add(1, Ordering::SeqCst);
            self.inner.set(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    // Storage whose medium is broken in both directions
    struct BrokenKeyValueStore {
        attempts: Mutex<usize>,
    }

    impl KeyValueStore for BrokenKeyValueStore {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(ParleyError::io("disk unplugged"))
        }

        fn set(&self, _key: &str, _value: &str) -> Result<()> {
            *self.attempts.lock().unwrap() += 1;
            Err(ParleyError::io("disk unplugged"))
        }

        fn remove(&self, _key: &str) -> Result<()> {
            Err(ParleyError::io("disk unplugged"))
        }
    }

    fn new_store() -> (SessionStore, Arc<InMemoryKeyValueStore>) {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        (SessionStore::init(kv.clone()), kv)
    }

    #[test]
    fn test_init_empty() {
        let (store, _) = new_store();
        assert!(store.is_empty());
        assert_eq!(store.current_session_id(), None);
    }

    #[test]
    fn test_create_sessions_newest_first_with_unique_ids() {
        let (mut store, _) = new_store();

        let created: Vec<String> = (0..5).map(|_| store.create_session()).collect();

        let listed: Vec<&str> = store.sessions().iter().map(|s| s.id.as_str()).collect();
        let expected: Vec<&str> = created.iter().rev().map(String::as_str).collect();
        assert_eq!(listed, expected);

        let unique: HashSet<&str> = listed.iter().copied().collect();
        assert_eq!(unique.len(), 5);

        assert_eq!(store.current_session_id(), Some(created[4].as_str()));
        assert!(store.sessions().iter().all(|s| s.title == DEFAULT_SESSION_TITLE));
    }

    #[test]
    fn test_select_session() {
        let (mut store, _) = new_store();
        let first = store.create_session();
        let _second = store.create_session();

        assert!(store.select_session(&first));
        assert_eq!(store.current_session_id(), Some(first.as_str()));

        assert!(!store.select_session("missing"));
        assert_eq!(store.current_session_id(), Some(first.as_str()));
    }

    #[test]
    fn test_delete_current_selects_next_newest() {
        let (mut store, _) = new_store();
        let oldest = store.create_session();
        let middle = store.create_session();
        let newest = store.create_session();

        assert!(store.delete_session(&newest));
        assert_eq!(store.current_session_id(), Some(middle.as_str()));

        assert!(store.delete_session(&middle));
        assert_eq!(store.current_session_id(), Some(oldest.as_str()));

        assert!(store.delete_session(&oldest));
        assert_eq!(store.current_session_id(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_current_in_the_middle_selects_front() {
        let (mut store, _) = new_store();
        let oldest = store.create_session();
        let middle = store.create_session();
        let newest = store.create_session();

        store.select_session(&middle);
        store.delete_session(&middle);

        assert_eq!(store.current_session_id(), Some(newest.as_str()));
        assert!(store.contains(&oldest));
    }

    #[test]
    fn test_delete_non_current_keeps_pointer() {
        let (mut store, _) = new_store();
        let older = store.create_session();
        let newer = store.create_session();

        store.delete_session(&older);
        assert_eq!(store.current_session_id(), Some(newer.as_str()));
        assert!(!store.delete_session(&older));
    }

    #[test]
    fn test_append_user_message_creates_session() {
        let (mut store, _) = new_store();

        let id = store.append_user_message(None, "hello", Vec::new());

        assert_eq!(store.len(), 1);
        let session = store.get(&id).unwrap();
        assert_eq!(session.title, "hello");
        assert_eq!(session.messages.len(), 1);
        assert_eq!(session.messages[0].role, MessageRole::User);
        assert_eq!(session.messages[0].content, "hello");
        assert_eq!(store.current_session_id(), Some(id.as_str()));
    }

    #[test]
    fn test_append_user_message_truncates_long_title() {
        let (mut store, _) = new_store();
        let text = "Explain the difference between processes and threads";

        let id = store.append_user_message(None, text, Vec::new());

        let title = &store.get(&id).unwrap().title;
        assert_eq!(title.chars().count(), 30);
        assert!(text.starts_with(title.as_str()));
    }

    #[test]
    fn test_attachment_only_message_uses_fallback_title() {
        let (mut store, _) = new_store();
        let attachment = Attachment::new("data:image/png;base64,AAAA", "image/png", "a.png");

        let id = store.append_user_message(None, "", vec![attachment]);

        let session = store.get(&id).unwrap();
        assert_eq!(session.title, ATTACHMENT_ONLY_TITLE);
        assert_eq!(session.messages[0].attachments().len(), 1);
    }

    #[test]
    fn test_first_message_names_new_chat_and_title_stays() {
        let (mut store, _) = new_store();
        let id = store.create_session();

        store.append_user_message(Some(&id), "first question", Vec::new());
        store.append_user_message(Some(&id), "second question", Vec::new());

        let session = store.get(&id).unwrap();
        assert_eq!(session.title, "first question");
        assert_eq!(session.messages.len(), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_append_to_deleted_session_creates_new_one() {
        let (mut store, _) = new_store();
        let id = store.create_session();
        store.delete_session(&id);

        assert_eq!(store.resolve_target(Some(&id)), SessionTarget::NeedsCreation);
        let new_id = store.append_user_message(Some(&id), "again", Vec::new());

        assert_ne!(new_id, id);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_resolve_target_existing() {
        let (mut store, _) = new_store();
        let id = store.create_session();
        assert_eq!(
            store.resolve_target(Some(&id)),
            SessionTarget::Existing(id.clone())
        );
        assert_eq!(store.resolve_target(None), SessionTarget::NeedsCreation);
    }

    #[test]
    fn test_append_assistant_message_to_deleted_session_is_noop() {
        let (mut store, _) = new_store();
        let keep = store.create_session();
        let doomed = store.append_user_message(None, "question", Vec::new());
        store.delete_session(&doomed);
        let before = store.sessions().to_vec();

        let appended = store.append_assistant_message(&doomed, "late answer", None, None);

        assert!(!appended);
        assert_eq!(store.sessions(), before.as_slice());
        assert!(store.contains(&keep));
    }

    #[test]
    fn test_append_assistant_message() {
        let (mut store, _) = new_store();
        let id = store.append_user_message(None, "hi", Vec::new());
        let citation = GroundingUrl {
            uri: "https://example.com".to_string(),
            title: "Example".to_string(),
        };

        assert!(store.append_assistant_message(
            &id,
            "hello",
            Some("thought".to_string()),
            Some(vec![citation.clone()]),
        ));

        let reply = store.get(&id).unwrap().last_message().unwrap();
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "hello");
        assert_eq!(reply.grounding_urls, Some(vec![citation]));
    }

    #[test]
    fn test_identical_appends_get_distinct_ids() {
        let (mut store, _) = new_store();
        let id = store.append_user_message(None, "same", Vec::new());
        store.append_user_message(Some(&id), "same", Vec::new());

        let messages = &store.get(&id).unwrap().messages;
        assert_eq!(messages.len(), 2);
        assert_ne!(messages[0].id, messages[1].id);
    }

    #[test]
    fn test_append_reply_uses_composer() {
        let (mut store, _) = new_store();
        let id = store.append_user_message(None, "hi", Vec::new());

        store.append_reply(
            &id,
            RemoteReply {
                text: "hello".to_string(),
                citations: Vec::new(),
                thinking: None,
            },
        );

        let reply = store.get(&id).unwrap().last_message().unwrap();
        assert!(reply.grounding_urls.is_none());
        assert_eq!(reply.content, "hello");
    }

    #[test]
    fn test_round_trip_through_storage() {
        let (mut store, kv) = new_store();
        let first = store.append_user_message(None, "one", Vec::new());
        store.append_assistant_message(&first, "uno", Some("t".to_string()), None);
        let second = store.append_user_message(
            None,
            "two",
            vec![Attachment::new("AAAA", "text/plain", "notes.txt")],
        );
        store.create_session();
        let original: Vec<Session> = store.sessions().to_vec();

        let reloaded = SessionStore::init(kv);

        assert_eq!(reloaded.sessions(), original.as_slice());
        assert_eq!(reloaded.current_session_id(), Some(original[0].id.as_str()));
        assert!(reloaded.contains(&second));
    }

    #[test]
    fn test_every_mutation_writes_once() {
        let kv = Arc::new(CountingKeyValueStore::new());
        let mut store = SessionStore::init(kv.clone());

        let id = store.create_session();
        assert_eq!(kv.writes(), 1);

        store.append_user_message(Some(&id), "hi", Vec::new());
        assert_eq!(kv.writes(), 2);

        store.append_assistant_message(&id, "hello", None, None);
        assert_eq!(kv.writes(), 3);

        store.select_session(&id);
        assert_eq!(kv.writes(), 3);

        store.delete_session(&id);
        assert_eq!(kv.writes(), 4);

        store.append_assistant_message(&id, "late", None, None);
        assert_eq!(kv.writes(), 4);
    }

    #[test]
    fn test_corrupt_snapshot_starts_empty() {
        let kv = Arc::new(InMemoryKeyValueStore::with_entry(SESSIONS_KEY, "{not json"));
        let store = SessionStore::init(kv);
        assert!(store.is_empty());
        assert_eq!(store.current_session_id(), None);
    }

    #[test]
    fn test_broken_storage_is_not_fatal() {
        let kv = Arc::new(BrokenKeyValueStore {
            attempts: Mutex::new(0),
        });
        let mut store = SessionStore::init(kv.clone());

        let id = store.append_user_message(None, "still works", Vec::new());

        assert_eq!(store.get(&id).unwrap().messages.len(), 1);
        assert_eq!(*kv.attempts.lock().unwrap(), 1);
    }

    #[test]
    fn test_custom_key_is_isolated() {
        let kv = Arc::new(InMemoryKeyValueStore::new());
        let mut store = SessionStore::init_with_key(kv.clone(), "other_slot");
        store.create_session();

        assert!(SessionStore::init(kv.clone()).is_empty());
        assert_eq!(SessionStore::init_with_key(kv, "other_slot").len(), 1);
    }
}
