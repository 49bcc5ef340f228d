use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::SessionsConfig;
use crate::pipeline::llm::ChatMessage;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Chat history per session id, bounded by idle time, session count and history length.
pub struct ChatSessions {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
    max_sessions: usize,
    max_history: usize,
}

struct Session {
    history: VecDeque<ChatMessage>,
    conversation_id: Option<String>,
    last_used: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            history: VecDeque::new(),
            conversation_id: None,
            last_used: Instant::now(),
        }
    }
}

impl ChatSessions {
    pub fn new(ttl: Duration, max_sessions: usize, max_history: usize) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            max_sessions: max_sessions.max(1),
            max_history: max_history.max(1),
        }
    }

    pub fn from_config(config: &SessionsConfig) -> Self {
        Self::new(
            Duration::from_secs(config.ttl_secs),
            config.max_sessions,
            config.max_history,
        )
    }

    /// Append a message and return the session's history including it.
    pub fn push(&self, session_id: &str, message: ChatMessage) -> Vec<ChatMessage> {
        let mut sessions = self.sessions.lock();
        let session = self.touch(&mut sessions, session_id);
        session.history.push_back(message);
        while session.history.len() > self.max_history {
            session.history.pop_front();
        }
        session.history.iter().cloned().collect()
    }

    /// Database conversation bound to this session, if any.
    pub fn conversation_id(&self, session_id: &str) -> Option<String> {
        let mut sessions = self.sessions.lock();
        self.touch(&mut sessions, session_id).conversation_id.clone()
    }

    pub fn set_conversation_id(&self, session_id: &str, conversation_id: &str) {
        let mut sessions = self.sessions.lock();
        self.touch(&mut sessions, session_id).conversation_id = Some(conversation_id.to_string());
    }

    /// Drop a session, returning its conversation id.
    pub fn end(&self, session_id: &str) -> Option<String> {
        self.sessions
            .lock()
            .remove(session_id)
            .and_then(|s| s.conversation_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove sessions idle longer than the TTL. Returns how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.lock();
        let before = sessions.len();
        sessions.retain(|_, s| s.last_used.elapsed() < self.ttl);
        before - sessions.len()
    }

    /// Purge expired sessions every minute until `cancel` fires.
    pub fn spawn_sweeper(self: &Arc<Self>, cancel: CancellationToken) -> tokio::task::JoinHandle<()> {
        let sessions = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        tracing::debug!("Session sweeper stopped");
                        break;
                    }
                    _ = ticker.tick() => {
                        let purged = sessions.purge_expired();
                        if purged > 0 {
                            tracing::info!(purged, remaining = sessions.len(), "Purged idle sessions");
                        }
                    }
                }
            }
        })
    }

    /// Fetch or create a live session, refreshing its timestamp.
    fn touch<'a>(
        &self,
        sessions: &'a mut HashMap<String, Session>,
        session_id: &str,
    ) -> &'a mut Session {
        let expired = sessions
            .get(session_id)
            .is_some_and(|s| s.last_used.elapsed() >= self.ttl);
        if expired {
            sessions.remove(session_id);
        }

        if !sessions.contains_key(session_id) && sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, s)| s.last_used)
                .map(|(id, _)| id.clone());
            if let Some(id) = oldest {
                tracing::debug!(session_id = %id, "Evicting least recently used session");
                sessions.remove(&id);
            }
        }

        let session = sessions
            .entry(session_id.to_string())
            .or_insert_with(Session::new);
        session.last_used = Instant::now();
        session
    }
}
