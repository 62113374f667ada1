//! In-memory conversation sessions.
//!
//! Sessions hold a bounded window of user/assistant messages. When the
//! window is full the oldest messages are evicted, so long conversations
//! keep only their most recent context.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use lectern_core::{AppError, AppResult};

/// Who produced a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Assistant,
}

impl Speaker {
    fn label(&self) -> &'static str {
        match self {
            Speaker::User => "User",
            Speaker::Assistant => "Assistant",
        }
    }
}

/// One message in a session.
#[derive(Debug, Clone)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Creates sessions and tracks their bounded history.
pub struct SessionManager {
    max_history: usize,
    sessions: Mutex<HashMap<String, VecDeque<Turn>>>,
}

impl SessionManager {
    /// `max_history` caps the number of retained messages per session, not
    /// exchanges.
    pub fn new(max_history: usize) -> Self {
        Self {
            max_history,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Create a new empty session and return its id.
    pub fn create_session(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.sessions
            .lock()
            .unwrap()
            .insert(id.clone(), VecDeque::new());
        id
    }

    /// Append one user/assistant exchange, evicting the oldest messages
    /// beyond the cap. Creates the session if it does not exist yet.
    pub fn add_exchange(&self, session_id: &str, user_text: &str, assistant_text: &str) {
        let mut sessions = self.sessions.lock().unwrap();
        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push_back(Turn {
            speaker: Speaker::User,
            text: user_text.to_string(),
        });
        turns.push_back(Turn {
            speaker: Speaker::Assistant,
            text: assistant_text.to_string(),
        });
        while turns.len() > self.max_history {
            turns.pop_front();
        }
    }

    /// Messages of a session, oldest first.
    pub fn history(&self, session_id: &str) -> AppResult<Vec<Turn>> {
        let sessions = self.sessions.lock().unwrap();
        sessions
            .get(session_id)
            .map(|turns| turns.iter().cloned().collect())
            .ok_or_else(|| AppError::Session(format!("Unknown session '{}'", session_id)))
    }

    /// History rendered for prompt injection, `None` when the session is
    /// empty.
    pub fn formatted_history(&self, session_id: &str) -> AppResult<Option<String>> {
        let turns = self.history(session_id)?;
        if turns.is_empty() {
            return Ok(None);
        }
        let lines: Vec<String> = turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker.label(), t.text))
            .collect();
        Ok(Some(lines.join("\n")))
    }

    /// Discard a session entirely.
    pub fn clear_session(&self, session_id: &str) {
        self.sessions.lock().unwrap().remove(session_id);
    }
}
