use chrono::{DateTime, Local};

use crate::gemini::CompletionError;
use crate::prompt::SupportRequest;
use crate::scope;

/// Greeting seeded into a fresh chat.
pub const GREETING_MESSAGE: &str =
    "<p>Hi! I'm MindMate, your mental health companion. How are you feeling today? 💜</p>";

/// Fixed reply for out-of-scope (commerce/finance) messages. The remote call
/// is short-circuited entirely for these turns.
pub const REFUSAL_MESSAGE: &str = "<p>I'm here to support your emotional wellbeing, \
so I can't help with shopping or money questions. 💜 Is there something on your mind \
you'd like to talk about?</p>";

/// Fixed reply substituted when the remote call fails for any reason. The
/// underlying cause is logged, never shown.
pub const FALLBACK_MESSAGE: &str = "<p>I'm sorry, I'm having trouble processing \
your request right now. Please try again later. 😔</p>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    User,
    Assistant,
}

/// One chat message. Immutable once created; the session's message list is
/// append-only and insertion order is display order.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub origin: Origin,
    pub created_at: DateTime<Local>,
}

/// What the caller should do with an accepted submission.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnPlan {
    /// The domain filter rejected the message; the refusal is already
    /// appended and the session is back at Idle.
    Refused,
    /// Forward this request to the completion client, then call
    /// `resolve_turn` with the outcome.
    Forward(SupportRequest),
}

/// Chat session controller: owns the message list and the pending flag.
///
/// Two states, Idle and Awaiting-Response. `begin_turn` moves to
/// Awaiting-Response for in-scope submissions; `resolve_turn` always returns
/// to Idle. A new `begin_turn` while pending is not defended against here;
/// the UI gates submissions on `is_pending`.
pub struct Session {
    messages: Vec<Message>,
    pending: bool,
    next_id: u64,
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            pending: false,
            next_id: 1,
        }
    }

    /// A session seeded with the greeting message.
    pub fn with_greeting() -> Self {
        let mut session = Self::new();
        session.push(Origin::Assistant, GREETING_MESSAGE);
        session
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn last_assistant_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.origin == Origin::Assistant)
            .map(|message| message.text.as_str())
    }

    /// Start a turn from raw user input. Returns `None` for empty (trimmed)
    /// input, which is a no-op. Otherwise appends exactly one user message,
    /// and either refuses immediately or hands back the request to forward.
    pub fn begin_turn(&mut self, text: &str) -> Option<TurnPlan> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.push(Origin::User, text);

        if !scope::is_in_scope(text) {
            tracing::info!("turn refused by domain filter");
            self.push(Origin::Assistant, REFUSAL_MESSAGE);
            return Some(TurnPlan::Refused);
        }

        self.pending = true;
        Some(TurnPlan::Forward(SupportRequest::new(text)))
    }

    /// Finish a forwarded turn. Appends exactly one assistant message: the
    /// reply verbatim on success, the fixed fallback on failure. This is the
    /// only place a completion failure is translated into user-facing text.
    pub fn resolve_turn(&mut self, outcome: Result<String, CompletionError>) {
        let text = match outcome {
            Ok(reply) => reply,
            Err(err) => {
                tracing::warn!(error = %err, "completion failed, substituting fallback");
                FALLBACK_MESSAGE.to_string()
            }
        };
        self.push(Origin::Assistant, text);
        self.pending = false;
    }

    /// Finish a turn with a specific assistant notice (for example when no
    /// API key is configured) instead of the generic fallback.
    pub fn resolve_turn_with_notice(&mut self, notice: &str) {
        self.push(Origin::Assistant, notice);
        self.pending = false;
    }

    fn push(&mut self, origin: Origin, text: impl Into<String>) {
        let message = Message {
            id: self.next_id,
            text: text.into(),
            origin,
            created_at: Local::now(),
        };
        self.next_id += 1;
        self.messages.push(message);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_monotonic() {
        let mut session = Session::new();
        let _ = session.begin_turn("how are you");
        session.resolve_turn(Ok("<p>fine</p>".to_string()));
        let ids: Vec<u64> = session.messages().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn greeting_session_starts_with_assistant_message() {
        let session = Session::with_greeting();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].origin, Origin::Assistant);
        assert_eq!(session.messages()[0].text, GREETING_MESSAGE);
        assert!(!session.is_pending());
    }
}
