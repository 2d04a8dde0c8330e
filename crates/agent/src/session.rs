//! The chat session driver.
//!
//! A [`ChatSession`] owns one conversation and moves through
//! `Idle → AwaitingInput → RequestInFlight → Idle` for every turn. `submit`
//! and `clear` take `&mut self`, so a session can never have two requests in
//! flight or be cleared mid-request; callers that share a session across tasks
//! wrap it in a lock and report contention as [`SessionError::Busy`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dostbot_core::conversation::Conversation;
use dostbot_core::error::SessionError;
use dostbot_core::message::Turn;
use dostbot_telemetry::{SessionUsage, UsageSnapshot};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::assistant::AssistantContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    AwaitingInput,
    RequestInFlight,
}

/// What happened to one submitted message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// The provider answered; the reply was appended to the transcript.
    Answered(String),
    /// The provider call failed. The user turn stays in the transcript, no
    /// assistant turn was added.
    Failed { reason: String },
}

impl TurnOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered(_))
    }
}

pub struct ChatSession {
    id: String,
    context: Arc<AssistantContext>,
    conversation: Conversation,
    state: SessionState,
    last_error: Option<String>,
    usage: SessionUsage,
    created_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(context: Arc<AssistantContext>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), context)
    }

    pub fn with_id(id: impl Into<String>, context: Arc<AssistantContext>) -> Self {
        Self {
            id: id.into(),
            context,
            conversation: Conversation::new(),
            state: SessionState::Idle,
            last_error: None,
            usage: SessionUsage::default(),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn transcript(&self) -> &[Turn] {
        self.conversation.all()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn usage(&self) -> &SessionUsage {
        &self.usage
    }

    pub fn usage_snapshot(&self) -> UsageSnapshot {
        self.context.usage_snapshot(&self.usage)
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the session as waiting for the next user message.
    pub fn await_input(&mut self) {
        if self.state == SessionState::Idle {
            self.state = SessionState::AwaitingInput;
        }
    }

    /// Run one turn: record the user message, send the whole history to the
    /// provider, and record the reply.
    ///
    /// Provider failures are not errors here; they come back as
    /// [`TurnOutcome::Failed`] and leave the session usable. Only blank input
    /// is rejected, before anything is recorded.
    pub async fn submit(&mut self, text: &str) -> Result<TurnOutcome, SessionError> {
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        if self.state == SessionState::RequestInFlight {
            warn!(session = %self.id, "Previous request was abandoned before completing");
        }

        self.conversation.append(Turn::user(text));
        self.state = SessionState::RequestInFlight;

        let request = self.context.build_request(&self.conversation);
        debug!(
            session = %self.id,
            messages = request.messages.len(),
            model = %request.model,
            "Sending completion request"
        );

        let outcome = match self.context.provider().complete(request).await {
            Ok(response) => {
                let reply = response.message.content;
                self.conversation.append(Turn::assistant(reply.clone()));
                self.usage.record_answer(response.usage.as_ref());
                self.last_error = None;
                info!(
                    session = %self.id,
                    turns = self.conversation.len(),
                    reply_chars = reply.chars().count(),
                    "Turn answered"
                );
                TurnOutcome::Answered(reply)
            }
            Err(e) => {
                let reason = e.to_string();
                self.usage.record_failure();
                self.last_error = Some(reason.clone());
                warn!(session = %self.id, error = %reason, "Completion request failed");
                TurnOutcome::Failed { reason }
            }
        };

        self.state = SessionState::Idle;
        Ok(outcome)
    }

    /// Drop the whole transcript and any pending error. Usage totals persist
    /// for the life of the session.
    pub fn clear(&mut self) {
        self.conversation.clear();
        self.last_error = None;
        self.state = SessionState::Idle;
        info!(session = %self.id, "Conversation cleared");
    }
}
