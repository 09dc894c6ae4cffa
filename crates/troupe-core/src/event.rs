//! Events emitted while a turn executes.
//!
//! Each turn produces a finite stream of [`TurnEvent`] values in strict
//! emission order. Consumers stop at the first event that reads as final;
//! anything after it is discarded.

use serde::{Deserialize, Serialize};

use crate::identifiers::AgentName;

/// One step in a turn's event stream.
///
/// Exactly two cases exist. `Content` carries text that may or may not be
/// the turn's answer; `Escalation` signals an unrecoverable condition from
/// a tool or child agent and always terminates the turn. Exhaustive
/// matching on this enum replaces field-presence checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnEvent {
    /// Text produced by an agent, final or intermediate.
    Content {
        /// Name of the agent that produced this event
        author: AgentName,
        /// The text content
        text: String,
        /// Whether this event carries the turn's answer
        is_final: bool,
    },
    /// An unrecoverable condition surfaced by a tool or child agent.
    Escalation {
        /// Name of the agent that escalated
        author: AgentName,
        /// Error message shown to the caller
        message: String,
    },
}

impl TurnEvent {
    /// Intermediate content, such as a delegation notice.
    pub fn content(author: AgentName, text: impl Into<String>) -> Self {
        TurnEvent::Content {
            author,
            text: text.into(),
            is_final: false,
        }
    }

    /// Content carrying the turn's answer.
    pub fn final_content(author: AgentName, text: impl Into<String>) -> Self {
        TurnEvent::Content {
            author,
            text: text.into(),
            is_final: true,
        }
    }

    /// An escalation with the given message.
    pub fn escalation(author: AgentName, message: impl Into<String>) -> Self {
        TurnEvent::Escalation {
            author,
            message: message.into(),
        }
    }

    /// Name of the agent that produced this event.
    pub fn author(&self) -> &AgentName {
        match self {
            TurnEvent::Content { author, .. } => author,
            TurnEvent::Escalation { author, .. } => author,
        }
    }

    /// Whether this event terminates the turn.
    ///
    /// Escalations are always terminal.
    pub fn is_final(&self) -> bool {
        match self {
            TurnEvent::Content { is_final, .. } => *is_final,
            TurnEvent::Escalation { .. } => true,
        }
    }

    /// The content text, if this is a content event.
    pub fn text(&self) -> Option<&str> {
        match self {
            TurnEvent::Content { text, .. } => Some(text),
            TurnEvent::Escalation { .. } => None,
        }
    }
}
