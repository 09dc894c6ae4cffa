//! # Troupe Core
//!
//! Core traits and types for the Troupe delegation runtime.
//! This crate provides the contracts the rest of the workspace builds on:
//! validated identifiers, the session store, the tool contract, and the
//! turn event model.

pub mod event;
pub mod identifiers;
pub mod session;
pub mod tool;
pub mod validation;

pub use event::TurnEvent;
pub use identifiers::{AgentName, AppId, SessionId, StateKey, ToolName, TurnId, UserId};
pub use session::{
    InMemorySessionStore, Session, SessionKey, SessionState, SessionStore, SessionStoreError,
};
pub use tool::{
    ArgsError, FailureReason, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome,
    ToolSchema,
};
pub use validation::{NameRules, ValidationError};
