//! Workspace facade over the `troupe` meta crate.
//!
//! Downstream code should depend on [`troupe`] directly; this crate exists
//! to anchor the workspace-level integration tests.

pub use troupe::{core, runtime, tools};

pub use troupe::{
    AgentNode, AgentNodeBuilder, InMemorySessionStore, IntentRouter, KeywordRouter, RouteDecision,
    RouteRule, Runner, RunnerConfig, Session, SessionKey, SessionState, SessionStore, TeamBuilder,
    Tool, ToolOutcome, TurnEvent, TurnOutcome,
};
