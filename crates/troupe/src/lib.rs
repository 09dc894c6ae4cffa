//! # Troupe
//!
//! Troupe is a Rust-native delegation runtime for hierarchical agent teams.
//! A root coordinator hands queries down to specialist agents, each bound to
//! its own narrow tool set, while conversation state persists across turns
//! within a session.
//!
//! ## Core Components
//!
//! - **[AgentNode]**: Named capability bundle with instruction, routing
//!   description, tools, and child specialists
//! - **[SessionStore]**: Conversation state keyed by the (app, user,
//!   session) identity triple
//! - **[Tool]**: External capabilities invoked behind schema validation and
//!   panic containment
//! - **[Runner]**: The turn loop that routes, delegates, executes, and
//!   always produces an answer
//!
//! ## Quick Start
//!
//! ```rust
//! use std::collections::HashMap;
//! use troupe::{AgentNode, AppId, SessionId, SessionKey, UserId};
//! use troupe::{InMemorySessionStore, SessionStore, TeamBuilder};
//!
//! // Assemble a team: a coordinator with one greeting specialist.
//! let report = TeamBuilder::new()
//!     .specialist(
//!         AgentNode::builder("gemini-2.0-flash", "greeting_agent")
//!             .description("Handles simple greetings.")
//!             .build(),
//!     )
//!     .build_root(
//!         AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
//!             .instruction("You are the main weather agent."),
//!     );
//! let root = report.root.expect("Root should build");
//! assert_eq!(root.children().len(), 1);
//!
//! // Create a session for one user.
//! let store = InMemorySessionStore::new();
//! let key = SessionKey::new(
//!     AppId::parse("weather_tutorial_app").unwrap(),
//!     UserId::parse("user_1").unwrap(),
//!     SessionId::parse("session_001").unwrap(),
//! );
//! store.create_session(key, HashMap::new()).unwrap();
//! ```
//!
//! ## Architecture
//!
//! Troupe separates the decision layer from the execution layer: an
//! [`IntentRouter`] picks single-hop moves through the tree, and the
//! [`Runner`] bounds the walk, invokes tools, and settles the event stream
//! into a final reply. Routing failures degrade to a fixed no-match answer
//! rather than aborting the turn.

// ============================================================================
// Module aliases for namespaced access
// ============================================================================

pub use troupe_core as core;
pub use troupe_runtime as runtime;
pub use troupe_tools as tools;

#[cfg(feature = "testing")]
pub use troupe_testing as testing;

// ============================================================================
// Core types - Identifiers, Sessions, Events
// ============================================================================

// Validated identifiers
pub use troupe_core::{
    AgentName, AppId, NameRules, SessionId, StateKey, ToolName, TurnId, UserId, ValidationError,
};

// Sessions and state
pub use troupe_core::{
    InMemorySessionStore, Session, SessionKey, SessionState, SessionStore, SessionStoreError,
};

// Turn events
pub use troupe_core::TurnEvent;

// ============================================================================
// Tools - Contract and invocation
// ============================================================================

pub use troupe_core::{
    ArgsError, FailureReason, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome,
    ToolSchema,
};

pub use troupe_runtime::invoke;

// Tool collections
pub use troupe_tools::{ToolSet, ToolSetError};

// Bundled tools - Weather
pub use troupe_tools::{GetWeather, GetWeatherStateful, TemperatureUnit};

// Bundled tools - Conversation framing
pub use troupe_tools::{SayGoodbye, SayHello};

// Bundled tools - Process and remediation
pub use troupe_tools::{FixVulnerability, RunBuildCommand};

// ============================================================================
// Runtime - Trees, routing, turn execution
// ============================================================================

// Tree construction
pub use troupe_runtime::{
    AgentNode, AgentNodeBuilder, CreationError, CreationReason, TeamBuilder, TeamReport,
};

// Routing
pub use troupe_runtime::{IntentRouter, KeywordRouter, RouteDecision, RouteRule, RouterError};

// Turn execution
pub use troupe_runtime::{
    FALLBACK_REPLY, ModelAuth, NO_MATCH_REPLY, Runner, RunnerConfig, RunnerError, TurnOutcome,
    escalation_reply, first_final_event,
};

// ============================================================================
// Testing utilities (conditional)
// ============================================================================

#[cfg(feature = "testing")]
pub use troupe_testing::*;
