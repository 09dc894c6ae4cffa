//! # Troupe Runtime - Agent Tree Orchestration
//!
//! This crate assembles agent trees and drives turns against them: routing
//! decisions, delegation, tool invocation, and event-stream consumption.
//!
//! ## Features
//!
//! - **Agent Trees**: Validated root/specialist hierarchies with non-fatal
//!   construction failures
//! - **Intent Routing**: A pluggable decision seam plus a deterministic
//!   keyword router
//! - **Turn Execution**: A bounded decide/delegate/execute loop that always
//!   produces a textual answer
//! - **Tool Invocation**: Schema enforcement and panic containment at the
//!   tool boundary
//!
//! ## Example: Running a Turn
//!
//! ```rust,ignore
//! use troupe_runtime::{AgentNode, KeywordRouter, Runner, TeamBuilder};
//!
//! let report = TeamBuilder::new()
//!     .specialist(greeting_agent)
//!     .specialist(farewell_agent)
//!     .build_root(AgentNode::builder("gemini-2.0-flash", "weather_agent_v2"));
//!
//! let runner = Runner::new(store, report.root.unwrap(), Arc::new(router));
//! let outcome = runner.run_turn(&session_key, "What is the weather in London?").await?;
//! println!("{}", outcome.reply);
//! ```

pub mod agent;
pub mod invoker;
pub mod router;
pub mod runner;

// Re-export tree construction types
pub use agent::{
    AgentNode, AgentNodeBuilder, CreationError, CreationReason, TeamBuilder, TeamReport,
};

// Re-export the invocation boundary
pub use invoker::invoke;

// Re-export routing types
pub use router::{IntentRouter, KeywordRouter, RouteDecision, RouteRule, RouterError};

// Re-export turn execution types
pub use runner::{
    FALLBACK_REPLY, ModelAuth, NO_MATCH_REPLY, Runner, RunnerConfig, RunnerError, TurnOutcome,
    escalation_reply, first_final_event,
};
