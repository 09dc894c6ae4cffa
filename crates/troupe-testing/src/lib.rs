//! # Troupe Testing - Deterministic Turn Testing
//!
//! This crate provides controlled building blocks for testing agent teams:
//! mock tools with scripted outcomes and call tracking, a router that
//! replays a fixed decision sequence, and a harness that wires a store,
//! tree, and runner around one default session.
//!
//! ## Example
//!
//! ```rust,ignore
//! use troupe_testing::{MockTool, ScriptedRouter, TestTeam};
//!
//! let tool = MockTool::new("get_weather")
//!     .keyed_by("city")
//!     .with_response("London", "The weather in London is cloudy with a temperature of 15°C.");
//!
//! let team = TestTeam::new(root, Arc::new(router));
//! let outcome = team.turn("What is the weather in London?").await;
//! assert!(!outcome.used_fallback);
//! ```

pub mod harness;
pub mod mock_tools;
pub mod scripted_router;

pub use harness::{TestTeam, TestTeamBuilder};
pub use mock_tools::{MockTool, PanickingTool};
pub use scripted_router::ScriptedRouter;
