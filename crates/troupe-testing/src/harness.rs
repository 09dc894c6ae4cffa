//! # Turn Test Harness
//!
//! Wires a store, an agent tree, and a router into a ready-to-drive
//! [`Runner`] with one pre-created session, so tests spend their lines on
//! scenario and assertion rather than setup.

use std::collections::HashMap;
use std::sync::Arc;

use troupe_core::identifiers::{AppId, SessionId, StateKey, UserId};
use troupe_core::session::{InMemorySessionStore, Session, SessionKey, SessionStore};
use troupe_runtime::agent::AgentNode;
use troupe_runtime::router::IntentRouter;
use troupe_runtime::runner::{Runner, RunnerConfig, TurnOutcome};

/// A fully wired runtime with a single default session.
///
/// # Example
///
/// ```rust,ignore
/// let team = TestTeam::builder(root, Arc::new(router))
///     .state(StateKey::new_unchecked("user_preference_temperature_unit"), "Fahrenheit")
///     .build();
///
/// let outcome = team.turn("What is the weather in New York?").await;
/// assert_eq!(outcome.reply, "The weather in New york is sunny with a temperature of 77°F.");
/// ```
pub struct TestTeam {
    runner: Runner<InMemorySessionStore>,
    key: SessionKey,
}

impl TestTeam {
    /// Wire a team with empty initial state and default configuration.
    pub fn new(root: Arc<AgentNode>, router: Arc<dyn IntentRouter>) -> Self {
        Self::builder(root, router).build()
    }

    /// Start configuring a team.
    pub fn builder(root: Arc<AgentNode>, router: Arc<dyn IntentRouter>) -> TestTeamBuilder {
        TestTeamBuilder {
            root,
            router,
            initial_state: HashMap::new(),
            config: RunnerConfig::default(),
        }
    }

    /// Run one turn against the default session.
    pub async fn turn(&self, query: &str) -> TurnOutcome {
        self.runner
            .run_turn(&self.key, query)
            .await
            .expect("Harness session should resolve")
    }

    /// The default session.
    pub fn session(&self) -> Session {
        self.runner
            .store()
            .get_session(&self.key)
            .expect("Harness session should resolve")
    }

    /// Read one value from the default session's state.
    pub fn state_value(&self, key: &StateKey) -> Option<String> {
        self.session()
            .state()
            .get(key)
            .expect("Harness state should be readable")
    }

    /// The identity triple of the default session.
    pub fn session_key(&self) -> &SessionKey {
        &self.key
    }

    /// The underlying runner, for tests that need more than one session.
    pub fn runner(&self) -> &Runner<InMemorySessionStore> {
        &self.runner
    }
}

/// Configures and builds a [`TestTeam`].
pub struct TestTeamBuilder {
    root: Arc<AgentNode>,
    router: Arc<dyn IntentRouter>,
    initial_state: HashMap<StateKey, String>,
    config: RunnerConfig,
}

impl TestTeamBuilder {
    /// Seed one state entry into the default session.
    pub fn state(mut self, key: StateKey, value: impl Into<String>) -> Self {
        self.initial_state.insert(key, value.into());
        self
    }

    /// Override the runner configuration.
    pub fn config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Create the store, the default session, and the runner.
    pub fn build(self) -> TestTeam {
        let store = InMemorySessionStore::new();
        let key = SessionKey::new(
            AppId::new_unchecked("weather_tutorial_app"),
            UserId::new_unchecked("user_1"),
            SessionId::new_unchecked("session_001"),
        );
        store
            .create_session(key.clone(), self.initial_state)
            .expect("Harness session should be creatable");

        TestTeam {
            runner: Runner::with_config(store, self.root, self.router, self.config),
            key,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_tools::MockTool;
    use crate::scripted_router::ScriptedRouter;
    use troupe_core::identifiers::ToolName;
    use troupe_core::tool::ToolArgs;
    use troupe_runtime::router::RouteDecision;

    #[tokio::test]
    async fn harness_runs_a_scripted_turn_end_to_end() {
        let weather = MockTool::new("get_weather")
            .keyed_by("city")
            .with_response(
                "London",
                "The weather in London is cloudy with a temperature of 15°C.",
            );
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .tool(Arc::new(weather.clone()))
            .build()
            .unwrap();
        let router = ScriptedRouter::new().then(RouteDecision::handle_with(
            ToolName::new_unchecked("get_weather"),
            ToolArgs::new(serde_json::json!({ "city": "London" })),
        ));

        let team = TestTeam::new(root, Arc::new(router));
        let outcome = team.turn("What is the weather in London?").await;

        assert_eq!(
            outcome.reply,
            "The weather in London is cloudy with a temperature of 15°C."
        );
        assert!(weather.was_called_with("London"));
    }

    #[tokio::test]
    async fn seeded_state_is_visible_to_the_session() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let unit_key = StateKey::new_unchecked("user_preference_temperature_unit");

        let team = TestTeam::builder(root, Arc::new(ScriptedRouter::new()))
            .state(unit_key.clone(), "Fahrenheit")
            .build();

        assert_eq!(team.state_value(&unit_key).as_deref(), Some("Fahrenheit"));
    }
}
