//! Turn execution against an agent tree.
//!
//! A [`Runner`] owns the session store, the tree root, and the routing
//! backend, and drives one query at a time through the decide/delegate/
//! execute loop. Every turn terminates with a textual answer: routing
//! failures degrade to a fixed no-match reply, tool failures surface as
//! escalations, and an event stream with no final event falls back to a
//! fixed placeholder.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use troupe_core::event::TurnEvent;
use troupe_core::identifiers::{AgentName, StateKey, TurnId};
use troupe_core::session::{Session, SessionKey, SessionStore, SessionStoreError};
use troupe_core::tool::{ToolContext, ToolOutcome};

use crate::agent::AgentNode;
use crate::invoker;
use crate::router::{IntentRouter, RouteDecision};

/// Reply produced when no node could act on the query.
pub const NO_MATCH_REPLY: &str = "I'm sorry, I can't handle that request.";

/// Reply substituted when a turn's event stream carries no final event.
pub const FALLBACK_REPLY: &str = "Agent did not produce a final response.";

/// Render an escalation message as the user-visible reply.
pub fn escalation_reply(message: &str) -> String {
    if message.is_empty() {
        "Agent escalated: No specific message.".to_string()
    } else {
        format!("Agent escalated: {}", message)
    }
}

/// First event in emission order that terminates the turn.
pub fn first_final_event(events: &[TurnEvent]) -> Option<&TurnEvent> {
    events.iter().find(|event| event.is_final())
}

/// How the inference backend authenticates.
///
/// Carried opaquely on the runner configuration for the backend's benefit;
/// the runtime itself never consults it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelAuth {
    /// Direct API-key credentials
    #[default]
    ApiKey,
    /// Managed cloud identity
    CloudIdentity,
}

impl ModelAuth {
    /// Environment variable selecting managed identity over API keys.
    pub const ENV_VAR: &'static str = "GOOGLE_GENAI_USE_VERTEXAI";

    /// Read the auth mode from the environment.
    pub fn from_env() -> Self {
        Self::from_flag(std::env::var(Self::ENV_VAR).ok().as_deref())
    }

    /// Interpret the flag value; only "true" and "1" select managed
    /// identity, case-insensitively.
    fn from_flag(value: Option<&str>) -> Self {
        match value {
            Some(flag) if matches!(flag.to_lowercase().as_str(), "true" | "1") => {
                ModelAuth::CloudIdentity
            }
            _ => ModelAuth::ApiKey,
        }
    }
}

/// Tunable bounds for turn execution.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Maximum delegation hops in one turn; a decision that would exceed
    /// it degrades to no-match
    pub max_delegation_depth: usize,
    /// Deadline for a single router decision; expiry degrades to no-match
    pub router_timeout: Duration,
    /// Inference-backend auth mode, carried opaquely
    pub model_auth: ModelAuth,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_delegation_depth: 8,
            router_timeout: Duration::from_secs(30),
            model_auth: ModelAuth::ApiKey,
        }
    }
}

/// The settled result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The answer text shown to the caller
    pub reply: String,
    /// Name of the node the answer is attributed to
    pub author: AgentName,
    /// Every event the turn emitted, in emission order
    pub events: Vec<TurnEvent>,
    /// Whether the fixed fallback reply was substituted
    pub used_fallback: bool,
}

/// Errors that abort a turn before it produces events.
///
/// Everything that happens after the session is resolved is contained
/// within the turn and reported through the event stream instead.
#[derive(Debug, Clone, Error)]
pub enum RunnerError {
    /// The session store failed or holds no session for the triple
    #[error(transparent)]
    Store(#[from] SessionStoreError),
}

/// Drives turns against an agent tree.
///
/// Generic over the session store so tests can run against the in-memory
/// store while deployments bring their own.
pub struct Runner<S> {
    store: S,
    root: Arc<AgentNode>,
    router: Arc<dyn IntentRouter>,
    config: RunnerConfig,
}

impl<S: SessionStore> Runner<S> {
    /// Create a runner with default configuration.
    pub fn new(store: S, root: Arc<AgentNode>, router: Arc<dyn IntentRouter>) -> Self {
        Self::with_config(store, root, router, RunnerConfig::default())
    }

    /// Create a runner with explicit configuration.
    pub fn with_config(
        store: S,
        root: Arc<AgentNode>,
        router: Arc<dyn IntentRouter>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            store,
            root,
            router,
            config,
        }
    }

    /// The session store this runner resolves sessions against.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The root of the agent tree.
    pub fn root(&self) -> &Arc<AgentNode> {
        &self.root
    }

    /// Execute one query against the session stored under `key`.
    ///
    /// Fails only if the session cannot be resolved or its state is
    /// unavailable; everything else resolves to a [`TurnOutcome`] whose
    /// reply is always non-empty.
    pub async fn run_turn(
        &self,
        key: &SessionKey,
        query: &str,
    ) -> Result<TurnOutcome, RunnerError> {
        let session = self.store.get_session(key)?;
        let turn = TurnId::generate();
        info!(turn = %turn, session = %key, "Turn started");
        debug!(turn = %turn, query = %query, "Processing query");

        let (events, commit) = self.drive(query, &session).await;

        // Output-key write-back happens only for tool-produced answers;
        // the no-match and fallback paths leave session state untouched.
        if let Some((state_key, value)) = commit {
            session.state().set(state_key, value)?;
        }

        let outcome = conclude(self.root.name(), events);
        info!(
            turn = %turn,
            author = %outcome.author,
            used_fallback = outcome.used_fallback,
            "Turn finished"
        );
        Ok(outcome)
    }

    /// Walk the tree from the root, one decision per node, until a
    /// terminal event is produced.
    ///
    /// Returns the emitted events plus the state write to commit, present
    /// only when the answer came from a successful tool call at a node
    /// declaring an output key.
    async fn drive(
        &self,
        query: &str,
        session: &Session,
    ) -> (Vec<TurnEvent>, Option<(StateKey, String)>) {
        let mut events = Vec::new();
        let mut current: &Arc<AgentNode> = &self.root;
        let mut hops = 0;

        loop {
            match self.decide_bounded(query, current, session).await {
                RouteDecision::Delegate { child } => {
                    if hops == self.config.max_delegation_depth {
                        warn!(
                            node = %current.name(),
                            depth = hops,
                            "Delegation depth bound reached; treating as no match"
                        );
                        events.push(no_match_event(current));
                        return (events, None);
                    }
                    match current.child(child.as_str()) {
                        Some(node) => {
                            events.push(TurnEvent::content(
                                current.name().clone(),
                                format!("Transferring to {}.", child),
                            ));
                            current = node;
                            hops += 1;
                        }
                        None => {
                            warn!(
                                node = %current.name(),
                                child = %child,
                                "Router selected an undeclared child; treating as no match"
                            );
                            events.push(no_match_event(current));
                            return (events, None);
                        }
                    }
                }
                RouteDecision::HandleWith { tool, args } => {
                    let Some(bound) = current.tools().get(tool.as_str()) else {
                        warn!(
                            node = %current.name(),
                            tool = %tool,
                            "Router selected an unbound tool; treating as no match"
                        );
                        events.push(no_match_event(current));
                        return (events, None);
                    };

                    let ctx = ToolContext::new(session.state().clone());
                    match invoker::invoke(bound.as_ref(), args, &ctx) {
                        ToolOutcome::Success { payload } => {
                            let commit = current
                                .output_key()
                                .map(|state_key| (state_key.clone(), payload.clone()));
                            events
                                .push(TurnEvent::final_content(current.name().clone(), payload));
                            return (events, commit);
                        }
                        ToolOutcome::Error { reason } => {
                            events.push(TurnEvent::escalation(
                                current.name().clone(),
                                reason.message(),
                            ));
                            return (events, None);
                        }
                    }
                }
                RouteDecision::NoMatch => {
                    events.push(no_match_event(current));
                    return (events, None);
                }
            }
        }
    }

    /// Ask the router for a decision, bounded by the configured deadline.
    ///
    /// Router errors and deadline expiry both degrade to
    /// [`RouteDecision::NoMatch`]; a broken routing backend can cost the
    /// turn its answer but never hang or abort it.
    async fn decide_bounded(
        &self,
        query: &str,
        node: &AgentNode,
        session: &Session,
    ) -> RouteDecision {
        match timeout(
            self.config.router_timeout,
            self.router.decide(query, node, session),
        )
        .await
        {
            Ok(Ok(decision)) => decision,
            Ok(Err(err)) => {
                warn!(node = %node.name(), error = %err, "Router failed; treating as no match");
                RouteDecision::NoMatch
            }
            Err(_) => {
                warn!(
                    node = %node.name(),
                    timeout_ms = self.config.router_timeout.as_millis() as u64,
                    "Router timed out; treating as no match"
                );
                RouteDecision::NoMatch
            }
        }
    }
}

fn no_match_event(node: &AgentNode) -> TurnEvent {
    TurnEvent::final_content(node.name().clone(), NO_MATCH_REPLY)
}

/// Settle an event stream into the turn's outcome.
///
/// The first final event supplies the answer; escalations render through
/// [`escalation_reply`]. A stream with no final event yields the fixed
/// fallback attributed to the root.
fn conclude(root: &AgentName, events: Vec<TurnEvent>) -> TurnOutcome {
    let (reply, author, used_fallback) = match first_final_event(&events) {
        Some(TurnEvent::Content { author, text, .. }) => (text.clone(), author.clone(), false),
        Some(TurnEvent::Escalation { author, message }) => {
            (escalation_reply(message), author.clone(), false)
        }
        None => (FALLBACK_REPLY.to_string(), root.clone(), true),
    };

    TurnOutcome {
        reply,
        author,
        events,
        used_fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use troupe_core::identifiers::{AppId, SessionId, ToolName, UserId};
    use troupe_core::session::InMemorySessionStore;
    use troupe_core::tool::{Tool, ToolArgs, ToolSchema};
    use troupe_tools::greeting::SayHello;

    use crate::router::{KeywordRouter, RouteRule, RouterError};

    struct CannedTool {
        name: &'static str,
        reply: &'static str,
    }

    impl Tool for CannedTool {
        fn name(&self) -> &str {
            self.name
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("Returns a canned reply.")
        }

        fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            ToolOutcome::success(self.reply)
        }
    }

    struct MissingCityTool;

    impl Tool for MissingCityTool {
        fn name(&self) -> &str {
            "get_weather"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("Always misses its lookup.")
        }

        fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            ToolOutcome::lookup_miss("Sorry, I don't have weather information for 'Atlantis'.")
        }
    }

    struct FixedRouter(RouteDecision);

    #[async_trait]
    impl IntentRouter for FixedRouter {
        async fn decide(
            &self,
            _query: &str,
            _node: &AgentNode,
            _session: &Session,
        ) -> Result<RouteDecision, RouterError> {
            Ok(self.0.clone())
        }
    }

    struct SlowRouter(Duration);

    #[async_trait]
    impl IntentRouter for SlowRouter {
        async fn decide(
            &self,
            _query: &str,
            _node: &AgentNode,
            _session: &Session,
        ) -> Result<RouteDecision, RouterError> {
            tokio::time::sleep(self.0).await;
            Ok(RouteDecision::handle_with(
                ToolName::new_unchecked("never_reached"),
                ToolArgs::empty(),
            ))
        }
    }

    struct BrokenRouter;

    #[async_trait]
    impl IntentRouter for BrokenRouter {
        async fn decide(
            &self,
            _query: &str,
            _node: &AgentNode,
            _session: &Session,
        ) -> Result<RouteDecision, RouterError> {
            Err(RouterError::backend("model API unreachable"))
        }
    }

    struct DescendRouter;

    #[async_trait]
    impl IntentRouter for DescendRouter {
        async fn decide(
            &self,
            _query: &str,
            node: &AgentNode,
            _session: &Session,
        ) -> Result<RouteDecision, RouterError> {
            match node.children().first() {
                Some(child) => Ok(RouteDecision::delegate(child.name().clone())),
                None => Ok(RouteDecision::NoMatch),
            }
        }
    }

    fn test_key() -> SessionKey {
        SessionKey::new(
            AppId::new_unchecked("weather_tutorial_app"),
            UserId::new_unchecked("user_1"),
            SessionId::new_unchecked("session_001"),
        )
    }

    fn runner_for(
        root: Arc<AgentNode>,
        router: Arc<dyn IntentRouter>,
    ) -> (Runner<InMemorySessionStore>, SessionKey) {
        let store = InMemorySessionStore::new();
        let key = test_key();
        store
            .create_session(key.clone(), HashMap::new())
            .expect("Test session should build");
        (Runner::new(store, root, router), key)
    }

    fn handle(tool: &str) -> RouteDecision {
        RouteDecision::handle_with(ToolName::new_unchecked(tool), ToolArgs::empty())
    }

    #[tokio::test]
    async fn tool_success_becomes_the_final_reply() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .tool(Arc::new(CannedTool {
                name: "get_weather",
                reply: "The weather in London is cloudy with a temperature of 15°C.",
            }))
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(FixedRouter(handle("get_weather"))));

        let outcome = runner.run_turn(&key, "weather in london").await.unwrap();

        assert_eq!(
            outcome.reply,
            "The weather in London is cloudy with a temperature of 15°C."
        );
        assert_eq!(outcome.author.as_str(), "weather_agent_v2");
        assert!(!outcome.used_fallback);
        assert_eq!(outcome.events.len(), 1);
    }

    #[tokio::test]
    async fn delegation_emits_transfer_then_child_answer() {
        let child = AgentNode::builder("gemini-2.0-flash", "greeting_agent")
            .tool(Arc::new(SayHello))
            .build()
            .unwrap();
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .child(child)
            .build()
            .unwrap();

        let router = KeywordRouter::new()
            .rule(
                RouteRule::keyword(
                    "hello",
                    RouteDecision::delegate(AgentName::new_unchecked("greeting_agent")),
                )
                .at(AgentName::new_unchecked("weather_agent_v2")),
            )
            .rule(
                RouteRule::keyword("hello", handle("say_hello"))
                    .at(AgentName::new_unchecked("greeting_agent")),
            );
        let (runner, key) = runner_for(root, Arc::new(router));

        let outcome = runner.run_turn(&key, "Hello there!").await.unwrap();

        assert_eq!(outcome.reply, "Hello, there!");
        assert_eq!(outcome.author.as_str(), "greeting_agent");
        assert_eq!(outcome.events.len(), 2);
        assert!(!outcome.events[0].is_final());
        assert_eq!(
            outcome.events[0].text(),
            Some("Transferring to greeting_agent.")
        );
        assert_eq!(outcome.events[0].author().as_str(), "weather_agent_v2");
    }

    #[tokio::test]
    async fn no_match_yields_fixed_reply_and_no_state_change() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .output_key(StateKey::new_unchecked("last_weather_report"))
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(KeywordRouter::new()));

        let outcome = runner
            .run_turn(&key, "What time is it in Tokyo?")
            .await
            .unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
        assert!(!outcome.used_fallback);

        let session = runner.store().get_session(&key).unwrap();
        assert!(session.state().snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn tool_failure_surfaces_as_escalation() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .tool(Arc::new(MissingCityTool))
            .output_key(StateKey::new_unchecked("last_weather_report"))
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(FixedRouter(handle("get_weather"))));

        let outcome = runner.run_turn(&key, "weather in atlantis").await.unwrap();

        assert_eq!(
            outcome.reply,
            "Agent escalated: Sorry, I don't have weather information for 'Atlantis'."
        );
        assert!(!outcome.used_fallback);

        // A failed tool never reaches the output-key write-back.
        let session = runner.store().get_session(&key).unwrap();
        assert!(session.state().snapshot().unwrap().is_empty());
    }

    #[tokio::test]
    async fn output_key_commits_the_final_answer() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .tool(Arc::new(CannedTool {
                name: "get_weather",
                reply: "The weather in Tokyo is light rain with a temperature of 18°C.",
            }))
            .output_key(StateKey::new_unchecked("last_weather_report"))
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(FixedRouter(handle("get_weather"))));

        runner.run_turn(&key, "weather in tokyo").await.unwrap();

        let session = runner.store().get_session(&key).unwrap();
        let stored = session
            .state()
            .get(&StateKey::new_unchecked("last_weather_report"))
            .unwrap();
        assert_eq!(
            stored.as_deref(),
            Some("The weather in Tokyo is light rain with a temperature of 18°C.")
        );
    }

    #[tokio::test]
    async fn unknown_session_is_a_store_error() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let store = InMemorySessionStore::new();
        let runner = Runner::new(store, root, Arc::new(KeywordRouter::new()));

        let result = runner.run_turn(&test_key(), "hello").await;

        assert!(matches!(
            result,
            Err(RunnerError::Store(SessionStoreError::SessionNotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn depth_bound_degrades_to_no_match() {
        let deepest = AgentNode::builder("gemini-2.0-flash", "hop_three")
            .build()
            .unwrap();
        let middle = AgentNode::builder("gemini-2.0-flash", "hop_two")
            .child(deepest)
            .build()
            .unwrap();
        let upper = AgentNode::builder("gemini-2.0-flash", "hop_one")
            .child(middle)
            .build()
            .unwrap();
        let root = AgentNode::builder("gemini-2.0-flash", "root")
            .child(upper)
            .build()
            .unwrap();

        let router = Arc::new(DescendRouter);
        let store = InMemorySessionStore::new();
        let key = test_key();
        store.create_session(key.clone(), HashMap::new()).unwrap();
        let config = RunnerConfig {
            max_delegation_depth: 2,
            ..RunnerConfig::default()
        };
        let runner = Runner::with_config(store, root, router, config);

        let outcome = runner.run_turn(&key, "keep going").await.unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
        // Two transfers happened before the bound cut the walk short.
        assert_eq!(outcome.events.len(), 3);
        assert!(!outcome.events[0].is_final());
        assert!(!outcome.events[1].is_final());
    }

    #[tokio::test]
    async fn router_timeout_degrades_to_no_match() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let store = InMemorySessionStore::new();
        let key = test_key();
        store.create_session(key.clone(), HashMap::new()).unwrap();
        let config = RunnerConfig {
            router_timeout: Duration::from_millis(20),
            ..RunnerConfig::default()
        };
        let runner = Runner::with_config(
            store,
            root,
            Arc::new(SlowRouter(Duration::from_millis(200))),
            config,
        );

        let outcome = runner.run_turn(&key, "anything").await.unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
    }

    #[tokio::test]
    async fn router_error_degrades_to_no_match() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(BrokenRouter));

        let outcome = runner.run_turn(&key, "anything").await.unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
        assert!(!outcome.used_fallback);
    }

    #[tokio::test]
    async fn undeclared_child_degrades_to_no_match() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let (runner, key) = runner_for(
            root,
            Arc::new(FixedRouter(RouteDecision::delegate(
                AgentName::new_unchecked("ghost_agent"),
            ))),
        );

        let outcome = runner.run_turn(&key, "hello").await.unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
    }

    #[tokio::test]
    async fn unbound_tool_degrades_to_no_match() {
        let root = AgentNode::builder("gemini-2.0-flash", "weather_agent_v2")
            .build()
            .unwrap();
        let (runner, key) = runner_for(root, Arc::new(FixedRouter(handle("ghost_tool"))));

        let outcome = runner.run_turn(&key, "hello").await.unwrap();

        assert_eq!(outcome.reply, NO_MATCH_REPLY);
    }

    #[test]
    fn escalation_reply_substitutes_a_placeholder_for_empty_messages() {
        assert_eq!(
            escalation_reply("tool exploded"),
            "Agent escalated: tool exploded"
        );
        assert_eq!(escalation_reply(""), "Agent escalated: No specific message.");
    }

    #[test]
    fn first_final_event_picks_the_earliest_final() {
        let author = AgentName::new_unchecked("weather_agent_v2");
        let events = vec![
            TurnEvent::content(author.clone(), "Transferring to greeting_agent."),
            TurnEvent::final_content(author.clone(), "first answer"),
            TurnEvent::final_content(author.clone(), "second answer"),
        ];

        let found = first_final_event(&events).expect("A final event exists");
        assert_eq!(found.text(), Some("first answer"));
    }

    #[test]
    fn escalations_count_as_final_for_consumption() {
        let author = AgentName::new_unchecked("weather_agent_v2");
        let events = vec![
            TurnEvent::content(author.clone(), "working"),
            TurnEvent::escalation(author.clone(), "boom"),
            TurnEvent::final_content(author, "too late"),
        ];

        let outcome = conclude(&AgentName::new_unchecked("root"), events);
        assert_eq!(outcome.reply, "Agent escalated: boom");
    }

    #[test]
    fn empty_stream_falls_back_to_the_fixed_reply() {
        let root = AgentName::new_unchecked("weather_agent_v2");
        let outcome = conclude(&root, Vec::new());

        assert_eq!(outcome.reply, FALLBACK_REPLY);
        assert_eq!(outcome.author, root);
        assert!(outcome.used_fallback);
    }

    #[test]
    fn model_auth_flag_parsing() {
        assert_eq!(ModelAuth::from_flag(None), ModelAuth::ApiKey);
        assert_eq!(ModelAuth::from_flag(Some("FALSE")), ModelAuth::ApiKey);
        assert_eq!(ModelAuth::from_flag(Some("0")), ModelAuth::ApiKey);
        assert_eq!(
            ModelAuth::from_flag(Some("true")),
            ModelAuth::CloudIdentity
        );
        assert_eq!(ModelAuth::from_flag(Some("1")), ModelAuth::CloudIdentity);
        assert_eq!(
            ModelAuth::from_flag(Some("TRUE")),
            ModelAuth::CloudIdentity
        );
    }
}
