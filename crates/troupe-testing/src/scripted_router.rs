//! # Scripted Router
//!
//! A deterministic [`IntentRouter`] that replays a fixed sequence of
//! decisions, one per `decide` call, and records what it was asked. Lets
//! turn-execution tests pin the exact path a query takes through the tree
//! without any keyword matching.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use troupe_core::identifiers::AgentName;
use troupe_core::session::Session;
use troupe_runtime::agent::AgentNode;
use troupe_runtime::router::{IntentRouter, RouteDecision, RouterError};

/// Replays scripted decisions in order; answers `NoMatch` once exhausted.
#[derive(Default)]
pub struct ScriptedRouter {
    script: Mutex<VecDeque<RouteDecision>>,
    seen: Mutex<Vec<(AgentName, String)>>,
}

impl ScriptedRouter {
    /// Create a router with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one decision to the script.
    pub fn then(self, decision: RouteDecision) -> Self {
        self.script.lock().unwrap().push_back(decision);
        self
    }

    /// How many scripted decisions remain unconsumed.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    /// Every (node, query) pair this router was asked to decide on.
    pub fn seen(&self) -> Vec<(AgentName, String)> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl IntentRouter for ScriptedRouter {
    async fn decide(
        &self,
        query: &str,
        node: &AgentNode,
        _session: &Session,
    ) -> Result<RouteDecision, RouterError> {
        self.seen
            .lock()
            .unwrap()
            .push((node.name().clone(), query.to_string()));

        Ok(self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(RouteDecision::NoMatch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use troupe_core::identifiers::{AppId, SessionId, ToolName, UserId};
    use troupe_core::session::{InMemorySessionStore, SessionKey, SessionStore};
    use troupe_core::tool::ToolArgs;

    fn session() -> Session {
        let key = SessionKey::new(
            AppId::new_unchecked("test_app"),
            UserId::new_unchecked("user_1"),
            SessionId::new_unchecked("session_001"),
        );
        InMemorySessionStore::new()
            .create_session(key, HashMap::new())
            .expect("Test session should build")
    }

    fn node(name: &str) -> Arc<AgentNode> {
        AgentNode::builder("gemini-2.0-flash", name)
            .build()
            .expect("Test node should build")
    }

    #[tokio::test]
    async fn decisions_replay_in_order_then_exhaust() {
        let router = ScriptedRouter::new()
            .then(RouteDecision::delegate(AgentName::new_unchecked(
                "greeting_agent",
            )))
            .then(RouteDecision::handle_with(
                ToolName::new_unchecked("say_hello"),
                ToolArgs::empty(),
            ));
        let root = node("root");
        let session = session();

        let first = router.decide("hi", &root, &session).await.unwrap();
        let second = router.decide("hi", &root, &session).await.unwrap();
        let third = router.decide("hi", &root, &session).await.unwrap();

        assert!(matches!(first, RouteDecision::Delegate { .. }));
        assert!(matches!(second, RouteDecision::HandleWith { .. }));
        assert_eq!(third, RouteDecision::NoMatch);
        assert_eq!(router.remaining(), 0);
    }

    #[tokio::test]
    async fn queries_and_nodes_are_recorded() {
        let router = ScriptedRouter::new();
        let root = node("root");
        let child = node("greeting_agent");
        let session = session();

        router.decide("first query", &root, &session).await.unwrap();
        router
            .decide("second query", &child, &session)
            .await
            .unwrap();

        let seen = router.seen();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0.as_str(), "root");
        assert_eq!(seen[0].1, "first query");
        assert_eq!(seen[1].0.as_str(), "greeting_agent");
    }
}
