//! Routing decisions and the router seam.
//!
//! Each step of a turn asks an [`IntentRouter`] what the current node should
//! do with the query: invoke one of its own tools, hand the query to one
//! direct child, or admit no match. Production deployments back this trait
//! with an inference model; tests and the CLI demo use deterministic
//! implementations.

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use troupe_core::identifiers::{AgentName, ToolName};
use troupe_core::session::Session;
use troupe_core::tool::ToolArgs;

use crate::agent::AgentNode;

/// What one node decided to do with the current query.
///
/// A decision moves the turn at most one hop: either sideways into a tool
/// bound to the deciding node, or down to one of its direct children.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteDecision {
    /// Invoke a tool bound to the current node with the given arguments
    HandleWith {
        /// Name of the tool, resolved against the node's own tool set
        tool: ToolName,
        /// Arguments passed to the tool
        args: ToolArgs,
    },
    /// Hand the query to one direct child of the current node
    Delegate {
        /// Name of the child, resolved against the node's own children
        child: AgentName,
    },
    /// The node has nothing suitable for this query
    NoMatch,
}

impl RouteDecision {
    /// Decision to invoke the named tool with the given arguments.
    pub fn handle_with(tool: ToolName, args: ToolArgs) -> Self {
        Self::HandleWith { tool, args }
    }

    /// Decision to hand the query down to the named child.
    pub fn delegate(child: AgentName) -> Self {
        Self::Delegate { child }
    }
}

/// The routing backend itself failed to produce a decision.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouterError {
    /// The backend reported an error (model API failure, transport issue)
    #[error("Routing backend failed: {message}")]
    Backend {
        /// Backend-provided detail
        message: String,
    },
}

impl RouterError {
    /// A backend failure with the given detail.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Decides what a node does with a query.
///
/// Implementations see the deciding node (name, description, tool schemas,
/// children) and the session the turn runs against, and return one
/// single-hop [`RouteDecision`]. The runner owns everything else: depth
/// bounds, deadlines, and what a `NoMatch` turns into.
#[async_trait]
pub trait IntentRouter: Send + Sync {
    /// Decide what `node` should do with `query`.
    async fn decide(
        &self,
        query: &str,
        node: &AgentNode,
        session: &Session,
    ) -> Result<RouteDecision, RouterError>;
}

/// One routing rule: a predicate over the query plus the decision to take.
///
/// Rules can be scoped to a single node with [`at`]; an unscoped rule is
/// consulted at every node of the tree.
///
/// [`at`]: RouteRule::at
pub struct RouteRule {
    /// Human-readable name for the rule, used in routing logs
    pub name: String,
    /// The condition to check against the query
    pub condition: Box<dyn Fn(&str) -> bool + Send + Sync>,
    /// Node this rule applies at; `None` means every node
    pub at: Option<AgentName>,
    /// The decision to return when the condition matches
    pub decision: RouteDecision,
}

impl RouteRule {
    /// Create a rule from an arbitrary predicate.
    pub fn new(
        name: impl Into<String>,
        condition: impl Fn(&str) -> bool + Send + Sync + 'static,
        decision: RouteDecision,
    ) -> Self {
        Self {
            name: name.into(),
            condition: Box::new(condition),
            at: None,
            decision,
        }
    }

    /// Create a rule that matches queries containing a keyword,
    /// case-insensitively.
    pub fn keyword(keyword: impl Into<String>, decision: RouteDecision) -> Self {
        let kw = keyword.into();
        let kw_lower = kw.to_lowercase();
        Self::new(
            format!("keyword:{}", kw),
            move |query| query.to_lowercase().contains(&kw_lower),
            decision,
        )
    }

    /// Scope the rule to one node.
    pub fn at(mut self, node: AgentName) -> Self {
        self.at = Some(node);
        self
    }

    fn applies_at(&self, node: &AgentNode) -> bool {
        self.at.as_ref().is_none_or(|at| at == node.name())
    }
}

/// A deterministic router driven by ordered keyword rules.
///
/// Rules are evaluated in insertion order and the first match wins; a query
/// no rule matches yields [`RouteDecision::NoMatch`]. Useful for demos and
/// smoke tests where routing must be reproducible.
///
/// # Example
/// ```rust,ignore
/// let router = KeywordRouter::new()
///     .rule(RouteRule::keyword("hello", RouteDecision::delegate(greeter)).at(root))
///     .rule(RouteRule::keyword("london", RouteDecision::handle_with(weather, args)));
/// ```
#[derive(Default)]
pub struct KeywordRouter {
    rules: Vec<RouteRule>,
}

impl KeywordRouter {
    /// Create a router with no rules; it answers `NoMatch` to everything.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule. Order matters: earlier rules win.
    pub fn rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Number of configured rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the router has no rules at all.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

#[async_trait]
impl IntentRouter for KeywordRouter {
    async fn decide(
        &self,
        query: &str,
        node: &AgentNode,
        _session: &Session,
    ) -> Result<RouteDecision, RouterError> {
        for rule in &self.rules {
            if rule.applies_at(node) && (rule.condition)(query) {
                debug!(
                    rule = %rule.name,
                    node = %node.name(),
                    decision = ?rule.decision,
                    "Routing rule matched"
                );
                return Ok(rule.decision.clone());
            }
        }

        debug!(node = %node.name(), "No routing rule matched");
        Ok(RouteDecision::NoMatch)
    }
}
