//! Agent nodes and tree assembly.
//!
//! An agent node bundles a name, instruction, routing description, bound
//! tools, child nodes and an optional output key. Nodes are immutable once
//! built and shared via `Arc`; children are constructed before their parent,
//! so a node can never appear as its own descendant.
//!
//! Construction failures are non-fatal by design: a node that misses
//! validation is reported and omitted, and [`TeamBuilder`] recomputes which
//! specialists made it before finalizing the root.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use troupe_core::identifiers::{AgentName, StateKey};
use troupe_core::tool::Tool;
use troupe_core::validation::ValidationError;
use troupe_tools::{ToolSet, ToolSetError};

/// Why one agent node failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CreationReason {
    /// The node's name failed identifier validation
    #[error("Invalid agent name: {0}")]
    InvalidName(#[from] ValidationError),
    /// A tool could not be bound (duplicate or invalid name)
    #[error("{0}")]
    ToolBinding(#[from] ToolSetError),
    /// Two children share a name
    #[error("Duplicate child name '{name}'")]
    DuplicateChild {
        /// The conflicting child name
        name: AgentName,
    },
    /// The name already appears elsewhere in the assembled tree
    #[error("Duplicate name '{name}' in the agent tree")]
    DuplicateInTree {
        /// The name that appears more than once
        name: AgentName,
    },
}

/// An agent node failed validation at build time.
///
/// Never fatal: callers omit the node, keep the rest of the tree, and
/// report the failure in aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Agent '{node}' could not be created: {reason}")]
pub struct CreationError {
    /// Name of the node as given to the builder, before validation
    pub node: String,
    /// What went wrong
    pub reason: CreationReason,
}

/// A named capability bundle in the agent tree.
///
/// Immutable once constructed. The tree reachable from a root node is
/// read-only during turn execution and safe for unsynchronized concurrent
/// reads.
pub struct AgentNode {
    name: AgentName,
    model: String,
    instruction: String,
    description: String,
    tools: ToolSet,
    children: Vec<Arc<AgentNode>>,
    output_key: Option<StateKey>,
}

impl AgentNode {
    /// Start building a node for the given model and name.
    ///
    /// The model string is opaque configuration handed to the inference
    /// backend; the runtime never interprets it.
    pub fn builder(model: impl Into<String>, name: impl Into<String>) -> AgentNodeBuilder {
        AgentNodeBuilder::new(model, name)
    }

    /// The node's validated name, unique within its tree.
    pub fn name(&self) -> &AgentName {
        &self.name
    }

    /// The model configuration string.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// The instruction text given to the inference backend.
    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// The description routing layers use to pick this node.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The tools bound to this node.
    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// The child nodes, in declaration order.
    pub fn children(&self) -> &[Arc<AgentNode>] {
        &self.children
    }

    /// Look up a direct child by name.
    pub fn child(&self, name: &str) -> Option<&Arc<AgentNode>> {
        self.children
            .iter()
            .find(|child| child.name().as_str() == name)
    }

    /// The session state key this node writes its final answer into.
    pub fn output_key(&self) -> Option<&StateKey> {
        self.output_key.as_ref()
    }
}

impl fmt::Debug for AgentNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentNode")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("tools", &self.tools)
            .field(
                "children",
                &self
                    .children
                    .iter()
                    .map(|child| child.name().as_str())
                    .collect::<Vec<_>>(),
            )
            .field("output_key", &self.output_key)
            .finish()
    }
}

/// Builder for [`AgentNode`]; all validation happens in [`build`].
///
/// [`build`]: AgentNodeBuilder::build
pub struct AgentNodeBuilder {
    model: String,
    name: String,
    instruction: String,
    description: String,
    tools: Vec<Arc<dyn Tool>>,
    children: Vec<Arc<AgentNode>>,
    output_key: Option<StateKey>,
}

impl AgentNodeBuilder {
    fn new(model: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            name: name.into(),
            instruction: String::new(),
            description: String::new(),
            tools: Vec::new(),
            children: Vec::new(),
            output_key: None,
        }
    }

    /// Set the instruction text.
    pub fn instruction(mut self, text: impl Into<String>) -> Self {
        self.instruction = text.into();
        self
    }

    /// Set the routing description.
    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    /// Bind one tool.
    pub fn tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.push(tool);
        self
    }

    /// Bind several tools in order.
    pub fn tools(mut self, tools: impl IntoIterator<Item = Arc<dyn Tool>>) -> Self {
        self.tools.extend(tools);
        self
    }

    /// Attach one child node.
    pub fn child(mut self, child: Arc<AgentNode>) -> Self {
        self.children.push(child);
        self
    }

    /// Attach several child nodes in order.
    pub fn children(mut self, children: impl IntoIterator<Item = Arc<AgentNode>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Declare the state key the node's final answer is written into.
    pub fn output_key(mut self, key: StateKey) -> Self {
        self.output_key = Some(key);
        self
    }

    /// Validate and build the node.
    ///
    /// Checks that the name parses, bound tools have pairwise-distinct
    /// names, and every node name is unique across the whole tree rooted
    /// here, the node's own included. On failure the node is simply not
    /// created; nothing panics.
    pub fn build(self) -> Result<Arc<AgentNode>, CreationError> {
        let given_name = self.name.clone();
        let fail = |reason: CreationReason| CreationError {
            node: given_name.clone(),
            reason,
        };

        let name = AgentName::parse(&self.name).map_err(|err| fail(err.into()))?;

        let mut tools = ToolSet::new();
        for tool in self.tools {
            tools.insert(tool).map_err(|err| fail(err.into()))?;
        }

        for (index, child) in self.children.iter().enumerate() {
            let duplicate = self.children[..index]
                .iter()
                .any(|earlier| earlier.name() == child.name());
            if duplicate {
                return Err(fail(CreationReason::DuplicateChild {
                    name: child.name().clone(),
                }));
            }
        }

        // Each attached subtree passed its own build, so a collision
        // involves either the new name or two distinct subtrees.
        let mut seen = HashSet::new();
        seen.insert(name.as_str());
        for child in &self.children {
            if let Some(duplicate) = duplicate_name(child, &mut seen) {
                return Err(fail(CreationReason::DuplicateInTree { name: duplicate }));
            }
        }

        info!(
            agent = %name,
            model = %self.model,
            tool_count = tools.len(),
            child_count = self.children.len(),
            "Agent node created"
        );

        Ok(Arc::new(AgentNode {
            name,
            model: self.model,
            instruction: self.instruction,
            description: self.description,
            tools,
            children: self.children,
            output_key: self.output_key,
        }))
    }
}

/// Depth-first name scan; returns the first name seen twice.
fn duplicate_name<'tree>(
    node: &'tree AgentNode,
    seen: &mut HashSet<&'tree str>,
) -> Option<AgentName> {
    if !seen.insert(node.name().as_str()) {
        return Some(node.name().clone());
    }
    node.children()
        .iter()
        .find_map(|child| duplicate_name(child, seen))
}

/// Outcome of assembling a team: the root (when it built) plus every
/// recorded failure.
#[derive(Debug)]
pub struct TeamReport {
    /// The assembled tree, absent only if the root itself failed
    pub root: Option<Arc<AgentNode>>,
    /// Every node that was omitted, with its reason
    pub failures: Vec<CreationError>,
}

impl TeamReport {
    /// Whether every offered node made it into the tree.
    pub fn is_complete(&self) -> bool {
        self.root.is_some() && self.failures.is_empty()
    }

    /// Names of the omitted nodes, for operator reporting.
    pub fn omitted(&self) -> Vec<&str> {
        self.failures
            .iter()
            .map(|failure| failure.node.as_str())
            .collect()
    }
}

/// Assembles a root agent plus optional specialists.
///
/// Specialists that fail validation are recorded and omitted; the root is
/// finalized against whichever specialists survived, so one malformed
/// configuration never takes the whole team down.
///
/// # Example
///
/// ```rust
/// use troupe_runtime::agent::{AgentNode, TeamBuilder};
///
/// let report = TeamBuilder::new()
///     .specialist(
///         AgentNode::builder("gemini-2.0-flash", "greeting_agent")
///             .description("Handles greetings.")
///             .build(),
///     )
///     .specialist(
///         AgentNode::builder("gemini-2.0-flash", "bad name")
///             .description("Never makes it.")
///             .build(),
///     )
///     .build_root(AgentNode::builder("gemini-2.0-flash", "weather_agent_v2"));
///
/// let root = report.root.as_ref().expect("Root should build");
/// assert_eq!(root.children().len(), 1);
/// assert_eq!(report.omitted(), vec!["bad name"]);
/// ```
#[derive(Default)]
pub struct TeamBuilder {
    survivors: Vec<Arc<AgentNode>>,
    failures: Vec<CreationError>,
}

impl TeamBuilder {
    /// Start an empty team.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a specialist build result.
    ///
    /// A failed build is recorded as a diagnostic and the specialist is
    /// left out of the tree.
    pub fn specialist(mut self, result: Result<Arc<AgentNode>, CreationError>) -> Self {
        match result {
            Ok(node) => self.survivors.push(node),
            Err(err) => {
                warn!(node = %err.node, reason = %err.reason, "Specialist omitted from team");
                self.failures.push(err);
            }
        }
        self
    }

    /// Finalize the root with every surviving specialist as a child.
    ///
    /// The surviving set is recomputed here, not when specialists were
    /// offered, so the root always reflects exactly the nodes that built.
    pub fn build_root(mut self, root: AgentNodeBuilder) -> TeamReport {
        let root = match root.children(self.survivors.drain(..)).build() {
            Ok(node) => Some(node),
            Err(err) => {
                warn!(node = %err.node, reason = %err.reason, "Root agent could not be created");
                self.failures.push(err);
                None
            }
        };

        TeamReport {
            root,
            failures: self.failures,
        }
    }
}
