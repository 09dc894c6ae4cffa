//! Ordered, name-unique collections of tools.
//!
//! Each agent node binds one [`ToolSet`]. Lookup is by exact name; binding
//! two tools under the same name is rejected at insertion so a node can
//! never hold an ambiguous dispatch table.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use troupe_core::identifiers::ToolName;
use troupe_core::tool::Tool;
use troupe_core::validation::ValidationError;

/// Errors raised while assembling a tool set.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ToolSetError {
    /// A tool with this name is already bound
    #[error("Tool '{name}' is already bound in this set")]
    DuplicateName {
        /// The conflicting tool name
        name: ToolName,
    },
    /// The tool reported a name that fails validation
    #[error("Invalid tool name: {0}")]
    InvalidName(#[from] ValidationError),
}

/// Ordered collection of tools bound to one agent node.
///
/// Preserves insertion order (routing layers may care about it) while
/// enforcing pairwise-distinct names. Tools are shared via `Arc` so the
/// same implementation can be bound on several nodes.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use troupe_tools::{SayGoodbye, SayHello, ToolSet};
///
/// let tools = ToolSet::new()
///     .with_tool(Arc::new(SayHello))
///     .unwrap()
///     .with_tool(Arc::new(SayGoodbye))
///     .unwrap();
///
/// assert_eq!(tools.len(), 2);
/// assert!(tools.get("say_hello").is_some());
/// assert!(tools.get("get_weather").is_none());
/// ```
#[derive(Clone, Default)]
pub struct ToolSet {
    entries: Vec<(ToolName, Arc<dyn Tool>)>,
}

impl ToolSet {
    /// Create an empty tool set.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Bind a tool, validating its name and rejecting duplicates.
    pub fn insert(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolSetError> {
        let name = ToolName::parse(tool.name())?;
        if self.entries.iter().any(|(bound, _)| bound == &name) {
            return Err(ToolSetError::DuplicateName { name });
        }
        self.entries.push((name, tool));
        Ok(())
    }

    /// Bind a tool using the builder pattern.
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Result<Self, ToolSetError> {
        self.insert(tool)?;
        Ok(self)
    }

    /// Look up a tool by exact name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.entries
            .iter()
            .find(|(bound, _)| bound.as_str() == name)
            .map(|(_, tool)| tool)
    }

    /// The bound names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &ToolName> {
        self.entries.iter().map(|(name, _)| name)
    }

    /// Iterate over the bound tools in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ToolName, &Arc<dyn Tool>)> {
        self.entries.iter().map(|(name, tool)| (name, tool))
    }

    /// Number of bound tools.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no tools are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ToolSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use troupe_core::tool::{ToolArgs, ToolContext, ToolOutcome, ToolSchema};

    struct NamedTool(&'static str);

    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("test tool")
        }

        fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            ToolOutcome::success(self.0)
        }
    }

    #[test]
    fn insertion_order_is_preserved() {
        let set = ToolSet::new()
            .with_tool(Arc::new(NamedTool("alpha")))
            .unwrap()
            .with_tool(Arc::new(NamedTool("beta")))
            .unwrap();

        let names: Vec<_> = set.names().map(|n| n.as_str().to_string()).collect();
        assert_eq!(names, vec!["alpha", "beta"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let mut set = ToolSet::new();
        set.insert(Arc::new(NamedTool("echo"))).unwrap();

        let result = set.insert(Arc::new(NamedTool("echo")));
        assert!(matches!(result, Err(ToolSetError::DuplicateName { .. })));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn invalid_names_are_rejected() {
        let mut set = ToolSet::new();
        let result = set.insert(Arc::new(NamedTool("bad name")));
        assert!(matches!(result, Err(ToolSetError::InvalidName(_))));
        assert!(set.is_empty());
    }

    #[test]
    fn lookup_is_exact_match() {
        let set = ToolSet::new()
            .with_tool(Arc::new(NamedTool("get_weather")))
            .unwrap();

        assert!(set.get("get_weather").is_some());
        assert!(set.get("get_weather_stateful").is_none());
        assert!(set.get("GET_WEATHER").is_none());
    }
}
