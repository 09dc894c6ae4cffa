//! # Mock Tools for Testing
//!
//! This module provides mock tool implementations that return predictable
//! outcomes, allowing for reliable and controlled turn-execution tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use troupe_core::tool::{
    FailureReason, ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema,
};

/// A mock tool that returns predefined outcomes keyed by one argument.
///
/// The keying argument defaults to `"input"`; configure it with
/// [`keyed_by`] to mimic a specific tool surface (for example `"city"`).
/// Calls are recorded so tests can assert on how the runtime drove the
/// tool.
///
/// [`keyed_by`]: MockTool::keyed_by
#[derive(Debug, Clone)]
pub struct MockTool {
    name: String,
    keyed_by: String,
    responses: HashMap<String, ToolOutcome>,
    default_response: Option<ToolOutcome>,
    call_count: Arc<Mutex<usize>>,
    call_history: Arc<Mutex<Vec<ToolArgs>>>,
}

impl MockTool {
    /// Create a new mock tool with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keyed_by: "input".to_string(),
            responses: HashMap::new(),
            default_response: None,
            call_count: Arc::new(Mutex::new(0)),
            call_history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Select which argument picks the response.
    pub fn keyed_by(mut self, arg: impl Into<String>) -> Self {
        self.keyed_by = arg.into();
        self
    }

    /// Add a success outcome for a specific argument value.
    pub fn with_response(mut self, input: impl Into<String>, payload: impl Into<String>) -> Self {
        self.responses
            .insert(input.into(), ToolOutcome::success(payload.into()));
        self
    }

    /// Add a failure outcome for a specific argument value.
    pub fn with_failure(mut self, input: impl Into<String>, reason: FailureReason) -> Self {
        self.responses
            .insert(input.into(), ToolOutcome::failure(reason));
        self
    }

    /// Set a success outcome for any unmatched argument value.
    pub fn with_default_response(mut self, payload: impl Into<String>) -> Self {
        self.default_response = Some(ToolOutcome::success(payload.into()));
        self
    }

    /// Set a failure outcome for any unmatched argument value.
    pub fn with_default_failure(mut self, reason: FailureReason) -> Self {
        self.default_response = Some(ToolOutcome::failure(reason));
        self
    }

    /// Get the number of times this tool has been called.
    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    /// Get the arguments of every call, in call order.
    pub fn call_history(&self) -> Vec<ToolArgs> {
        self.call_history.lock().unwrap().clone()
    }

    /// Check if the tool was called with the given keying argument value.
    pub fn was_called_with(&self, input: &str) -> bool {
        self.call_history
            .lock()
            .unwrap()
            .iter()
            .any(|args| args.text_opt(&self.keyed_by) == Some(input))
    }

    /// Reset call count and history.
    pub fn reset(&self) {
        *self.call_count.lock().unwrap() = 0;
        self.call_history.lock().unwrap().clear();
    }
}

impl Tool for MockTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Mock tool with scripted outcomes.")
            .with_param(ParamSpec::optional(self.keyed_by.clone(), ParamType::Text))
    }

    fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        *self.call_count.lock().unwrap() += 1;
        self.call_history.lock().unwrap().push(args.clone());

        let key = args.text_opt(&self.keyed_by).unwrap_or_default();
        if let Some(outcome) = self.responses.get(key) {
            outcome.clone()
        } else if let Some(default) = &self.default_response {
            default.clone()
        } else {
            ToolOutcome::success(format!("Mock response for: {}", key))
        }
    }
}

/// A tool that always panics, for exercising containment at the invoker.
#[derive(Debug, Clone)]
pub struct PanickingTool {
    name: String,
    message: String,
}

impl PanickingTool {
    /// Create a panicking tool with the given name and panic message.
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

impl Tool for PanickingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Panics on every call.")
    }

    fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        panic!("{}", self.message)
    }
}
