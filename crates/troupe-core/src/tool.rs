//! Tool contract shared by every capability the runtime can invoke.
//!
//! A tool is a named, synchronous callable with a declared parameter schema
//! and a normalized result shape. Tools never raise across the invoker
//! boundary: every failure mode is folded into [`ToolOutcome::Error`] with a
//! structured [`FailureReason`], so the orchestrator can classify outcomes
//! without string matching.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::session::SessionState;

/// Typed access to tool call arguments.
///
/// Wraps a JSON object so tools can extract parameters without hand-rolled
/// `Option` chains. Getters distinguish a missing argument from one of the
/// wrong type.
///
/// # Examples
///
/// ```rust
/// use troupe_core::tool::ToolArgs;
///
/// let args = ToolArgs::new(serde_json::json!({ "city": "London" }));
/// assert_eq!(args.text("city").unwrap(), "London");
/// assert!(args.text("country").is_err());
/// assert_eq!(args.text_opt("country"), None);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ToolArgs {
    value: serde_json::Value,
}

impl ToolArgs {
    /// Wrap a JSON value as tool arguments.
    pub fn new(value: serde_json::Value) -> Self {
        Self { value }
    }

    /// Arguments carrying no parameters at all.
    pub fn empty() -> Self {
        Self {
            value: serde_json::json!({}),
        }
    }

    /// The raw JSON value.
    pub fn raw(&self) -> &serde_json::Value {
        &self.value
    }

    /// Get a required string argument by name.
    pub fn text(&self, name: &str) -> Result<&str, ArgsError> {
        match self.value.get(name) {
            None => Err(ArgsError::Missing {
                name: name.to_string(),
            }),
            Some(v) => v.as_str().ok_or_else(|| ArgsError::WrongType {
                name: name.to_string(),
                expected: "string",
            }),
        }
    }

    /// Get an optional string argument by name.
    ///
    /// Absent and non-string values both read as `None`.
    pub fn text_opt(&self, name: &str) -> Option<&str> {
        self.value.get(name).and_then(|v| v.as_str())
    }

    /// Get a required integer argument by name.
    pub fn integer(&self, name: &str) -> Result<i64, ArgsError> {
        match self.value.get(name) {
            None => Err(ArgsError::Missing {
                name: name.to_string(),
            }),
            Some(v) => v.as_i64().ok_or_else(|| ArgsError::WrongType {
                name: name.to_string(),
                expected: "integer",
            }),
        }
    }
}

impl Default for ToolArgs {
    fn default() -> Self {
        Self::empty()
    }
}

/// Errors produced when extracting or validating tool arguments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgsError {
    /// A declared required argument was absent
    #[error("Missing required argument '{name}'")]
    Missing {
        /// Name of the absent argument
        name: String,
    },
    /// An argument was present but not of the declared type
    #[error("Argument '{name}' is not a valid {expected}")]
    WrongType {
        /// Name of the offending argument
        name: String,
        /// The type the schema declares
        expected: &'static str,
    },
}

/// Semantic type of one tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamType {
    /// Free-form text
    Text,
    /// Whole number
    Integer,
    /// Floating-point number
    Number,
    /// Boolean flag
    Flag,
}

impl ParamType {
    fn matches(&self, value: &serde_json::Value) -> bool {
        match self {
            ParamType::Text => value.is_string(),
            ParamType::Integer => value.is_i64(),
            ParamType::Number => value.is_number(),
            ParamType::Flag => value.is_boolean(),
        }
    }

    fn expected(&self) -> &'static str {
        match self {
            ParamType::Text => "string",
            ParamType::Integer => "integer",
            ParamType::Number => "number",
            ParamType::Flag => "boolean",
        }
    }
}

/// Declaration of one tool parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name, matched against argument keys
    pub name: String,
    /// Semantic type the argument must satisfy
    pub kind: ParamType,
    /// Whether the argument must be present
    pub required: bool,
}

impl ParamSpec {
    /// Declare a required parameter.
    pub fn required(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
        }
    }

    /// Declare an optional parameter.
    pub fn optional(name: impl Into<String>, kind: ParamType) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
        }
    }
}

/// Parameter schema and routing description of a tool.
///
/// The description is what a routing layer sees when deciding whether this
/// tool can serve a query; the parameter list is enforced by the invoker
/// before the tool body runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolSchema {
    description: String,
    params: Vec<ParamSpec>,
}

impl ToolSchema {
    /// Start a schema with a routing description and no parameters.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            params: Vec::new(),
        }
    }

    /// Add a parameter declaration.
    pub fn with_param(mut self, param: ParamSpec) -> Self {
        self.params.push(param);
        self
    }

    /// The routing description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The declared parameters in declaration order.
    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// Check `args` against the declared parameters.
    ///
    /// Required parameters must be present with a matching type; optional
    /// parameters are type-checked only when present. Arguments the schema
    /// does not declare are ignored.
    pub fn validate(&self, args: &ToolArgs) -> Result<(), ArgsError> {
        for param in &self.params {
            match args.raw().get(&param.name) {
                None if param.required => {
                    return Err(ArgsError::Missing {
                        name: param.name.clone(),
                    });
                }
                None => {}
                Some(value) => {
                    if !param.kind.matches(value) {
                        return Err(ArgsError::WrongType {
                            name: param.name.clone(),
                            expected: param.kind.expected(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Categorized failure reasons for tool execution.
///
/// Structured variants let the orchestrator and callers distinguish "the
/// tool ran and reported a failure" from "the tool could not run at all"
/// without parsing message text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FailureReason {
    /// The tool body panicked or hit an unexpected internal fault
    Raised {
        /// Diagnostic describing the fault
        message: String,
    },
    /// An external process ran to completion but exited non-zero
    ExitNonZero {
        /// The process exit code, when one was reported
        code: Option<i32>,
        /// Captured standard-error text, verbatim
        stderr: String,
    },
    /// An external process could not be started
    SpawnFailed {
        /// Description of the spawn failure
        message: String,
    },
    /// An external process exceeded its allotted time and was killed
    TimedOut {
        /// The limit that was exceeded, in seconds
        limit_secs: u64,
    },
    /// Arguments did not satisfy the tool's declared schema
    InvalidArguments {
        /// Description of the mismatch
        message: String,
    },
    /// A domain lookup had no entry for the requested input
    LookupMiss {
        /// Templated message naming the unresolved input
        message: String,
    },
}

impl FailureReason {
    /// Human-readable message for this failure.
    ///
    /// For [`FailureReason::ExitNonZero`] this is the captured stderr text
    /// unchanged, so callers comparing against process output see exactly
    /// what the process wrote.
    pub fn message(&self) -> String {
        match self {
            FailureReason::Raised { message } => message.clone(),
            FailureReason::ExitNonZero { stderr, .. } => stderr.clone(),
            FailureReason::SpawnFailed { message } => message.clone(),
            FailureReason::TimedOut { limit_secs } => {
                format!("Command timed out after {}s", limit_secs)
            }
            FailureReason::InvalidArguments { message } => message.clone(),
            FailureReason::LookupMiss { message } => message.clone(),
        }
    }
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

/// The result of executing a tool.
///
/// Either successful execution with a payload or failed execution with a
/// structured reason. There is no third state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    /// Tool executed successfully with the given payload.
    ///
    /// The payload is free-form text; for report-style tools it is the
    /// sentence shown to the user.
    Success {
        /// The successful output
        payload: String,
    },
    /// Tool execution failed with a structured reason.
    Error {
        /// Why the execution failed
        reason: FailureReason,
    },
}

impl ToolOutcome {
    /// Create a successful outcome.
    pub fn success(payload: impl Into<String>) -> Self {
        ToolOutcome::Success {
            payload: payload.into(),
        }
    }

    /// Create a failed outcome from a structured reason.
    pub fn failure(reason: FailureReason) -> Self {
        ToolOutcome::Error { reason }
    }

    /// Create a failed outcome for arguments that missed the schema.
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        ToolOutcome::Error {
            reason: FailureReason::InvalidArguments {
                message: message.into(),
            },
        }
    }

    /// Create a failed outcome for a domain lookup with no entry.
    pub fn lookup_miss(message: impl Into<String>) -> Self {
        ToolOutcome::Error {
            reason: FailureReason::LookupMiss {
                message: message.into(),
            },
        }
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, ToolOutcome::Success { .. })
    }

    /// The payload, if this outcome is a success.
    pub fn payload(&self) -> Option<&str> {
        match self {
            ToolOutcome::Success { payload } => Some(payload),
            ToolOutcome::Error { .. } => None,
        }
    }

    /// The structured failure reason, if this outcome is an error.
    pub fn failure_reason(&self) -> Option<&FailureReason> {
        match self {
            ToolOutcome::Success { .. } => None,
            ToolOutcome::Error { reason } => Some(reason),
        }
    }

    /// The failure message, if this outcome is an error.
    pub fn error_message(&self) -> Option<String> {
        self.failure_reason().map(|reason| reason.message())
    }
}

/// Execution context a tool receives alongside its arguments.
///
/// Carries the shared state handle of the session the turn runs against.
/// Pure tools ignore it; stateful tools read and write through it, and
/// their writes are visible to later tool calls in the same turn.
#[derive(Debug, Clone)]
pub struct ToolContext {
    state: SessionState,
}

impl ToolContext {
    /// Context scoped to the given session state.
    pub fn new(state: SessionState) -> Self {
        Self { state }
    }

    /// Context over a fresh, empty state mapping.
    ///
    /// Useful for exercising pure tools without a session store.
    pub fn detached() -> Self {
        Self {
            state: SessionState::new(),
        }
    }

    /// The session state handle for this turn.
    pub fn state(&self) -> &SessionState {
        &self.state
    }
}

/// A named capability the runtime can invoke.
///
/// Implementations must be cheap to share (`Send + Sync`) since agent trees
/// are read concurrently. The call itself is synchronous; long-running work
/// belongs behind the tool boundary, not in the orchestrator.
///
/// # Examples
///
/// ```rust
/// use troupe_core::tool::{ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema};
///
/// struct Shout;
///
/// impl Tool for Shout {
///     fn name(&self) -> &str {
///         "shout"
///     }
///
///     fn schema(&self) -> ToolSchema {
///         ToolSchema::new("Upper-cases the given text.")
///             .with_param(ParamSpec::required("text", ParamType::Text))
///     }
///
///     fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
///         match args.text("text") {
///             Ok(text) => ToolOutcome::success(text.to_uppercase()),
///             Err(err) => ToolOutcome::invalid_arguments(err.to_string()),
///         }
///     }
/// }
///
/// let outcome = Shout.call(
///     ToolArgs::new(serde_json::json!({ "text": "hello" })),
///     &ToolContext::detached(),
/// );
/// assert_eq!(outcome.payload(), Some("HELLO"));
/// ```
pub trait Tool: Send + Sync {
    /// The unique name this tool is bound under.
    fn name(&self) -> &str;

    /// The parameter schema and routing description.
    fn schema(&self) -> ToolSchema;

    /// Execute the tool against validated arguments.
    fn call(&self, args: ToolArgs, ctx: &ToolContext) -> ToolOutcome;
}
