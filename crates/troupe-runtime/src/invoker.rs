//! The tool invocation boundary.
//!
//! All tool calls go through [`invoke`], which enforces the declared schema
//! and contains panics. Whatever happens inside a tool body, the caller gets
//! a [`ToolOutcome`] back; a faulty tool can fail its own call but never
//! unwind the turn that invoked it.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use troupe_core::tool::{FailureReason, Tool, ToolArgs, ToolContext, ToolOutcome};

/// Invoke a tool with schema validation and panic containment.
///
/// Arguments are checked against the tool's schema first; a mismatch is
/// reported as [`FailureReason::InvalidArguments`] without running the tool
/// body. A panic inside the body is caught and reported as
/// [`FailureReason::Raised`] with the panic text.
pub fn invoke(tool: &dyn Tool, args: ToolArgs, ctx: &ToolContext) -> ToolOutcome {
    if let Err(err) = tool.schema().validate(&args) {
        warn!(tool = tool.name(), error = %err, "Tool arguments rejected by schema");
        return ToolOutcome::invalid_arguments(err.to_string());
    }

    debug!(tool = tool.name(), "Invoking tool");

    match panic::catch_unwind(AssertUnwindSafe(|| tool.call(args, ctx))) {
        Ok(outcome) => outcome,
        Err(payload) => {
            let message = format!(
                "Tool '{}' panicked: {}",
                tool.name(),
                panic_message(payload.as_ref())
            );
            warn!(tool = tool.name(), "Tool panicked during execution");
            ToolOutcome::failure(FailureReason::Raised { message })
        }
    }
}

/// Extract readable text from a panic payload.
///
/// `panic!` with a literal carries `&'static str`; `panic!` with a format
/// string carries `String`. Anything else is opaque.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        text
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.as_str()
    } else {
        "opaque panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use troupe_core::tool::{ParamSpec, ParamType, ToolSchema};

    struct Upper;

    impl Tool for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("Upper-cases text.")
                .with_param(ParamSpec::required("text", ParamType::Text))
        }

        fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            match args.text("text") {
                Ok(text) => ToolOutcome::success(text.to_uppercase()),
                Err(err) => ToolOutcome::invalid_arguments(err.to_string()),
            }
        }
    }

    struct TrackedTool {
        body_ran: AtomicBool,
    }

    impl Tool for TrackedTool {
        fn name(&self) -> &str {
            "tracked"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("Requires a count.")
                .with_param(ParamSpec::required("count", ParamType::Integer))
        }

        fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            self.body_ran.store(true, Ordering::SeqCst);
            ToolOutcome::success("ran")
        }
    }

    struct Panicky(&'static str);

    impl Tool for Panicky {
        fn name(&self) -> &str {
            "panicky"
        }

        fn schema(&self) -> ToolSchema {
            ToolSchema::new("Always panics.")
        }

        fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
            panic!("{}", self.0)
        }
    }

    #[test]
    fn successful_call_passes_through() {
        let outcome = invoke(
            &Upper,
            ToolArgs::new(serde_json::json!({"text": "quiet"})),
            &ToolContext::detached(),
        );

        assert_eq!(outcome, ToolOutcome::success("QUIET"));
    }

    #[test]
    fn schema_mismatch_skips_the_tool_body() {
        let tool = TrackedTool {
            body_ran: AtomicBool::new(false),
        };

        let outcome = invoke(
            &tool,
            ToolArgs::new(serde_json::json!({"count": "three"})),
            &ToolContext::detached(),
        );

        assert!(matches!(
            outcome.failure_reason(),
            Some(FailureReason::InvalidArguments { .. })
        ));
        assert!(!tool.body_ran.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_required_argument_is_rejected() {
        let outcome = invoke(&Upper, ToolArgs::empty(), &ToolContext::detached());

        assert_eq!(
            outcome.error_message().as_deref(),
            Some("Missing required argument 'text'")
        );
    }

    #[test]
    fn panic_is_contained_and_reported() {
        let outcome = invoke(
            &Panicky("weather db offline"),
            ToolArgs::empty(),
            &ToolContext::detached(),
        );

        match outcome.failure_reason() {
            Some(FailureReason::Raised { message }) => {
                assert_eq!(message, "Tool 'panicky' panicked: weather db offline");
            }
            other => panic!("Expected Raised, got {:?}", other),
        }
    }

    #[test]
    fn non_string_panic_payload_is_reported_opaquely() {
        struct OddPanic;

        impl Tool for OddPanic {
            fn name(&self) -> &str {
                "odd"
            }

            fn schema(&self) -> ToolSchema {
                ToolSchema::new("Panics with a non-string payload.")
            }

            fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
                std::panic::panic_any(42_u32)
            }
        }

        let outcome = invoke(&OddPanic, ToolArgs::empty(), &ToolContext::detached());

        match outcome.failure_reason() {
            Some(FailureReason::Raised { message }) => {
                assert_eq!(message, "Tool 'odd' panicked: opaque panic payload");
            }
            other => panic!("Expected Raised, got {:?}", other),
        }
    }
}
