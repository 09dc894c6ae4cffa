//! Conversation framing tools: greeting and farewell.

use tracing::debug;

use troupe_core::tool::{
    ParamSpec, ParamType, Tool, ToolArgs, ToolContext, ToolOutcome, ToolSchema,
};

/// Greets the user, optionally by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct SayHello;

impl Tool for SayHello {
    fn name(&self) -> &str {
        "say_hello"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Provides a simple greeting, optionally addressing the user by name.")
            .with_param(ParamSpec::optional("name", ParamType::Text))
    }

    fn call(&self, args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        let name = args.text_opt("name").unwrap_or("there");
        debug!(name = %name, "Greeting");
        ToolOutcome::success(format!("Hello, {}!", name))
    }
}

/// Concludes the conversation with a fixed farewell.
#[derive(Debug, Clone, Copy, Default)]
pub struct SayGoodbye;

impl Tool for SayGoodbye {
    fn name(&self) -> &str {
        "say_goodbye"
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new("Provides a simple farewell message to conclude the conversation.")
    }

    fn call(&self, _args: ToolArgs, _ctx: &ToolContext) -> ToolOutcome {
        ToolOutcome::success("Goodbye! Have a great day.")
    }
}
