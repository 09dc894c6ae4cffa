//! Weather team demo: a coordinator that answers weather lookups itself and
//! hands greetings and farewells to two specialists.

use std::collections::HashMap;
use std::sync::Arc;

use troupe::{
    AgentName, AgentNode, AppId, GetWeather, InMemorySessionStore, KeywordRouter, ModelAuth,
    RouteDecision, RouteRule, Runner, RunnerConfig, SayGoodbye, SayHello, SessionId, SessionKey,
    SessionStore, TeamBuilder, ToolArgs, ToolName, UserId,
};

const MODEL: &str = "gemini-2.0-flash";

pub async fn run_weather_team() -> Result<(), Box<dyn std::error::Error>> {
    let root = build_team()?;
    let router = build_router(root.name().clone())?;

    let store = InMemorySessionStore::new();
    let key = SessionKey::new(
        AppId::parse("weather_tutorial_agent_team")?,
        UserId::parse("user_1_agent_team")?,
        SessionId::parse("session_001_agent_team")?,
    );
    store.create_session(key.clone(), HashMap::new())?;
    println!(
        "Session created: App='{}', User='{}', Session='{}'",
        key.app(),
        key.user(),
        key.session()
    );

    let config = RunnerConfig {
        model_auth: ModelAuth::from_env(),
        ..RunnerConfig::default()
    };
    let runner = Runner::with_config(store, root, Arc::new(router), config);

    for query in [
        "Hello there!",
        "What is the weather in New York?",
        "How about Paris?",
        "Thanks, bye!",
    ] {
        let outcome = runner.run_turn(&key, query).await?;
        println!("\n>>> User Query: {query}");
        println!("<<< Agent Response: {}", outcome.reply);
    }

    Ok(())
}

fn build_team() -> Result<Arc<AgentNode>, Box<dyn std::error::Error>> {
    let greeting = AgentNode::builder(MODEL, "greeting_agent")
        .description("Handles simple greetings and hellos using the 'say_hello' tool.")
        .instruction(
            "You are the Greeting Agent. Your ONLY task is to provide a friendly greeting \
             using the 'say_hello' tool.",
        )
        .tool(Arc::new(SayHello))
        .build();

    let farewell = AgentNode::builder(MODEL, "farewell_agent")
        .description("Handles simple farewells and goodbyes using the 'say_goodbye' tool.")
        .instruction(
            "You are the Farewell Agent. Your ONLY task is to provide a polite goodbye \
             message using the 'say_goodbye' tool.",
        )
        .tool(Arc::new(SayGoodbye))
        .build();

    let report = TeamBuilder::new()
        .specialist(greeting)
        .specialist(farewell)
        .build_root(
            AgentNode::builder(MODEL, "weather_agent_v2")
                .description(
                    "The main coordinator agent. Handles weather requests and delegates \
                     greetings and farewells to specialists.",
                )
                .instruction(
                    "You are the main Weather Agent coordinating a team. Use the 'get_weather' \
                     tool for specific weather requests and delegate greetings and farewells \
                     to your sub-agents.",
                )
                .tool(Arc::new(GetWeather)),
        );

    if !report.is_complete() {
        println!("Specialists omitted from the team: {:?}", report.omitted());
    }
    let root = report.root.ok_or("Coordinator agent could not be created")?;
    Ok(root)
}

// Static stand-in for a model-backed router: the coordinator delegates
// conversational queries and keeps weather lookups for itself, and each
// specialist answers with its own tool once the turn reaches it.
fn build_router(root: AgentName) -> Result<KeywordRouter, Box<dyn std::error::Error>> {
    let greeting = AgentName::parse("greeting_agent")?;
    let farewell = AgentName::parse("farewell_agent")?;
    let say_hello = ToolName::parse("say_hello")?;
    let say_goodbye = ToolName::parse("say_goodbye")?;

    Ok(KeywordRouter::new()
        .rule(
            RouteRule::keyword("hello", RouteDecision::delegate(greeting.clone()))
                .at(root.clone()),
        )
        .rule(
            RouteRule::keyword("bye", RouteDecision::delegate(farewell.clone())).at(root.clone()),
        )
        .rule(RouteRule::keyword("new york", weather_request("New York")?).at(root.clone()))
        .rule(RouteRule::keyword("london", weather_request("London")?).at(root.clone()))
        .rule(RouteRule::keyword("tokyo", weather_request("Tokyo")?).at(root.clone()))
        .rule(RouteRule::keyword("paris", weather_request("Paris")?).at(root))
        .rule(
            RouteRule::keyword("hello", RouteDecision::handle_with(say_hello, ToolArgs::empty()))
                .at(greeting),
        )
        .rule(
            RouteRule::keyword("bye", RouteDecision::handle_with(say_goodbye, ToolArgs::empty()))
                .at(farewell),
        ))
}

fn weather_request(city: &str) -> Result<RouteDecision, Box<dyn std::error::Error>> {
    Ok(RouteDecision::handle_with(
        ToolName::parse("get_weather")?,
        ToolArgs::new(serde_json::json!({ "city": city })),
    ))
}
