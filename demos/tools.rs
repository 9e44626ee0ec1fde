//! Registers a couple of tools and either calls them directly or lets a
//! model call them.
//!
//! Usage:
//!   cargo run --example tools -- --city Paris
//!   OPENAI_API_KEY=sk-... cargo run --example tools -- --prompt "What is the weather in New York City?"
//!   cargo run --example tools -- --base-url http://localhost:8000 --model qwen-plus --prompt "Greet Ada, she is 36"

use std::time::Duration;

use agent_tools::{
    ContentBlock, InferenceProvider, InferenceRequest, ProviderConfig, StopReason, Tool,
    ToolContext, ToolError, ToolRegistry,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

#[derive(Parser)]
#[command(name = "tools", about = "Exercise agent tools locally or through a model")]
struct Cli {
    /// Prompt to send to the model. Without it, tools are called directly.
    #[arg(long, short = 'p')]
    prompt: Option<String>,

    /// City for the direct weather call
    #[arg(long, default_value = "New York City")]
    city: String,

    /// Model to use
    #[arg(long, default_value = "gpt-4o-mini")]
    model: String,

    /// API base URL (overrides OPENAI_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 60)]
    timeout: u64,

    /// Max retries for transient provider failures
    #[arg(long, default_value_t = 2)]
    max_retries: u32,
}

#[derive(Deserialize)]
struct GreetInput {
    name: String,
    age: u32,
}

#[derive(Serialize)]
struct GreetOutput {
    message: String,
}

fn build_registry() -> ToolRegistry {
    let weather = Tool::from_fn(
        "get_weather",
        "Get the current weather for a given city",
        json!({
            "type": "object",
            "properties": { "location": { "type": "string" } },
            "required": ["location"]
        }),
        |ctx: ToolContext, input: String| async move {
            ctx.check()?;
            info!(%input, "fetching weather");
            Ok::<_, ToolError>("Sunny, 25°C".to_string())
        },
    );

    let greet = Tool::typed(
        "greet",
        "Greet a person by name and age",
        json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "age": { "type": "integer" }
            },
            "required": ["name", "age"]
        }),
        |_ctx, input: GreetInput| async move {
            Ok::<_, ToolError>(GreetOutput {
                message: format!("Hello {}, you are {} years old", input.name, input.age),
            })
        },
    );

    ToolRegistry::new().add(weather).add(greet)
}

async fn call_directly(registry: &ToolRegistry, city: &str) {
    let ctx = ToolContext::new();
    let calls = [
        ("get_weather", json!({ "location": city }).to_string()),
        ("greet", r#"{"name":"Alice","age":30}"#.to_string()),
        ("greet", "not json".to_string()),
    ];
    for (name, input) in calls {
        match registry.execute(&ctx, name, &input).await {
            Ok(output) => println!("{name}({input}) -> {output}"),
            Err(e) => println!("{name}({input}) failed: {e}"),
        }
    }
}

async fn ask(
    provider: &dyn InferenceProvider,
    registry: &ToolRegistry,
    model: &str,
    prompt: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut request = InferenceRequest {
        model: model.to_string(),
        system: Some("You are a helpful assistant that provides weather information.".into()),
        tools: registry.definitions(),
        messages: vec![json!({ "role": "user", "content": prompt })],
        ..Default::default()
    };

    let response = provider.infer(request.clone()).await?;
    if response.stop_reason != StopReason::ToolUse {
        println!("{}", response.text());
        return Ok(());
    }

    let ctx = ToolContext::new();
    let mut tool_calls = Vec::new();
    let mut results = Vec::new();
    for block in &response.content {
        if let ContentBlock::ToolUse {
            id,
            name,
            arguments,
        } = block
        {
            let output = match registry
                .execute(&ctx.clone().with_call_id(id.as_str()), name, arguments)
                .await
            {
                Ok(output) => output,
                Err(e) => format!("error: {e}"),
            };
            eprintln!("  [tool: {name}] {arguments} -> {output}");
            tool_calls.push(json!({
                "id": id,
                "type": "function",
                "function": { "name": name, "arguments": arguments }
            }));
            results.push(json!({ "role": "tool", "tool_call_id": id, "content": output }));
        }
    }

    request.messages.push(json!({
        "role": "assistant",
        "content": Value::Null,
        "tool_calls": tool_calls,
    }));
    request.messages.extend(results);

    let response = provider.infer(request).await?;
    println!("{}", response.text());
    Ok(())
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let registry = build_registry();

    let Some(prompt) = cli.prompt.as_deref() else {
        call_directly(&registry, &cli.city).await;
        return;
    };

    let mut config = ProviderConfig::from_env()
        .with_request_timeout(Duration::from_secs(cli.timeout))
        .with_max_retries(cli.max_retries)
        .with_header("X-Client", "agent-tools-demo");
    if let Some(ref url) = cli.base_url {
        config = config.with_base_url(url);
    }
    let provider = config.into_provider();

    if let Err(e) = ask(&provider, &registry, &cli.model, prompt).await {
        eprintln!("\x1b[1;31merror:\x1b[0m {e}");
        std::process::exit(1);
    }
}
