use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use log::info;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod cli;

use agentlab::agent::{Agent, AgentConfig, AgentRunner};
use agentlab::config::Config;
use agentlab::llm::{ChatModel, ChatRequest, Message, OpenAiClient, OpenAiConfig, Role};
use agentlab::mcp::{EMAIL_SERVER_NAME, McpClient, email_server};
use agentlab::prompt::ChatPromptTemplate;
use agentlab::rag::RagPipeline;
use agentlab::tools::{Arguments, Dispatcher, calculator_registry, weather_registry};
use cli::Cli;
use cli::commands::Commands;

const DEMO_MESSAGES: [&str; 3] = [
    "Please send an email to zhangsan@example.com with the subject 'Project progress update' and the body 'The project is going well this week, 75% of development is done.'",
    "How many unread emails are in my inbox?",
    "First check my inbox, then email lisi@example.com to tell him I will reply on Friday.",
];

fn setup_logging(filter: &str) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("agentlab")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("agentlab.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::new()
        .parse_filters(filter)
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized ({}), writing to: {}", filter, log_file.display());
    Ok(())
}

fn build_model(config: &Config) -> Result<Arc<OpenAiClient>> {
    let client = OpenAiClient::from_env(&config.llm.api_key_env, OpenAiConfig::from(&config.llm))
        .context("Failed to create model client")?;
    Ok(Arc::new(client))
}

fn email_client() -> Result<McpClient> {
    let mut client = McpClient::new();
    client.connect_server(EMAIL_SERVER_NAME, email_server().context("Failed to build email server")?);
    Ok(client)
}

fn email_agent(config: &Config) -> Result<Agent<OpenAiClient, McpClient>> {
    let runner = AgentRunner::with_config(
        build_model(config)?,
        Arc::new(email_client()?),
        AgentConfig::from(&config.agent),
    );
    Ok(Agent::new(runner))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        None | Some(Commands::Tools) => handle_tools_command(),
        Some(Commands::Call { tool, args }) => handle_call_command(tool, args).await,
        Some(Commands::Chat { messages }) => handle_chat_command(messages, config).await,
        Some(Commands::Demo) => handle_demo_command(config).await,
        Some(Commands::Weather { question }) => handle_weather_command(question, config).await,
        Some(Commands::Calc { question }) => handle_calc_command(question, config).await,
        Some(Commands::Joke { topic }) => handle_joke_command(topic, config).await,
        Some(Commands::Ingest { file }) => handle_ingest_command(file, config).await,
        Some(Commands::Ask { query }) => handle_ask_command(query, config).await,
    }
}

fn handle_tools_command() -> Result<()> {
    let client = email_client()?;
    for tool in client.list_all_tools() {
        println!(
            "{} {} - {}",
            format!("[{}]", tool.server).dimmed(),
            tool.descriptor.name.green(),
            tool.descriptor.description
        );
        for param in &tool.descriptor.parameters {
            let required = if param.required { "required" } else { "optional" };
            println!("    {} ({}, {})", param.name.cyan(), param.kind.as_str(), required);
        }
    }
    Ok(())
}

async fn handle_call_command(tool: &str, args: &str) -> Result<()> {
    info!("Calling tool {} directly", tool);
    let arguments: Arguments = match serde_json::from_str::<Value>(args).context("Failed to parse --args")? {
        Value::Object(map) => map,
        other => return Err(eyre!("--args must be a JSON object, got {}", other)),
    };

    let response = email_client()?.call_tool(tool, arguments).await;
    if response.is_error {
        println!("{} {}", "Error:".red(), response.text_content());
    } else {
        println!("{}", response.text_content());
    }
    Ok(())
}

async fn handle_chat_command(messages: &[String], config: &Config) -> Result<()> {
    let mut agent = email_agent(config)?;
    for message in messages {
        print_turn(message, &agent.chat(message.as_str()).await?);
    }
    Ok(())
}

async fn handle_demo_command(config: &Config) -> Result<()> {
    let mut agent = email_agent(config)?;
    for (i, message) in DEMO_MESSAGES.iter().enumerate() {
        if i == 2 {
            agent.reset();
            println!("{}", "--- conversation reset ---".dimmed());
        }
        println!("{} {}", "Example:".cyan(), i + 1);
        print_turn(message, &agent.chat(*message).await?);
    }
    Ok(())
}

async fn handle_weather_command(question: &str, config: &Config) -> Result<()> {
    let tools = Arc::new(Dispatcher::new(weather_registry().context("Failed to build weather tools")?));
    let runner = AgentRunner::with_config(build_model(config)?, tools, AgentConfig::from(&config.agent));
    let mut agent = Agent::new(runner);
    print_turn(question, &agent.chat(question).await?);
    Ok(())
}

async fn handle_calc_command(question: &str, config: &Config) -> Result<()> {
    let tools = Arc::new(Dispatcher::new(calculator_registry().context("Failed to build calculator tools")?));
    let runner = AgentRunner::with_config(build_model(config)?, tools, AgentConfig::from(&config.agent));
    let mut agent = Agent::new(runner);
    print_turn(question, &agent.chat(question).await?);
    Ok(())
}

async fn handle_joke_command(topic: &str, config: &Config) -> Result<()> {
    let template = ChatPromptTemplate::from_messages([
        (Role::System, "You are a joke master who tells short jokes."),
        (Role::User, "Write a joke about {{topic}}"),
    ])?;
    let messages: Vec<Message> = template.format_messages(&json!({ "topic": topic }))?;

    let model = build_model(config)?;
    let response = model.complete(ChatRequest::new(messages)).await?;
    println!("{}", response.content.unwrap_or_default());
    Ok(())
}

async fn handle_ingest_command(file: &Path, config: &Config) -> Result<()> {
    let model = build_model(config)?;
    let mut pipeline = RagPipeline::open(model.clone(), model, &config.rag)?;
    let added = pipeline
        .ingest(file)
        .await
        .context(format!("Failed to ingest {}", file.display()))?;
    println!(
        "{} {} chunks from {} into {}",
        "Ingested".green(),
        added,
        file.display(),
        config.rag.store_dir.display()
    );
    Ok(())
}

async fn handle_ask_command(query: &str, config: &Config) -> Result<()> {
    let model = build_model(config)?;
    let pipeline = RagPipeline::open(model.clone(), model, &config.rag)?;
    if pipeline.store().is_empty() {
        println!("{}", "Vector store is empty; run `agentlab ingest <file>` first".yellow());
    }

    let answer = pipeline.answer(query).await?;
    println!("{} {}", "Question:".cyan(), query);
    println!("{} {}", "Answer:".green(), answer.answer);
    for (i, source) in answer.sources.iter().enumerate() {
        println!("{}", format!("  [{}] score {:.3}", i + 1, source.score).dimmed());
    }
    Ok(())
}

fn print_turn(user: &str, reply: &str) {
    println!("{} {}", "User:".cyan(), user);
    println!("{} {}", "Assistant:".green(), reply);
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration; it names the log level
    let config = Config::load(cli.config.as_ref())
        .context("Failed to load configuration")?
        .with_env_overrides();

    // Setup logging
    let filter = config.log_filter(cli.is_verbose(), std::env::var("RUST_LOG").ok());
    setup_logging(&filter).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
