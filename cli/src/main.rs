//! CLI entrypoint for hearth
//!
//! Wires the layers together for a one-shot turn: load configuration, build
//! the tool catalog and the in-memory home, connect the Workers AI gateway,
//! and drive the utterance through the conversation loop.

use anyhow::{Context, Result, bail};
use clap::Parser;
use hearth_application::{ConversationLoop, LoopConfig, ToolDispatcher, TurnLogger};
use hearth_domain::prompt::SystemPrompt;
use hearth_domain::session::turn::TurnStatus;
use hearth_domain::tool::builtin::builtin_catalog;
use hearth_infrastructure::{ConfigLoader, InMemoryHome, JsonlTurnLogger, WorkersAiGateway};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hearth", version, about = "Smart-home voice assistant core")]
struct Cli {
    /// The utterance to process (e.g. "turn off all lights in the kitchen")
    utterance: Option<String>,

    /// Explicit configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Home description file (entities, areas, floors) backing the registry
    #[arg(long)]
    home: Option<PathBuf>,

    /// Write the machine-readable turn log to this JSONL file
    #[arg(long)]
    transcript_log: Option<PathBuf>,

    /// List the advertised tools and exit
    #[arg(long)]
    list_tools: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow::anyhow!(e))?;

    let mut catalog = builtin_catalog();
    if let Some(enabled) = &config.tools.enabled {
        catalog = catalog.filtered(enabled);
    }

    if cli.list_tools {
        for def in catalog.list_definitions() {
            println!("{:<28} {}", def.name, def.description);
        }
        return Ok(());
    }

    let Some(utterance) = cli.utterance else {
        bail!("An utterance is required. Try: hearth \"turn off the kitchen light\"");
    };

    if !config.has_credentials() {
        bail!(
            "Workers AI credentials missing. Set [workers_ai] account_id and api_token in {}",
            ConfigLoader::global_config_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "hearth.toml".to_string())
        );
    }

    let Some(home_path) = cli.home else {
        bail!("A home file is required. Try: hearth --home home.toml \"...\"");
    };
    let home = Arc::new(
        InMemoryHome::from_file(&home_path)
            .with_context(|| format!("loading {}", home_path.display()))?,
    );

    info!(model = %config.workers_ai.model, tools = catalog.len(), "starting turn");

    // === Dependency injection ===
    let gateway = Arc::new(WorkersAiGateway::new(&config.workers_ai));
    let dispatcher = Arc::new(ToolDispatcher::new(catalog, home.clone(), home.clone()));

    let mut conversation = ConversationLoop::new(gateway, dispatcher)
        .with_config(LoopConfig {
            max_rounds: config.conversation.max_rounds,
            round_timeout: Duration::from_secs(config.conversation.round_timeout_secs),
        })
        .with_system_prompt(SystemPrompt::new(config.conversation.system_prompt.clone()));

    // Ctrl-C is a barge-in: abort the in-flight round, fail the turn.
    let token = CancellationToken::new();
    {
        let token = token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        });
    }
    conversation = conversation.with_cancellation(token);

    let log_path = cli
        .transcript_log
        .or_else(|| config.logging.transcript_path.as_ref().map(PathBuf::from));
    if let Some(path) = log_path
        && let Some(logger) = JsonlTurnLogger::new(&path)
    {
        info!(path = %logger.path().display(), "turn log enabled");
        conversation = conversation.with_logger(Arc::new(logger) as Arc<dyn TurnLogger>);
    }

    let outcome = conversation.run(&utterance).await;

    println!("{}", outcome.speech);

    if outcome.status == TurnStatus::Failed {
        std::process::exit(1);
    }
    Ok(())
}
