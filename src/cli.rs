//! Command-line entry points: list and call tools, check the provider, inspect models.
//!
//! Results go to stdout as JSON; logs go to stderr.

use crate::compression::CompressionEngine;
use crate::config::Config;
use crate::provider::{self, CapabilityRegistry, CapabilitySource, format_api_error};
use crate::tool::{ToolContext, ToolRegistry};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "COGNILENS_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

/// LLM-backed text compression tools
#[derive(Parser, Debug)]
#[command(name = "cognilens", version, about)]
pub struct Cli {
    /// Config file (defaults to $COGNILENS_CONFIG, then ./config.yaml)
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the available tools and their parameters
    Tools,
    /// Call one tool with JSON arguments
    Call(CallArgs),
    /// Check that the configured provider is reachable
    Health,
    /// Show the model capabilities reported by the provider
    Models {
        /// Bypass the capability cache
        #[arg(long)]
        refresh: bool,
    },
}

#[derive(Parser, Debug)]
pub struct CallArgs {
    /// Tool name (see `cognilens tools`)
    pub tool: String,

    /// Arguments as a JSON object (read from stdin when neither source is given)
    #[arg(short, long, conflicts_with = "args_file")]
    pub args: Option<String>,

    /// Read arguments from a file ("-" for stdin)
    #[arg(long, value_name = "PATH")]
    pub args_file: Option<PathBuf>,
}

/// Run the CLI
pub async fn run(cli: Cli) -> ExitCode {
    init_tracing(cli.verbose);

    match run_inner(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", format_api_error(&format!("{e:#}")));
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        tracing_subscriber::EnvFilter::new("debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn run_inner(cli: Cli) -> Result<ExitCode> {
    let config = load_config(cli.config.as_deref())?;
    let engine = Arc::new(CompressionEngine::from_config(&config)?);
    let tools = ToolRegistry::with_builtins();

    match cli.command {
        Commands::Tools => {
            print_json(&tool_listing(&tools))?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Call(args) => {
            let input = read_args(&args)?;
            let ctx = ToolContext::new(engine, config.summarization.clone());
            let output = tools
                .call_tool(&args.tool, input, &ctx)
                .await
                .with_context(|| format!("{} failed", args.tool))?;
            print_json(&output)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Health => {
            let report = health_report(&engine, &config).await;
            print_json(&report)?;
            Ok(if report["healthy"] == true {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            })
        }
        Commands::Models { refresh } => {
            let source = model_source(&engine)?;
            let registry =
                CapabilityRegistry::new(source, config.llm.smart_selection.cache_ttl_seconds);
            let snapshot = registry
                .get(refresh)
                .await
                .context("Failed to fetch model capabilities")?;
            print_json(&serde_json::to_value(snapshot.as_ref())?)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn model_source(engine: &CompressionEngine) -> Result<Arc<dyn CapabilitySource>, provider::Error> {
    engine
        .llm()
        .capabilities()
        .ok_or_else(|| provider::Error::Unsupported {
            backend: engine.llm().id().to_string(),
            operation: "model capabilities".into(),
        })
}

fn load_config(path: Option<&Path>) -> crate::Result<Config> {
    let config = match path {
        Some(path) => Config::from_yaml(path)?,
        None => Config::load()?,
    };
    tracing::debug!(provider = config.llm.provider.id(), model = %config.llm.model, "Config loaded");
    Ok(config)
}

/// Tool arguments from `--args`, `--args-file` or stdin. Blank input means `{}`.
fn read_args(args: &CallArgs) -> crate::Result<Value> {
    let raw = match (&args.args, &args.args_file) {
        (Some(json), _) => json.clone(),
        (None, Some(path)) if path.as_os_str() != "-" => std::fs::read_to_string(path)?,
        (None, _) => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    if raw.trim().is_empty() {
        return Ok(json!({}));
    }
    Ok(serde_json::from_str(&raw)?)
}

fn tool_listing(tools: &ToolRegistry) -> Value {
    Value::Array(
        tools
            .list_tools()
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters(),
                })
            })
            .collect(),
    )
}

/// Provider health plus, for capability-reporting gateways, the advertised model count.
async fn health_report(engine: &CompressionEngine, config: &Config) -> Value {
    let llm = engine.llm();
    let (healthy, models) = futures::join!(llm.health_check(), async {
        match llm.capabilities() {
            Some(source) => match source.get_capabilities(false).await {
                Ok(models) => Some(models.len()),
                Err(e) => {
                    tracing::warn!(error = %e, "Capability check failed");
                    None
                }
            },
            None => None,
        }
    });

    json!({
        "provider": llm.id(),
        "model": config.llm.model,
        "healthy": healthy,
        "smart_selection": engine.selector().is_some(),
        "models": models,
    })
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
