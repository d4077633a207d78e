// Binary: ALCF assistant MCP server
//
// `serve` speaks MCP on stdio; `ask` is a one-shot question from the shell.
// Logs go to stderr so stdout stays clean for the transport.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use alcf_mcp::{AlcfServer, OutputFormat, QueryOrchestrator, RunOptions, SystemName, load_yaml_config};

#[derive(Parser, Debug)]
#[command(name = "alcf-mcp")]
#[command(about = "MCP server for the ALCF AI assistant (ask.alcf.anl.gov)", long_about = None)]
struct Cli {
    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    no_headless: bool,

    /// Debug logging for this crate
    #[arg(short, long, global = true)]
    verbose: bool,

    /// YAML config file (default: $ALCF_MCP_CONFIG, then ./config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server.
    Serve,
    /// Ask one question and print the answer.
    Ask {
        /// Question for the assistant (5-1000 characters)
        question: String,

        /// Timeout in milliseconds (10000-180000)
        #[arg(short = 't', long = "timeout")]
        timeout_ms: Option<u64>,

        /// document|markdown or structured|json
        #[arg(long, default_value = "document")]
        format: OutputFormat,
    },
    /// List the systems accepted by alcf_get_system_info.
    Systems,
}

fn init_tracing(options: &RunOptions) {
    let filter = if options.verbose {
        EnvFilter::new(options.log_filter())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(options.log_filter()))
    };
    // ignore a second init, e.g. when a test harness already installed one
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&RunOptions {
        verbose: cli.verbose,
        ..RunOptions::default()
    });

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    if let Commands::Systems = cli.command {
        for name in SystemName::ALL {
            println!("{:<12} {}", name.as_str(), name.description());
        }
        return Ok(ExitCode::SUCCESS);
    }

    let config = Arc::new(load_yaml_config(cli.config.as_deref())?);
    let options = RunOptions {
        headless: config.browser.headless && !cli.no_headless,
        verbose: cli.verbose,
    };
    let orchestrator = Arc::new(QueryOrchestrator::with_chrome(config, options));

    match cli.command {
        Commands::Serve => {
            AlcfServer::new(orchestrator).serve_stdio().await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ask {
            question,
            timeout_ms,
            format,
        } => ask_once(&orchestrator, &question, timeout_ms, format).await,
        Commands::Systems => Ok(ExitCode::SUCCESS),
    }
}

async fn ask_once(
    orchestrator: &QueryOrchestrator,
    question: &str,
    timeout_ms: Option<u64>,
    format: OutputFormat,
) -> Result<ExitCode> {
    let ruler = "=".repeat(80);
    let outcome = tokio::select! {
        outcome = orchestrator.ask(question, timeout_ms, format) => outcome,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\nInterrupted");
            return Ok(ExitCode::from(130));
        }
    };

    match outcome {
        Ok(shaped) => {
            println!("{ruler}");
            println!("{}", shaped.body);
            println!("{ruler}");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("{e}");
            Ok(ExitCode::FAILURE)
        }
    }
}
