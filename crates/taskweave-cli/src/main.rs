//! Taskweave CLI — drives the multi-agent scheduler from the terminal.
//!
//! This binary plays the role of the owning protocol module: it picks a
//! reasoning backend, executes the goal, and formats the human-readable
//! report out of the spent execution context.

mod commands;

use clap::{Parser, Subcommand};

/// Taskweave CLI — multi-agent task scheduling
#[derive(Parser)]
#[command(name = "taskweave", version, about = "Taskweave CLI — multi-agent task scheduling")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a goal through the scheduler and print the report
    Run {
        /// The goal to decompose and execute
        goal: String,

        /// Reasoning backend: "echo" (offline), "script" (canned replies
        /// from --script), or "http"
        #[arg(long, default_value = "echo")]
        backend: String,

        /// YAML file with canned replies (for --backend script)
        #[arg(long)]
        script: Option<String>,

        /// Maximum scheduler rounds before the run fails as a timeout
        #[arg(long, default_value_t = 15)]
        max_steps: u32,

        /// Dump the full message log as JSON instead of the report
        #[arg(long)]
        json: bool,

        /// API base URL (for --backend http)
        #[arg(long, env = "TASKWEAVE_BASE_URL", default_value = "https://api.anthropic.com")]
        base_url: String,

        /// API key (for --backend http)
        #[arg(long, env = "ANTHROPIC_API_KEY", default_value = "")]
        api_key: String,

        /// Model ID (for --backend http)
        #[arg(long, env = "TASKWEAVE_MODEL", default_value = "claude-sonnet-4-20250514")]
        model: String,
    },

    /// Ask the planner for a task graph and print it without executing
    Plan {
        /// The goal to decompose
        goal: String,

        /// Reasoning backend: "echo", "script", or "http"
        #[arg(long, default_value = "echo")]
        backend: String,

        /// YAML file with canned replies (for --backend script)
        #[arg(long)]
        script: Option<String>,

        /// API base URL (for --backend http)
        #[arg(long, env = "TASKWEAVE_BASE_URL", default_value = "https://api.anthropic.com")]
        base_url: String,

        /// API key (for --backend http)
        #[arg(long, env = "ANTHROPIC_API_KEY", default_value = "")]
        api_key: String,

        /// Model ID (for --backend http)
        #[arg(long, env = "TASKWEAVE_MODEL", default_value = "claude-sonnet-4-20250514")]
        model: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            goal,
            backend,
            script,
            max_steps,
            json,
            base_url,
            api_key,
            model,
        } => {
            let backend_config = commands::BackendConfig {
                backend,
                script,
                base_url,
                api_key,
                model,
            };
            commands::run(&goal, backend_config, max_steps, json).await
        }
        Commands::Plan {
            goal,
            backend,
            script,
            base_url,
            api_key,
            model,
        } => {
            let backend_config = commands::BackendConfig {
                backend,
                script,
                base_url,
                api_key,
                model,
            };
            commands::plan(&goal, backend_config).await
        }
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
