//! Muster CLI
//!
//! Run with: cargo run --bin muster

use anyhow::Result;
use clap::{Parser, Subcommand};
use muster::{
    server::{serve, AppState},
    tools, Config, CrewBuilder, CrewKind, Executor, OpenAiRuntime, TemplateStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "muster")]
#[command(about = "Assemble and run crews of LLM agents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Directory with agents.yaml / tasks.yaml overriding the built-in
    /// template tables
    #[arg(long)]
    templates_dir: Option<PathBuf>,

    /// LLM model to use
    #[arg(short, long, default_value = "gpt-4o-mini")]
    model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, default_value = "https://api.openai.com/v1")]
    base_url: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP service
    Serve {
        /// Address to bind
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Port to listen on
        #[arg(short, long, default_value_t = 5001)]
        port: u16,
    },

    /// Run a single crew and print the result
    Run {
        /// The topic the crew works on
        topic: String,

        /// Crew shape: research, analysis, full or custom
        #[arg(short, long, default_value = "research")]
        crew: String,

        /// Agent ids for a custom crew
        #[arg(long, value_delimiter = ',')]
        agents: Vec<String>,

        /// Task ids for a custom crew
        #[arg(long, value_delimiter = ',')]
        tasks: Vec<String>,

        /// File whose contents are injected as document context
        #[arg(long)]
        context_file: Option<PathBuf>,
    },

    /// List available agent and task templates
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let config = {
        let mut config = Config::default()
            .with_model(cli.model.as_str())
            .with_base_url(cli.base_url.as_str());
        if let Some(dir) = &cli.templates_dir {
            config = config.with_templates_dir(dir.clone());
        }
        config
    };

    let store = Arc::new(TemplateStore::load(config.templates_dir.as_deref())?);

    match cli.command {
        Commands::Serve { host, port } => {
            let config = config.with_listener(host, port);
            let state = Arc::new(AppState::new(config, store));
            serve(state).await
        }
        Commands::Run {
            topic,
            crew,
            agents,
            tasks,
            context_file,
        } => {
            let mut builder = CrewBuilder::new(store, cli.model.as_str());
            if let Some(path) = context_file {
                builder = builder.with_document_context(std::fs::read_to_string(&path)?);
            }

            let crew = match CrewKind::from_selector(&crew) {
                CrewKind::Research => builder.research_crew(&topic)?,
                CrewKind::Analysis => builder.analysis_crew(&topic)?,
                CrewKind::Full => builder.full_crew(&topic)?,
                CrewKind::Custom => builder.custom_crew(&topic, &agents, &tasks)?,
            };

            let runtime =
                OpenAiRuntime::from_config(&config.llm, builder.model(), tools::create_registry())?;
            let result = Executor::new(Arc::new(runtime)).run(&crew, None).await?;
            println!("{result}");
            Ok(())
        }
        Commands::List => {
            println!("Agents:");
            for agent in store.agent_summaries() {
                println!("  {:12} - {}", agent.id, agent.role);
            }
            println!();
            println!("Tasks:");
            for task in store.task_summaries() {
                let agent = if task.agent.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", task.agent)
                };
                println!("  {:16}{} - {}", task.id, agent, task.description);
            }
            println!();
            println!("Tools:");
            for def in tools::create_registry().definitions() {
                println!("  {:24} - {}", def.name, def.description);
            }
            Ok(())
        }
    }
}
