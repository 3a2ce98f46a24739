//! Career Assistant - multi-agent job search helper
//!
//! Main entry point for the CLI application.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use career_assistant::cli::print_worker;
use career_assistant::core::config::JobSearchBackendKind;
use career_assistant::{Assistant, Config, ProviderType, Repl};

/// Career Assistant - resume analysis, job search, cover letters and research
#[derive(Parser, Debug)]
#[command(name = "career-assistant")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// LLM provider (openai, groq, ollama)
    #[arg(long)]
    provider: Option<ProviderType>,

    /// Model name understood by the provider
    #[arg(long, short = 'm')]
    model: Option<String>,

    /// Sampling temperature (0.0 - 2.0)
    #[arg(long, short = 't')]
    temperature: Option<f32>,

    /// Resume file (PDF, .txt or .md)
    #[arg(long, short = 'r')]
    resume: Option<PathBuf>,

    /// Job search backend (guest, api)
    #[arg(long)]
    job_backend: Option<JobSearchBackendKind>,

    /// Routing decisions allowed per turn
    #[arg(long)]
    max_steps: Option<usize>,

    /// Enable debug output
    #[arg(long, short = 'd')]
    debug: bool,

    /// Single prompt mode (non-interactive)
    #[arg(long, short = 'p')]
    prompt: Option<String>,
}

fn init_tracing(debug: bool) {
    let default_filter = if debug {
        "career_assistant=debug,info"
    } else {
        "career_assistant=warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Build configuration
    let mut config = Config::load();

    // Apply CLI overrides
    if let Some(provider) = args.provider {
        config.set_provider(provider);
    }

    if let Some(ref model) = args.model {
        config.set_model(model.clone());
    }

    if let Some(temperature) = args.temperature {
        config.set_temperature(temperature)?;
    }

    if let Some(ref resume) = args.resume {
        config.resume.path = resume.clone();
    }

    if let Some(backend) = args.job_backend {
        config.job_search.backend = backend;
    }

    if let Some(max_steps) = args.max_steps {
        config.set_max_steps(max_steps)?;
    }

    if args.debug {
        config.agent.debug = true;
    }

    init_tracing(config.agent.debug);

    // Single prompt mode
    if let Some(prompt) = args.prompt {
        let mut assistant =
            Assistant::new(config).context("failed to start the career assistant")?;
        assistant.set_observer(Arc::new(print_worker));

        println!("{}", assistant.process(&prompt).await);
        return Ok(());
    }

    // Interactive REPL mode
    let mut repl = Repl::with_config(config).context("failed to start the career assistant")?;
    repl.run().await?;

    Ok(())
}
