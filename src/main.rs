use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};
use xenofont::config::{self, Config};
use xenofont::ear::LineEar;
use xenofont::launcher::SystemLauncher;
use xenofont::logging::{self, LogLevel};
use xenofont::mouth::ConsoleMouth;
use xenofont::{Assistant, Responder};

const DEFAULT_CONFIG: &str = "xenofont.toml";

/// Voice command shell answering free-form questions through Ollama.
#[derive(Parser, Debug)]
#[command(name = "xenofont")]
struct Cli {
    /// TOML configuration file. `xenofont.toml` is read when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Base URL of the Ollama server.
    #[arg(long, env = "OLLAMA_BASE_URL")]
    base_url: Option<String>,

    /// Model name to generate with.
    #[arg(long, env = "OLLAMA_MODEL")]
    model: Option<String>,

    #[arg(long, value_enum, default_value_t = LogLevel::Warn)]
    log_level: LogLevel,
}

async fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => config::load(path).await,
        None if Path::new(DEFAULT_CONFIG).exists() => config::load(DEFAULT_CONFIG).await,
        None => {
            debug!("no config file, using defaults");
            Ok(Config::default())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level);

    let mut cfg = load_config(cli.config.as_deref()).await?;
    if let Some(base_url) = cli.base_url {
        cfg.llm.base_url = base_url;
    }
    if let Some(model) = cli.model {
        cfg.llm.model = model;
    }
    info!(base_url = %cfg.llm.base_url, model = %cfg.llm.model, "starting");

    let responder = Responder::from_config(&cfg.llm)?;
    let mouth = ConsoleMouth::new(cfg.assistant.name.clone(), cfg.assistant.pause());
    let assistant = Assistant::new(
        LineEar::stdin(),
        mouth,
        &cfg,
        Arc::new(SystemLauncher),
        responder,
    );
    assistant.run().await
}
