use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use pingu::application::errors::BotError;
use pingu::application::runtime::{BuildInfo, Runtime, RuntimeOptions, Session};
use pingu::domain::traits::Transport;
use pingu::infrastructure::adapters::{ConsoleTransport, SlackTransport};
use pingu::infrastructure::config::Config;
use pingu::infrastructure::plugins::{Catalog, PluginRegistry};

#[derive(Parser)]
#[command(name = "pingu")]
#[command(about = "A plugin-hosting Slack bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path
    #[arg(short, long, default_value = "pingu.yaml")]
    config: PathBuf,

    /// Read messages from stdin instead of connecting to Slack
    #[arg(long)]
    console: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot (default)
    Run,
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// List the plugins the config would load
    Plugins,
}

fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_bot(&cli.config, cli.console),
        Commands::Version => print_version(),
        Commands::InitConfig => init_config(&cli.config),
        Commands::Plugins => list_plugins(&cli.config),
    };

    if let Err(e) = result {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn load_registry(config: &Config) -> Result<Arc<PluginRegistry>, BotError> {
    let registry = PluginRegistry::load(&config.plugins.directory, config, &Catalog::builtin())?;
    Ok(Arc::new(registry))
}

fn run_bot(config_path: &Path, console: bool) -> Result<(), BotError> {
    let config = Config::load(config_path)?;
    let registry = load_registry(&config)?;
    let build = BuildInfo::from_build_env()?;

    let transport: Arc<dyn Transport> = if console {
        Arc::new(ConsoleTransport::new())
    } else {
        let (bot_token, app_token) = config.require_slack_tokens()?;
        Arc::new(SlackTransport::new(bot_token, app_token)?)
    };

    tracing::info!(
        name = %config.bot.name,
        version = %build.friendly_version(),
        plugins = registry.len(),
        transport = transport.name(),
        "Starting pingu"
    );

    let session = Arc::new(Session::new(
        config.bot.name.clone(),
        build,
        registry,
        transport,
    ));

    let options = RuntimeOptions {
        handler_timeout: config.runtime.handler_timeout(),
        catch_up_timeout: config.runtime.catch_up_timeout(),
    };

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| BotError::Internal(format!("Failed to start async runtime: {}", e)))?;

    rt.block_on(async move { Runtime::new(session, options)?.run().await })
}

fn print_version() -> Result<(), BotError> {
    let build = BuildInfo::from_build_env()?;
    println!(
        "pingu {} (built {})",
        build.friendly_version(),
        build.built_at().format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}

fn init_config(config_path: &Path) -> Result<(), BotError> {
    Config::write_default(config_path)?;
    println!("Created {}", config_path.display());
    Ok(())
}

fn list_plugins(config_path: &Path) -> Result<(), BotError> {
    let config = Config::load(config_path)?;
    let registry = load_registry(&config)?;

    if registry.is_empty() {
        println!("No plugins enabled in {}", config.plugins.directory.display());
        return Ok(());
    }

    for plugin in registry.plugins() {
        println!("{} {} by {}", plugin.name(), plugin.version(), plugin.author());
        for command in plugin.commands() {
            println!("  {:<32} {}", command.pattern(), command.description());
        }
        if !plugin.tasks().is_empty() {
            println!("  {} scheduled task(s)", plugin.tasks().len());
        }
    }

    Ok(())
}
