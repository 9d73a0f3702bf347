//! admin-config
//!
//! Inspect an admin configuration from the command line: validate an
//! initializer file, print the model pool, the navigation list or the
//! effective settings, or keep reloading while the initializer changes.
//!
//! Model sources are scanned under every `--root`; each discovered name is
//! registered as a plain model so it can be configured and listed.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};

use admin_config::config::{load_initializer, FileInitializer, GlobalConfig, InitializerWatcher};
use admin_config::hooks::AuthorizationAdapter;
use admin_config::model::{AbstractModel, ModelDiscovery, ModelSource};
use admin_config::observability::logging::{init_logging, DEFAULT_DIRECTIVE};
use admin_config::{Bindings, RequestContext};

#[derive(Parser)]
#[command(name = "admin-config")]
#[command(about = "Inspect and validate admin interface configuration", long_about = None)]
struct Cli {
    /// Application root to scan for models (repeatable)
    #[arg(short, long = "root")]
    roots: Vec<PathBuf>,

    /// Model directory under each root
    #[arg(long, default_value = "src/models")]
    load_path: Vec<PathBuf>,

    /// TOML initializer run on boot
    #[arg(short, long)]
    initializer: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate an initializer file
    Check { path: PathBuf },
    /// Print the effective model pool
    Pool,
    /// Print the navigation list
    Nav {
        /// Authorize every action instead of denying by default
        #[arg(long)]
        allow_all: bool,
    },
    /// Print the effective settings as JSON
    Settings,
    /// Reload whenever the initializer changes, until Ctrl-C
    Watch,
}

struct AllowAll;

impl AuthorizationAdapter for AllowAll {
    fn authorized(&self, _action: &str, _bindings: &Bindings) -> Option<bool> {
        Some(true)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(DEFAULT_DIRECTIVE);
    run(Cli::parse()).await
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match &cli.command {
        Commands::Check { path } => {
            load_initializer(path)?;
            println!("{}: ok", path.display());
        }
        Commands::Pool => {
            let config = boot(&cli)?;
            for name in config.models_pool()? {
                println!("{name}");
            }
        }
        Commands::Nav { allow_all } => {
            let mut config = boot(&cli)?;
            if *allow_all {
                config.authorize_with(|ctx: &mut RequestContext| {
                    ctx.set_authorization_adapter(Arc::new(AllowAll));
                });
            }
            let mut ctx = RequestContext::new();
            config.run_request_hooks(&mut ctx);
            let bindings = Bindings::new(Arc::new(ctx));
            for model in config.visible_models(&bindings)? {
                println!("{:>4}  {:<32} {}", model.weight(), model.key(), model.label());
            }
        }
        Commands::Settings => {
            let config = boot(&cli)?;
            println!("{}", serde_json::to_string_pretty(config.settings())?);
        }
        Commands::Watch => {
            let Some(path) = cli.initializer.as_deref() else {
                return Err("watch needs --initializer".into());
            };
            let mut config = boot(&cli)?;
            watch(&mut config, path).await?;
        }
    }

    Ok(())
}

fn boot(cli: &Cli) -> Result<GlobalConfig, Box<dyn std::error::Error>> {
    let sources = cli
        .roots
        .iter()
        .map(|root| ModelSource::new(root).with_load_paths(cli.load_path.iter()))
        .collect();
    let discovery = ModelDiscovery::new(sources);

    let mut config = GlobalConfig::new();
    for name in discovery.effective_pool(&[], &[])? {
        config.catalog_mut().register(AbstractModel::new(name));
    }
    config.set_discovery(discovery);

    if let Some(path) = &cli.initializer {
        config.set_initializer(FileInitializer::new(path));
    }
    config.reload()?;

    tracing::info!(
        models = config.catalog().len(),
        initializer = ?cli.initializer,
        "Configuration loaded"
    );
    Ok(config)
}

async fn watch(config: &mut GlobalConfig, path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let (watcher, mut updates) = InitializerWatcher::new(path);
    let _watcher = watcher.run()?;

    loop {
        tokio::select! {
            Some(file) = updates.recv() => {
                config.set_initializer(file);
                match config.reload() {
                    Ok(()) => tracing::info!(pool = ?config.models_pool().ok(), "Configuration reloaded"),
                    Err(e) => tracing::error!(error = %e, "Reload failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown complete");
                return Ok(());
            }
        }
    }
}
