use clap::Parser;
use mount_console::{
    app::{self, ConsoleMount},
    config::{self, Config, MountBackend},
    model::{ConsoleError, ConsoleResult},
};
use poi_selector::Catalog;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mount_console", about = "Point-of-interest keypad for a telescope mount")]
struct Args {
    /// Config file, defaults to the platform config directory
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON catalog body, overrides the config
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// INDI server address (host:port), overrides the config
    #[arg(long)]
    indi: Option<String>,
    /// INDI mount device name
    #[arg(long, requires = "indi")]
    device: Option<String>,
}

fn main() -> ConsoleResult<()> {
    let args = Args::parse();

    let config_path = args.config.unwrap_or_else(config::default_config_path);
    let mut config = Config::load_from(&config_path)?;
    if let Some(path) = args.catalog {
        config.catalog_path = Some(path);
    }
    if let Some(address) = args.indi {
        config.mount = MountBackend::Indi {
            address,
            device: args.device,
        };
    }

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)
        .map_err(|e| ConsoleError::ConfigError(format!("{}: {e}", log_dir.display())))?;
    let file_appender = tracing_appender::rolling::never(&log_dir, "mount_console.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    std::panic::set_hook(Box::new(|info| tracing::error!("PANIC: {info}")));

    let catalog = match &config.catalog_path {
        Some(path) => Catalog::load(path)?,
        None => Catalog::builtin(),
    };
    tracing::info!("loaded {} points of interest", catalog.body().len());

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| ConsoleError::ServerError(format!("failed to start runtime: {e}")))?;

    let mount = ConsoleMount::open(&config.mount, runtime.handle())?;
    app::run(&config, catalog, mount)
}
