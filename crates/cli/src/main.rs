use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pushgate")]
#[command(about = "pushgate: push messages to chats over HTTP", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version
    Version,

    /// Generate the config file with defaults (random token) if it does not exist, and print where it is.
    Init {
        /// Config file path (default: PUSHGATE_CONFIG_PATH or ~/.pushgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,
    },

    /// Run the push gateway (HTTP intake + delivery dispatcher).
    Serve {
        /// Config file path (default: PUSHGATE_CONFIG_PATH or ~/.pushgate/config.json)
        #[arg(long, short, value_name = "PATH")]
        config: Option<PathBuf>,

        /// Listen port (default from config or 9966)
        #[arg(long, short)]
        port: Option<u16>,

        /// Bind address (default from config or 0.0.0.0)
        #[arg(long)]
        host: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Version) => {
            println!("pushgate {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Init { config }) => {
            if let Err(e) = run_init(config) {
                log::error!("init failed: {:#}", e);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { config, port, host }) => {
            if let Err(e) = run_serve(config, port, host).await {
                log::error!("gateway failed: {:#}", e);
                std::process::exit(1);
            }
        }
        None => {
            println!("Run with --help for usage");
        }
    }
}

fn run_init(config_path: Option<PathBuf>) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(pushgate::config::default_config_path);
    let config = pushgate::config::load_or_generate(&path)?;
    println!("config: {}", path.display());
    println!("push endpoint: POST http://{}{}", config.api.bind_addr(), config.api.route_path());
    if config.api.default_recipient().is_none() {
        println!("set api.default_umo in the config to choose the default recipient");
    }
    Ok(())
}

async fn run_serve(
    config_path: Option<PathBuf>,
    port: Option<u16>,
    host: Option<String>,
) -> anyhow::Result<()> {
    let path = config_path.unwrap_or_else(pushgate::config::default_config_path);
    let mut config = pushgate::config::load_or_generate(&path)?;
    config.api.token = pushgate::config::resolve_token(&config);
    if let Some(p) = port {
        config.api.port = p;
    }
    if let Some(h) = host {
        config.api.host = h;
    }
    log::info!("using config {}", path.display());
    pushgate::gateway::run_gateway(config).await
}
