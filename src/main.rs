use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

mod commands;

use commands::{ConfigCommand, OrderCommand, ProductCommand, UserCommand};
use vibe_admin::{Config, Console, FileGateway};

#[derive(Parser)]
#[command(name = "vibe-admin")]
#[command(version)]
#[command(about = "Admin console for the shop's products, orders and users", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the product catalog
    Product(ProductCommand),

    /// Manage orders and their status
    Order(OrderCommand),

    /// Manage user accounts
    User(UserCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so json output on stdout stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vibe_admin=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = Config::load(cli.config)?;

    let Some(command) = cli.command else {
        println!("vibe-admin {}", vibe_admin::version());
        println!("Run 'vibe-admin --help' for usage.");
        return Ok(());
    };

    if let Commands::Config(cmd) = &command {
        return cmd.run(&config);
    }

    let gateway = Arc::new(FileGateway::new(config.data_dir.value.clone()));
    let console = Console::new(gateway);

    match &command {
        Commands::Product(cmd) => cmd.run(&console).await,
        Commands::Order(cmd) => cmd.run(&console, &config).await,
        Commands::User(cmd) => cmd.run(&console, &config).await,
        Commands::Config(_) => Ok(()),
    }
}
