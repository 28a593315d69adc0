use clap::{Args, Subcommand};
use std::fs;
use std::io::Write;

use super::OutputFormat;
use vibe_admin::config::DEFAULT_RECENT_LIMIT;
use vibe_admin::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Initialize configuration file
    Init,
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("data_dir: {}", config.data_dir.value.display());
                        println!("  source: {}", config.data_dir.source);
                        println!();

                        println!("recent_limit: {}", config.recent_limit.value);
                        println!("  source: {}", config.recent_limit.source);
                    }
                }
                Ok(())
            }

            ConfigSubcommand::Init => {
                let config_path = Config::default_config_path();

                if config_path.exists() {
                    println!("Config file already exists: {}", config_path.display());
                    println!("Use 'vibe-admin config show' to view current configuration.");
                    return Ok(());
                }

                if let Some(parent) = config_path.parent() {
                    fs::create_dir_all(parent)?;
                }

                let mut file = fs::File::create(&config_path)?;
                writeln!(file, "# vibe-admin configuration")?;
                writeln!(file)?;
                writeln!(file, "# Directory holding products.json, orders.json and users.json")?;
                writeln!(file, "data_dir: {}", Config::default_data_dir().display())?;
                writeln!(file)?;
                writeln!(file, "# Records shown by --recent listings")?;
                writeln!(file, "recent_limit: {}", DEFAULT_RECENT_LIMIT)?;

                println!("Created config file: {}", config_path.display());
                Ok(())
            }
        }
    }
}
