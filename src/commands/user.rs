use clap::{Args, Subcommand};

use super::{parse_assignments, print_entities, print_entity, OutputFormat};
use vibe_admin::{AccountStatus, Config, Console};

const COLUMNS: &[&str] = &["email", "displayName", "status"];

#[derive(Args)]
pub struct UserCommand {
    #[command(subcommand)]
    pub command: UserSubcommand,
}

#[derive(Subcommand)]
pub enum UserSubcommand {
    /// List user accounts
    List {
        /// Only accounts with this status
        #[arg(long)]
        status: Option<AccountStatus>,

        /// Only the most recently created accounts
        #[arg(long)]
        recent: bool,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a user account
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a user account record
    Create {
        /// Field assignment (can be repeated)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Activate or deactivate an account
    Status { id: String, status: AccountStatus },

    /// Show account counts by status
    Stats {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl UserCommand {
    pub async fn run(
        &self,
        console: &Console,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let users = &console.users;

        match &self.command {
            UserSubcommand::List {
                status,
                recent,
                format,
            } => {
                users.fetch_all().await?;

                let items = match (status, *recent) {
                    (Some(AccountStatus::Active), false) => users.active_users(),
                    (Some(status), false) => users.by_status(status.as_str()),
                    (None, true) => users.recent(config.recent_limit.value),
                    (Some(status), true) => {
                        let mut items = users.by_status(status.as_str());
                        items.truncate(config.recent_limit.value);
                        items
                    }
                    (None, false) => users.entities(),
                };

                print_entities(&items, COLUMNS, *format, "user")
            }

            UserSubcommand::Show { id, format } => {
                let user = users.fetch_one(id).await?;
                print_entity(&user, *format)
            }

            UserSubcommand::Create { set } => {
                let fields = parse_assignments(set)?;
                if fields.is_empty() {
                    return Err("Nothing to create. Provide at least one --set KEY=VALUE.".into());
                }

                let created = users.create(fields).await?;
                println!("Created user:");
                print!("{}", created);
                Ok(())
            }

            UserSubcommand::Status { id, status } => {
                users.update_status(id, *status).await?;
                println!("User {} is now {}", id, status);
                Ok(())
            }

            UserSubcommand::Stats { format } => {
                users.fetch_all().await?;
                let stats = users.stats();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    OutputFormat::Text => print!("{}", stats),
                }
                Ok(())
            }
        }
    }
}
