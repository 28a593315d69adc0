use clap::{Args, Subcommand};

use super::{parse_assignments, print_entities, print_entity, OutputFormat};
use vibe_admin::models::status_history;
use vibe_admin::{Config, Console, OrderStatus};

const COLUMNS: &[&str] = &["status", "total", "createdAt"];

#[derive(Args)]
pub struct OrderCommand {
    #[command(subcommand)]
    pub command: OrderSubcommand,
}

#[derive(Subcommand)]
pub enum OrderSubcommand {
    /// List orders
    List {
        /// Only orders with this status
        #[arg(long)]
        status: Option<OrderStatus>,

        /// Only the most recent orders
        #[arg(long)]
        recent: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show an order with its status history
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create an order
    Create {
        /// Field assignment (can be repeated)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Change an order's status
    Status {
        id: String,

        /// New status
        status: OrderStatus,

        /// Note recorded in the status history
        #[arg(long)]
        note: Option<String>,
    },

    /// Show order counts by status
    Stats {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show revenue from delivered orders
    Revenue,
}

impl OrderCommand {
    pub async fn run(
        &self,
        console: &Console,
        config: &Config,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let orders = &console.orders;

        match &self.command {
            OrderSubcommand::List {
                status,
                recent,
                format,
            } => {
                orders.fetch_all().await?;

                let mut items = match status {
                    Some(status) => orders.by_status(status.as_str()),
                    None => orders.entities(),
                };
                if *recent {
                    items.truncate(config.recent_limit.value);
                }

                print_entities(&items, COLUMNS, *format, "order")
            }

            OrderSubcommand::Show { id, format } => {
                let order = orders.fetch_one(id).await?;
                print_entity(&order, *format)?;

                if let OutputFormat::Text = format {
                    let history = status_history(&order);
                    if !history.is_empty() {
                        println!("\nStatus history:");
                        for entry in history {
                            if entry.notes.is_empty() {
                                println!("  {}  {}", entry.timestamp, entry.status);
                            } else {
                                println!("  {}  {} ({})", entry.timestamp, entry.status, entry.notes);
                            }
                        }
                    }
                }
                Ok(())
            }

            OrderSubcommand::Create { set } => {
                let fields = parse_assignments(set)?;
                if fields.is_empty() {
                    return Err("Nothing to create. Provide at least one --set KEY=VALUE.".into());
                }

                let created = orders.create(fields).await?;
                println!("Created order:");
                print!("{}", created);
                Ok(())
            }

            OrderSubcommand::Status { id, status, note } => {
                // the new history entry extends the record's existing history
                orders.fetch_one(id).await?;
                orders.update_status(id, *status, note.as_deref()).await?;
                println!("Order {} is now {}", id, status);
                Ok(())
            }

            OrderSubcommand::Stats { format } => {
                orders.fetch_all().await?;
                let stats = orders.stats();
                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
                    OutputFormat::Text => print!("{}", stats),
                }
                Ok(())
            }

            OrderSubcommand::Revenue => {
                orders.fetch_all().await?;
                println!("Revenue from delivered orders: {:.2}", orders.total_revenue());
                Ok(())
            }
        }
    }
}
