use clap::{Args, Subcommand};

use super::{confirm, parse_assignments, print_entities, print_entity, OutputFormat};
use vibe_admin::Console;

const COLUMNS: &[&str] = &["name", "category", "price", "active", "featured"];

#[derive(Args)]
pub struct ProductCommand {
    #[command(subcommand)]
    pub command: ProductSubcommand,
}

#[derive(Subcommand)]
pub enum ProductSubcommand {
    /// List catalog items
    List {
        /// Only items in this category
        #[arg(long)]
        category: Option<String>,

        /// Only featured items
        #[arg(long)]
        featured: bool,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a catalog item's details
    Show {
        id: String,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Create a catalog item
    Create {
        /// Field assignment (can be repeated)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Update fields on a catalog item
    Update {
        id: String,

        /// Field assignment (can be repeated)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },

    /// Delete a catalog item
    Delete {
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Flip the active flag
    ToggleActive { id: String },

    /// Flip the featured flag
    ToggleFeatured { id: String },
}

impl ProductCommand {
    pub async fn run(&self, console: &Console) -> Result<(), Box<dyn std::error::Error>> {
        let products = &console.products;

        match &self.command {
            ProductSubcommand::List {
                category,
                featured,
                format,
            } => {
                products.fetch_all().await?;

                let items = match (category, *featured) {
                    (Some(category), false) => products.by_category(category),
                    (Some(category), true) => products
                        .featured()
                        .into_iter()
                        .filter(|p| p.str_field("category") == Some(category.as_str()))
                        .collect::<Vec<_>>(),
                    (None, true) => products.featured(),
                    (None, false) => products.entities(),
                };

                print_entities(&items, COLUMNS, *format, "product")
            }

            ProductSubcommand::Show { id, format } => {
                let product = products.fetch_one(id).await?;
                print_entity(&product, *format)
            }

            ProductSubcommand::Create { set } => {
                let fields = parse_assignments(set)?;
                if fields.is_empty() {
                    return Err("Nothing to create. Provide at least one --set KEY=VALUE.".into());
                }

                let created = products.create(fields).await?;
                println!("Created product:");
                print!("{}", created);
                Ok(())
            }

            ProductSubcommand::Update { id, set } => {
                let fields = parse_assignments(set)?;
                if fields.is_empty() {
                    return Err("Nothing to update. Provide at least one --set KEY=VALUE.".into());
                }

                products.fetch_one(id).await?;
                products.update(id, fields, None).await?;
                if let Some(product) = products.current() {
                    println!("Updated product:");
                    print!("{}", product);
                }
                Ok(())
            }

            ProductSubcommand::Delete { id, force } => {
                let product = products.fetch_one(id).await?;
                let name = product.str_field("name").unwrap_or(id.as_str()).to_string();

                if !force && !confirm(&format!("Delete product '{}'?", name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                products.delete(id).await?;
                println!("Deleted product: {}", name);
                Ok(())
            }

            ProductSubcommand::ToggleActive { id } => {
                products.fetch_all().await?;
                if !products.toggle_active(id).await? {
                    return Err(format!("Product not found: {}", id).into());
                }
                let active = products
                    .cached(id)
                    .and_then(|p| p.bool_field("active"))
                    .unwrap_or(false);
                println!("Product {} is now {}", id, if active { "active" } else { "inactive" });
                Ok(())
            }

            ProductSubcommand::ToggleFeatured { id } => {
                products.fetch_all().await?;
                if !products.toggle_featured(id).await? {
                    return Err(format!("Product not found: {}", id).into());
                }
                let featured = products
                    .cached(id)
                    .and_then(|p| p.bool_field("featured"))
                    .unwrap_or(false);
                println!(
                    "Product {} is {}",
                    id,
                    if featured { "featured" } else { "no longer featured" }
                );
                Ok(())
            }
        }
    }
}
