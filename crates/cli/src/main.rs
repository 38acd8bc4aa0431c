//! Safeguard CLI - sample data, catalog browsing, and the local quote cart.
//!
//! # Usage
//!
//! ```bash
//! # Write sample products and categories to the configured store
//! sg-cli seed --count 48
//!
//! # Browse
//! sg-cli products --category ppe --search gloves
//! sg-cli categories
//!
//! # Build a cart (kept in SAFEGUARD_CART_PATH) and request a quote
//! sg-cli cart add 12 --quantity 5 --color blue
//! sg-cli cart list
//! sg-cli quote --first-name Nino --last-name Beridze \
//!     --email nino@example.ge --phone "+995 555 123 456"
//! ```
//!
//! The store is selected the same way as for the storefront server
//! (`FIRESTORE_PROJECT_ID`, `STORE_BACKEND`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use safeguard_core::{ContactDetails, VariantChoice};

mod commands;

#[derive(Parser)]
#[command(name = "sg-cli")]
#[command(author, version, about = "Safeguard CLI tools")]
struct Cli {
    /// File holding the local cart
    #[arg(
        long,
        global = true,
        env = "SAFEGUARD_CART_PATH",
        default_value = ".safeguard-cart.json"
    )]
    cart_path: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write sample products and categories to the store
    Seed {
        /// Number of sample products
        #[arg(short, long, default_value_t = safeguard_storefront::catalog::sample::DEFAULT_COUNT)]
        count: usize,
    },
    /// List products
    Products {
        /// Category, subcategory, or leaf name
        #[arg(short, long)]
        category: Option<String>,

        /// Search term (name, model, brand)
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Print the category navigation tree
    Categories,
    /// Manage the local cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Submit the cart as a quote request, clearing it on success
    Quote {
        #[command(flatten)]
        contact: ContactArgs,
    },
    /// Ask for a product the catalog does not carry
    SpecialOrder {
        #[command(flatten)]
        contact: ContactArgs,

        /// What you are looking for
        #[arg(short, long)]
        description: String,

        /// How many you need
        #[arg(short, long)]
        quantity: Option<u32>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add a product by document key or numeric id
    Add {
        product: String,

        #[arg(short, long, default_value_t = 1)]
        quantity: u32,

        #[arg(long)]
        color: Option<String>,

        #[arg(long)]
        size: Option<String>,

        #[arg(long)]
        theme: Option<String>,
    },
    /// Set the quantity of a line (0 removes it)
    Update { product_id: i64, quantity: u32 },
    /// Remove a line
    Remove { product_id: i64 },
    /// Show the cart
    List,
    /// Empty the cart
    Clear,
}

#[derive(Args)]
struct ContactArgs {
    #[arg(long)]
    first_name: String,

    #[arg(long)]
    last_name: String,

    #[arg(long)]
    email: String,

    #[arg(long)]
    phone: String,

    #[arg(long, default_value = "")]
    company: String,

    /// Job title
    #[arg(long, default_value = "")]
    position: String,

    #[arg(long, default_value = "")]
    note: String,
}

impl From<ContactArgs> for ContactDetails {
    fn from(args: ContactArgs) -> Self {
        Self {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            note: args.note,
            position: args.position,
            company: args.company,
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load .env before clap reads SAFEGUARD_CART_PATH
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = commands::Context::from_env(cli.cart_path)?;

    match cli.command {
        Commands::Seed { count } => commands::seed::sample(&ctx, count).await?,
        Commands::Products { category, search } => {
            commands::catalog::products(&ctx, category.as_deref(), search.as_deref()).await;
        }
        Commands::Categories => commands::catalog::categories(&ctx).await,
        Commands::Cart { action } => match action {
            CartAction::Add {
                product,
                quantity,
                color,
                size,
                theme,
            } => {
                let variant = VariantChoice { color, size, theme };
                commands::cart::add(&ctx, &product, quantity, variant).await?;
            }
            CartAction::Update {
                product_id,
                quantity,
            } => commands::cart::update(&ctx, product_id, quantity)?,
            CartAction::Remove { product_id } => commands::cart::remove(&ctx, product_id)?,
            CartAction::List => commands::cart::list(&ctx),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Quote { contact } => {
            commands::quote::submit(&ctx, &contact.into()).await?;
        }
        Commands::SpecialOrder {
            contact,
            description,
            quantity,
        } => {
            commands::quote::special_order(&ctx, contact.into(), description, quantity).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_cart_add_with_variant() {
        let cli = Cli::try_parse_from([
            "sg-cli", "cart", "add", "gloves-01", "-q", "3", "--color", "blue",
        ]);
        let Ok(Cli {
            command: Commands::Cart {
                action: CartAction::Add {
                    product,
                    quantity,
                    color,
                    ..
                },
            },
            ..
        }) = cli
        else {
            panic!("expected cart add");
        };
        assert_eq!(product, "gloves-01");
        assert_eq!(quantity, 3);
        assert_eq!(color.as_deref(), Some("blue"));
    }

    #[test]
    fn test_manifest_readme_exists() {
        let readme = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(env!("CARGO_PKG_README"));
        assert!(readme.is_file(), "missing {}", readme.display());
    }

    #[test]
    fn test_quote_requires_contact_fields() {
        assert!(Cli::try_parse_from(["sg-cli", "quote", "--first-name", "Nino"]).is_err());
    }
}
