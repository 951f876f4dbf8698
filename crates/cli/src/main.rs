//! Pocket Cart CLI - Inspect and edit a file-backed cart.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart list
//!
//! # Add a product (or one more unit of it)
//! cart add --id sku-1 --title "Shirt" --image-url https://cdn.example/shirt.png --price 19.99
//!
//! # Change quantities
//! cart increment sku-1
//! cart decrement sku-1
//!
//! # Empty the cart
//! cart clear
//! ```
//!
//! # Environment Variables
//!
//! See `pocket_cart::config`. `--data-dir` and `--key` override
//! `CART_DATA_DIR` and `CART_STORAGE_KEY`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pocket_cart_core::{Price, ProductId};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Pocket Cart CLI tools")]
struct Cli {
    /// Directory holding the cart file (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage key of the cart (overrides `CART_STORAGE_KEY`)
    #[arg(long, global = true)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show every line item and the total quantity
    List,
    /// Add one unit of a product
    Add {
        /// Product identifier
        #[arg(long, value_parser = ProductId::parse)]
        id: ProductId,

        /// Display name
        #[arg(long)]
        title: String,

        /// Display image reference
        #[arg(long, default_value = "")]
        image_url: String,

        /// Unit price (e.g. 19.99)
        #[arg(long)]
        price: Price,
    },
    /// Add one unit of a product already in the cart
    Increment {
        /// Product identifier
        #[arg(value_parser = ProductId::parse)]
        id: ProductId,
    },
    /// Remove one unit of a product, dropping it at zero
    Decrement {
        /// Product identifier
        #[arg(value_parser = ProductId::parse)]
        id: ProductId,
    },
    /// Remove every line item
    Clear,
}

#[tokio::main]
async fn main() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pocket_cart=info,pocket_cart_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let store = commands::cart::open(cli.data_dir, cli.key).await?;

    match cli.command {
        Commands::List => {}
        Commands::Add {
            id,
            title,
            image_url,
            price,
        } => commands::cart::add(&store, id, title, image_url, price).await?,
        Commands::Increment { id } => commands::cart::increment(&store, &id).await?,
        Commands::Decrement { id } => commands::cart::decrement(&store, &id).await?,
        Commands::Clear => commands::cart::clear(&store).await?,
    }

    commands::cart::print(&store);
    Ok(())
}
