//! Storefront State CLI - Inspect and edit persisted cart and wishlist state.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart with totals
//! np-state cart show
//!
//! # Add two medium tees
//! np-state cart add --product tee --variant tee-m --name "Tee" --price 20 --quantity 2
//!
//! # Save a product to the wishlist
//! np-state wishlist add --product mug --name "Mug" --price 12
//!
//! # Dump the raw cart snapshot
//! np-state export cart > cart.json
//! ```
//!
//! # Commands
//!
//! - `cart` - Cart line items and drawer flag
//! - `wishlist` - Wishlist membership
//! - `export` / `import` - Raw snapshot JSON
//! - `reset` - Delete both persisted records
//!
//! Configuration comes from the `STOREFRONT_STATE_*` environment variables
//! (see `storefront_state::config`).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use storefront_state::{StateConfig, StoreState};
use storefront_state_core::parse_price;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "np-state")]
#[command(author, version, about = "Storefront cart and wishlist state tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Print a store's raw snapshot JSON
    Export {
        /// Which store to export
        kind: StoreKind,
    },
    /// Replace a store's state from a snapshot file
    Import {
        /// Which store to import into
        kind: StoreKind,
        /// Path to a snapshot produced by `export`
        file: PathBuf,
    },
    /// Delete both persisted records
    Reset,
}

#[derive(Clone, Copy, ValueEnum)]
enum StoreKind {
    Cart,
    Wishlist,
}

/// Product fields shared by cart and wishlist adds.
#[derive(clap::Args)]
struct ProductArgs {
    /// Catalog product ID
    #[arg(long)]
    product: String,

    /// Display name
    #[arg(long)]
    name: String,

    /// List unit price (e.g. 19.99 or $19.99)
    #[arg(long, value_parser = parse_price)]
    price: f64,

    /// Sale unit price, if on sale
    #[arg(long, value_parser = parse_price)]
    sale_price: Option<f64>,

    /// Image URL
    #[arg(long, default_value = "")]
    image: String,

    /// Product page slug
    #[arg(long, default_value = "")]
    slug: String,
}

#[derive(Subcommand)]
enum CartAction {
    /// List cart lines and totals
    Show,
    /// Add a line, or add to an existing line's quantity
    Add {
        #[command(flatten)]
        product: ProductArgs,

        /// Catalog variant ID (merge key)
        #[arg(long)]
        variant: String,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        quantity: i64,

        /// Selected size
        #[arg(long)]
        size: Option<String>,

        /// Selected color
        #[arg(long)]
        color: Option<String>,
    },
    /// Remove a line
    Remove {
        /// Variant ID of the line
        variant: String,
    },
    /// Set a line's quantity (0 or less removes it)
    SetQty {
        /// Variant ID of the line
        variant: String,

        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove every line
    Clear,
    /// Mark the cart drawer open
    Open,
    /// Mark the cart drawer closed
    Close,
    /// Flip the cart drawer flag
    Toggle,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// List saved products
    Show,
    /// Save a product (no-op if already saved)
    Add {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Remove a saved product
    Remove {
        /// Product ID
        product: String,
    },
    /// Report whether a product is saved
    Contains {
        /// Product ID
        product: String,
    },
    /// Save a product if absent, remove it if present
    Toggle {
        #[command(flatten)]
        product: ProductArgs,
    },
    /// Remove every saved product
    Clear,
}

fn main() {
    // Logs go to stderr so `export` output stays pipeable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "storefront_state=info,np_state=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli);

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = StateConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    let state = StoreState::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&state),
            CartAction::Add {
                product,
                variant,
                quantity,
                size,
                color,
            } => {
                let item = commands::cart_line(product, variant, quantity, size, color);
                commands::cart::add(&state, item)?;
            }
            CartAction::Remove { variant } => commands::cart::remove(&state, &variant)?,
            CartAction::SetQty { variant, quantity } => {
                commands::cart::set_quantity(&state, &variant, quantity)?;
            }
            CartAction::Clear => commands::cart::clear(&state)?,
            CartAction::Open => commands::cart::drawer(&state, commands::cart::Drawer::Open)?,
            CartAction::Close => commands::cart::drawer(&state, commands::cart::Drawer::Close)?,
            CartAction::Toggle => commands::cart::drawer(&state, commands::cart::Drawer::Toggle)?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&state),
            WishlistAction::Add { product } => {
                commands::wishlist::add(&state, commands::wishlist_item(product))?;
            }
            WishlistAction::Remove { product } => commands::wishlist::remove(&state, &product)?,
            WishlistAction::Contains { product } => commands::wishlist::contains(&state, &product),
            WishlistAction::Toggle { product } => {
                commands::wishlist::toggle(&state, commands::wishlist_item(product))?;
            }
            WishlistAction::Clear => commands::wishlist::clear(&state)?,
        },
        Commands::Export { kind } => commands::snapshot::export(&state, kind.into())?,
        Commands::Import { kind, file } => commands::snapshot::import(&state, kind.into(), &file)?,
        Commands::Reset => commands::snapshot::reset(&state)?,
    }
    Ok(())
}

impl From<StoreKind> for commands::snapshot::Target {
    fn from(kind: StoreKind) -> Self {
        match kind {
            StoreKind::Cart => Self::Cart,
            StoreKind::Wishlist => Self::Wishlist,
        }
    }
}
