//! InMind CLI - operator tools for the storefront's slot store.
//!
//! Works directly on the configured data directory (`STOREFRONT_DATA_DIR`),
//! so stop the server or expect it to pick the changes up on its next read.
//!
//! # Usage
//!
//! ```bash
//! # Show stock levels and alerts
//! inmind-cli inventory list
//!
//! # Set a product's stock (tracks it if needed)
//! inmind-cli inventory set 3 25
//!
//! # Restore the default inventory
//! inmind-cli inventory seed
//!
//! # Orders, optionally by status
//! inmind-cli orders list --status shipped
//!
//! # Monthly figures
//! inmind-cli orders stats --year 2026 --month 3
//!
//! # Create an admin account
//! inmind-cli users create -e ops@example.com -u ops -p 'secret123' --admin
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "inmind-cli")]
#[command(author, version, about = "InMind storefront operator tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect and adjust stock levels
    Inventory {
        #[command(subcommand)]
        action: InventoryAction,
    },
    /// Inspect orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
    /// Manage user accounts
    Users {
        #[command(subcommand)]
        action: UsersAction,
    },
}

#[derive(Subcommand)]
enum InventoryAction {
    /// List tracked products with stock alerts
    List,
    /// Set a product's stock
    Set {
        /// Product ID
        product_id: i64,
        /// New stock level
        stock: u32,
    },
    /// Replace the inventory with the default seed
    Seed,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders, newest first
    List {
        /// Only orders with this status (processing, shipped, delivered, cancelled)
        #[arg(short, long)]
        status: Option<String>,
    },
    /// Order count and revenue for a month
    Stats {
        #[arg(short, long)]
        year: i32,
        /// Month, 1-12
        #[arg(short, long)]
        month: u32,
    },
}

#[derive(Subcommand)]
enum UsersAction {
    /// Create a user account
    Create {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,

        /// Grant admin access
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::from_env().await?;

    match cli.command {
        Commands::Inventory { action } => match action {
            InventoryAction::List => commands::inventory::list(&ctx).await?,
            InventoryAction::Set { product_id, stock } => {
                commands::inventory::set(&ctx, product_id, stock).await?;
            }
            InventoryAction::Seed => commands::inventory::seed(&ctx).await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { status } => {
                commands::orders::list(&ctx, status.as_deref()).await?;
            }
            OrdersAction::Stats { year, month } => {
                commands::orders::stats(&ctx, year, month).await?;
            }
        },
        Commands::Users { action } => match action {
            UsersAction::Create {
                email,
                username,
                password,
                admin,
            } => commands::users::create(&ctx, &email, &username, &password, admin).await?,
        },
    }
    Ok(())
}
