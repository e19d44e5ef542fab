//! Clementine CLI - Database migrations and account bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! clementine-cli migrate
//!
//! # Create staff accounts
//! clementine-cli staff create -t admin -e admin@example.com -n "Platform Admin"
//! clementine-cli staff create -t shipper -e courier@example.com -n "Courier One"
//! clementine-cli staff create -t storage -e warehouse@example.com -n "Main Warehouse"
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `staff create` - Create admin/shipper/storage accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand, ValueEnum};

mod commands;

#[derive(Parser)]
#[command(name = "clementine-cli")]
#[command(author, version, about = "Clementine CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage staff accounts
    Staff {
        #[command(subcommand)]
        action: StaffAction,
    },
}

#[derive(Subcommand)]
enum StaffAction {
    /// Create a new staff account
    Create {
        /// Which staff table the account goes into
        #[arg(short = 't', long, value_enum)]
        table: StaffKind,

        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StaffKind {
    Admin,
    Shipper,
    Storage,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Staff {
            action: StaffAction::Create { table, email, name },
        } => {
            let table = match table {
                StaffKind::Admin => clementine_server::db::StaffTable::Admin,
                StaffKind::Shipper => clementine_server::db::StaffTable::Shipper,
                StaffKind::Storage => clementine_server::db::StaffTable::Storage,
            };
            commands::staff::create(table, &email, &name).await?;
        }
    }

    Ok(())
}
