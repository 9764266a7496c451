//! Sports Store CLI - database migrations, seeding and user management.
//!
//! # Usage
//!
//! ```bash
//! # Run catalog/order migrations
//! sportsstore-cli migrate store
//!
//! # Run identity migrations
//! sportsstore-cli migrate identity
//!
//! # Run all database migrations
//! sportsstore-cli migrate all
//!
//! # Insert the sample catalog and the Admin user when missing
//! sportsstore-cli seed --admin-password 'kT9#vQ2!mZ7@pL4$'
//!
//! # Create a user in the admin role
//! STORE_USER_PASSWORD='...' sportsstore-cli user create -u alice -r Admins
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sportsstore-cli")]
#[command(author, version, about = "Sports Store CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        target: MigrateTarget,
    },
    /// Insert the sample catalog and the Admin user when missing
    Seed {
        /// Password for the Admin user (generated and logged when omitted)
        #[arg(long, env = "STORE_ADMIN_PASSWORD", hide_env_values = true)]
        admin_password: Option<String>,
    },
    /// Manage identity users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum MigrateTarget {
    /// Run catalog/order (`store` schema) migrations
    Store,
    /// Run identity (`identity` schema) migrations
    Identity,
    /// Run all database migrations
    All,
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    ///
    /// The password is read from `STORE_USER_PASSWORD`; when unset a random
    /// one is generated and logged once.
    Create {
        /// Login name
        #[arg(short, long)]
        user_name: String,

        /// Email address
        #[arg(short, long)]
        email: Option<String>,

        /// Role to grant (repeatable)
        #[arg(short, long = "role")]
        roles: Vec<String>,
    },
}

#[tokio::main]
async fn main() {
    // Info by default so generated credentials and progress are visible
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Load .env before parsing so `env` arguments see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate { target } => match target {
            MigrateTarget::Store => commands::migrate::store().await?,
            MigrateTarget::Identity => commands::migrate::identity().await?,
            MigrateTarget::All => {
                commands::migrate::store().await?;
                commands::migrate::identity().await?;
            }
        },
        Commands::Seed { admin_password } => {
            commands::seed::run(admin_password).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create {
                user_name,
                email,
                roles,
            } => {
                commands::user::create(&user_name, email.as_deref(), &roles).await?;
            }
        },
    }
    Ok(())
}
