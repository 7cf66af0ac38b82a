//! Store Rating CLI - Terminal client for the store rating API.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (the session is kept in .store-rating-session.json)
//! srate login -e user@example.com -p 'Secret1!'
//!
//! # Browse and rate stores
//! srate stores --name books
//! srate rate 12 4
//!
//! # Admin
//! srate admin users --role STORE_OWNER
//! srate admin create-store -n "Corner Books" -e books@example.com --owner 7
//!
//! # Store owner
//! srate owner
//! ```
//!
//! # Environment Variables
//!
//! - `STORE_RATING_API_URL` - Base URL of the rating API
//! - `STORE_RATING_SESSION_FILE` - Where the session is stored
//! - `STORE_RATING_PASSWORD` - Password for `login` when `-p` is omitted

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secrecy::SecretString;

use store_rating_core::{FilterSet, RegistrationForm, Role};
use store_rating_web::api::ApiClient;
use store_rating_web::config::{ApiConfig, DEFAULT_API_URL};

mod commands;
mod credentials;
mod output;

use commands::{CliError, Context};
use credentials::{DEFAULT_SESSION_FILE, FileCredentialStore};

#[derive(Parser)]
#[command(name = "srate")]
#[command(author, version, about = "Store rating terminal client")]
struct Cli {
    /// Base URL of the rating API
    #[arg(long, env = "STORE_RATING_API_URL", default_value = DEFAULT_API_URL, global = true)]
    api_url: String,

    /// File the session is stored in
    #[arg(long, env = "STORE_RATING_SESSION_FILE", default_value = DEFAULT_SESSION_FILE, global = true)]
    session_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in and store the session
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long, env = "STORE_RATING_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Whoami,
    /// List stores with your ratings (user)
    Stores {
        #[command(flatten)]
        search: StoreSearch,
    },
    /// Rate a store, or change your rating (user)
    Rate {
        /// Store ID or name
        store: String,

        /// Rating from 1 to 5
        rating: i64,
    },
    /// Change your password
    Password {
        #[arg(long)]
        current: String,

        #[arg(long)]
        new: String,
    },
    /// Manage users and stores (admin)
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Show your store and its ratings (store owner)
    Owner,
}

#[derive(Args)]
struct StoreSearch {
    /// Match store names containing this text
    #[arg(long, default_value = "")]
    name: String,

    /// Match addresses containing this text
    #[arg(long, default_value = "")]
    address: String,
}

impl From<StoreSearch> for FilterSet {
    fn from(search: StoreSearch) -> Self {
        Self {
            name: search.name,
            address: search.address,
            ..Self::default()
        }
    }
}

#[derive(Args)]
struct UserSearch {
    /// Match names containing this text
    #[arg(long, default_value = "")]
    name: String,

    /// Match emails containing this text
    #[arg(long, default_value = "")]
    email: String,

    /// Match addresses containing this text
    #[arg(long, default_value = "")]
    address: String,

    /// Match roles containing this text (USER, ADMIN, `STORE_OWNER`)
    #[arg(long, default_value = "")]
    role: String,
}

impl From<UserSearch> for FilterSet {
    fn from(search: UserSearch) -> Self {
        Self {
            name: search.name,
            email: search.email,
            address: search.address,
            role: search.role,
        }
    }
}

#[derive(Subcommand)]
enum AdminAction {
    /// List users
    Users {
        #[command(flatten)]
        search: UserSearch,
    },
    /// List stores with rating counts and averages
    Stores,
    /// Create a user
    CreateUser {
        /// Full name (20-60 characters)
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, default_value = "")]
        address: String,

        #[arg(short, long)]
        password: String,

        /// Role (`USER`, `ADMIN`, `STORE_OWNER`)
        #[arg(short, long, default_value = "USER")]
        role: Role,
    },
    /// Create a store
    CreateStore {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(short, long, default_value = "")]
        address: String,

        /// Owning store owner, by ID or email
        #[arg(long)]
        owner: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file if present (ignore errors if not found)
    let _ = dotenvy::dotenv();

    // Logs go to stderr so command output stays clean
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!(error = ?e, "Command failed");
        output::fail(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let api = ApiClient::new(&ApiConfig::parse(&cli.api_url)?)?;
    let ctx = Context::new(api, FileCredentialStore::new(cli.session_file));

    match cli.command {
        Commands::Login { email, password } => {
            commands::auth::login(&ctx, &email, &SecretString::from(password)).await?;
        }
        Commands::Logout => commands::auth::logout(&ctx).await?,
        Commands::Whoami => commands::auth::whoami(&ctx).await?,
        Commands::Stores { search } => commands::user::stores(&ctx, search.into()).await?,
        Commands::Rate { store, rating } => commands::user::rate(&ctx, &store, rating).await?,
        Commands::Password { current, new } => {
            commands::auth::password(
                &ctx,
                &SecretString::from(current),
                &SecretString::from(new),
            )
            .await?;
        }
        Commands::Admin { action } => match action {
            AdminAction::Users { search } => commands::admin::users(&ctx, search.into()).await?,
            AdminAction::Stores => commands::admin::stores(&ctx).await?,
            AdminAction::CreateUser {
                name,
                email,
                address,
                password,
                role,
            } => {
                let form = RegistrationForm {
                    name,
                    email: email.trim().to_string(),
                    address,
                    password,
                    role,
                };
                commands::admin::create_user(&ctx, form).await?;
            }
            AdminAction::CreateStore {
                name,
                email,
                address,
                owner,
            } => {
                commands::admin::create_store(&ctx, name, email, address, owner.as_deref())
                    .await?;
            }
        },
        Commands::Owner => commands::owner::dashboard(&ctx).await?,
    }
    Ok(())
}
