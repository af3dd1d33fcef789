//! CLI administration tool for linkpress.
//!
//! Provides commands for registering users, issuing bearer tokens and
//! checking the database without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Register a user
//! cargo run --bin linkpress-admin -- user create --username alice --email alice@example.com
//!
//! # Show a user by email or id
//! cargo run --bin linkpress-admin -- user show alice@example.com
//!
//! # Issue a bearer token
//! cargo run --bin linkpress-admin -- token issue alice@example.com
//!
//! # Check connectivity / create indexes
//! cargo run --bin linkpress-admin -- db check
//! cargo run --bin linkpress-admin -- db indexes
//! ```
//!
//! # Environment Variables
//!
//! Reads the same variables as the server (`MONGODB_URL`, `DB_NAME`,
//! `TOKEN_SIGNING_SECRET`, `REDIS_*`, ...), including a `.env` file.

use linkpress::application::services::TokenSigner;
use linkpress::config::{Config, load_from_env, mask_connection_string};
use linkpress::domain::entities::{NewUser, User, UserId};
use linkpress::domain::repositories::UserRepository;
use linkpress::infrastructure::cache::{RedisUserCache, UserCache};
use linkpress::infrastructure::persistence::{MongoUserRepository, mongo};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::{Confirm, Input};
use mongodb::Database;

/// CLI tool for managing linkpress.
#[derive(Parser)]
#[command(name = "linkpress-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Manage bearer tokens
    Token {
        #[command(subcommand)]
        action: TokenAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// User management subcommands.
#[derive(Subcommand)]
enum UserAction {
    /// Register a new user
    Create {
        #[arg(short, long)]
        username: Option<String>,

        #[arg(short, long)]
        email: Option<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a user by email or id
    Show { email_or_id: String },
}

/// Token subcommands.
#[derive(Subcommand)]
enum TokenAction {
    /// Issue a bearer token for a user (email or id)
    Issue { email_or_id: String },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check MongoDB (and Redis, when enabled) connectivity
    Check,

    /// Create the indexes the service relies on
    Indexes,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_from_env()?;

    let db = mongo::connect(&config.mongo_settings())
        .await
        .context("Failed to connect to MongoDB")?;

    match cli.command {
        Commands::User { action } => handle_user_action(action, &db).await?,
        Commands::Token { action } => handle_token_action(action, &db, &config).await?,
        Commands::Db { action } => handle_db_action(action, &db, &config).await?,
    }

    Ok(())
}

/// Dispatches user management commands.
async fn handle_user_action(action: UserAction, db: &Database) -> Result<()> {
    let repo = MongoUserRepository::new(db);

    match action {
        UserAction::Create {
            username,
            email,
            yes,
        } => create_user(&repo, username, email, yes).await,
        UserAction::Show { email_or_id } => {
            let user = find_user(&repo, &email_or_id).await?;
            print_user(&user);
            Ok(())
        }
    }
}

/// Registers a user with interactive prompts for missing fields.
async fn create_user(
    repo: &MongoUserRepository,
    username: Option<String>,
    email: Option<String>,
    skip_confirm: bool,
) -> Result<()> {
    println!("{}", "👤 Create User".bright_blue().bold());
    println!();

    let username = match username {
        Some(u) => u,
        None => Input::new().with_prompt("Username").interact_text()?,
    };
    let email = match email {
        Some(e) => e,
        None => Input::new().with_prompt("Email").interact_text()?,
    };

    println!("  Username: {}", username.cyan());
    println!("  Email:    {}", email.cyan());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Create this user?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let user = repo
        .create(NewUser {
            username,
            email,
            password_hash: None,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create user: {}", e))?;

    println!();
    println!("{}", "✅ User created successfully!".green().bold());
    print_user(&user);
    println!(
        "  Issue a token with: {} {}",
        "linkpress-admin token issue".bright_cyan(),
        user.email
    );
    println!();

    Ok(())
}

/// Dispatches token commands.
async fn handle_token_action(action: TokenAction, db: &Database, config: &Config) -> Result<()> {
    let repo = MongoUserRepository::new(db);

    match action {
        TokenAction::Issue { email_or_id } => {
            let user = find_user(&repo, &email_or_id).await?;

            if !user.is_active {
                println!(
                    "{}",
                    "⚠️  This user is inactive; the token will be rejected".yellow()
                );
            }

            let signer = TokenSigner::new(&config.token_signing_secret)
                .context("Invalid TOKEN_SIGNING_SECRET")?;
            let token = signer.issue(&user.id);

            println!("{}", "🔑 Bearer Token".bright_blue().bold());
            println!();
            println!("  User:  {}", user.username.cyan());
            println!("  Token: {}", token.bright_yellow().bold());
            println!();
            println!("{}", "Example:".bright_white());
            println!(
                "  curl -H \"Authorization: Bearer {}\" http://{}/v1/urls",
                token.bright_yellow(),
                config.listen_addr
            );
            println!();
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, db: &Database, config: &Config) -> Result<()> {
    match action {
        DbAction::Check => {
            println!(
                "{} {}",
                "🔍 Checking MongoDB:".bright_blue(),
                mask_connection_string(&config.mongodb_url)
            );
            mongo::ping(db)
                .await
                .map_err(|e| anyhow::anyhow!("MongoDB ping failed: {}", e))?;
            println!("{}", "✅ MongoDB connection OK".green().bold());

            if config.redis_enabled {
                println!(
                    "{} {}",
                    "🔍 Checking Redis:".bright_blue(),
                    mask_connection_string(&config.redis_url)
                );
                let cache = RedisUserCache::connect(&config.redis_url, config.user_cache_ttl())
                    .await
                    .map_err(|e| anyhow::anyhow!("Redis connection failed: {}", e))?;
                if cache.health_check().await {
                    println!("{}", "✅ Redis connection OK".green().bold());
                } else {
                    anyhow::bail!("Redis PING failed");
                }
            }
        }
        DbAction::Indexes => {
            println!("{}", "🗂  Ensuring indexes".bright_blue().bold());
            mongo::ensure_indexes(db)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to create indexes: {}", e))?;

            for (collection, model) in mongo::index_models() {
                let name = model
                    .options
                    .as_ref()
                    .and_then(|o| o.name.clone())
                    .unwrap_or_default();
                println!("  {}.{}", collection.bright_black(), name.cyan());
            }
            println!("{}", "✅ Indexes in place".green().bold());
        }
    }

    Ok(())
}

/// Looks a user up by id when the input parses as one, by email otherwise.
async fn find_user(repo: &MongoUserRepository, email_or_id: &str) -> Result<User> {
    let found = match email_or_id.parse::<UserId>() {
        Ok(id) => repo.find_by_id(&id).await,
        Err(_) => repo.find_by_email(email_or_id).await,
    }
    .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

    found.context("User not found")
}

fn print_user(user: &User) {
    let status = if user.is_active {
        "ACTIVE".green()
    } else {
        "INACTIVE".red()
    };

    println!("  ID:       {}", user.id.to_string().bright_black());
    println!("  Username: {}", user.username.cyan());
    println!("  Email:    {}", user.email.cyan());
    println!(
        "  Created:  {}",
        user.created_at.format("%Y-%m-%d %H:%M").to_string().bright_black()
    );
    println!("  Status:   {}", status);
    println!();
}
