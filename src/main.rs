mod cli;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use cli::{Cli, Commands};
use staybook_core::config::Config;
use staybook_core::UserRole;
use staybook_db::pool::{get_conn, init_pool, DbPool};
use staybook_db::queries::{bookings, users};
use staybook_db::{detail::BookingDetail, migrations};
use std::path::Path;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set, otherwise pick a level from --verbose
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "staybook=debug,staybook_db=debug,staybook_core=debug".to_string()
        } else {
            "staybook=info,staybook_db=info,staybook_core=info".to_string()
        }
    });

    // Logs go to stderr so JSON on stdout stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Migrate => migrate(&load_config(&cli.config, &cli.db)),
        Commands::PurgeCarts { dry_run } => purge_carts(&load_config(&cli.config, &cli.db), dry_run),
        Commands::ShowBooking {
            ref confirmation,
            admin,
        } => show_booking(&load_config(&cli.config, &cli.db), confirmation, admin),
        Commands::CreateAdmin {
            ref email,
            ref password,
            ref name,
        } => create_admin(
            &load_config(&cli.config, &cli.db),
            email,
            password,
            name.as_deref(),
        ),
        Commands::HashPassword { ref password } => hash_password(password),
        Commands::Validate {
            config: ref config_path,
        } => {
            let path = config_path.as_ref().or(cli.config.as_ref());
            validate_config(path.map(|p| p.as_path()))
        }
        Commands::Version => {
            println!("staybook {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

/// Config from `--config` (or defaults), with `--db` taking precedence
/// over `database.path`.
fn load_config(
    config_path: &Option<std::path::PathBuf>,
    db: &Option<std::path::PathBuf>,
) -> Config {
    let mut config = Config::load_or_default(config_path.as_deref());
    if let Some(db) = db {
        config.database.path = db.clone();
    }
    for warning in config.validate() {
        tracing::warn!("Config: {warning}");
    }
    config
}

fn open_pool(config: &Config) -> Result<DbPool> {
    tracing::debug!("Opening database at {}", config.database.path.display());
    init_pool(&config.database).with_context(|| {
        format!(
            "failed to open database {}",
            config.database.path.display()
        )
    })
}

fn migrate(config: &Config) -> Result<()> {
    let pool = open_pool(config)?;
    let conn = get_conn(&pool)?;
    let version = migrations::current_version(&conn)?;
    println!(
        "Database {} is at schema version {version}",
        config.database.path.display()
    );
    Ok(())
}

fn purge_carts(config: &Config, dry_run: bool) -> Result<()> {
    let pool = open_pool(config)?;
    let conn = get_conn(&pool)?;
    let now = Utc::now();

    if dry_run {
        let expired = bookings::list_expired_carts(&conn, now)?;
        for cart in &expired {
            let expires = cart
                .cart_expires_at
                .map(staybook_core::format::timestamp)
                .unwrap_or_default();
            println!("{} (expired {expires})", cart.confirmation_number);
        }
        println!("[DRY RUN] {} expired cart(s) would be purged", expired.len());
        return Ok(());
    }

    let purged = bookings::purge_expired_carts(&conn, now)?;
    println!("Purged {purged} expired cart(s)");
    Ok(())
}

fn show_booking(config: &Config, confirmation: &str, admin: bool) -> Result<()> {
    let pool = open_pool(config)?;
    let conn = get_conn(&pool)?;

    let booking = bookings::get_booking_by_confirmation(&conn, confirmation)?
        .with_context(|| format!("no booking with confirmation number {confirmation}"))?;
    let detail: BookingDetail = bookings::load_detail(&conn, booking.id)?
        .with_context(|| format!("booking {confirmation} disappeared while loading"))?;

    let map = if admin {
        detail.serialize_admin()
    } else {
        detail.serialize()
    };
    println!("{}", serde_json::to_string_pretty(&map)?);
    Ok(())
}

fn create_admin(config: &Config, email: &str, password: &str, name: Option<&str>) -> Result<()> {
    if password.is_empty() {
        anyhow::bail!("password must not be empty");
    }
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;

    let pool = open_pool(config)?;
    let conn = get_conn(&pool)?;
    let user = users::create_user(&conn, email, &hash, UserRole::Admin, name, None)?;

    tracing::info!("Created admin account {}", user.email);
    println!("Created admin {} ({})", user.email, user.id);
    Ok(())
}

fn hash_password(password: &str) -> Result<()> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)?;
    println!("{hash}");
    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {}", p.display());
            let config = Config::load(p)
                .with_context(|| format!("failed to load config {}", p.display()))?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    println!("  Database: {}", config.database.path.display());
    println!("  Pool size: {}", config.database.pool_size);
    println!("  Cart TTL: {} minutes", config.carts.ttl_minutes);

    let warnings = config.validate();
    if !warnings.is_empty() {
        println!("Warnings:");
        for w in &warnings {
            println!("  - {w}");
        }
    }
    Ok(())
}
