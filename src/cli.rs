use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "staybook")]
#[command(author, version, about = "Booking database maintenance tool")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// SQLite database file (overrides database.path from the config)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database if needed and apply pending migrations
    Migrate,

    /// Delete carts whose expiry has passed
    PurgeCarts {
        /// List the expired carts without deleting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print a booking with its related records as JSON
    ShowBooking {
        /// Confirmation number, e.g. BK20240115A7QZ
        confirmation: String,

        /// Include payment gateway details
        #[arg(long)]
        admin: bool,
    },

    /// Create an administrator account
    CreateAdmin {
        /// Login email
        #[arg(long)]
        email: String,

        /// Plain-text password (stored as a bcrypt hash)
        #[arg(long)]
        password: String,

        /// Display name
        #[arg(long)]
        name: Option<String>,
    },

    /// Generate a bcrypt password hash
    HashPassword {
        /// Password to hash
        password: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
