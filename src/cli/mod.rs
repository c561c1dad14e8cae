//! CLI module - Command-line interface for ContractDesk
//!
//! Parsed with clap; `serve` runs when no subcommand is given.

mod commands;

use clap::{Parser, Subcommand};

/// ContractDesk - contract management API for legal teams
#[derive(Parser)]
#[command(name = "contractdesk")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API until Ctrl+C
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Create a user account directly in the database
    CreateUser {
        username: String,
        password: String,
        /// admin or lawyer
        #[arg(long, default_value = "lawyer")]
        role: String,
    },

    /// Print an Argon2id hash for a password
    HashPassword { password: String },
}

pub use commands::*;
