//! CLI interface for the booking service

pub mod commands;
mod output;

pub use output::*;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "ticket-booking")]
#[command(version)]
#[command(about = "Ticket booking API for tourist destinations", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a default ticket-booking.toml in the current directory
    Init,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host from the config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to server.port from the config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Print a fresh random token key as 64 hex characters
    Keygen,

    /// Hash a password with bcrypt, e.g. to seed an account row by hand
    HashPassword {
        /// Plaintext password
        #[arg(env = "TICKET_BOOKING_PASSWORD")]
        password: String,
    },
}
