//! Ticket booking - booking API for tourist destinations
//!
//! Library interface for the booking service: the token-based authentication
//! layer, the catalogue store and the HTTP router.

pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod store;

pub use config::Config;
pub use error::Error;
