//! HTTP API server

pub mod resources;
pub mod routes;
pub mod server;

pub use server::*;
