//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::auth::{password, TokenKey};
use crate::cli::{error, info, success, warn};
use crate::config::{self, loader::CONFIG_FILENAME};

/// Initialize a new ticket-booking.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(CONFIG_FILENAME);

    if config_path.exists() {
        warn(&format!("{} already exists", CONFIG_FILENAME));
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success(&format!("Created {}", CONFIG_FILENAME));
    info("Set TICKET_BOOKING_TOKEN_KEY (see 'ticket-booking keygen') and run 'ticket-booking serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let config = config::load_config()?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&format!("Server stopped: {}", e));
        return Err(e.into());
    }
    Ok(())
}

/// Print a new random token key
pub async fn keygen() -> Result<()> {
    let key = TokenKey::generate("generated");
    println!("{}", key.to_hex());
    Ok(())
}

/// Print the bcrypt digest of a password
pub async fn hash_password(plaintext: String) -> Result<()> {
    let digest = password::hash_password_blocking(plaintext).await?;
    println!("{}", digest);
    Ok(())
}
