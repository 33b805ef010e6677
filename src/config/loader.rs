//! Configuration loading and environment variable interpolation

use regex::{Captures, Regex};
use std::borrow::Cow;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use super::Config;
use crate::error::{Error, Result};

pub const CONFIG_FILENAME: &str = "ticket-booking.toml";

/// Names an explicit config file, skipping the directory search
pub const CONFIG_PATH_ENV: &str = "TICKET_BOOKING_CONFIG";

/// `${NAME}` or `${NAME:-fallback}`
static ENV_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}").expect("static pattern")
});

/// Load `$TICKET_BOOKING_CONFIG`, or the nearest ticket-booking.toml at or
/// above the working directory
pub fn load_config() -> Result<Config> {
    let path = match env::var_os(CONFIG_PATH_ENV) {
        Some(explicit) => PathBuf::from(explicit),
        None => {
            let cwd = env::current_dir()?;
            locate_config(&cwd).ok_or(Error::ConfigNotFound)?
        }
    };
    load_config_from_path(&path)
}

pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let raw = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    let config = toml::from_str(&expand_env(&raw))?;
    tracing::debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// First directory from `start` upward that holds a config file
fn locate_config(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_FILENAME))
        .find(|candidate| candidate.is_file())
}

/// Substitute environment references. An unset variable without a fallback
/// becomes the empty string.
fn expand_env(raw: &str) -> Cow<'_, str> {
    ENV_REF.replace_all(raw, |caps: &Captures| {
        let name = &caps[1];
        match env::var(name) {
            Ok(value) => value,
            Err(_) => match caps.get(2) {
                Some(fallback) => fallback.as_str().to_string(),
                None => {
                    tracing::debug!("{} is not set", name);
                    String::new()
                }
            },
        }
    })
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Ticket booking configuration

[server]
host = "0.0.0.0"
port = 3000
uploads_dir = "./uploads"

[auth]
# 32 raw bytes or 64 hex characters. Generate one with `ticket-booking keygen`.
token_key = "${TICKET_BOOKING_TOKEN_KEY}"
key_id = "v2-local-1"

# Without a database URL all data is kept in memory.
# [database]
# url = "host=localhost user=postgres password=${POSTGRES_PASSWORD:-postgres} dbname=booking"
"#
}
