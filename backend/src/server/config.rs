//! Server settings loaded via OrthoConfig and the HTTP server configuration
//! object built from them.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::{Key, SameSite};
use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_PAYMENT_DELAY_MS: u64 = 1500;

/// Application settings read from `DRAGONFIRE_*` environment variables,
/// configuration files and command-line flags.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "DRAGONFIRE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// Directory holding the JSON stores. In-memory stores are used when
    /// unset.
    pub data_dir: Option<PathBuf>,
    /// Catalog document replacing the bundled one.
    pub catalog_path: Option<PathBuf>,
    /// Simulated payment confirmation delay.
    pub payment_delay_ms: Option<u64>,
    /// Administrator login email.
    pub admin_email: Option<String>,
    /// SHA-256 hex digest of the administrator password.
    pub admin_password_hash: Option<String>,
    pub cloudflare_account_id: Option<String>,
    pub cloudflare_api_token: Option<String>,
}

impl AppSettings {
    /// Return the configured bind address, falling back to the default.
    pub fn bind_addr(&self) -> &str {
        self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR)
    }

    /// Return the configured payment delay, falling back to the default.
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms.unwrap_or(DEFAULT_PAYMENT_DELAY_MS))
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
        }
    }
}
