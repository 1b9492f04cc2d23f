//! Backend entry-point: loads settings, wires adapters and serves the API.

mod server;

use std::net::SocketAddr;

use actix_web::web;
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use dragonfire::inbound::http::health::HealthState;
use dragonfire::inbound::http::session_config::fingerprint::key_fingerprint;
use dragonfire::inbound::http::session_config::{BuildMode, session_settings_from_env};
use server::{AppSettings, ServerConfig, build_http_state, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("configuration failed to load: {e}")))?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .map_err(std::io::Error::other)?;
    info!(
        fingerprint = %key_fingerprint(&session.key),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let bind_addr: SocketAddr = settings.bind_addr().parse().map_err(|e| {
        std::io::Error::other(format!("invalid bind address {}: {e}", settings.bind_addr()))
    })?;
    let http_state = build_http_state(&settings).await?;

    let health_state = web::Data::new(HealthState::new());
    let config = ServerConfig::new(session.key, session.cookie_secure, session.same_site, bind_addr);
    let server = create_server(health_state, http_state, config)?;
    info!(%bind_addr, "listening");
    server.await
}
