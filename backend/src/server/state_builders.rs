//! Builders for the driven adapters behind [`HttpState`].

use std::sync::Arc;
use std::time::Duration;

use camino::Utf8PathBuf;
use mockable::{Clock, DefaultClock};
use tracing::{info, warn};
use zeroize::Zeroizing;

use dragonfire::domain::ports::{
    CatalogProvider, DisabledVideoUploadService, FeedbackSink, UserRepository, VideoUploadService,
};
use dragonfire::domain::{AdminCredentials, Email, PasswordDigest};
use dragonfire::inbound::http::state::{HttpState, HttpStatePorts};
use dragonfire::outbound::cloudflare::{CloudflareCredentials, CloudflareStreamUploader};
use dragonfire::outbound::payment::SimulatedPaymentGateway;
use dragonfire::outbound::persistence::{
    InMemoryFeedbackSink, InMemoryUserRepository, JsonFileFeedbackSink, JsonFileUserRepository,
};
use dragonfire::outbound::static_catalog::StaticCatalogProvider;

use super::AppSettings;

const UPLOAD_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

fn startup_error(context: &str, err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::other(format!("{context}: {err}"))
}

fn utf8_path(path: &std::path::Path, setting: &str) -> std::io::Result<Utf8PathBuf> {
    Utf8PathBuf::try_from(path.to_path_buf()).map_err(|err| startup_error(setting, err))
}

fn build_catalog(settings: &AppSettings) -> std::io::Result<StaticCatalogProvider> {
    match &settings.catalog_path {
        Some(path) => {
            let path = utf8_path(path, "catalog_path")?;
            StaticCatalogProvider::from_path(&path)
        }
        None => StaticCatalogProvider::bundled(),
    }
    .map_err(|err| startup_error("catalog failed to load", err))
}

async fn build_stores(
    settings: &AppSettings,
    catalog: &StaticCatalogProvider,
    clock: &dyn Clock,
) -> std::io::Result<(Arc<dyn UserRepository>, Arc<dyn FeedbackSink>)> {
    let Some(data_dir) = &settings.data_dir else {
        warn!("no data directory configured; accounts and feedback are kept in memory");
        return Ok((
            Arc::new(InMemoryUserRepository::default()),
            Arc::new(InMemoryFeedbackSink::default()),
        ));
    };
    let data_dir = utf8_path(data_dir, "data_dir")?;
    let users = JsonFileUserRepository::open(&data_dir, &catalog.catalog(), clock.utc())
        .await
        .map_err(|err| startup_error("user store failed to open", err))?;
    let feedback = JsonFileFeedbackSink::open(&data_dir)
        .map_err(|err| startup_error("feedback store failed to open", err))?;
    info!(data_dir = %data_dir, "using JSON file stores");
    Ok((Arc::new(users), Arc::new(feedback)))
}

fn build_uploads(settings: &AppSettings) -> std::io::Result<Arc<dyn VideoUploadService>> {
    let (Some(account_id), Some(api_token)) = (
        settings.cloudflare_account_id.clone(),
        settings.cloudflare_api_token.clone(),
    ) else {
        info!("Cloudflare credentials not configured; video uploads disabled");
        return Ok(Arc::new(DisabledVideoUploadService));
    };
    let uploader = CloudflareStreamUploader::new(
        CloudflareCredentials {
            account_id,
            api_token: Zeroizing::new(api_token),
        },
        UPLOAD_REQUEST_TIMEOUT,
    )
    .map_err(|err| startup_error("Cloudflare uploader failed to build", err))?;
    Ok(Arc::new(uploader))
}

fn build_admin(settings: &AppSettings) -> std::io::Result<Option<AdminCredentials>> {
    let (Some(email), Some(hash)) = (&settings.admin_email, &settings.admin_password_hash) else {
        warn!("admin credentials not configured; admin panel disabled");
        return Ok(None);
    };
    let email = Email::parse(email).map_err(|err| startup_error("admin_email", err))?;
    let password_digest =
        PasswordDigest::parse(hash).map_err(|err| startup_error("admin_password_hash", err))?;
    Ok(Some(AdminCredentials {
        email,
        password_digest,
    }))
}

/// Build the HTTP state from settings, opening stores and adapters.
///
/// # Errors
/// Returns [`std::io::Error`] when the catalog, stores or adapter settings
/// are invalid.
pub(crate) async fn build_http_state(settings: &AppSettings) -> std::io::Result<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let catalog = build_catalog(settings)?;
    let (users, feedback) = build_stores(settings, &catalog, clock.as_ref()).await?;
    let payments = Arc::new(SimulatedPaymentGateway::new(
        settings.payment_delay(),
        clock.clone(),
    ));
    let catalog: Arc<dyn CatalogProvider> = Arc::new(catalog);

    Ok(HttpState::new(HttpStatePorts {
        users,
        catalog,
        feedback,
        payments,
        uploads: build_uploads(settings)?,
        clock,
        admin: build_admin(settings)?,
    }))
}
