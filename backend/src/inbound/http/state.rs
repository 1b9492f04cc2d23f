//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AccountService, AdminCommand, CatalogProvider, CatalogQuery, EntitlementCommand,
    FeedbackCommand, FeedbackSink, PaymentGateway, PlaybackCommand, UserRepository,
    VideoUploadService,
};
use crate::domain::{
    AdminCredentials, AdminService, CatalogService, EntitlementService, FeedbackService,
    PlaybackService, UserAccountService, UserWriteLocks,
};

/// Parameter object bundling the driven adapters the services run on.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub catalog: Arc<dyn CatalogProvider>,
    pub feedback: Arc<dyn FeedbackSink>,
    pub payments: Arc<dyn PaymentGateway>,
    pub uploads: Arc<dyn VideoUploadService>,
    pub clock: Arc<dyn Clock>,
    /// `None` disables the admin panel.
    pub admin: Option<AdminCredentials>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: Arc<dyn AccountService>,
    pub catalog: Arc<dyn CatalogQuery>,
    pub entitlements: Arc<dyn EntitlementCommand>,
    pub playback: Arc<dyn PlaybackCommand>,
    pub feedback: Arc<dyn FeedbackCommand>,
    pub admin: Arc<dyn AdminCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Wire the domain services over `ports`.
    ///
    /// Entitlement and playback writes share one set of per-user locks so a
    /// purchase and a watch event for the same user never interleave.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use dragonfire::domain::ports::{
    ///     DisabledVideoUploadService, FixturePaymentGateway, FixtureFeedbackSink,
    /// };
    /// use dragonfire::inbound::http::state::{HttpState, HttpStatePorts};
    /// use dragonfire::outbound::persistence::InMemoryUserRepository;
    /// use dragonfire::outbound::static_catalog::StaticCatalogProvider;
    /// use mockable::DefaultClock;
    ///
    /// let ports = HttpStatePorts {
    ///     users: Arc::new(InMemoryUserRepository::default()),
    ///     catalog: Arc::new(StaticCatalogProvider::bundled().expect("bundled catalog")),
    ///     feedback: Arc::new(FixtureFeedbackSink),
    ///     payments: Arc::new(FixturePaymentGateway),
    ///     uploads: Arc::new(DisabledVideoUploadService),
    ///     clock: Arc::new(DefaultClock),
    ///     admin: None,
    /// };
    /// let state = HttpState::new(ports);
    /// let _catalog = state.catalog.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            catalog,
            feedback,
            payments,
            uploads,
            clock,
            admin,
        } = ports;
        let locks = Arc::new(UserWriteLocks::default());

        Self {
            accounts: Arc::new(UserAccountService::new(
                users.clone(),
                catalog.clone(),
                clock.clone(),
            )),
            catalog: Arc::new(CatalogService::new(users.clone(), catalog.clone())),
            entitlements: Arc::new(EntitlementService::new(
                users.clone(),
                catalog.clone(),
                payments,
                locks.clone(),
            )),
            playback: Arc::new(PlaybackService::new(
                users.clone(),
                catalog,
                locks,
                clock.clone(),
            )),
            feedback: Arc::new(FeedbackService::new(users.clone(), feedback.clone(), clock)),
            admin: Arc::new(AdminService::new(users, feedback, uploads, admin)),
        }
    }
}
