//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `CatalogProvider`, `FeedbackSink`,
//! `PaymentGateway`, `VideoUploadService`) describe what the domain needs
//! from adapters. Driving ports (`AccountService`, `CatalogQuery`,
//! `EntitlementCommand`, `PlaybackCommand`, `FeedbackCommand`,
//! `AdminCommand`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod admin_command;
mod catalog_provider;
mod catalog_query;
mod entitlement_command;
mod feedback_command;
mod feedback_sink;
mod payment_gateway;
mod playback_command;
mod user_repository;
mod video_upload;

#[cfg(test)]
pub use account_service::MockAccountService;
pub use account_service::{AccountService, ProfileSummary, SummaryEpisode};
#[cfg(test)]
pub use admin_command::MockAdminCommand;
pub use admin_command::{AdminCommand, AdminUserUpdate, AdminUserUpdateParts};
#[cfg(test)]
pub use catalog_provider::MockCatalogProvider;
pub use catalog_provider::{CatalogProvider, FixtureCatalogProvider, list_series, series_by_id};
#[cfg(test)]
pub use catalog_query::MockCatalogQuery;
pub use catalog_query::{CatalogQuery, EpisodeAccess, SequelStatus, SeriesSummary};
#[cfg(test)]
pub use entitlement_command::MockEntitlementCommand;
pub use entitlement_command::{
    DownloadGrant, EntitlementCommand, PurchaseOutcome, SequelUnlockOutcome,
};
#[cfg(test)]
pub use feedback_command::MockFeedbackCommand;
pub use feedback_command::FeedbackCommand;
#[cfg(test)]
pub use feedback_sink::MockFeedbackSink;
pub use feedback_sink::{FeedbackSink, FeedbackSinkError, FixtureFeedbackSink};
#[cfg(test)]
pub use payment_gateway::MockPaymentGateway;
pub use payment_gateway::{
    FixturePaymentGateway, PaymentError, PaymentGateway, PaymentReceipt, PaymentRequest,
};
#[cfg(test)]
pub use playback_command::MockPlaybackCommand;
pub use playback_command::{PlaybackCommand, PlaybackSession, ProgressReport};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{FixtureUserRepository, UserPersistenceError, UserRepository};
#[cfg(test)]
pub use video_upload::MockVideoUploadService;
pub use video_upload::{
    DirectUploadTicket, DisabledVideoUploadService, VideoUploadError, VideoUploadService,
};
