//! Domain primitives, policy, ports, and services.
//!
//! Purpose: define strongly typed entities used by the HTTP and persistence
//! layers, the pure access policy that decides what a user may watch, and
//! the services that drive it through ports. Keep types immutable and
//! document invariants and serialisation contracts in each type's Rustdoc.
//!
//! Public surface:
//! - Error (alias to `error::Error`) — API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`) — stable error identifier.
//! - Catalog, Series, Episode — read-only catalog model.
//! - User, Entitlements — account record and what it grants.
//! - AccessPolicy — watch/download/sequel decisions.
//! - WatchProgressTracker — once-per-session watched detection.

pub mod access_policy;
pub mod account_service;
pub mod admin_service;
pub mod auth;
pub mod catalog;
pub mod catalog_service;
pub mod entitlement_service;
pub mod entitlements;
pub mod error;
pub mod feedback;
pub mod feedback_service;
pub mod playback_service;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod user_locks;
pub mod watch_progress;

#[cfg(test)]
pub(crate) mod service_fixtures;

pub use self::access_policy::{
    AccessPolicy, AccessPolicyError, DownloadAccess, EntitlementDecision, EpisodeAccessView,
    SeasonAccessView, SequelProgress, SeriesAccessView, WatchAccess,
};
pub use self::account_service::UserAccountService;
pub use self::admin_service::{AdminCredentials, AdminService};
pub use self::auth::{LoginCredentials, LoginValidationError, PasswordChange, Registration};
pub use self::catalog::{
    Catalog, CatalogLookupError, CatalogValidationError, Episode, EpisodeId, EpisodeKey,
    EpisodeLocation, PricingPolicy, Series, SeriesDraft, SeriesId, SeriesKind,
};
pub use self::catalog_service::CatalogService;
pub use self::entitlement_service::{EntitlementService, PendingPayments};
pub use self::entitlements::Entitlements;
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::feedback::{
    FEEDBACK_MAX_CHARS, Feedback, FeedbackComment, FeedbackValidationError, NewFeedback,
};
pub use self::feedback_service::FeedbackService;
pub use self::playback_service::PlaybackService;
pub use self::trace_id::TraceId;
pub use self::user::{
    ALLOWED_EMAIL_DOMAINS, Email, PASSWORD_MIN, Password, PasswordDigest, Profile, User,
    UserDraft, UserId, UserPatch, UserValidationError,
};
pub use self::user_locks::{UserWriteGuard, UserWriteLocks};
pub use self::watch_progress::{
    ProgressTick, WATCHED_THRESHOLD, WatchProgressTracker, WatchedEvent,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use dragonfire::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
