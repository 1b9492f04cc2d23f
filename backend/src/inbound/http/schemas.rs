//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their corresponding
//! domain types but live in the inbound adapter layer where framework
//! concerns belong. Prices are decimal strings on the wire.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
///
/// Stable machine-readable error codes returned in API error responses.
#[derive(ToSchema)]
#[schema(as = crate::domain::ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed or is missing.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// Authenticated but not permitted to perform this action.
    #[schema(rename = "forbidden")]
    Forbidden,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request clashes with current state.
    #[schema(rename = "conflict")]
    Conflict,
    /// A collaborator (store, payment, upload provider) is unavailable.
    #[schema(rename = "service_unavailable")]
    ServiceUnavailable,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
///
/// API error response payload with machine-readable code and human-readable
/// message.
#[derive(ToSchema)]
#[schema(as = crate::domain::Error, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "invalid_request")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "Something went wrong")]
    message: String,
    /// Correlation identifier for tracing this error across systems.
    #[schema(example = "01HZY8B2W6X5Y7Z9ABCD1234")]
    trace_id: Option<String>,
    /// Supplementary error details for clients.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::Profile`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Profile, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProfileSchema {
    #[schema(example = "Arya Stark")]
    name: String,
    #[schema(example = "Westeros")]
    country: String,
    #[schema(example = "Winterfell")]
    city: String,
    #[schema(example = "0123456")]
    phone_number: String,
}

/// OpenAPI schema for [`crate::domain::EntitlementDecision`].
///
/// `status` is one of `free`, `lockedPayable` or `unlockedByPurchase`;
/// `price` is present for `lockedPayable` only.
#[derive(ToSchema)]
#[schema(as = crate::domain::EntitlementDecision)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EntitlementDecisionSchema {
    #[schema(example = "lockedPayable")]
    status: String,
    #[schema(example = "0.10")]
    price: Option<String>,
}

/// OpenAPI schema for [`crate::domain::WatchAccess`].
///
/// `status` is `allowed` or `requiresPurchase`.
#[derive(ToSchema)]
#[schema(as = crate::domain::WatchAccess)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct WatchAccessSchema {
    #[schema(example = "requiresPurchase")]
    status: String,
    #[schema(example = "0.10")]
    price: Option<String>,
}

/// OpenAPI schema for [`crate::domain::DownloadAccess`].
#[derive(ToSchema)]
#[schema(as = crate::domain::DownloadAccess)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DownloadAccessSchema {
    #[schema(example = "requiresPurchase")]
    status: String,
    #[schema(example = "0.50")]
    price: String,
}

/// OpenAPI schema for [`crate::domain::ports::SeriesSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SeriesSummary, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SeriesSummarySchema {
    #[schema(example = "got")]
    id: String,
    #[schema(example = "Game of Thrones")]
    title: String,
    description: String,
    poster_url: String,
    /// The series is the sequel gated behind the base series.
    sequel: bool,
    #[schema(example = 73)]
    total_episodes: u32,
    /// Closed to the current user.
    locked: bool,
}

/// OpenAPI schema for [`crate::domain::EpisodeAccessView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::EpisodeAccessView, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EpisodeAccessViewSchema {
    #[schema(example = 5)]
    id: u32,
    /// 1-based position within the series.
    #[schema(example = 5)]
    position: u32,
    #[schema(example = 1)]
    season: u32,
    #[schema(example = 5)]
    number: u32,
    title: String,
    description: String,
    decision: EntitlementDecisionSchema,
    #[schema(example = "0.10")]
    watch_price: String,
    #[schema(example = "0.50")]
    download_price: String,
    watched: bool,
}

/// OpenAPI schema for [`crate::domain::SeasonAccessView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SeasonAccessView)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SeasonAccessViewSchema {
    season: u32,
    episodes: Vec<EpisodeAccessViewSchema>,
}

/// OpenAPI schema for [`crate::domain::SeriesAccessView`].
#[derive(ToSchema)]
#[schema(as = crate::domain::SeriesAccessView, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SeriesAccessViewSchema {
    id: String,
    title: String,
    description: String,
    poster_url: String,
    seasons: Vec<SeasonAccessViewSchema>,
}

/// OpenAPI schema for [`crate::domain::ports::EpisodeAccess`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::EpisodeAccess, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct EpisodeAccessSchema {
    episode: u32,
    series: String,
    position: u32,
    decision: EntitlementDecisionSchema,
    watch: WatchAccessSchema,
    download: DownloadAccessSchema,
    /// The owning sequel series is still locked.
    series_locked: bool,
}

/// OpenAPI schema for [`crate::domain::ports::SequelStatus`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SequelStatus, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SequelStatusSchema {
    #[schema(example = "hod")]
    sequel: String,
    locked: bool,
    #[schema(example = 12)]
    watched: u32,
    #[schema(example = 73)]
    required: u32,
    unlocked_by_payment: bool,
    #[schema(example = "2.00")]
    unlock_price: String,
}

/// OpenAPI schema for [`crate::domain::ports::PaymentReceipt`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::PaymentReceipt, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PaymentReceiptSchema {
    #[schema(value_type = String, format = Uuid)]
    reference: String,
    #[schema(example = "0.10")]
    amount: String,
    #[schema(example = "Game of Thrones: Winter Is Coming")]
    label: String,
    #[schema(value_type = String, format = DateTime)]
    confirmed_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::PurchaseOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::PurchaseOutcome)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PurchaseOutcomeSchema {
    episode: u32,
    decision: EntitlementDecisionSchema,
    /// Absent when nothing had to be paid.
    receipt: Option<PaymentReceiptSchema>,
}

/// OpenAPI schema for [`crate::domain::ports::DownloadGrant`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DownloadGrant, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DownloadGrantSchema {
    episode: u32,
    video_url: String,
    receipt: PaymentReceiptSchema,
}

/// OpenAPI schema for [`crate::domain::ports::SequelUnlockOutcome`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SequelUnlockOutcome)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SequelUnlockOutcomeSchema {
    status: SequelStatusSchema,
    /// Absent when the sequel was already open.
    receipt: Option<PaymentReceiptSchema>,
}

/// OpenAPI schema for [`crate::domain::ports::PlaybackSession`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::PlaybackSession, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PlaybackSessionSchema {
    #[schema(value_type = String, format = Uuid)]
    session_id: String,
    episode: u32,
    video_url: String,
}

/// OpenAPI schema for [`crate::domain::ports::ProgressReport`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ProgressReport, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProgressReportSchema {
    episode: u32,
    watched: bool,
    newly_recorded: bool,
    sequel_locked: bool,
}

/// OpenAPI schema for [`crate::domain::ports::SummaryEpisode`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::SummaryEpisode, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct SummaryEpisodeSchema {
    id: u32,
    series_id: String,
    series_title: String,
    title: String,
}

/// OpenAPI schema for [`crate::domain::ports::ProfileSummary`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::ProfileSummary, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProfileSummarySchema {
    watched: Vec<SummaryEpisodeSchema>,
    purchased: Vec<SummaryEpisodeSchema>,
    sequel_unlocked: bool,
}

/// OpenAPI schema for [`crate::domain::Feedback`].
#[derive(ToSchema)]
#[schema(as = crate::domain::Feedback, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct FeedbackSchema {
    #[schema(value_type = String, format = Uuid)]
    id: String,
    #[schema(value_type = String, format = Uuid)]
    user_id: String,
    user_name: String,
    user_email: String,
    comment: String,
    #[schema(value_type = String, format = DateTime)]
    submitted_at: String,
}

/// OpenAPI schema for [`crate::domain::ports::DirectUploadTicket`].
#[derive(ToSchema)]
#[schema(as = crate::domain::ports::DirectUploadTicket, rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct DirectUploadTicketSchema {
    upload_url: String,
    stream_id: String,
}
