//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! document for the REST API. It registers:
//!
//! - **Paths**: every `/api/v1` handler plus the health probes
//! - **Schemas**: request and response bodies, and wrappers such as
//!   [`ErrorSchema`] that describe domain types without coupling them to
//!   utoipa
//! - **Security**: session cookie authentication scheme
//!
//! The generated document is served by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::accounts::{
    LoginRequest, PasswordRequest, ProfileRequest, RegisterRequest, UserResponse,
};
use crate::inbound::http::admin::{AdminSessionResponse, AdminUserRequest};
use crate::inbound::http::entitlements::CancelPaymentResponse;
use crate::inbound::http::feedback::FeedbackRequest;
use crate::inbound::http::playback::{ProgressRequest, StartPlaybackRequest};
use crate::inbound::http::schemas::{
    DirectUploadTicketSchema, DownloadAccessSchema, DownloadGrantSchema,
    EntitlementDecisionSchema, EpisodeAccessSchema, EpisodeAccessViewSchema, ErrorCodeSchema,
    ErrorSchema, FeedbackSchema, PaymentReceiptSchema, PlaybackSessionSchema, ProfileSchema,
    ProfileSummarySchema, ProgressReportSchema, PurchaseOutcomeSchema, SeasonAccessViewSchema,
    SequelStatusSchema, SequelUnlockOutcomeSchema, SeriesAccessViewSchema, SeriesSummarySchema,
    SummaryEpisodeSchema, WatchAccessSchema,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login or /api/v1/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Dragonfire API",
        description = "Accounts, per-episode pricing, sequel unlocking and playback for the streaming catalog.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::logout,
        crate::inbound::http::accounts::current_user,
        crate::inbound::http::accounts::update_profile,
        crate::inbound::http::accounts::change_password,
        crate::inbound::http::accounts::profile_summary,
        crate::inbound::http::catalog::list_series,
        crate::inbound::http::catalog::series_access,
        crate::inbound::http::catalog::sequel_status,
        crate::inbound::http::catalog::episode_access,
        crate::inbound::http::entitlements::purchase_episode,
        crate::inbound::http::entitlements::purchase_download,
        crate::inbound::http::entitlements::unlock_sequel,
        crate::inbound::http::entitlements::cancel_pending_payment,
        crate::inbound::http::playback::start_playback,
        crate::inbound::http::playback::report_progress,
        crate::inbound::http::playback::finish_playback,
        crate::inbound::http::feedback::submit_feedback,
        crate::inbound::http::admin::admin_login,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::update_user,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::admin::list_feedback,
        crate::inbound::http::admin::create_upload,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        LoginRequest,
        ProfileRequest,
        PasswordRequest,
        UserResponse,
        ProfileSchema,
        ProfileSummarySchema,
        SummaryEpisodeSchema,
        SeriesSummarySchema,
        SeriesAccessViewSchema,
        SeasonAccessViewSchema,
        EpisodeAccessViewSchema,
        EpisodeAccessSchema,
        EntitlementDecisionSchema,
        WatchAccessSchema,
        DownloadAccessSchema,
        SequelStatusSchema,
        PaymentReceiptSchema,
        PurchaseOutcomeSchema,
        DownloadGrantSchema,
        SequelUnlockOutcomeSchema,
        CancelPaymentResponse,
        StartPlaybackRequest,
        ProgressRequest,
        PlaybackSessionSchema,
        ProgressReportSchema,
        FeedbackRequest,
        FeedbackSchema,
        AdminSessionResponse,
        AdminUserRequest,
        DirectUploadTicketSchema,
    )),
    tags(
        (name = "accounts", description = "Registration, login and profile management"),
        (name = "catalog", description = "Series listings with per-user access decisions"),
        (name = "entitlements", description = "Episode purchases, downloads and sequel unlocks"),
        (name = "playback", description = "Playback sessions and watch progress"),
        (name = "feedback", description = "User feedback"),
        (name = "admin", description = "Administrator panel"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI schema and path structure.

    use super::*;
    use rstest::rstest;
    use utoipa::OpenApi;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    // Note: utoipa replaces :: with . in schema names
    const ERROR_SCHEMA_NAME: &str = "crate.domain.Error";
    const SEQUEL_STATUS_SCHEMA_NAME: &str = "crate.domain.ports.SequelStatus";

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get(ERROR_SCHEMA_NAME).expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
        assert_object_schema_has_field(error_schema, "traceId");
    }

    #[test]
    fn openapi_sequel_status_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(SEQUEL_STATUS_SCHEMA_NAME)
            .expect("SequelStatus schema");

        assert_object_schema_has_field(schema, "locked");
        assert_object_schema_has_field(schema, "unlockPrice");
    }

    #[test]
    fn openapi_registers_the_session_cookie_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }

    #[rstest]
    #[case("/api/v1/register")]
    #[case("/api/v1/me/summary")]
    #[case("/api/v1/series/{id}")]
    #[case("/api/v1/sequel/status")]
    #[case("/api/v1/episodes/{id}/purchase")]
    #[case("/api/v1/payments/pending")]
    #[case("/api/v1/playback/{session}/progress")]
    #[case("/api/v1/admin/uploads")]
    #[case("/health/ready")]
    fn openapi_documents_path(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing path {path}");
    }
}
