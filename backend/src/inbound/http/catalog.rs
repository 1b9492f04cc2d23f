//! Catalog browsing handlers.
//!
//! ```text
//! GET /api/v1/series
//! GET /api/v1/series/got
//! GET /api/v1/sequel/status
//! GET /api/v1/episodes/5/access
//! ```

use actix_web::{get, web};

use crate::domain::ports::{EpisodeAccess, SequelStatus, SeriesSummary};
use crate::domain::{EpisodeId, Error, SeriesAccessView, SeriesId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    EpisodeAccessSchema, ErrorSchema, SequelStatusSchema, SeriesAccessViewSchema,
    SeriesSummarySchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Malformed slugs cannot name a series, so they are reported as unknown.
fn parse_series_id(raw: String) -> Result<SeriesId, Error> {
    SeriesId::new(raw).map_err(|err| Error::not_found(err.to_string()))
}

/// Every series with its lock state for the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/series",
    responses(
        (status = 200, description = "Series in catalog order", body = [SeriesSummarySchema]),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "listSeries",
    security(("SessionCookie" = []))
)]
#[get("/series")]
pub async fn list_series(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<SeriesSummary>>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.catalog.list_series(&user_id).await?))
}

/// Episodes of one series grouped by season, each with its access decision.
#[utoipa::path(
    get,
    path = "/api/v1/series/{id}",
    params(("id" = String, Path, description = "Series slug", example = "got")),
    responses(
        (status = 200, description = "Series access view", body = SeriesAccessViewSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Sequel still locked", body = ErrorSchema),
        (status = 404, description = "Unknown series", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "seriesAccess",
    security(("SessionCookie" = []))
)]
#[get("/series/{id}")]
pub async fn series_access(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<SeriesAccessView>> {
    let user_id = session.require_user_id()?;
    let series = parse_series_id(path.into_inner())?;
    Ok(web::Json(
        state.catalog.series_access(&user_id, &series).await?,
    ))
}

/// Progress towards opening the sequel.
#[utoipa::path(
    get,
    path = "/api/v1/sequel/status",
    responses(
        (status = 200, description = "Sequel status", body = SequelStatusSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Catalog has no sequel", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "sequelStatus",
    security(("SessionCookie" = []))
)]
#[get("/sequel/status")]
pub async fn sequel_status(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SequelStatus>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.catalog.sequel_status(&user_id).await?))
}

/// Watch and download decisions for one episode.
#[utoipa::path(
    get,
    path = "/api/v1/episodes/{id}/access",
    params(("id" = u32, Path, description = "Episode id", example = 5)),
    responses(
        (status = 200, description = "Episode access", body = EpisodeAccessSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown episode", body = ErrorSchema)
    ),
    tags = ["catalog"],
    operation_id = "episodeAccess",
    security(("SessionCookie" = []))
)]
#[get("/episodes/{id}/access")]
pub async fn episode_access(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<u32>,
) -> ApiResult<web::Json<EpisodeAccess>> {
    let user_id = session.require_user_id()?;
    let episode = EpisodeId::new(path.into_inner());
    Ok(web::Json(
        state.catalog.episode_access(&user_id, episode).await?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockCatalogQuery;
    use crate::inbound::http::test_utils::{register_and_get_cookie, test_app, test_ports};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use serde_json::Value;
    use std::sync::Arc;

    async fn get_json(
        app: &impl actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
        uri: &str,
        cookie: actix_web::cookie::Cookie<'static>,
    ) -> (StatusCode, Value) {
        let request = actix_test::TestRequest::get()
            .uri(uri)
            .cookie(cookie)
            .to_request();
        let response = actix_test::call_service(app, request).await;
        let status = response.status();
        let bytes = actix_test::read_body(response).await;
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[actix_web::test]
    async fn new_users_see_the_sequel_locked() {
        let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
        let cookie = register_and_get_cookie(&app, "arya@gmail.com").await;

        let (status, body) = get_json(&app, "/api/v1/series", cookie.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "got");
        assert_eq!(body[0]["locked"], false);
        assert_eq!(body[1]["id"], "hod");
        assert_eq!(body[1]["locked"], true);

        let (status, body) = get_json(&app, "/api/v1/sequel/status", cookie.clone()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["watched"], 0);
        assert_eq!(body["required"], 73);
        assert_eq!(body["unlockPrice"], "2.00");

        let (status, body) = get_json(&app, "/api/v1/series/hod", cookie).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["details"]["code"], "sequel_locked");
    }

    #[actix_web::test]
    async fn series_view_carries_prices_as_strings() {
        let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
        let cookie = register_and_get_cookie(&app, "arya@gmail.com").await;

        let (status, body) = get_json(&app, "/api/v1/series/got", cookie).await;
        assert_eq!(status, StatusCode::OK);
        let first_season = &body["seasons"][0]["episodes"];
        assert_eq!(first_season[0]["decision"]["status"], "free");
        assert_eq!(first_season[4]["decision"]["status"], "lockedPayable");
        assert_eq!(first_season[4]["decision"]["price"], "0.10");
        assert_eq!(first_season[4]["downloadPrice"], "0.50");
    }

    #[actix_web::test]
    async fn unknown_ids_are_not_found() {
        let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
        let cookie = register_and_get_cookie(&app, "arya@gmail.com").await;

        let (status, _) = get_json(&app, "/api/v1/series/Not%20A%20Slug", cookie.clone()).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = get_json(&app, "/api/v1/episodes/999/access", cookie).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn catalog_routes_require_login() {
        let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
        let request = actix_test::TestRequest::get().uri("/api/v1/series").to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn service_failures_pass_through() {
        let mut catalog = MockCatalogQuery::new();
        catalog
            .expect_sequel_status()
            .times(1)
            .return_once(|_| Err(Error::not_found("catalog has no sequel series")));
        let mut state = HttpState::new(test_ports());
        state.catalog = Arc::new(catalog);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = register_and_get_cookie(&app, "arya@gmail.com").await;

        let (status, body) = get_json(&app, "/api/v1/sequel/status", cookie).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "catalog has no sequel series");
    }
}
