//! Playback session handlers.
//!
//! A client opens a session per mounted player, streams progress ticks
//! into it, and closes it on unmount. The episode is recorded as watched on
//! the first tick at or past 80% of the duration.

use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::{PlaybackSession, ProgressReport};
use crate::domain::{EpisodeId, ProgressTick};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, PlaybackSessionSchema, ProgressReportSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/playback`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartPlaybackRequest {
    #[schema(example = 5)]
    pub episode_id: u32,
}

/// Body of `POST /api/v1/playback/{session}/progress`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRequest {
    #[schema(example = 1700.5)]
    pub position_secs: f64,
    /// Zero while the player is still loading metadata.
    #[schema(example = 2100.0)]
    pub duration_secs: f64,
}

impl From<ProgressRequest> for ProgressTick {
    fn from(value: ProgressRequest) -> Self {
        Self {
            position_secs: value.position_secs,
            duration_secs: value.duration_secs,
        }
    }
}

/// Check watch access and open a playback session.
#[utoipa::path(
    post,
    path = "/api/v1/playback",
    request_body = StartPlaybackRequest,
    responses(
        (status = 201, description = "Session opened", body = PlaybackSessionSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Episode must be purchased or sequel is locked", body = ErrorSchema),
        (status = 404, description = "Unknown episode", body = ErrorSchema)
    ),
    tags = ["playback"],
    operation_id = "startPlayback",
    security(("SessionCookie" = []))
)]
#[post("/playback")]
pub async fn start_playback(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<StartPlaybackRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let episode = EpisodeId::new(payload.episode_id);
    let playback: PlaybackSession = state.playback.start_playback(&user_id, episode).await?;
    Ok(HttpResponse::Created().json(playback))
}

/// Feed one progress tick into an open session.
#[utoipa::path(
    post,
    path = "/api/v1/playback/{session}/progress",
    params(("session" = String, Path, format = Uuid, description = "Playback session id")),
    request_body = ProgressRequest,
    responses(
        (status = 200, description = "Progress recorded", body = ProgressReportSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown session", body = ErrorSchema)
    ),
    tags = ["playback"],
    operation_id = "reportProgress",
    security(("SessionCookie" = []))
)]
#[post("/playback/{session}/progress")]
pub async fn report_progress(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<ProgressRequest>,
) -> ApiResult<web::Json<ProgressReport>> {
    let user_id = session.require_user_id()?;
    let report = state
        .playback
        .report_progress(&user_id, path.into_inner(), payload.into_inner().into())
        .await?;
    Ok(web::Json(report))
}

/// Close a playback session.
#[utoipa::path(
    delete,
    path = "/api/v1/playback/{session}",
    params(("session" = String, Path, format = Uuid, description = "Playback session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Unknown session", body = ErrorSchema)
    ),
    tags = ["playback"],
    operation_id = "finishPlayback",
    security(("SessionCookie" = []))
)]
#[delete("/playback/{session}")]
pub async fn finish_playback(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    state
        .playback
        .finish_playback(&user_id, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
