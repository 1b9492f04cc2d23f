//! Paid entitlement handlers.
//!
//! Each request blocks until the payment collaborator confirms or the user
//! cancels through `DELETE /api/v1/payments/pending` from another request.

use actix_web::{delete, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::EpisodeId;
use crate::domain::ports::{DownloadGrant, PurchaseOutcome, SequelUnlockOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{
    DownloadGrantSchema, ErrorSchema, PurchaseOutcomeSchema, SequelUnlockOutcomeSchema,
};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `DELETE /api/v1/payments/pending`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CancelPaymentResponse {
    /// A payment was in flight and has been withdrawn.
    pub cancelled: bool,
}

/// Buy watch access to a locked episode.
#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/purchase",
    params(("id" = u32, Path, description = "Episode id", example = 5)),
    responses(
        (status = 200, description = "Episode unlocked; no receipt when nothing was due", body = PurchaseOutcomeSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Sequel still locked", body = ErrorSchema),
        (status = 404, description = "Unknown episode", body = ErrorSchema),
        (status = 409, description = "Payment cancelled or declined", body = ErrorSchema)
    ),
    tags = ["entitlements"],
    operation_id = "purchaseEpisode",
    security(("SessionCookie" = []))
)]
#[post("/episodes/{id}/purchase")]
pub async fn purchase_episode(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<u32>,
) -> ApiResult<web::Json<PurchaseOutcome>> {
    let user_id = session.require_user_id()?;
    let episode = EpisodeId::new(path.into_inner());
    Ok(web::Json(
        state.entitlements.purchase_episode(&user_id, episode).await?,
    ))
}

/// Pay the download price and receive the media location.
#[utoipa::path(
    post,
    path = "/api/v1/episodes/{id}/download",
    params(("id" = u32, Path, description = "Episode id", example = 5)),
    responses(
        (status = 200, description = "Download granted", body = DownloadGrantSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 403, description = "Sequel still locked", body = ErrorSchema),
        (status = 404, description = "Unknown episode", body = ErrorSchema),
        (status = 409, description = "Payment cancelled or declined", body = ErrorSchema)
    ),
    tags = ["entitlements"],
    operation_id = "purchaseDownload",
    security(("SessionCookie" = []))
)]
#[post("/episodes/{id}/download")]
pub async fn purchase_download(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<u32>,
) -> ApiResult<web::Json<DownloadGrant>> {
    let user_id = session.require_user_id()?;
    let episode = EpisodeId::new(path.into_inner());
    Ok(web::Json(
        state.entitlements.purchase_download(&user_id, episode).await?,
    ))
}

/// Pay to open the sequel without finishing the base series.
#[utoipa::path(
    post,
    path = "/api/v1/sequel/unlock",
    responses(
        (status = 200, description = "Sequel open; no receipt when it already was", body = SequelUnlockOutcomeSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 404, description = "Catalog has no sequel", body = ErrorSchema),
        (status = 409, description = "Payment cancelled or declined", body = ErrorSchema)
    ),
    tags = ["entitlements"],
    operation_id = "unlockSequel",
    security(("SessionCookie" = []))
)]
#[post("/sequel/unlock")]
pub async fn unlock_sequel(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<SequelUnlockOutcome>> {
    let user_id = session.require_user_id()?;
    Ok(web::Json(state.entitlements.unlock_sequel(&user_id).await?))
}

/// Withdraw the user's in-flight payment, if any.
#[utoipa::path(
    delete,
    path = "/api/v1/payments/pending",
    responses(
        (status = 200, description = "Whether a payment was cancelled", body = CancelPaymentResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["entitlements"],
    operation_id = "cancelPendingPayment",
    security(("SessionCookie" = []))
)]
#[delete("/payments/pending")]
pub async fn cancel_pending_payment(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<CancelPaymentResponse>> {
    let user_id = session.require_user_id()?;
    let cancelled = state.entitlements.cancel_pending_payment(&user_id).await?;
    Ok(web::Json(CancelPaymentResponse { cancelled }))
}

#[cfg(test)]
#[path = "entitlements_tests.rs"]
mod tests;
