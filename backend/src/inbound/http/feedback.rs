//! Feedback submission handler.

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::FeedbackComment;
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, FeedbackSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body of `POST /api/v1/feedback`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FeedbackRequest {
    #[schema(example = "More dragons, please.")]
    pub comment: String,
}

/// Store a comment attributed to the signed-in user.
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    request_body = FeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackSchema),
        (status = 400, description = "Empty or overlong comment", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema),
        (status = 503, description = "Feedback store unavailable", body = ErrorSchema)
    ),
    tags = ["feedback"],
    operation_id = "submitFeedback",
    security(("SessionCookie" = []))
)]
#[post("/feedback")]
pub async fn submit_feedback(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<FeedbackRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let comment = FeedbackComment::new(&payload.comment)?;
    let stored = state.feedback.submit(&user_id, comment).await?;
    Ok(HttpResponse::Created().json(stored))
}
