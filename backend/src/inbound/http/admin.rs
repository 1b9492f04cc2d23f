//! Admin panel handlers.
//!
//! Admin sessions are separate from user sessions: signing in as admin drops
//! any user identity from the cookie and vice versa.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::{AdminUserUpdate, AdminUserUpdateParts, DirectUploadTicket};
use crate::domain::{Error, Feedback, LoginCredentials, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::accounts::{LoginRequest, UserResponse};
use crate::inbound::http::schemas::{DirectUploadTicketSchema, ErrorSchema, FeedbackSchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Body returned by `POST /api/v1/admin/login`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdminSessionResponse {
    #[schema(example = "admin@dragonfire.test")]
    pub email: String,
}

/// Admin edit of one user. A blank or absent `newPassword` keeps the
/// current password.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminUserRequest {
    pub name: String,
    pub email: String,
    pub country: String,
    pub city: String,
    pub phone_number: String,
    #[serde(default)]
    pub new_password: Option<String>,
}

fn parse_user_id(raw: &str) -> Result<UserId, Error> {
    UserId::new(raw).map_err(|_| Error::not_found(format!("user {raw} not found")))
}

/// Sign in to the admin panel.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Admin session started", body = AdminSessionResponse),
        (status = 400, description = "Missing email or password", body = ErrorSchema),
        (status = 401, description = "Invalid admin credentials", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn admin_login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<AdminSessionResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let admin = state.admin.login(&credentials).await?;
    session.persist_admin(&admin)?;
    Ok(web::Json(AdminSessionResponse {
        email: admin.to_string(),
    }))
}

/// Every registered user.
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Admin login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListUsers",
    security(("SessionCookie" = []))
)]
#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<UserResponse>>> {
    session.require_admin()?;
    let users = state.admin.list_users().await?;
    Ok(web::Json(users.iter().map(UserResponse::from).collect()))
}

/// Edit a user's profile, email or password.
#[utoipa::path(
    put,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, format = Uuid, description = "User id")),
    request_body = AdminUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 401, description = "Admin login required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 409, description = "Email already taken", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminUpdateUser",
    security(("SessionCookie" = []))
)]
#[put("/admin/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<AdminUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    session.require_admin()?;
    let id = parse_user_id(&path)?;
    let update = AdminUserUpdate::try_from_parts(AdminUserUpdateParts {
        name: &payload.name,
        email: &payload.email,
        country: &payload.country,
        city: &payload.city,
        phone_number: &payload.phone_number,
        new_password: payload.new_password.as_deref(),
    })?;
    let user = state.admin.update_user(&id, update).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Remove a user.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/users/{id}",
    params(("id" = String, Path, format = Uuid, description = "User id")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 401, description = "Admin login required", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminDeleteUser",
    security(("SessionCookie" = []))
)]
#[delete("/admin/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let id = parse_user_id(&path)?;
    state.admin.delete_user(&id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Submitted feedback, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/admin/feedback",
    responses(
        (status = 200, description = "Feedback", body = [FeedbackSchema]),
        (status = 401, description = "Admin login required", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminListFeedback",
    security(("SessionCookie" = []))
)]
#[get("/admin/feedback")]
pub async fn list_feedback(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Feedback>>> {
    session.require_admin()?;
    Ok(web::Json(state.admin.list_feedback().await?))
}

/// Reserve a direct upload URL for a new video.
#[utoipa::path(
    post,
    path = "/api/v1/admin/uploads",
    responses(
        (status = 201, description = "Upload ticket", body = DirectUploadTicketSchema),
        (status = 401, description = "Admin login required", body = ErrorSchema),
        (status = 503, description = "Uploads not configured or provider unavailable", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "adminCreateUpload",
    security(("SessionCookie" = []))
)]
#[post("/admin/uploads")]
pub async fn create_upload(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    let ticket: DirectUploadTicket = state.admin.create_upload_ticket().await?;
    Ok(HttpResponse::Created().json(ticket))
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod tests;
