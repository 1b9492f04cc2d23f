//! Account API handlers.
//!
//! ```text
//! POST /api/v1/register {"email":"arya@gmail.com","password":"needle42"}
//! POST /api/v1/login {"email":"arya@gmail.com","password":"needle42"}
//! POST /api/v1/logout
//! GET /api/v1/me
//! PUT /api/v1/me/profile
//! PUT /api/v1/me/password
//! GET /api/v1/me/summary
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::ProfileSummary;
use crate::domain::{LoginCredentials, PasswordChange, Profile, Registration, User};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, ProfileSummarySchema};
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Registration body for `POST /api/v1/register`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[schema(example = "arya@gmail.com")]
    pub email: String,
    #[schema(example = "needle42")]
    pub password: String,
}

/// Login body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[schema(example = "arya@gmail.com")]
    pub email: String,
    #[schema(example = "needle42")]
    pub password: String,
}

/// Full profile edit for `PUT /api/v1/me/profile`. Every field is required.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub name: String,
    pub country: String,
    pub city: String,
    #[schema(example = "0123456")]
    pub phone_number: String,
}

/// Password change body for `PUT /api/v1/me/password`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Public view of an account. The password digest never leaves the server.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub id: String,
    #[schema(example = "arya@gmail.com")]
    pub email: String,
    pub name: String,
    pub country: String,
    pub city: String,
    pub phone_number: String,
    pub watched_episodes: Vec<u32>,
    pub purchased_episodes: Vec<u32>,
    pub sequel_unlocked: bool,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        let Profile {
            name,
            country,
            city,
            phone_number,
        } = user.profile().clone();
        let entitlements = user.entitlements();
        Self {
            id: user.id().to_string(),
            email: user.email().to_string(),
            name,
            country,
            city,
            phone_number,
            watched_episodes: entitlements.watched().iter().map(|id| id.get()).collect(),
            purchased_episodes: entitlements.purchased().iter().map(|id| id.get()).collect(),
            sequel_unlocked: entitlements.sequel_unlocked(),
            created_at: user.created_at(),
        }
    }
}

/// Create an account and sign it in.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid email, domain or password", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 503, description = "User store unavailable", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest { email, password } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &password)?;
    let user = state.accounts.register(&registration).await?;
    session.persist_user(user.id())?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Missing email or password", body = ErrorSchema),
        (status = 401, description = "Invalid credentials", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let LoginRequest { email, password } = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&email, &password)?;
    let user = state.accounts.login(&credentials).await?;
    session.persist_user(user.id())?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Drop the session cookie.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Session ended")),
    tags = ["accounts"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent().finish()
}

/// The signed-in account.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "currentUser",
    security(("SessionCookie" = []))
)]
#[get("/me")]
pub async fn current_user(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let user = state.accounts.current_user(&user_id).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Replace the profile attributes.
#[utoipa::path(
    put,
    path = "/api/v1/me/profile",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Missing field or malformed phone number", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "updateProfile",
    security(("SessionCookie" = []))
)]
#[put("/me/profile")]
pub async fn update_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let user_id = session.require_user_id()?;
    let ProfileRequest {
        name,
        country,
        city,
        phone_number,
    } = payload.into_inner();
    let profile = Profile::try_from_parts(&name, &country, &city, &phone_number)?;
    let user = state.accounts.update_profile(&user_id, profile).await?;
    Ok(web::Json(UserResponse::from(&user)))
}

/// Change the password after checking the current one.
#[utoipa::path(
    put,
    path = "/api/v1/me/password",
    request_body = PasswordRequest,
    responses(
        (status = 204, description = "Password changed"),
        (status = 400, description = "Current password wrong or new password invalid", body = ErrorSchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "changePassword",
    security(("SessionCookie" = []))
)]
#[put("/me/password")]
pub async fn change_password(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PasswordRequest>,
) -> ApiResult<HttpResponse> {
    let user_id = session.require_user_id()?;
    let change = PasswordChange::try_from_parts(&payload.current_password, &payload.new_password)?;
    state.accounts.change_password(&user_id, &change).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Watched and purchased episodes.
#[utoipa::path(
    get,
    path = "/api/v1/me/summary",
    responses(
        (status = 200, description = "Profile summary", body = ProfileSummarySchema),
        (status = 401, description = "Login required", body = ErrorSchema)
    ),
    tags = ["accounts"],
    operation_id = "profileSummary",
    security(("SessionCookie" = []))
)]
#[get("/me/summary")]
pub async fn profile_summary(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<ProfileSummary>> {
    let user_id = session.require_user_id()?;
    let summary = state.accounts.profile_summary(&user_id).await?;
    Ok(web::Json(summary))
}

#[cfg(test)]
#[path = "accounts_tests.rs"]
mod tests;
