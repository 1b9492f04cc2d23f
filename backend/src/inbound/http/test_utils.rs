//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use crate::domain::catalog::fixtures::default_catalog;
use crate::domain::ports::{
    DisabledVideoUploadService, FixtureCatalogProvider, FixturePaymentGateway,
};
use crate::domain::service_fixtures::fixture_clock;
use crate::domain::{AdminCredentials, Email, PasswordDigest};
use crate::outbound::persistence::{InMemoryFeedbackSink, InMemoryUserRepository};

use super::api_services;
use super::error::{json_config, path_config};
use super::state::{HttpState, HttpStatePorts};

pub const ADMIN_EMAIL: &str = "admin@dragonfire.test";
pub const ADMIN_PASSWORD: &str = "dracarys1";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Ports over in-memory stores, the fixture catalog and an instant payment
/// gateway.
pub fn test_ports() -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(InMemoryUserRepository::default()),
        catalog: Arc::new(FixtureCatalogProvider::new(default_catalog())),
        feedback: Arc::new(InMemoryFeedbackSink::default()),
        payments: Arc::new(FixturePaymentGateway),
        uploads: Arc::new(DisabledVideoUploadService),
        clock: fixture_clock(),
        admin: Some(AdminCredentials {
            email: Email::parse(ADMIN_EMAIL).expect("admin email"),
            password_digest: PasswordDigest::of(ADMIN_PASSWORD),
        }),
    }
}

/// The whole API mounted under `/api/v1` over `state`.
pub fn test_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(web::Data::new(state))
        .app_data(json_config())
        .app_data(path_config())
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").configure(api_services))
}

fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie")
        .into_owned()
}

/// Register `email` with a valid password and return the session cookie.
pub async fn register_and_get_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    email: &str,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({ "email": email, "password": "winter42" }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "registration failed");
    session_cookie(&response)
}

/// Sign in to the admin panel and return the session cookie.
pub async fn admin_cookie(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
) -> Cookie<'static> {
    let request = test::TestRequest::post()
        .uri("/api/v1/admin/login")
        .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
        .to_request();
    let response = test::call_service(app, request).await;
    assert!(response.status().is_success(), "admin login failed");
    session_cookie(&response)
}
