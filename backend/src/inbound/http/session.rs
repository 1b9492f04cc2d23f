//! Session helpers to keep HTTP handlers free of framework-specific logic.
//!
//! A cookie session holds at most one identity: a viewer (`user_id`) or an
//! administrator (`admin_email`). Starting either kind renews the cookie and
//! drops the other, and values that fail to parse are treated as absent.

use std::fmt::Display;

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Email, Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";
pub(crate) const ADMIN_EMAIL_KEY: &str = "admin_email";

/// Newtype wrapper that exposes higher-level session operations.
#[derive(Clone)]
pub struct SessionContext(Session);

fn write_failed(error: impl Display) -> Error {
    Error::internal(format!("failed to persist session: {error}"))
}

impl SessionContext {
    /// Construct a new wrapper from the underlying Actix session.
    pub fn new(session: Session) -> Self {
        Self(session)
    }

    fn start(&self, key: &str, value: &str, replaces: &str) -> Result<(), Error> {
        self.0.renew();
        self.0.remove(replaces);
        self.0.insert(key, value).map_err(write_failed)
    }

    fn read<T, E: Display>(
        &self,
        key: &str,
        parse: impl FnOnce(&str) -> Result<T, E>,
    ) -> Result<Option<T>, Error> {
        let raw = self
            .0
            .get::<String>(key)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        match parse(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(error) => {
                warn!(key, %error, "discarding malformed session value");
                Ok(None)
            }
        }
    }

    /// Start a viewer session.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.start(USER_ID_KEY, user_id.as_ref(), ADMIN_EMAIL_KEY)
    }

    /// The signed-in viewer, if any.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        self.read(USER_ID_KEY, |raw| UserId::new(raw))
    }

    /// Require a signed-in viewer or return `401 Unauthorized`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .ok_or_else(|| Error::unauthorized("login required"))
    }

    /// Start an admin session.
    pub fn persist_admin(&self, email: &Email) -> Result<(), Error> {
        self.start(ADMIN_EMAIL_KEY, email.as_ref(), USER_ID_KEY)
    }

    /// Require an admin session or return `401 Unauthorized`.
    pub fn require_admin(&self) -> Result<Email, Error> {
        self.read(ADMIN_EMAIL_KEY, Email::parse)?
            .ok_or_else(|| Error::unauthorized("admin login required"))
    }

    /// Drop every key and expire the cookie.
    pub fn purge(&self) {
        self.0.purge();
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(SessionContext::new) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use actix_web::{App, HttpResponse, web};
    use rstest::rstest;

    const VIEWER: &str = "3fa85f64-5717-4562-b3fc-2c963f66afa6";
    const ADMIN: &str = "admin@dragonfire.test";

    async fn sign_in_viewer(session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_user(&UserId::new(VIEWER).expect("fixture id"))?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn sign_in_admin(session: SessionContext) -> Result<HttpResponse, Error> {
        session.persist_admin(&Email::parse(ADMIN).expect("fixture email"))?;
        Ok(HttpResponse::NoContent().finish())
    }

    async fn tamper(session: Session) -> HttpResponse {
        session
            .insert(USER_ID_KEY, "not-a-uuid")
            .expect("raw session write");
        HttpResponse::NoContent().finish()
    }

    async fn viewer(session: SessionContext) -> Result<HttpResponse, Error> {
        let id = session.require_user_id()?;
        Ok(HttpResponse::Ok().body(id.to_string()))
    }

    async fn admin(session: SessionContext) -> Result<HttpResponse, Error> {
        let email = session.require_admin()?;
        Ok(HttpResponse::Ok().body(email.to_string()))
    }

    async fn logout(session: SessionContext) -> HttpResponse {
        session.purge();
        HttpResponse::NoContent().finish()
    }

    async fn app() -> impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>
    {
        actix_test::init_service(
            App::new()
                .wrap(crate::inbound::http::test_utils::test_session_middleware())
                .route("/viewer/login", web::post().to(sign_in_viewer))
                .route("/admin/login", web::post().to(sign_in_admin))
                .route("/tamper", web::post().to(tamper))
                .route("/logout", web::post().to(logout))
                .route("/viewer", web::get().to(viewer))
                .route("/admin", web::get().to(admin)),
        )
        .await
    }

    fn session_cookie(response: &ServiceResponse) -> Cookie<'static> {
        response
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned()
    }

    async fn post_for_cookie(
        app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> Cookie<'static> {
        let mut request = actix_test::TestRequest::post().uri(uri);
        if let Some(cookie) = cookie {
            request = request.cookie(cookie);
        }
        let response = actix_test::call_service(app, request.to_request()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        session_cookie(&response)
    }

    async fn get(
        app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
        uri: &str,
        cookie: Option<Cookie<'static>>,
    ) -> (StatusCode, String) {
        let mut request = actix_test::TestRequest::get().uri(uri);
        if let Some(cookie) = cookie {
            request = request.cookie(cookie);
        }
        let response = actix_test::call_service(app, request.to_request()).await;
        let status = response.status();
        let body = actix_test::read_body(response).await;
        (status, String::from_utf8_lossy(&body).into_owned())
    }

    #[actix_web::test]
    async fn viewer_session_round_trips_the_user_id() {
        let app = app().await;
        let cookie = post_for_cookie(&app, "/viewer/login", None).await;
        assert_eq!(
            get(&app, "/viewer", Some(cookie)).await,
            (StatusCode::OK, VIEWER.to_owned())
        );
    }

    #[rstest]
    #[case("/viewer")]
    #[case("/admin")]
    #[actix_web::test]
    async fn missing_identity_is_unauthorised(#[case] uri: &str) {
        let app = app().await;
        let (status, _) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn malformed_user_id_is_treated_as_signed_out() {
        let app = app().await;
        let cookie = post_for_cookie(&app, "/tamper", None).await;
        let (status, _) = get(&app, "/viewer", Some(cookie)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn admin_sign_in_replaces_the_viewer() {
        let app = app().await;
        let viewer_cookie = post_for_cookie(&app, "/viewer/login", None).await;
        let admin_cookie = post_for_cookie(&app, "/admin/login", Some(viewer_cookie)).await;

        assert_eq!(
            get(&app, "/admin", Some(admin_cookie.clone())).await,
            (StatusCode::OK, ADMIN.to_owned())
        );
        let (status, _) = get(&app, "/viewer", Some(admin_cookie)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn logout_sends_a_removal_cookie() {
        let app = app().await;
        let cookie = post_for_cookie(&app, "/viewer/login", None).await;
        let removal = post_for_cookie(&app, "/logout", Some(cookie)).await;
        assert_eq!(removal.value(), "");
    }
}
