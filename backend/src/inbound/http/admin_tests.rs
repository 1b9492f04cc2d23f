//! Tests for admin HTTP handlers.

use super::*;
use crate::domain::ports::MockAdminCommand;
use crate::inbound::http::test_utils::{
    ADMIN_EMAIL, admin_cookie, register_and_get_cookie, test_app, test_ports,
};
use actix_web::cookie::Cookie;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};
use std::sync::Arc;

async fn call(
    app: &impl Service<actix_http::Request, Response = ServiceResponse, Error = actix_web::Error>,
    request: actix_test::TestRequest,
    cookie: &Cookie<'static>,
) -> (StatusCode, Value) {
    let response = actix_test::call_service(app, request.cookie(cookie.clone()).to_request()).await;
    let status = response.status();
    let bytes = actix_test::read_body(response).await;
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn edit(email: &str, new_password: Option<&str>) -> Value {
    json!({
        "name": "Arya Stark",
        "email": email,
        "country": "Westeros",
        "city": "Winterfell",
        "phoneNumber": "0123456",
        "newPassword": new_password,
    })
}

#[rstest]
#[case(ADMIN_EMAIL, "wrongpass")]
#[case("someone@gmail.com", "dracarys1")]
#[actix_web::test]
async fn bad_admin_credentials_are_rejected(#[case] email: &str, #[case] password: &str) {
    let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/admin/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let response = actix_test::call_service(&app, request).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn user_sessions_cannot_reach_the_admin_panel() {
    let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
    let cookie = register_and_get_cookie(&app, "arya@gmail.com").await;
    let (status, _) = call(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/users"),
        &cookie,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn admin_manages_users() {
    let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
    register_and_get_cookie(&app, "arya@gmail.com").await;
    register_and_get_cookie(&app, "sansa@gmail.com").await;
    let admin = admin_cookie(&app).await;

    let (status, users) = call(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/users"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let users = users.as_array().expect("user list").clone();
    assert_eq!(users.len(), 2);
    let arya = users
        .iter()
        .find(|user| user["email"] == "arya@gmail.com")
        .and_then(|user| user["id"].as_str())
        .expect("arya listed")
        .to_owned();

    let (status, _) = call(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{arya}"))
            .set_json(edit("sansa@gmail.com", None)),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, updated) = call(
        &app,
        actix_test::TestRequest::put()
            .uri(&format!("/api/v1/admin/users/{arya}"))
            .set_json(edit("arya@gmail.com", Some("needle-sharp"))),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Winterfell");

    let login = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(json!({ "email": "arya@gmail.com", "password": "needle-sharp" }))
        .to_request();
    assert_eq!(
        actix_test::call_service(&app, login).await.status(),
        StatusCode::OK
    );

    let (status, _) = call(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/admin/users/{arya}")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = call(
        &app,
        actix_test::TestRequest::delete().uri(&format!("/api/v1/admin/users/{arya}")),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn admin_reads_feedback() {
    let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
    let user = register_and_get_cookie(&app, "sam@protonmail.com").await;
    let (status, _) = call(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/feedback")
            .set_json(json!({ "comment": "The wall needs heating." })),
        &user,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let admin = admin_cookie(&app).await;
    let (status, feedback) = call(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/admin/feedback"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(feedback[0]["comment"], "The wall needs heating.");
}

#[actix_web::test]
async fn uploads_are_unavailable_without_credentials() {
    let app = actix_test::init_service(test_app(HttpState::new(test_ports()))).await;
    let admin = admin_cookie(&app).await;
    let (status, body) = call(
        &app,
        actix_test::TestRequest::post().uri("/api/v1/admin/uploads"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "service_unavailable");
}

#[actix_web::test]
async fn upload_ticket_is_returned() {
    let mut commands = MockAdminCommand::new();
    commands.expect_login().times(1).return_once(|_| {
        crate::domain::Email::parse(ADMIN_EMAIL).map_err(Error::from)
    });
    commands.expect_create_upload_ticket().times(1).return_once(|| {
        Ok(DirectUploadTicket {
            upload_url: "https://upload.videodelivery.net/abc".to_owned(),
            stream_id: "abc".to_owned(),
        })
    });
    let mut state = HttpState::new(test_ports());
    state.admin = Arc::new(commands);
    let app = actix_test::init_service(test_app(state)).await;
    let admin = admin_cookie(&app).await;

    let (status, body) = call(
        &app,
        actix_test::TestRequest::post().uri("/api/v1/admin/uploads"),
        &admin,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["streamId"], "abc");
    assert_eq!(body["uploadUrl"], "https://upload.videodelivery.net/abc");
}
