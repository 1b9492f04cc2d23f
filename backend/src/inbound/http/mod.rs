//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod accounts;
pub mod admin;
pub mod catalog;
pub mod entitlements;
pub mod error;
pub mod feedback;
pub mod health;
pub mod playback;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;

/// Register every `/api/v1` handler on `cfg`.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use dragonfire::inbound::http::api_services;
///
/// let app = App::new().service(web::scope("/api/v1").configure(api_services));
/// ```
pub fn api_services(cfg: &mut web::ServiceConfig) {
    cfg.service(accounts::register)
        .service(accounts::login)
        .service(accounts::logout)
        .service(accounts::current_user)
        .service(accounts::update_profile)
        .service(accounts::change_password)
        .service(accounts::profile_summary)
        .service(catalog::list_series)
        .service(catalog::series_access)
        .service(catalog::sequel_status)
        .service(catalog::episode_access)
        .service(entitlements::purchase_episode)
        .service(entitlements::purchase_download)
        .service(entitlements::unlock_sequel)
        .service(entitlements::cancel_pending_payment)
        .service(playback::start_playback)
        .service(playback::report_progress)
        .service(playback::finish_playback)
        .service(feedback::submit_feedback)
        .service(admin::admin_login)
        .service(admin::list_users)
        .service(admin::update_user)
        .service(admin::delete_user)
        .service(admin::list_feedback)
        .service(admin::create_upload);
}
