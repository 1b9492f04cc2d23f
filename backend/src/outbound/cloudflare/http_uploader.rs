//! Reqwest-backed Cloudflare Stream direct-upload adapter.
//!
//! This adapter owns transport details only: the authenticated POST, timeout
//! and HTTP error mapping, and JSON decoding into an upload ticket.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use zeroize::Zeroizing;

use super::dto::DirectUploadResponseDto;
use crate::domain::ports::{DirectUploadTicket, VideoUploadError, VideoUploadService};

const API_BASE: &str = "https://api.cloudflare.com/client/v4/";

/// Account credentials for the Stream API.
pub struct CloudflareCredentials {
    pub account_id: String,
    pub api_token: Zeroizing<String>,
}

/// Direct-upload adapter for one Cloudflare account.
pub struct CloudflareStreamUploader {
    client: Client,
    endpoint: Url,
    api_token: Zeroizing<String>,
}

impl CloudflareStreamUploader {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the account id does not form a valid URL or the
    /// client cannot be constructed.
    pub fn new(
        credentials: CloudflareCredentials,
        timeout: Duration,
    ) -> Result<Self, VideoUploadError> {
        let endpoint = direct_upload_endpoint(&credentials.account_id)?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| VideoUploadError::transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_token: credentials.api_token,
        })
    }
}

fn direct_upload_endpoint(account_id: &str) -> Result<Url, VideoUploadError> {
    let account_id = account_id.trim();
    if account_id.is_empty() || !account_id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(VideoUploadError::not_configured());
    }
    Url::parse(&format!(
        "{API_BASE}accounts/{account_id}/stream?direct_user=true"
    ))
    .map_err(|err| VideoUploadError::rejected(format!("invalid endpoint: {err}")))
}

#[async_trait]
impl VideoUploadService for CloudflareStreamUploader {
    async fn create_direct_upload(&self) -> Result<DirectUploadTicket, VideoUploadError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .bearer_auth(self.api_token.as_str())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        parse_ticket(body.as_ref())
    }
}

fn parse_ticket(body: &[u8]) -> Result<DirectUploadTicket, VideoUploadError> {
    let decoded: DirectUploadResponseDto = serde_json::from_slice(body).map_err(|error| {
        VideoUploadError::rejected(format!("invalid Stream JSON payload: {error}"))
    })?;
    decoded.into_ticket().map_err(VideoUploadError::rejected)
}

fn map_transport_error(error: reqwest::Error) -> VideoUploadError {
    VideoUploadError::transport(error.to_string())
}

fn map_status_error(status: StatusCode, body: &[u8]) -> VideoUploadError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };
    if status.is_server_error() {
        VideoUploadError::transport(message)
    } else {
        VideoUploadError::rejected(message)
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
