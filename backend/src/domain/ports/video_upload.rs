//! Port for issuing direct video upload URLs.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::Error;

use super::define_port_error;

/// One-time URL the admin client uploads a video to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectUploadTicket {
    pub upload_url: String,
    /// Identifier of the video once processed.
    pub stream_id: String,
}

define_port_error! {
    /// Errors raised by upload adapters.
    pub enum VideoUploadError {
        /// Upload credentials are not configured.
        NotConfigured => "video uploads are not configured",
        /// The provider could not be reached.
        Transport { message: String } => "video upload provider unreachable: {message}",
        /// The provider answered with an error or an unusable body.
        Rejected { message: String } => "video upload provider rejected the request: {message}",
    }
}

impl From<VideoUploadError> for Error {
    fn from(error: VideoUploadError) -> Self {
        Error::service_unavailable(error.to_string())
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoUploadService: Send + Sync {
    /// Reserve a direct upload slot.
    async fn create_direct_upload(&self) -> Result<DirectUploadTicket, VideoUploadError>;
}

/// Stand-in used when no provider credentials are configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledVideoUploadService;

#[async_trait]
impl VideoUploadService for DisabledVideoUploadService {
    async fn create_direct_upload(&self) -> Result<DirectUploadTicket, VideoUploadError> {
        Err(VideoUploadError::not_configured())
    }
}
