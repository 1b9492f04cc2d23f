//! DTOs for decoding Cloudflare Stream direct-upload responses.

use serde::Deserialize;

use crate::domain::ports::DirectUploadTicket;

#[derive(Debug, Deserialize)]
pub(super) struct DirectUploadResponseDto {
    #[serde(default)]
    pub(super) success: bool,
    #[serde(default)]
    pub(super) errors: Vec<ApiMessageDto>,
    pub(super) result: Option<DirectUploadResultDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct ApiMessageDto {
    #[serde(default)]
    pub(super) code: Option<i64>,
    #[serde(default)]
    pub(super) message: String,
}

#[derive(Debug, Deserialize)]
pub(super) struct DirectUploadResultDto {
    #[serde(rename = "uploadURL")]
    pub(super) upload_url: Option<String>,
    pub(super) uid: Option<String>,
}

impl DirectUploadResponseDto {
    pub(super) fn into_ticket(self) -> Result<DirectUploadTicket, String> {
        if !self.success {
            let reasons = self
                .errors
                .iter()
                .map(|error| match error.code {
                    Some(code) => format!("{code}: {}", error.message),
                    None => error.message.clone(),
                })
                .collect::<Vec<_>>()
                .join("; ");
            return Err(if reasons.is_empty() {
                "response reported failure".to_owned()
            } else {
                reasons
            });
        }
        let result = self.result.ok_or("response has no result")?;
        let upload_url = result
            .upload_url
            .filter(|url| !url.is_empty())
            .ok_or("response has no upload URL")?;
        Ok(DirectUploadTicket {
            upload_url,
            stream_id: result.uid.unwrap_or_default(),
        })
    }
}
