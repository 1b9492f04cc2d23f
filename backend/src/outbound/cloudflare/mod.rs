//! Cloudflare Stream adapter for admin video uploads.

mod dto;
mod http_uploader;

pub use http_uploader::{CloudflareCredentials, CloudflareStreamUploader};
