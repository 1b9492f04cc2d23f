//! Streaming catalog backend: accounts, per-episode pricing, sequel
//! unlocking and watch-progress tracking behind an actix-web API.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
