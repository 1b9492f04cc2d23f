//! File and memory backed persistence adapters.
//!
//! # Architecture
//!
//! - **Thin adapters**: stores only translate between on-disk records and
//!   domain types. No business logic resides here.
//! - **Versioned records**: user records carry a schema version and are
//!   upgraded once when a store is opened (`user_record`).
//! - **Atomic writes**: JSON documents are replaced through a temporary
//!   file and rename (`json_file`), so a crash never leaves a torn file.
//! - **Strongly typed errors**: I/O and decode failures map to the port
//!   error enums.

mod in_memory;
mod json_file;
mod json_file_feedback_sink;
mod json_file_user_repository;
pub mod user_record;
mod user_table;

pub use in_memory::{InMemoryFeedbackSink, InMemoryUserRepository};
pub use json_file::{JsonFile, JsonFileError};
pub use json_file_feedback_sink::{FEEDBACK_FILE, JsonFileFeedbackSink};
pub use json_file_user_repository::{JsonFileUserRepository, USERS_FILE};
