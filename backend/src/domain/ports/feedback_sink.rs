//! Port for the append-only feedback store.

use async_trait::async_trait;

use crate::domain::{Error, Feedback, NewFeedback};

use super::define_port_error;

define_port_error! {
    /// Errors raised by feedback sink adapters.
    pub enum FeedbackSinkError {
        /// Sink connection could not be established.
        Connection { message: String } => "feedback sink connection failed: {message}",
        /// Write or read failed during execution.
        Query { message: String } => "feedback sink query failed: {message}",
    }
}

impl From<FeedbackSinkError> for Error {
    fn from(error: FeedbackSinkError) -> Self {
        match error {
            FeedbackSinkError::Connection { message } => {
                Error::service_unavailable(format!("feedback sink unavailable: {message}"))
            }
            FeedbackSinkError::Query { message } => {
                Error::internal(format!("feedback sink error: {message}"))
            }
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackSink: Send + Sync {
    /// Store a feedback record and return it with its assigned id.
    async fn append(&self, feedback: NewFeedback) -> Result<Feedback, FeedbackSinkError>;

    /// Every stored record, newest first.
    async fn list(&self) -> Result<Vec<Feedback>, FeedbackSinkError>;
}

/// Fixture sink that accepts writes and forgets them.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureFeedbackSink;

#[async_trait]
impl FeedbackSink for FixtureFeedbackSink {
    async fn append(&self, feedback: NewFeedback) -> Result<Feedback, FeedbackSinkError> {
        Ok(Feedback::from_new(feedback))
    }

    async fn list(&self) -> Result<Vec<Feedback>, FeedbackSinkError> {
        Ok(Vec::new())
    }
}
