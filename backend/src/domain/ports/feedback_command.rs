//! Driving port for submitting feedback.

use async_trait::async_trait;

use crate::domain::{Error, Feedback, FeedbackComment, UserId};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedbackCommand: Send + Sync {
    /// Store `comment` attributed to `user`.
    async fn submit(&self, user: &UserId, comment: FeedbackComment) -> Result<Feedback, Error>;
}
