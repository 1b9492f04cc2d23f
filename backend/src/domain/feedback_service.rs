//! Feedback submission.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::info;

use crate::domain::account_service::require_user;
use crate::domain::ports::{FeedbackCommand, FeedbackSink, UserRepository};
use crate::domain::{Error, Feedback, FeedbackComment, NewFeedback, UserId};

/// Attributes comments to the submitting user and hands them to the sink.
#[derive(Clone)]
pub struct FeedbackService<R: ?Sized> {
    users: Arc<R>,
    sink: Arc<dyn FeedbackSink>,
    clock: Arc<dyn Clock>,
}

impl<R: ?Sized> FeedbackService<R> {
    pub fn new(users: Arc<R>, sink: Arc<dyn FeedbackSink>, clock: Arc<dyn Clock>) -> Self {
        Self { users, sink, clock }
    }
}

#[async_trait]
impl<R> FeedbackCommand for FeedbackService<R>
where
    R: UserRepository + ?Sized,
{
    async fn submit(&self, user: &UserId, comment: FeedbackComment) -> Result<Feedback, Error> {
        let record = require_user(self.users.as_ref(), user).await?;
        let feedback = self
            .sink
            .append(NewFeedback {
                user_id: record.id().clone(),
                user_name: record.display_name().to_owned(),
                user_email: record.email().clone(),
                comment,
                submitted_at: self.clock.utc(),
            })
            .await?;
        info!(user_id = %user, feedback_id = %feedback.id, "feedback received");
        Ok(feedback)
    }
}
