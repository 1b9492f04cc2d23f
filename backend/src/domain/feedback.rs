//! User feedback records.
//!
//! Feedback is append-only: created once from a [`NewFeedback`] and never
//! mutated afterwards.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use super::{Email, Error, UserId};

/// Longest accepted comment, in characters.
pub const FEEDBACK_MAX_CHARS: usize = 2000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedbackValidationError {
    EmptyComment,
    CommentTooLong { max: usize },
}

impl fmt::Display for FeedbackValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyComment => write!(f, "comment must not be empty"),
            Self::CommentTooLong { max } => {
                write!(f, "comment must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for FeedbackValidationError {}

impl From<FeedbackValidationError> for Error {
    fn from(err: FeedbackValidationError) -> Self {
        let code = match err {
            FeedbackValidationError::EmptyComment => "empty_field",
            FeedbackValidationError::CommentTooLong { .. } => "too_long",
        };
        Error::invalid_request(err.to_string())
            .with_details(json!({ "field": "comment", "code": code }))
    }
}

/// Trimmed, non-empty comment text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FeedbackComment(String);

impl FeedbackComment {
    pub fn new(raw: &str) -> Result<Self, FeedbackValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(FeedbackValidationError::EmptyComment);
        }
        if trimmed.chars().count() > FEEDBACK_MAX_CHARS {
            return Err(FeedbackValidationError::CommentTooLong {
                max: FEEDBACK_MAX_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FeedbackComment {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FeedbackComment> for String {
    fn from(value: FeedbackComment) -> Self {
        value.0
    }
}

impl TryFrom<String> for FeedbackComment {
    type Error = FeedbackValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

/// Feedback awaiting storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: Email,
    pub comment: FeedbackComment,
    pub submitted_at: DateTime<Utc>,
}

/// A stored feedback record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub user_id: UserId,
    pub user_name: String,
    pub user_email: Email,
    pub comment: FeedbackComment,
    pub submitted_at: DateTime<Utc>,
}

impl Feedback {
    /// Assign a fresh id to `new`.
    pub fn from_new(new: NewFeedback) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: new.user_id,
            user_name: new.user_name,
            user_email: new.user_email,
            comment: new.comment,
            submitted_at: new.submitted_at,
        }
    }
}
