//! In-memory store adapters used when no data directory is configured.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::ports::{FeedbackSink, FeedbackSinkError, UserPersistenceError, UserRepository};
use crate::domain::{Email, Feedback, NewFeedback, User, UserId, UserPatch};

use super::user_table::UserTable;

/// Process-local user store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    table: RwLock<UserTable>,
}

impl InMemoryUserRepository {
    /// Seed the store with `users`.
    pub fn with_users(users: Vec<User>) -> Result<Self, UserPersistenceError> {
        Ok(Self {
            table: RwLock::new(UserTable::from_users(users)?),
        })
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.read().await.find_by_email(email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.read().await.find_by_id(id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.table.write().await.insert(user.clone())
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserPersistenceError> {
        self.table.write().await.update(id, patch)
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.table.read().await.list())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.table.write().await.remove(id).map(|_| ())
    }
}

/// Process-local feedback sink.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackSink {
    records: RwLock<Vec<Feedback>>,
}

#[async_trait]
impl FeedbackSink for InMemoryFeedbackSink {
    async fn append(&self, feedback: NewFeedback) -> Result<Feedback, FeedbackSinkError> {
        let stored = Feedback::from_new(feedback);
        self.records.write().await.push(stored.clone());
        Ok(stored)
    }

    async fn list(&self) -> Result<Vec<Feedback>, FeedbackSinkError> {
        Ok(newest_first(self.records.read().await.clone()))
    }
}

/// Order records newest first; ties keep insertion order reversed.
pub(crate) fn newest_first(mut records: Vec<Feedback>) -> Vec<Feedback> {
    records.reverse();
    records.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FeedbackComment, Password};
    use chrono::{Duration, Utc};

    fn user(email: &str) -> User {
        let password = Password::new("winter42").expect("valid password");
        User::register(Email::parse(email).expect("valid email"), &password, Utc::now())
    }

    #[tokio::test]
    async fn create_then_find_by_email_and_id() {
        let repo = InMemoryUserRepository::default();
        let stored = user("arya@gmail.com");
        repo.create(&stored).await.expect("create");

        let by_email = repo
            .find_by_email(stored.email())
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(by_email, stored);
        assert_eq!(repo.find_by_id(stored.id()).await.expect("lookup"), Some(stored));
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected() {
        let repo = InMemoryUserRepository::default();
        repo.create(&user("arya@gmail.com")).await.expect("create");
        let err = repo
            .create(&user("arya@gmail.com"))
            .await
            .expect_err("duplicate");
        assert!(matches!(err, UserPersistenceError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let repo = InMemoryUserRepository::default();
        let stored = user("arya@gmail.com");
        repo.create(&stored).await.expect("create");
        repo.delete(stored.id()).await.expect("delete");
        assert!(repo.list().await.expect("list").is_empty());
        assert!(repo.find_by_email(stored.email()).await.expect("lookup").is_none());
    }

    #[tokio::test]
    async fn feedback_lists_newest_first() {
        let sink = InMemoryFeedbackSink::default();
        let author = user("arya@gmail.com");
        let base = Utc::now();
        for (offset, text) in [(0, "first"), (5, "second"), (2, "third")] {
            sink.append(NewFeedback {
                user_id: author.id().clone(),
                user_name: author.display_name().to_owned(),
                user_email: author.email().clone(),
                comment: FeedbackComment::new(text).expect("comment"),
                submitted_at: base + Duration::seconds(offset),
            })
            .await
            .expect("append");
        }
        let comments: Vec<String> = sink
            .list()
            .await
            .expect("list")
            .into_iter()
            .map(|f| f.comment.into())
            .collect();
        assert_eq!(comments, vec!["second", "third", "first"]);
    }
}
