//! Admin panel operations: user management, feedback review, and video
//! upload tickets.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::ports::{
    AdminCommand, AdminUserUpdate, DirectUploadTicket, FeedbackSink, UserRepository, VideoUploadService,
};
use crate::domain::{
    Email, Error, Feedback, LoginCredentials, PasswordDigest, User, UserId, UserPatch,
};

const INVALID_ADMIN_CREDENTIALS: &str = "invalid admin credentials";

/// Configured admin identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminCredentials {
    pub email: Email,
    pub password_digest: PasswordDigest,
}

/// Admin service implementing [`AdminCommand`].
#[derive(Clone)]
pub struct AdminService<R: ?Sized> {
    users: Arc<R>,
    feedback: Arc<dyn FeedbackSink>,
    uploads: Arc<dyn VideoUploadService>,
    credentials: Option<AdminCredentials>,
}

impl<R: ?Sized> AdminService<R> {
    /// Without `credentials` every admin login is refused.
    pub fn new(
        users: Arc<R>,
        feedback: Arc<dyn FeedbackSink>,
        uploads: Arc<dyn VideoUploadService>,
        credentials: Option<AdminCredentials>,
    ) -> Self {
        Self {
            users,
            feedback,
            uploads,
            credentials,
        }
    }
}

#[async_trait]
impl<R> AdminCommand for AdminService<R>
where
    R: UserRepository + ?Sized,
{
    async fn login(&self, credentials: &LoginCredentials) -> Result<Email, Error> {
        let Some(admin) = &self.credentials else {
            warn!("admin login attempted but no admin account is configured");
            return Err(Error::unauthorized(INVALID_ADMIN_CREDENTIALS));
        };
        if credentials.email() != admin.email.as_ref()
            || !credentials.matches(&admin.password_digest)
        {
            return Err(Error::unauthorized(INVALID_ADMIN_CREDENTIALS));
        }
        info!(admin = %admin.email, "admin logged in");
        Ok(admin.email.clone())
    }

    async fn list_users(&self) -> Result<Vec<User>, Error> {
        Ok(self.users.list().await?)
    }

    async fn update_user(&self, id: &UserId, update: AdminUserUpdate) -> Result<User, Error> {
        let patch = UserPatch {
            email: Some(update.email),
            profile: Some(update.profile),
            password_digest: update.new_password.map(|password| password.digest()),
            entitlements: None,
        };
        let user = self.users.update(id, patch).await?;
        info!(user_id = %id, "user updated by admin");
        Ok(user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), Error> {
        self.users.delete(id).await?;
        info!(user_id = %id, "user deleted by admin");
        Ok(())
    }

    async fn list_feedback(&self) -> Result<Vec<Feedback>, Error> {
        Ok(self.feedback.list().await?)
    }

    async fn create_upload_ticket(&self) -> Result<DirectUploadTicket, Error> {
        let ticket = self.uploads.create_direct_upload().await?;
        info!(stream_id = %ticket.stream_id, "direct upload ticket issued");
        Ok(ticket)
    }
}
