//! Indexed user collection shared by the store adapters.

use std::collections::HashMap;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{Email, User, UserId, UserPatch};

/// Users keyed by id with a unique email index.
#[derive(Debug, Clone, Default)]
pub(crate) struct UserTable {
    users: HashMap<UserId, User>,
    by_email: HashMap<Email, UserId>,
}

impl UserTable {
    /// Build a table, rejecting duplicate ids or emails.
    pub(crate) fn from_users(users: Vec<User>) -> Result<Self, UserPersistenceError> {
        let mut table = Self::default();
        for user in users {
            if table.users.contains_key(user.id()) {
                return Err(UserPersistenceError::query(format!(
                    "duplicate user id {} in store",
                    user.id()
                )));
            }
            table.insert(user).map_err(|err| {
                UserPersistenceError::query(format!("inconsistent store: {err}"))
            })?;
        }
        Ok(table)
    }

    pub(crate) fn find_by_email(&self, email: &Email) -> Option<&User> {
        self.by_email.get(email).and_then(|id| self.users.get(id))
    }

    pub(crate) fn find_by_id(&self, id: &UserId) -> Option<&User> {
        self.users.get(id)
    }

    pub(crate) fn insert(&mut self, user: User) -> Result<(), UserPersistenceError> {
        if self.by_email.contains_key(user.email()) {
            return Err(UserPersistenceError::duplicate_email(user.email().to_string()));
        }
        self.by_email.insert(user.email().clone(), user.id().clone());
        self.users.insert(user.id().clone(), user);
        Ok(())
    }

    pub(crate) fn update(
        &mut self,
        id: &UserId,
        patch: UserPatch,
    ) -> Result<User, UserPersistenceError> {
        let Some(current) = self.users.get(id) else {
            return Err(UserPersistenceError::not_found(id.to_string()));
        };
        if let Some(email) = &patch.email {
            let taken_by_other = self.by_email.get(email).is_some_and(|owner| owner != id);
            if taken_by_other {
                return Err(UserPersistenceError::duplicate_email(email.to_string()));
            }
        }

        let previous_email = current.email().clone();
        let updated = current.clone().apply(patch);
        if *updated.email() != previous_email {
            self.by_email.remove(&previous_email);
            self.by_email.insert(updated.email().clone(), id.clone());
        }
        self.users.insert(id.clone(), updated.clone());
        Ok(updated)
    }

    pub(crate) fn remove(&mut self, id: &UserId) -> Result<User, UserPersistenceError> {
        let user = self
            .users
            .remove(id)
            .ok_or_else(|| UserPersistenceError::not_found(id.to_string()))?;
        self.by_email.remove(user.email());
        Ok(user)
    }

    /// Users ordered by creation time, then id.
    pub(crate) fn list(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        users.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.id().cmp(b.id()))
        });
        users
    }
}
