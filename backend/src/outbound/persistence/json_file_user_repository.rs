//! User store persisted as one JSON document in the data directory.

use async_trait::async_trait;
use camino::Utf8Path;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::info;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{Catalog, Email, User, UserId, UserPatch};

use super::json_file::{JsonFile, JsonFileError};
use super::user_record::{CURRENT_SCHEMA_VERSION, UpgradeContext, UserRecord, upgrade};
use super::user_table::UserTable;

/// File name of the user document.
pub const USERS_FILE: &str = "users.json";

impl From<JsonFileError> for UserPersistenceError {
    fn from(err: JsonFileError) -> Self {
        UserPersistenceError::connection(err.to_string())
    }
}

/// JSON-file user store.
///
/// The document is a JSON array of versioned records. The legacy shape, an
/// object keyed by email, is accepted on load. Records are upgraded once at
/// open and the document is rewritten when anything was upgraded.
#[derive(Debug)]
pub struct JsonFileUserRepository {
    file: JsonFile,
    table: Mutex<UserTable>,
}

impl JsonFileUserRepository {
    /// Open or create the store in `data_dir`.
    pub async fn open(
        data_dir: &Utf8Path,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Result<Self, UserPersistenceError> {
        let file = JsonFile::open(data_dir, USERS_FILE)?;
        let Some(contents) = file.read()? else {
            return Ok(Self {
                file,
                table: Mutex::new(UserTable::default()),
            });
        };

        let (users, upgraded) = decode_users(&contents, UpgradeContext { catalog, now })?;
        let table = UserTable::from_users(users)?;
        let repo = Self {
            file,
            table: Mutex::new(UserTable::default()),
        };
        if upgraded > 0 {
            info!(path = %repo.file.path(), upgraded, "upgraded stored user records");
            repo.persist(&table).await?;
        }
        *repo.table.lock().await = table;
        Ok(repo)
    }

    async fn persist(&self, table: &UserTable) -> Result<(), UserPersistenceError> {
        let records: Vec<UserRecord> = table.list().iter().map(UserRecord::from_user).collect();
        let contents = serde_json::to_string_pretty(&records)
            .map_err(|err| UserPersistenceError::query(format!("encode users: {err}")))?;
        self.file.write(contents).await?;
        Ok(())
    }

    /// Apply `change` to a copy of the table and commit it only once the
    /// document is written.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut UserTable) -> Result<T, UserPersistenceError>,
    ) -> Result<T, UserPersistenceError> {
        let mut table = self.table.lock().await;
        let mut draft = table.clone();
        let outcome = change(&mut draft)?;
        self.persist(&draft).await?;
        *table = draft;
        Ok(outcome)
    }
}

fn decode_users(
    contents: &str,
    ctx: UpgradeContext<'_>,
) -> Result<(Vec<User>, usize), UserPersistenceError> {
    let document: Value = serde_json::from_str(contents)
        .map_err(|err| UserPersistenceError::query(format!("decode users: {err}")))?;
    let raw_records: Vec<Value> = match document {
        Value::Array(items) => items,
        Value::Object(by_email) => by_email.into_iter().map(|(_, record)| record).collect(),
        _ => {
            return Err(UserPersistenceError::query(
                "users document must be an array or an object",
            ));
        }
    };

    let mut upgraded = 0;
    let mut users = Vec::with_capacity(raw_records.len());
    for raw in raw_records {
        let is_current = raw
            .get("schemaVersion")
            .and_then(Value::as_u64)
            .is_some_and(|version| version == CURRENT_SCHEMA_VERSION);
        if !is_current {
            upgraded += 1;
        }
        let record =
            upgrade(raw, ctx).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let user = record
            .into_user()
            .map_err(|err| UserPersistenceError::query(err.to_string()))?;
        users.push(user);
    }
    Ok((users, upgraded))
}

#[async_trait]
impl UserRepository for JsonFileUserRepository {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.lock().await.find_by_email(email).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.table.lock().await.find_by_id(id).cloned())
    }

    async fn create(&self, user: &User) -> Result<(), UserPersistenceError> {
        self.mutate(|table| table.insert(user.clone())).await
    }

    async fn update(&self, id: &UserId, patch: UserPatch) -> Result<User, UserPersistenceError> {
        self.mutate(|table| table.update(id, patch)).await
    }

    async fn list(&self) -> Result<Vec<User>, UserPersistenceError> {
        Ok(self.table.lock().await.list())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserPersistenceError> {
        self.mutate(|table| table.remove(id).map(|_| ())).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::fixtures::default_catalog;
    use crate::domain::{Entitlements, EpisodeId, Password};
    use camino::Utf8PathBuf;
    use serde_json::json;

    fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp path");
        (dir, path)
    }

    fn user(email: &str) -> User {
        let password = Password::new("winter42").expect("valid password");
        User::register(Email::parse(email).expect("valid email"), &password, Utc::now())
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let (_guard, path) = temp_dir();
        let catalog = default_catalog();
        let repo = JsonFileUserRepository::open(&path, &catalog, Utc::now())
            .await
            .expect("open");
        let stored = user("arya@gmail.com");
        repo.create(&stored).await.expect("create");
        let entitlements = Entitlements::default().with_purchased(EpisodeId::new(9));
        repo.update(stored.id(), UserPatch::entitlements(entitlements.clone()))
            .await
            .expect("update");
        drop(repo);

        let reopened = JsonFileUserRepository::open(&path, &catalog, Utc::now())
            .await
            .expect("reopen");
        let loaded = reopened
            .find_by_id(stored.id())
            .await
            .expect("lookup")
            .expect("present");
        assert_eq!(loaded.entitlements(), &entitlements);
    }

    #[tokio::test]
    async fn legacy_document_is_upgraded_and_rewritten() {
        let (_guard, path) = temp_dir();
        let legacy = json!({
            "arya@gmail.com": {
                "id": "1700000000000",
                "email": "arya@gmail.com",
                "passwordHash": Password::new("winter42").expect("valid").digest().as_ref(),
                "watchedGoTEpisodes": 2,
                "unlockedHoD": false
            }
        });
        std::fs::write(path.join(USERS_FILE), legacy.to_string()).expect("seed legacy file");

        let catalog = default_catalog();
        let repo = JsonFileUserRepository::open(&path, &catalog, Utc::now())
            .await
            .expect("open legacy");
        let users = repo.list().await.expect("list");
        assert_eq!(users.len(), 1);
        let watched: Vec<u32> = users
            .first()
            .expect("one user")
            .entitlements()
            .watched()
            .iter()
            .map(|id| id.get())
            .collect();
        assert_eq!(watched, vec![1, 2]);

        let rewritten: Value = serde_json::from_str(
            &std::fs::read_to_string(path.join(USERS_FILE)).expect("read back"),
        )
        .expect("json");
        assert_eq!(rewritten[0]["schemaVersion"], json!(CURRENT_SCHEMA_VERSION));
    }

    #[tokio::test]
    async fn future_schema_fails_to_open() {
        let (_guard, path) = temp_dir();
        std::fs::write(
            path.join(USERS_FILE),
            json!([{ "schemaVersion": 9, "email": "a@gmail.com" }]).to_string(),
        )
        .expect("seed file");
        let catalog = default_catalog();
        let err = JsonFileUserRepository::open(&path, &catalog, Utc::now())
            .await
            .expect_err("unsupported version");
        assert!(matches!(err, UserPersistenceError::Query { .. }));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_table_unchanged() {
        let (_guard, path) = temp_dir();
        let catalog = default_catalog();
        let repo = JsonFileUserRepository::open(&path, &catalog, Utc::now())
            .await
            .expect("open");
        repo.create(&user("arya@gmail.com")).await.expect("create");
        repo.create(&user("arya@gmail.com"))
            .await
            .expect_err("duplicate");
        assert_eq!(repo.list().await.expect("list").len(), 1);
    }
}
