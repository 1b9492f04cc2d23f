//! Versioned on-disk user records.
//!
//! Records carry a `schemaVersion`. Version 1 is the shape written by the
//! first browser-only release: optional profile fields, no purchase list,
//! and sometimes a bare `watchedGoTEpisodes` counter instead of a watched
//! list. [`upgrade`] turns any supported version into a current
//! [`UserRecord`] once, at load time.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::domain::{
    Catalog, Email, Entitlements, EpisodeId, PasswordDigest, Profile, User, UserDraft, UserId,
};

/// Schema version written by this release.
pub const CURRENT_SCHEMA_VERSION: u64 = 2;

/// Failures while reading a stored record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserRecordError {
    /// Written by a newer release.
    #[error("unsupported user record schema version {found}")]
    UnsupportedVersion { found: u64 },
    /// Not a JSON object of the expected shape.
    #[error("malformed user record: {message}")]
    Malformed { message: String },
    /// A field failed domain validation.
    #[error("invalid user record field {field}: {message}")]
    InvalidField { field: &'static str, message: String },
}

/// Current (v2) record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub schema_version: u64,
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub country: String,
    pub city: String,
    pub phone_number: String,
    pub watched_episodes: BTreeSet<u32>,
    pub purchased_episodes: BTreeSet<u32>,
    #[serde(rename = "unlockedHoD")]
    pub unlocked_hod: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyUserRecord {
    #[serde(default)]
    id: Option<String>,
    email: String,
    password_hash: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    phone_number: Option<String>,
    #[serde(default)]
    watched_episodes: Option<Vec<u32>>,
    #[serde(default, rename = "watchedGoTEpisodes")]
    watched_base_count: Option<u32>,
    #[serde(default)]
    purchased_episodes: Option<Vec<u32>>,
    #[serde(default, rename = "unlockedHoD")]
    unlocked_hod: Option<bool>,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Inputs the upgrade needs besides the record itself.
#[derive(Debug, Clone, Copy)]
pub struct UpgradeContext<'a> {
    pub catalog: &'a Catalog,
    /// Creation time for legacy records that carry none.
    pub now: DateTime<Utc>,
}

/// Upgrade a stored record to the current version.
///
/// Missing sets become empty, missing profile strings become empty, a
/// legacy counter `n` becomes the first `n` base-series episodes, and ids
/// unknown to the catalog are dropped.
pub fn upgrade(raw: Value, ctx: UpgradeContext<'_>) -> Result<UserRecord, UserRecordError> {
    let version = match raw.get("schemaVersion") {
        None => 1,
        Some(value) => value.as_u64().ok_or_else(|| UserRecordError::Malformed {
            message: "schemaVersion must be an unsigned integer".to_owned(),
        })?,
    };

    let record = match version {
        1 => {
            let legacy: LegacyUserRecord =
                serde_json::from_value(raw).map_err(|err| UserRecordError::Malformed {
                    message: err.to_string(),
                })?;
            from_legacy(legacy, ctx)
        }
        CURRENT_SCHEMA_VERSION => {
            serde_json::from_value(raw).map_err(|err| UserRecordError::Malformed {
                message: err.to_string(),
            })?
        }
        found => return Err(UserRecordError::UnsupportedVersion { found }),
    };

    Ok(drop_unknown_episodes(record, ctx.catalog))
}

fn from_legacy(legacy: LegacyUserRecord, ctx: UpgradeContext<'_>) -> UserRecord {
    let mut watched: BTreeSet<u32> = legacy.watched_episodes.unwrap_or_default().into_iter().collect();
    if let Some(count) = legacy.watched_base_count {
        let count = usize::try_from(count).unwrap_or(usize::MAX);
        watched.extend(
            ctx.catalog
                .base_series()
                .episodes()
                .iter()
                .take(count)
                .map(|episode| episode.id.get()),
        );
    }

    // Legacy ids were millisecond timestamps; keep them as the creation time.
    let legacy_created = legacy
        .id
        .as_deref()
        .and_then(|id| id.parse::<i64>().ok())
        .and_then(DateTime::from_timestamp_millis);
    let id = match legacy.id.filter(|id| UserId::new(id).is_ok()) {
        Some(id) => id,
        None => {
            let fresh = UserId::random();
            info!(email = %legacy.email, user_id = %fresh, "assigned id to legacy user record");
            fresh.to_string()
        }
    };

    UserRecord {
        schema_version: CURRENT_SCHEMA_VERSION,
        id,
        email: legacy.email,
        password_hash: legacy.password_hash,
        name: legacy.name.unwrap_or_default(),
        country: legacy.country.unwrap_or_default(),
        city: legacy.city.unwrap_or_default(),
        phone_number: legacy.phone_number.unwrap_or_default(),
        watched_episodes: watched,
        purchased_episodes: legacy.purchased_episodes.unwrap_or_default().into_iter().collect(),
        unlocked_hod: legacy.unlocked_hod.unwrap_or(false),
        created_at: legacy.created_at.or(legacy_created).unwrap_or(ctx.now),
    }
}

fn drop_unknown_episodes(mut record: UserRecord, catalog: &Catalog) -> UserRecord {
    let known = |list: &'static str, record_id: &str, id: u32| {
        let keep = catalog.contains_episode(EpisodeId::new(id));
        if !keep {
            warn!(user_id = %record_id, episode_id = id, list, "dropping unknown episode id");
        }
        keep
    };
    let record_id = record.id.clone();
    record
        .watched_episodes
        .retain(|id| known("watchedEpisodes", &record_id, *id));
    record
        .purchased_episodes
        .retain(|id| known("purchasedEpisodes", &record_id, *id));
    record
}

impl UserRecord {
    /// Snapshot a domain user.
    pub fn from_user(user: &User) -> Self {
        let profile = user.profile();
        let entitlements = user.entitlements();
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            id: user.id().to_string(),
            email: user.email().to_string(),
            password_hash: user.password_digest().as_ref().to_owned(),
            name: profile.name.clone(),
            country: profile.country.clone(),
            city: profile.city.clone(),
            phone_number: profile.phone_number.clone(),
            watched_episodes: entitlements.watched().iter().map(|id| id.get()).collect(),
            purchased_episodes: entitlements.purchased().iter().map(|id| id.get()).collect(),
            unlocked_hod: entitlements.sequel_unlocked(),
            created_at: user.created_at(),
        }
    }

    /// Validate and convert into a domain user.
    pub fn into_user(self) -> Result<User, UserRecordError> {
        let invalid = |field: &'static str| {
            move |err: crate::domain::UserValidationError| UserRecordError::InvalidField {
                field,
                message: err.to_string(),
            }
        };
        Ok(User::new(UserDraft {
            id: UserId::new(&self.id).map_err(invalid("id"))?,
            email: Email::parse(&self.email).map_err(invalid("email"))?,
            password_digest: PasswordDigest::parse(&self.password_hash)
                .map_err(invalid("passwordHash"))?,
            profile: Profile {
                name: self.name,
                country: self.country,
                city: self.city,
                phone_number: self.phone_number,
            },
            entitlements: Entitlements::new(
                self.watched_episodes.into_iter().map(EpisodeId::new).collect(),
                self.purchased_episodes.into_iter().map(EpisodeId::new).collect(),
                self.unlocked_hod,
            ),
            created_at: self.created_at,
        }))
    }
}
