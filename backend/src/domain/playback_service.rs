//! Playback sessions and the watched-episode latch.
//!
//! A user holds at most one open session per episode; starting the episode
//! again replaces it. Sessions without a start or progress report for
//! [`PLAYBACK_IDLE_TIMEOUT_SECS`] are dropped.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::domain::account_service::require_user;
use crate::domain::ports::{
    CatalogProvider, PlaybackCommand, PlaybackSession, ProgressReport, UserRepository,
};
use crate::domain::{
    AccessPolicy, AccessPolicyError, EpisodeId, Error, ProgressTick, UserId, UserPatch,
    UserWriteLocks, WatchAccess, WatchProgressTracker,
};

/// Seconds a session may go without progress before it is dropped.
pub const PLAYBACK_IDLE_TIMEOUT_SECS: i64 = 30 * 60;

struct ActiveSession {
    user: UserId,
    tracker: WatchProgressTracker,
    last_seen: DateTime<Utc>,
}

impl ActiveSession {
    fn is_idle(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.last_seen) >= TimeDelta::seconds(PLAYBACK_IDLE_TIMEOUT_SECS)
    }
}

fn session_not_found(session: Uuid) -> Error {
    Error::not_found(format!("playback session {session} not found"))
}

/// Playback service implementing [`PlaybackCommand`].
pub struct PlaybackService<R: ?Sized> {
    users: Arc<R>,
    catalog: Arc<dyn CatalogProvider>,
    locks: Arc<UserWriteLocks>,
    clock: Arc<dyn Clock>,
    sessions: Mutex<HashMap<Uuid, ActiveSession>>,
}

impl<R: ?Sized> PlaybackService<R> {
    pub fn new(
        users: Arc<R>,
        catalog: Arc<dyn CatalogProvider>,
        locks: Arc<UserWriteLocks>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            catalog,
            locks,
            clock,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Register a session for `user` on `episode`, dropping idle sessions
    /// and the user's previous session on the same episode.
    fn open(&self, user: &UserId, episode: EpisodeId) -> Uuid {
        let now = self.clock.utc();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, active| {
            !active.is_idle(now) && !(&active.user == user && active.tracker.episode() == episode)
        });
        let dropped = before - sessions.len();
        if dropped > 0 {
            debug!(user_id = %user, dropped, "playback sessions closed");
        }
        let session_id = Uuid::new_v4();
        sessions.insert(
            session_id,
            ActiveSession {
                user: user.clone(),
                tracker: WatchProgressTracker::new(episode),
                last_seen: now,
            },
        );
        session_id
    }

    /// Number of open sessions.
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Feed `tick` to the session's tracker, returning the episode, whether
    /// this tick crossed the threshold, and whether it is latched.
    fn observe(
        &self,
        user: &UserId,
        session: Uuid,
        tick: ProgressTick,
    ) -> Result<(EpisodeId, bool, bool), Error> {
        let now = self.clock.utc();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if sessions.get(&session).is_some_and(|active| active.is_idle(now)) {
            sessions.remove(&session);
            debug!(user_id = %user, session_id = %session, "idle playback session expired");
        }
        let active = sessions
            .get_mut(&session)
            .filter(|active| &active.user == user)
            .ok_or_else(|| session_not_found(session))?;
        active.last_seen = now;
        let crossed = active.tracker.observe(tick).is_some();
        Ok((
            active.tracker.episode(),
            crossed,
            active.tracker.is_latched(),
        ))
    }

    /// Undo the latch after the watched episode could not be saved, so the
    /// next tick past the threshold raises the event again.
    fn rearm(&self, session: Uuid) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(active) = sessions.get_mut(&session) {
            active.tracker.reset();
        }
    }
}

impl<R> PlaybackService<R>
where
    R: UserRepository + ?Sized,
{
    /// Merge `episode` into the watched set. Returns whether it was new and
    /// the sequel lock state afterwards.
    async fn record_watched(&self, user: &UserId, episode: EpisodeId) -> Result<(bool, bool), Error> {
        let _guard = self.locks.acquire(user).await;
        let record = require_user(self.users.as_ref(), user).await?;
        let catalog = self.catalog.catalog();
        let policy = AccessPolicy::new(&catalog);
        if record.entitlements().has_watched(episode) {
            return Ok((false, policy.is_sequel_locked(record.entitlements())));
        }
        let entitlements = policy.record_watched(record.entitlements(), episode)?;
        let updated = self
            .users
            .update(user, UserPatch::entitlements(entitlements))
            .await?;
        info!(user_id = %user, episode_id = %episode, "episode marked watched");
        Ok((true, policy.is_sequel_locked(updated.entitlements())))
    }
}

#[async_trait]
impl<R> PlaybackCommand for PlaybackService<R>
where
    R: UserRepository + ?Sized,
{
    async fn start_playback(
        &self,
        user: &UserId,
        episode: EpisodeId,
    ) -> Result<PlaybackSession, Error> {
        let record = require_user(self.users.as_ref(), user).await?;
        let catalog = self.catalog.catalog();
        let policy = AccessPolicy::new(&catalog);
        let location = catalog.locate(episode)?;
        if !policy.is_series_open(record.entitlements(), location.series) {
            return Err(AccessPolicyError::SequelLocked {
                series: location.series.id().clone(),
            }
            .into());
        }
        if let WatchAccess::RequiresPurchase { price } =
            policy.check_watch_access(record.entitlements(), episode)?
        {
            return Err(
                Error::forbidden(format!("episode {episode} must be purchased first"))
                    .with_details(json!({
                        "code": "purchase_required",
                        "episodeId": episode,
                        "price": price.to_string(),
                    })),
            );
        }

        let session_id = self.open(user, episode);
        debug!(user_id = %user, episode_id = %episode, %session_id, "playback started");
        Ok(PlaybackSession {
            session_id,
            episode,
            video_url: location.episode.video_url.clone(),
        })
    }

    async fn report_progress(
        &self,
        user: &UserId,
        session: Uuid,
        tick: ProgressTick,
    ) -> Result<ProgressReport, Error> {
        let (episode, crossed, latched) = self.observe(user, session, tick)?;
        let (newly_recorded, sequel_locked) = if crossed {
            match self.record_watched(user, episode).await {
                Ok(recorded) => recorded,
                Err(error) => {
                    warn!(
                        user_id = %user,
                        episode_id = %episode,
                        %error,
                        "watched episode not saved; latch re-armed"
                    );
                    self.rearm(session);
                    return Err(error);
                }
            }
        } else {
            let record = require_user(self.users.as_ref(), user).await?;
            let catalog = self.catalog.catalog();
            let locked = AccessPolicy::new(&catalog).is_sequel_locked(record.entitlements());
            (false, locked)
        };
        Ok(ProgressReport {
            episode,
            watched: latched,
            newly_recorded,
            sequel_locked,
        })
    }

    async fn finish_playback(&self, user: &UserId, session: Uuid) -> Result<(), Error> {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        match sessions.get(&session) {
            Some(active) if &active.user == user => {
                sessions.remove(&session);
                debug!(user_id = %user, session_id = %session, "playback finished");
                Ok(())
            }
            _ => Err(session_not_found(session)),
        }
    }
}

#[cfg(test)]
mod tests;
