//! Driving port for playback sessions and watch progress.

use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{EpisodeId, Error, ProgressTick, UserId};

/// A started playback session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackSession {
    pub session_id: Uuid,
    pub episode: EpisodeId,
    pub video_url: String,
}

/// Outcome of one progress report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub episode: EpisodeId,
    /// The session has crossed the watched threshold.
    pub watched: bool,
    /// This report recorded the episode as watched.
    pub newly_recorded: bool,
    /// Sequel lock state after the report.
    pub sequel_locked: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlaybackCommand: Send + Sync {
    /// Check watch access and open a session.
    async fn start_playback(&self, user: &UserId, episode: EpisodeId)
    -> Result<PlaybackSession, Error>;

    /// Feed a progress tick into the session's tracker.
    async fn report_progress(
        &self,
        user: &UserId,
        session: Uuid,
        tick: ProgressTick,
    ) -> Result<ProgressReport, Error>;

    /// Close the session.
    async fn finish_playback(&self, user: &UserId, session: Uuid) -> Result<(), Error>;
}
