//! Watch-progress tracking.
//!
//! A tracker lives for one playback session and raises the watched event
//! the first time reported progress reaches [`WATCHED_THRESHOLD`] of the
//! episode's duration. Persisting the event is the caller's job.

use serde::{Deserialize, Serialize};

use super::EpisodeId;

/// Fraction of the duration after which an episode counts as watched.
pub const WATCHED_THRESHOLD: f64 = 0.80;

/// One progress report from the playback surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressTick {
    /// Current playback position in seconds.
    pub position_secs: f64,
    /// Total duration in seconds; zero or non-finite while metadata loads.
    pub duration_secs: f64,
}

impl ProgressTick {
    /// Progress ratio, or `None` when the tick cannot be interpreted.
    pub fn ratio(&self) -> Option<f64> {
        if !self.duration_secs.is_finite() || self.duration_secs <= 0.0 {
            return None;
        }
        if !self.position_secs.is_finite() {
            return None;
        }
        Some(self.position_secs / self.duration_secs)
    }
}

/// Raised once per session when the threshold is crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchedEvent {
    pub episode: EpisodeId,
}

/// Session-scoped latch over progress ticks.
///
/// # Examples
/// ```
/// use dragonfire::domain::{EpisodeId, ProgressTick, WatchProgressTracker};
///
/// let mut tracker = WatchProgressTracker::new(EpisodeId::new(3));
/// let tick = ProgressTick { position_secs: 90.0, duration_secs: 100.0 };
/// assert!(tracker.observe(tick).is_some());
/// assert!(tracker.observe(tick).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct WatchProgressTracker {
    episode: EpisodeId,
    latched: bool,
}

impl WatchProgressTracker {
    pub fn new(episode: EpisodeId) -> Self {
        Self {
            episode,
            latched: false,
        }
    }

    pub fn episode(&self) -> EpisodeId {
        self.episode
    }

    /// Whether the watched event has already been raised.
    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Clear the latch so the next crossing raises the event again.
    pub fn reset(&mut self) {
        self.latched = false;
    }

    /// Feed one tick; returns the event on the first crossing only.
    pub fn observe(&mut self, tick: ProgressTick) -> Option<WatchedEvent> {
        if self.latched {
            return None;
        }
        let ratio = tick.ratio()?;
        if ratio < WATCHED_THRESHOLD {
            return None;
        }
        self.latched = true;
        Some(WatchedEvent {
            episode: self.episode,
        })
    }
}
