//! Per-user entitlement state.

use std::collections::BTreeSet;

use super::EpisodeId;

/// What a user has watched, bought, and unlocked.
///
/// Updates return a new value; inserting an id that is already present is
/// a no-op.
///
/// # Examples
/// ```
/// use dragonfire::domain::{Entitlements, EpisodeId};
///
/// let once = Entitlements::default().with_purchased(EpisodeId::new(75));
/// let twice = once.clone().with_purchased(EpisodeId::new(75));
/// assert_eq!(once, twice);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entitlements {
    watched: BTreeSet<EpisodeId>,
    purchased: BTreeSet<EpisodeId>,
    sequel_unlocked: bool,
}

impl Entitlements {
    /// Build entitlements from stored parts.
    pub fn new(
        watched: BTreeSet<EpisodeId>,
        purchased: BTreeSet<EpisodeId>,
        sequel_unlocked: bool,
    ) -> Self {
        Self {
            watched,
            purchased,
            sequel_unlocked,
        }
    }

    /// Episodes counted as watched.
    pub fn watched(&self) -> &BTreeSet<EpisodeId> {
        &self.watched
    }

    /// Episodes bought for playback.
    pub fn purchased(&self) -> &BTreeSet<EpisodeId> {
        &self.purchased
    }

    /// Whether the sequel was unlocked by payment.
    pub fn sequel_unlocked(&self) -> bool {
        self.sequel_unlocked
    }

    pub fn has_watched(&self, episode: EpisodeId) -> bool {
        self.watched.contains(&episode)
    }

    pub fn has_purchased(&self, episode: EpisodeId) -> bool {
        self.purchased.contains(&episode)
    }

    /// Add `episode` to the watched set.
    #[must_use]
    pub fn with_watched(mut self, episode: EpisodeId) -> Self {
        self.watched.insert(episode);
        self
    }

    /// Add `episode` to the purchased set.
    #[must_use]
    pub fn with_purchased(mut self, episode: EpisodeId) -> Self {
        self.purchased.insert(episode);
        self
    }

    /// Set the paid sequel unlock flag.
    #[must_use]
    pub fn with_sequel_unlocked(mut self) -> Self {
        self.sequel_unlocked = true;
        self
    }

    /// Drop ids rejected by `keep` from both sets.
    #[must_use]
    pub fn retain_known(mut self, keep: impl Fn(EpisodeId) -> bool) -> Self {
        self.watched.retain(|id| keep(*id));
        self.purchased.retain(|id| keep(*id));
        self
    }
}
