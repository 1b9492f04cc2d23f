//! Driving port for paid entitlement changes.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::{EntitlementDecision, EpisodeId, Error, UserId};

use super::{PaymentReceipt, SequelStatus};

/// Result of buying watch access to an episode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOutcome {
    pub episode: EpisodeId,
    pub decision: EntitlementDecision,
    /// `None` when nothing had to be paid.
    pub receipt: Option<PaymentReceipt>,
}

/// A paid download. Entitlements are unchanged by downloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadGrant {
    pub episode: EpisodeId,
    pub video_url: String,
    pub receipt: PaymentReceipt,
}

/// Result of unlocking the sequel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequelUnlockOutcome {
    pub status: SequelStatus,
    /// `None` when the sequel was already open.
    pub receipt: Option<PaymentReceipt>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EntitlementCommand: Send + Sync {
    /// Pay the watch price for a locked episode and record the purchase.
    async fn purchase_episode(&self, user: &UserId, episode: EpisodeId)
    -> Result<PurchaseOutcome, Error>;

    /// Pay the download price and return the media location.
    async fn purchase_download(&self, user: &UserId, episode: EpisodeId)
    -> Result<DownloadGrant, Error>;

    /// Pay to open the sequel regardless of watch progress.
    async fn unlock_sequel(&self, user: &UserId) -> Result<SequelUnlockOutcome, Error>;

    /// Cancel the user's in-flight payment. Returns whether one existed.
    async fn cancel_pending_payment(&self, user: &UserId) -> Result<bool, Error>;
}
