//! Paid entitlement changes: episode purchases, downloads, and the sequel
//! unlock.
//!
//! Every operation holds the user's write lock across payment and persist,
//! so a second request for the same user waits until the first one has
//! either committed or been cancelled. Entitlements change only after the
//! gateway returns a receipt.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rust_decimal::Decimal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::domain::account_service::require_user;
use crate::domain::catalog_service::{no_sequel, sequel_status};
use crate::domain::ports::{
    CatalogProvider, DownloadGrant, EntitlementCommand, PaymentGateway, PaymentReceipt,
    PaymentRequest, PurchaseOutcome, SequelUnlockOutcome, UserRepository,
};
use crate::domain::{
    AccessPolicy, AccessPolicyError, Catalog, EpisodeId, EpisodeLocation, Error, User, UserId,
    UserPatch, UserWriteLocks, WatchAccess,
};

/// In-flight payments, one cancellation token per user.
#[derive(Debug, Default)]
pub struct PendingPayments {
    tokens: Mutex<HashMap<UserId, CancellationToken>>,
}

impl PendingPayments {
    /// Track a new payment for `user`.
    pub fn begin(&self, user: &UserId) -> CancellationToken {
        let token = CancellationToken::new();
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.insert(user.clone(), token.clone());
        token
    }

    /// Stop tracking `user`'s payment once the gateway has answered.
    pub fn finish(&self, user: &UserId) {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.remove(user);
    }

    /// Cancel `user`'s in-flight payment. Returns whether one existed.
    pub fn cancel(&self, user: &UserId) -> bool {
        let mut tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        match tokens.remove(user) {
            Some(token) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    /// Whether `user` has a payment awaiting confirmation.
    pub fn is_pending(&self, user: &UserId) -> bool {
        let tokens = self.tokens.lock().unwrap_or_else(PoisonError::into_inner);
        tokens.contains_key(user)
    }
}

/// Entitlement service implementing [`EntitlementCommand`].
#[derive(Clone)]
pub struct EntitlementService<R: ?Sized> {
    users: Arc<R>,
    catalog: Arc<dyn CatalogProvider>,
    payments: Arc<dyn PaymentGateway>,
    locks: Arc<UserWriteLocks>,
    pending: Arc<PendingPayments>,
}

impl<R: ?Sized> EntitlementService<R> {
    pub fn new(
        users: Arc<R>,
        catalog: Arc<dyn CatalogProvider>,
        payments: Arc<dyn PaymentGateway>,
        locks: Arc<UserWriteLocks>,
    ) -> Self {
        Self {
            users,
            catalog,
            payments,
            locks,
            pending: Arc::new(PendingPayments::default()),
        }
    }

    /// Registry of in-flight payments.
    pub fn pending(&self) -> &PendingPayments {
        &self.pending
    }
}

fn ensure_series_open(
    catalog: &Catalog,
    user: &User,
    location: &EpisodeLocation<'_>,
) -> Result<(), Error> {
    if AccessPolicy::new(catalog).is_series_open(user.entitlements(), location.series) {
        Ok(())
    } else {
        Err(AccessPolicyError::SequelLocked {
            series: location.series.id().clone(),
        }
        .into())
    }
}

fn episode_label(location: &EpisodeLocation<'_>) -> String {
    format!("{}: {}", location.series.title(), location.episode.title)
}

impl<R> EntitlementService<R>
where
    R: UserRepository + ?Sized,
{
    async fn pay(
        &self,
        user: &UserId,
        amount: Decimal,
        label: String,
    ) -> Result<PaymentReceipt, Error> {
        let request = PaymentRequest {
            user_id: user.clone(),
            amount,
            label,
        };
        let token = self.pending.begin(user);
        let outcome = self.payments.request_payment(&request, token).await;
        self.pending.finish(user);
        match &outcome {
            Ok(receipt) => info!(
                user_id = %user,
                amount = %receipt.amount,
                reference = %receipt.reference,
                "payment confirmed"
            ),
            Err(err) => warn!(user_id = %user, amount = %amount, error = %err, "payment not completed"),
        }
        Ok(outcome?)
    }
}

#[async_trait]
impl<R> EntitlementCommand for EntitlementService<R>
where
    R: UserRepository + ?Sized,
{
    async fn purchase_episode(
        &self,
        user: &UserId,
        episode: EpisodeId,
    ) -> Result<PurchaseOutcome, Error> {
        let _guard = self.locks.acquire(user).await;
        let record = require_user(self.users.as_ref(), user).await?;
        let catalog = self.catalog.catalog();
        let policy = AccessPolicy::new(&catalog);
        let location = catalog.locate(episode)?;
        ensure_series_open(&catalog, &record, &location)?;

        let WatchAccess::RequiresPurchase { price } =
            policy.check_watch_access(record.entitlements(), episode)?
        else {
            return Ok(PurchaseOutcome {
                episode,
                decision: policy.entitlement(record.entitlements(), episode)?,
                receipt: None,
            });
        };

        let receipt = self.pay(user, price, episode_label(&location)).await?;
        let entitlements = policy.record_purchase(record.entitlements(), episode)?;
        let updated = self
            .users
            .update(user, UserPatch::entitlements(entitlements))
            .await?;
        info!(user_id = %user, episode_id = %episode, amount = %price, "episode purchased");
        Ok(PurchaseOutcome {
            episode,
            decision: policy.entitlement(updated.entitlements(), episode)?,
            receipt: Some(receipt),
        })
    }

    async fn purchase_download(
        &self,
        user: &UserId,
        episode: EpisodeId,
    ) -> Result<DownloadGrant, Error> {
        let _guard = self.locks.acquire(user).await;
        let record = require_user(self.users.as_ref(), user).await?;
        let catalog = self.catalog.catalog();
        let location = catalog.locate(episode)?;
        ensure_series_open(&catalog, &record, &location)?;

        let price = location.series.pricing().download_price();
        let label = format!("Download {}", episode_label(&location));
        let receipt = self.pay(user, price, label).await?;
        info!(user_id = %user, episode_id = %episode, amount = %price, "download granted");
        Ok(DownloadGrant {
            episode,
            video_url: location.episode.video_url.clone(),
            receipt,
        })
    }

    async fn unlock_sequel(&self, user: &UserId) -> Result<SequelUnlockOutcome, Error> {
        let _guard = self.locks.acquire(user).await;
        let record = require_user(self.users.as_ref(), user).await?;
        let catalog = self.catalog.catalog();
        let status = sequel_status(&catalog, record.entitlements()).ok_or_else(no_sequel)?;
        if !status.locked {
            return Ok(SequelUnlockOutcome {
                status,
                receipt: None,
            });
        }

        let label = catalog
            .sequel_series()
            .map(|series| format!("Unlock {}", series.title()))
            .ok_or_else(no_sequel)?;
        let receipt = self.pay(user, status.unlock_price, label).await?;
        let entitlements = AccessPolicy::new(&catalog).unlock_sequel_by_payment(record.entitlements());
        let updated = self
            .users
            .update(user, UserPatch::entitlements(entitlements))
            .await?;
        info!(
            user_id = %user,
            series_id = %status.sequel,
            amount = %status.unlock_price,
            "sequel unlocked by payment"
        );
        Ok(SequelUnlockOutcome {
            status: sequel_status(&catalog, updated.entitlements()).ok_or_else(no_sequel)?,
            receipt: Some(receipt),
        })
    }

    async fn cancel_pending_payment(&self, user: &UserId) -> Result<bool, Error> {
        let cancelled = self.pending.cancel(user);
        if cancelled {
            info!(user_id = %user, "pending payment cancelled");
        }
        Ok(cancelled)
    }
}
