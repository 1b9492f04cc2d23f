//! Tests for the access policy engine.

use rstest::{fixture, rstest};

use super::*;
use crate::domain::catalog::fixtures::{CatalogShape, catalog, cents, default_catalog, series_id};
use crate::domain::ErrorCode;

#[fixture]
fn full_catalog() -> Catalog {
    default_catalog()
}

fn watched_base(count: u32) -> Entitlements {
    (1..=count).fold(Entitlements::default(), |acc, id| {
        acc.with_watched(EpisodeId::new(id))
    })
}

#[rstest]
#[case(1, false)]
#[case(4, false)]
#[case(5, true)]
#[case(73, true)]
fn base_series_locks_past_free_prefix(
    full_catalog: Catalog,
    #[case] id: u32,
    #[case] expected: bool,
) {
    let policy = AccessPolicy::new(&full_catalog);
    let locked = policy
        .is_locked(&Entitlements::default(), EpisodeId::new(id))
        .expect("known episode");
    assert_eq!(locked, expected);
}

#[rstest]
fn purchase_unlocks_only_that_episode(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let entitlements = policy
        .record_purchase(&Entitlements::default(), EpisodeId::new(10))
        .expect("known episode");

    assert!(!policy.is_locked(&entitlements, EpisodeId::new(10)).expect("known"));
    assert!(policy.is_locked(&entitlements, EpisodeId::new(11)).expect("known"));
}

#[rstest]
fn locked_episode_requires_watch_price(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let access = policy
        .check_watch_access(&Entitlements::default(), EpisodeId::new(5))
        .expect("known episode");
    assert_eq!(access, WatchAccess::RequiresPurchase { price: cents(10) });
}

#[rstest]
fn sequel_episode_uses_sequel_prices() {
    let shape = CatalogShape {
        sequel_free: 1,
        ..CatalogShape::default()
    };
    let catalog = catalog(shape);
    let policy = AccessPolicy::new(&catalog);
    let access = policy
        .check_watch_access(&Entitlements::default(), EpisodeId::new(75))
        .expect("known episode");
    assert_eq!(access, WatchAccess::RequiresPurchase { price: cents(20) });

    let download = policy
        .check_download_access(&Entitlements::default(), EpisodeId::new(75))
        .expect("known episode");
    assert_eq!(download, DownloadAccess::RequiresPurchase { price: cents(60) });
}

#[rstest]
#[case(1)]
#[case(9)]
fn downloads_always_require_payment(full_catalog: Catalog, #[case] id: u32) {
    let policy = AccessPolicy::new(&full_catalog);
    let owned = Entitlements::default().with_purchased(EpisodeId::new(id));
    let download = policy
        .check_download_access(&owned, EpisodeId::new(id))
        .expect("known episode");
    assert_eq!(download, DownloadAccess::RequiresPurchase { price: cents(50) });
}

#[rstest]
fn entitlement_reports_all_three_states(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let owned = Entitlements::default().with_purchased(EpisodeId::new(6));

    assert_eq!(
        policy.entitlement(&owned, EpisodeId::new(2)).expect("known"),
        EntitlementDecision::Free
    );
    assert_eq!(
        policy.entitlement(&owned, EpisodeId::new(6)).expect("known"),
        EntitlementDecision::UnlockedByPurchase
    );
    assert_eq!(
        policy.entitlement(&owned, EpisodeId::new(7)).expect("known"),
        EntitlementDecision::LockedPayable { price: cents(10) }
    );
}

#[rstest]
fn unknown_episode_is_not_found(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let err = policy
        .record_watched(&Entitlements::default(), EpisodeId::new(999))
        .expect_err("unknown episode");
    assert_eq!(err, CatalogLookupError::EpisodeNotFound(EpisodeId::new(999)));
    assert_eq!(Error::from(err).code(), ErrorCode::NotFound);
}

#[rstest]
fn sequel_stays_locked_one_episode_short(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let entitlements = watched_base(72);

    let progress = policy.sequel_progress(&entitlements).expect("catalog has a sequel");
    assert_eq!(progress.watched, 72);
    assert_eq!(progress.required, 73);
    assert!(policy.is_sequel_locked(&entitlements));

    let entitlements = policy
        .record_watched(&entitlements, EpisodeId::new(73))
        .expect("known episode");
    assert!(!policy.is_sequel_locked(&entitlements));
}

#[rstest]
fn watching_sequel_episodes_does_not_count_towards_unlock(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let entitlements = (74..=83).fold(watched_base(70), |acc, id| {
        acc.with_watched(EpisodeId::new(id))
    });
    let progress = policy.sequel_progress(&entitlements).expect("sequel");
    assert_eq!(progress.watched, 70);
    assert!(progress.is_locked());
}

#[rstest]
fn payment_unlocks_sequel(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let entitlements = policy.unlock_sequel_by_payment(&Entitlements::default());
    assert!(!policy.is_sequel_locked(&entitlements));
    let progress = policy.sequel_progress(&entitlements).expect("sequel");
    assert!(progress.unlocked_by_payment);
    assert_eq!(progress.watched, 0);
}

#[rstest]
fn smaller_base_series_lowers_the_threshold() {
    let shape = CatalogShape {
        base_episodes: 5,
        ..CatalogShape::default()
    };
    let catalog = catalog(shape);
    let policy = AccessPolicy::new(&catalog);
    assert!(!policy.is_sequel_locked(&watched_base(5)));
    assert!(policy.is_sequel_locked(&watched_base(4)));
}

#[rstest]
fn recording_is_idempotent(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let once = policy
        .record_watched(&Entitlements::default(), EpisodeId::new(3))
        .expect("known");
    let twice = policy.record_watched(&once, EpisodeId::new(3)).expect("known");
    assert_eq!(once, twice);
}

#[rstest]
fn series_view_groups_by_season(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let entitlements = Entitlements::default().with_watched(EpisodeId::new(1));
    let view = policy
        .series_access(&entitlements, &series_id("got"))
        .expect("base series is open");

    let sizes: Vec<usize> = view.seasons.iter().map(|s| s.episodes.len()).collect();
    assert_eq!(sizes, vec![10, 10, 10, 10, 10, 10, 10, 3]);
    let first = view
        .seasons
        .first()
        .and_then(|season| season.episodes.first())
        .expect("first episode");
    assert!(first.watched);
    assert_eq!(first.decision, EntitlementDecision::Free);
}

#[rstest]
fn locked_sequel_view_is_forbidden(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let err = policy
        .series_access(&Entitlements::default(), &series_id("hod"))
        .expect_err("sequel locked");
    assert_eq!(
        err,
        AccessPolicyError::SequelLocked {
            series: series_id("hod")
        }
    );
    assert_eq!(Error::from(err).code(), ErrorCode::Forbidden);
}

#[rstest]
fn open_sequel_view_lists_sequel_episodes(full_catalog: Catalog) {
    let policy = AccessPolicy::new(&full_catalog);
    let view = policy
        .series_access(&watched_base(73), &series_id("hod"))
        .expect("sequel open");
    let total: usize = view.seasons.iter().map(|s| s.episodes.len()).sum();
    assert_eq!(total, 10);
}

#[rstest]
fn decision_serialises_with_status_tag() {
    let value = serde_json::to_value(EntitlementDecision::LockedPayable { price: cents(10) })
        .expect("serialise");
    assert_eq!(value, serde_json::json!({ "status": "lockedPayable", "price": "0.10" }));
}
