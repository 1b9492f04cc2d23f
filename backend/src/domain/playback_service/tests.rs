//! Tests for playback sessions and watch recording.

use std::sync::Arc;

use chrono::Local;

use super::*;
use crate::domain::catalog::fixtures::default_catalog;
use crate::domain::ports::{FixtureCatalogProvider, MockUserRepository, UserPersistenceError};
use crate::domain::service_fixtures::{fixture_timestamp, registered_user};
use crate::domain::{Entitlements, ErrorCode};
use crate::outbound::persistence::InMemoryUserRepository;

/// Clock that only moves when told to.
struct SteppingClock {
    now: Mutex<DateTime<Utc>>,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            now: Mutex::new(fixture_timestamp()),
        }
    }

    fn advance_minutes(&self, minutes: i64) {
        let mut now = self.now.lock().expect("clock lock");
        *now += TimeDelta::minutes(minutes);
    }
}

impl Clock for SteppingClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.now.lock().expect("clock lock")
    }
}

struct Harness {
    service: PlaybackService<InMemoryUserRepository>,
    repo: Arc<InMemoryUserRepository>,
    clock: Arc<SteppingClock>,
    user: UserId,
}

impl Harness {
    async fn new(entitlements: Entitlements) -> Self {
        let user = registered_user("jon@gmail.com");
        let repo = Arc::new(InMemoryUserRepository::with_users(vec![user.clone()]).expect("seed"));
        repo.update(user.id(), UserPatch::entitlements(entitlements))
            .await
            .expect("entitlements");
        let clock = Arc::new(SteppingClock::new());
        let service = PlaybackService::new(
            Arc::clone(&repo),
            Arc::new(FixtureCatalogProvider::new(default_catalog())),
            Arc::new(UserWriteLocks::default()),
            clock.clone(),
        );
        Self {
            service,
            repo,
            clock,
            user: user.id().clone(),
        }
    }

    async fn entitlements(&self) -> Entitlements {
        self.repo
            .find_by_id(&self.user)
            .await
            .expect("lookup")
            .expect("user present")
            .entitlements()
            .clone()
    }
}

fn tick(position_secs: f64) -> ProgressTick {
    ProgressTick {
        position_secs,
        duration_secs: 100.0,
    }
}

#[tokio::test]
async fn free_episode_playback_records_watch_once() {
    let harness = Harness::new(Entitlements::default()).await;
    let session = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(1))
        .await
        .expect("free episode plays");
    assert_eq!(session.video_url, "https://media.test/got/1.mp4");

    let early = harness
        .service
        .report_progress(&harness.user, session.session_id, tick(50.0))
        .await
        .expect("progress");
    assert!(!early.watched);
    assert!(!early.newly_recorded);

    let crossing = harness
        .service
        .report_progress(&harness.user, session.session_id, tick(85.0))
        .await
        .expect("progress");
    assert!(crossing.watched);
    assert!(crossing.newly_recorded);

    let later = harness
        .service
        .report_progress(&harness.user, session.session_id, tick(95.0))
        .await
        .expect("progress");
    assert!(later.watched);
    assert!(!later.newly_recorded);

    assert_eq!(
        harness.entitlements().await,
        Entitlements::default().with_watched(EpisodeId::new(1))
    );
}

#[tokio::test]
async fn locked_episode_reports_price() {
    let harness = Harness::new(Entitlements::default()).await;
    let err = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(5))
        .await
        .expect_err("locked");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    let details = err.details().expect("details");
    assert_eq!(details["code"], "purchase_required");
    assert_eq!(details["price"], "0.10");
}

#[tokio::test]
async fn sequel_episode_requires_unlocked_sequel() {
    let harness = Harness::new(Entitlements::default()).await;
    let err = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(74))
        .await
        .expect_err("sequel locked");
    assert_eq!(err.code(), ErrorCode::Forbidden);
    assert_eq!(err.details().expect("details")["code"], "sequel_locked");
}

#[tokio::test]
async fn finishing_the_base_series_opens_the_sequel() {
    let seeded = (1..=72)
        .fold(Entitlements::default(), |acc, id| {
            acc.with_watched(EpisodeId::new(id))
        })
        .with_purchased(EpisodeId::new(73));
    let harness = Harness::new(seeded).await;

    let session = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(73))
        .await
        .expect("purchased episode plays");
    let report = harness
        .service
        .report_progress(&harness.user, session.session_id, tick(81.0))
        .await
        .expect("progress");

    assert!(report.newly_recorded);
    assert!(!report.sequel_locked);
    harness
        .service
        .start_playback(&harness.user, EpisodeId::new(74))
        .await
        .expect("sequel now open");
}

#[tokio::test]
async fn sessions_belong_to_their_user() {
    let harness = Harness::new(Entitlements::default()).await;
    let session = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(2))
        .await
        .expect("start");
    let stranger = UserId::random();

    let err = harness
        .service
        .report_progress(&stranger, session.session_id, tick(90.0))
        .await
        .expect_err("not theirs");
    assert_eq!(err.code(), ErrorCode::NotFound);
    let err = harness
        .service
        .finish_playback(&stranger, session.session_id)
        .await
        .expect_err("not theirs");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn finishing_closes_the_session() {
    let harness = Harness::new(Entitlements::default()).await;
    let session = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(3))
        .await
        .expect("start");
    assert_eq!(harness.service.active_sessions(), 1);

    harness
        .service
        .finish_playback(&harness.user, session.session_id)
        .await
        .expect("finish");
    assert_eq!(harness.service.active_sessions(), 0);

    let err = harness
        .service
        .report_progress(&harness.user, session.session_id, tick(90.0))
        .await
        .expect_err("closed");
    assert_eq!(err.code(), ErrorCode::NotFound);
}

#[tokio::test]
async fn failed_save_rearms_the_watched_latch() {
    let stored = registered_user("bran@gmail.com");
    let user = stored.id().clone();
    let mut repo = MockUserRepository::new();
    let lookup = stored.clone();
    repo.expect_find_by_id()
        .returning(move |_| Ok(Some(lookup.clone())));
    let mut failed_once = false;
    repo.expect_update().times(2).returning(move |_, patch| {
        if failed_once {
            Ok(stored.clone().apply(patch))
        } else {
            failed_once = true;
            Err(UserPersistenceError::connection("disk full"))
        }
    });
    let service = PlaybackService::new(
        Arc::new(repo),
        Arc::new(FixtureCatalogProvider::new(default_catalog())),
        Arc::new(UserWriteLocks::default()),
        Arc::new(SteppingClock::new()),
    );

    let session = service
        .start_playback(&user, EpisodeId::new(1))
        .await
        .expect("free episode plays");
    let err = service
        .report_progress(&user, session.session_id, tick(85.0))
        .await
        .expect_err("store offline");
    assert_eq!(err.code(), ErrorCode::ServiceUnavailable);

    let retry = service
        .report_progress(&user, session.session_id, tick(90.0))
        .await
        .expect("store back");
    assert!(retry.watched);
    assert!(retry.newly_recorded);
}

#[tokio::test]
async fn restarting_an_episode_replaces_its_session() {
    let harness = Harness::new(Entitlements::default()).await;
    let first = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(1))
        .await
        .expect("start");
    let second = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(1))
        .await
        .expect("restart");
    assert_eq!(harness.service.active_sessions(), 1);

    let err = harness
        .service
        .report_progress(&harness.user, first.session_id, tick(10.0))
        .await
        .expect_err("replaced");
    assert_eq!(err.code(), ErrorCode::NotFound);
    harness
        .service
        .report_progress(&harness.user, second.session_id, tick(10.0))
        .await
        .expect("current session");

    harness
        .service
        .start_playback(&harness.user, EpisodeId::new(2))
        .await
        .expect("other episode");
    assert_eq!(harness.service.active_sessions(), 2);
}

#[tokio::test]
async fn idle_sessions_expire() {
    let harness = Harness::new(Entitlements::default()).await;
    let stale = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(1))
        .await
        .expect("start");
    harness.clock.advance_minutes(31);

    let err = harness
        .service
        .report_progress(&harness.user, stale.session_id, tick(90.0))
        .await
        .expect_err("expired");
    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(harness.service.active_sessions(), 0);
    assert_eq!(harness.entitlements().await, Entitlements::default());
}

#[tokio::test]
async fn starting_playback_sweeps_idle_sessions() {
    let harness = Harness::new(Entitlements::default()).await;
    for episode in 1..=3 {
        harness
            .service
            .start_playback(&harness.user, EpisodeId::new(episode))
            .await
            .expect("start");
    }
    harness.clock.advance_minutes(45);

    harness
        .service
        .start_playback(&harness.user, EpisodeId::new(4))
        .await
        .expect("start");
    assert_eq!(harness.service.active_sessions(), 1);
}

#[tokio::test]
async fn progress_keeps_a_session_alive() {
    let harness = Harness::new(Entitlements::default()).await;
    let session = harness
        .service
        .start_playback(&harness.user, EpisodeId::new(2))
        .await
        .expect("start");
    for position in [20.0, 40.0, 60.0] {
        harness.clock.advance_minutes(20);
        harness
            .service
            .report_progress(&harness.user, session.session_id, tick(position))
            .await
            .expect("still open");
    }
}
