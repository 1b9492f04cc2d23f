//! Behaviour tests for episode purchases and the sequel unlock.
//!
//! Scenarios drive the domain services through the same state the HTTP
//! adapter uses, over the bundled catalog and in-memory stores.

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::Utc;
use dragonfire::domain::ports::{
    DisabledVideoUploadService, EpisodeAccess, FixturePaymentGateway, ProgressReport,
    SequelStatus, UserRepository,
};
use dragonfire::domain::{
    Email, EntitlementDecision, Entitlements, EpisodeId, Error, ErrorCode, Password, ProgressTick,
    User, UserId, UserPatch, WatchAccess,
};
use dragonfire::inbound::http::state::{HttpState, HttpStatePorts};
use dragonfire::outbound::persistence::{InMemoryFeedbackSink, InMemoryUserRepository};
use dragonfire::outbound::static_catalog::StaticCatalogProvider;
use mockable::DefaultClock;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use serde_json::Value;
use tokio::runtime::Runtime;

struct ViewerWorld {
    runtime: Runtime,
    users: Arc<InMemoryUserRepository>,
    state: HttpState,
    viewer: RefCell<Option<UserId>>,
    payments: RefCell<Vec<String>>,
    failure: RefCell<Option<Error>>,
    sequel: RefCell<Option<SequelStatus>>,
    episode: RefCell<Option<EpisodeAccess>>,
    progress: RefCell<Option<ProgressReport>>,
}

impl ViewerWorld {
    fn new() -> Self {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        let users = Arc::new(InMemoryUserRepository::default());
        let state = HttpState::new(HttpStatePorts {
            users: users.clone(),
            catalog: Arc::new(StaticCatalogProvider::bundled().expect("bundled catalog")),
            feedback: Arc::new(InMemoryFeedbackSink::default()),
            payments: Arc::new(FixturePaymentGateway),
            uploads: Arc::new(DisabledVideoUploadService),
            clock: Arc::new(DefaultClock),
            admin: None,
        });
        Self {
            runtime,
            users,
            state,
            viewer: RefCell::new(None),
            payments: RefCell::new(Vec::new()),
            failure: RefCell::new(None),
            sequel: RefCell::new(None),
            episode: RefCell::new(None),
            progress: RefCell::new(None),
        }
    }

    fn viewer(&self) -> UserId {
        self.viewer.borrow().clone().expect("viewer seeded")
    }

    fn seed_viewer(&self, watched: u32) {
        let email = Email::for_registration("viewer@gmail.com").expect("email");
        let password = Password::with_min_length("winter42").expect("password");
        let entitlements = Entitlements::new(
            (1..=watched).map(EpisodeId::new).collect(),
            BTreeSet::new(),
            false,
        );
        let user = User::register(email, &password, Utc::now())
            .apply(UserPatch::entitlements(entitlements));
        self.runtime
            .block_on(self.users.create(&user))
            .expect("seed viewer");
        *self.viewer.borrow_mut() = Some(user.id().clone());
    }

    fn record_payment(&self, amount: Option<String>) {
        if let Some(amount) = amount {
            self.payments.borrow_mut().push(amount);
        }
    }

    fn buy(&self, episode: u32) {
        let viewer = self.viewer();
        let result = self.runtime.block_on(
            self.state
                .entitlements
                .purchase_episode(&viewer, EpisodeId::new(episode)),
        );
        match result {
            Ok(outcome) => {
                self.record_payment(outcome.receipt.map(|receipt| receipt.amount.to_string()));
            }
            Err(error) => *self.failure.borrow_mut() = Some(error),
        }
    }

    fn refresh_sequel(&self) {
        let viewer = self.viewer();
        let status = self
            .runtime
            .block_on(self.state.catalog.sequel_status(&viewer))
            .expect("sequel status");
        *self.sequel.borrow_mut() = Some(status);
    }

    fn check_episode(&self, episode: u32) -> EpisodeAccess {
        let viewer = self.viewer();
        let access = self
            .runtime
            .block_on(
                self.state
                    .catalog
                    .episode_access(&viewer, EpisodeId::new(episode)),
            )
            .expect("episode access");
        *self.episode.borrow_mut() = Some(access.clone());
        access
    }
}

#[fixture]
fn world() -> ViewerWorld {
    ViewerWorld::new()
}

#[given("a viewer who has watched {count} base episodes")]
fn a_viewer_who_has_watched_base_episodes(world: &ViewerWorld, count: u32) {
    world.seed_viewer(count);
}

#[given("the viewer has bought episode {episode}")]
fn the_viewer_has_bought_episode(world: &ViewerWorld, episode: u32) {
    world.buy(episode);
    assert!(world.failure.borrow().is_none(), "purchase should succeed");
}

#[when("the viewer checks the sequel status")]
fn the_viewer_checks_the_sequel_status(world: &ViewerWorld) {
    world.refresh_sequel();
}

#[when("the viewer checks episode {episode}")]
fn the_viewer_checks_episode(world: &ViewerWorld, episode: u32) {
    world.check_episode(episode);
}

#[when("the viewer buys episode {episode}")]
fn the_viewer_buys_episode(world: &ViewerWorld, episode: u32) {
    world.buy(episode);
}

#[when("the viewer downloads episode {episode}")]
fn the_viewer_downloads_episode(world: &ViewerWorld, episode: u32) {
    let viewer = world.viewer();
    let grant = world
        .runtime
        .block_on(
            world
                .state
                .entitlements
                .purchase_download(&viewer, EpisodeId::new(episode)),
        )
        .expect("download grant");
    world.record_payment(Some(grant.receipt.amount.to_string()));
}

#[when("the viewer pays to unlock the sequel")]
fn the_viewer_pays_to_unlock_the_sequel(world: &ViewerWorld) {
    let viewer = world.viewer();
    let outcome = world
        .runtime
        .block_on(world.state.entitlements.unlock_sequel(&viewer))
        .expect("sequel unlock");
    world.record_payment(outcome.receipt.map(|receipt| receipt.amount.to_string()));
}

#[when("the viewer watches episode {episode} past the watched threshold")]
fn the_viewer_watches_episode_past_the_threshold(world: &ViewerWorld, episode: u32) {
    let viewer = world.viewer();
    let playback = &world.state.playback;
    let report = world
        .runtime
        .block_on(async {
            let session = playback
                .start_playback(&viewer, EpisodeId::new(episode))
                .await?;
            playback
                .report_progress(
                    &viewer,
                    session.session_id,
                    ProgressTick {
                        position_secs: 2_700.0,
                        duration_secs: 3_000.0,
                    },
                )
                .await
        })
        .expect("playback progress");
    *world.progress.borrow_mut() = Some(report);
}

#[then("the sequel is locked with {watched} of {required} episodes watched")]
fn the_sequel_is_locked_with_progress(world: &ViewerWorld, watched: usize, required: usize) {
    let sequel = world.sequel.borrow();
    let status = sequel.as_ref().expect("sequel status");
    assert!(status.locked);
    assert_eq!(status.watched, watched);
    assert_eq!(status.required, required);
}

#[then("the episode is recorded as watched")]
fn the_episode_is_recorded_as_watched(world: &ViewerWorld) {
    let progress = world.progress.borrow();
    let report = progress.as_ref().expect("progress report");
    assert!(report.watched);
    assert!(report.newly_recorded);
    assert!(!report.sequel_locked);
}

#[then("the sequel is unlocked")]
fn the_sequel_is_unlocked(world: &ViewerWorld) {
    world.refresh_sequel();
    let sequel = world.sequel.borrow();
    assert!(!sequel.as_ref().expect("sequel status").locked);
}

#[then("episode {episode} costs {price} to watch")]
fn episode_costs_to_watch(world: &ViewerWorld, episode: u32, price: String) {
    let access = world.check_episode(episode);
    assert!(!access.series_locked);
    match access.watch {
        WatchAccess::RequiresPurchase { price: actual } => assert_eq!(actual.to_string(), price),
        WatchAccess::Allowed => panic!("episode {episode} should require a purchase"),
    }
}

#[then("the episode is free")]
fn the_episode_is_free(world: &ViewerWorld) {
    let episode = world.episode.borrow();
    let access = episode.as_ref().expect("episode access");
    assert_eq!(access.decision, EntitlementDecision::Free);
    assert_eq!(access.watch, WatchAccess::Allowed);
}

#[then("episode {episode} is unlocked by purchase")]
fn episode_is_unlocked_by_purchase(world: &ViewerWorld, episode: u32) {
    let access = world.check_episode(episode);
    assert_eq!(access.decision, EntitlementDecision::UnlockedByPurchase);
}

#[then("the payments taken were {amounts}")]
fn the_payments_taken_were(world: &ViewerWorld, amounts: String) {
    let expected: Vec<String> = amounts.split(", ").map(str::to_owned).collect();
    assert_eq!(*world.payments.borrow(), expected);
}

#[then("the request is forbidden with code {code}")]
fn the_request_is_forbidden_with_code(world: &ViewerWorld, code: String) {
    let failure = world.failure.borrow();
    let error = failure.as_ref().expect("request should fail");
    assert_eq!(error.code(), ErrorCode::Forbidden);
    assert_eq!(
        error
            .details()
            .and_then(|details| details.get("code"))
            .and_then(Value::as_str),
        Some(code.as_str())
    );
}

#[scenario(
    path = "tests/features/sequel_unlock.feature",
    name = "One unwatched base episode keeps the sequel locked"
)]
fn one_unwatched_base_episode_keeps_the_sequel_locked(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/sequel_unlock.feature",
    name = "Watching the last base episode opens the sequel"
)]
fn watching_the_last_base_episode_opens_the_sequel(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/sequel_unlock.feature",
    name = "Paying opens the sequel early"
)]
fn paying_opens_the_sequel_early(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/sequel_unlock.feature",
    name = "Sequel episodes cannot be bought while the sequel is locked"
)]
fn sequel_episodes_cannot_be_bought_while_locked(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/episode_purchase.feature",
    name = "Early episodes are free"
)]
fn early_episodes_are_free(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/episode_purchase.feature",
    name = "A paid episode is charged only once"
)]
fn a_paid_episode_is_charged_only_once(world: ViewerWorld) {
    drop(world);
}

#[scenario(
    path = "tests/features/episode_purchase.feature",
    name = "Downloads are charged every time"
)]
fn downloads_are_charged_every_time(world: ViewerWorld) {
    drop(world);
}
