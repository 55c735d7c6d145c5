// tests/spin_tests.rs

mod test_utils;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mockall::mock;
use tokio_test::{assert_err, assert_ok};

use spinwheel_common::models::{Countdown, DrawRecord, SessionIdentity, SpinState, VoucherOffer};
use spinwheel_common::traits::repository_traits::DrawRecordRepository;
use spinwheel_core::cooldown::GateState;
use spinwheel_core::eventbus::WheelEvent;
use spinwheel_core::session::SessionHandle;
use spinwheel_core::store::PersistentDrawStore;
use spinwheel_core::{DrawError, Error, WheelConfig};

use test_utils::helpers::{catalog, fast_config, mounted_wheel, now, offer, wait_for_view};

mock! {
    DrawRepo {}
    #[async_trait]
    impl DrawRecordRepository for DrawRepo {
        async fn get(&self, user_id: &str) -> Result<Option<DrawRecord>, Error>;
        async fn put(&self, user_id: &str, drawn_at: DateTime<Utc>, offer: &VoucherOffer) -> Result<(), Error>;
    }
}

fn memory_store() -> Arc<PersistentDrawStore> {
    Arc::new(PersistentDrawStore::new(None))
}

#[tokio::test]
async fn test_five_turns_plus_45_on_six_offers_awards_last_offer() -> Result<(), Error> {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let wheel = mounted_wheel(fast_config(), catalog(6), store.clone(), session.subscribe(), 45.0).await;

    let outcome = wheel.draw(now()).await.expect("draw should succeed");
    assert_eq!(outcome.rotation, 1845.0);
    assert_eq!(outcome.index, 5);
    assert_eq!(outcome.offer.id, "v5");
    assert_eq!(outcome.code.as_deref(), Some("v5-OPEN"));

    assert_eq!(wheel.view().spin, SpinState::Result(offer("v5")));
    let record = store.get("alice").await.expect("record persisted");
    assert_eq!(record.offer.id, "v5");
    assert_eq!(record.drawn_at, now());
    Ok(())
}

#[tokio::test]
async fn test_selected_offer_matches_painted_segment() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    for offset in [0.0, 59.0, 61.0, 150.0, 359.5] {
        let wheel = mounted_wheel(fast_config(), catalog(6), memory_store(), session.subscribe(), offset).await;
        let layout = wheel.layout(now());
        let painted = layout
            .iter()
            .find(|(_, span)| offset >= span.start_deg && offset < span.end_deg)
            .map(|(o, _)| o.id.clone())
            .expect("offset falls in a painted span");

        let outcome = wheel.draw(now()).await.unwrap();
        assert_eq!(outcome.offer.id, painted, "offset {offset}");
    }
}

#[tokio::test]
async fn test_anonymous_user_is_rejected() {
    let session = SessionHandle::default();
    let wheel = mounted_wheel(fast_config(), catalog(3), memory_store(), session.subscribe(), 10.0).await;

    let err = wheel.draw(now()).await.unwrap_err();
    assert_eq!(err, DrawError::Unauthenticated);
    assert!(err.user_message().unwrap().contains("log in"));
    assert_eq!(wheel.view().spin, SpinState::Idle);
}

#[tokio::test]
async fn test_no_eligible_offers_never_touches_store_during_draw() {
    let mut repo = MockDrawRepo::new();
    // One read at mount to load the view, none during the draw.
    repo.expect_get().times(1).returning(|_| Ok(None));
    repo.expect_put().never();

    let store = Arc::new(PersistentDrawStore::with_repository(Arc::new(repo)));
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));

    let mut suspended = offer("suspended");
    suspended.status = 3;
    let mut expired = offer("expired");
    expired.ends_at = now() - Duration::seconds(1);

    let wheel = mounted_wheel(fast_config(), vec![suspended, expired], store, session.subscribe(), 10.0).await;
    assert!(wheel.layout(now()).is_empty());

    let err = wheel.draw(now()).await.unwrap_err();
    assert_eq!(err, DrawError::NoEligibleOffers);
    assert!(err.user_message().unwrap().contains("no vouchers"));
}

#[tokio::test]
async fn test_cooldown_blocks_until_exactly_elapsed() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let wheel = mounted_wheel(fast_config(), catalog(4), store.clone(), session.subscribe(), 200.0).await;

    assert_ok!(wheel.draw(now()).await);
    let first = store.get("alice").await.unwrap();

    let almost = now() + Duration::hours(23) + Duration::minutes(59);
    let err = assert_err!(wheel.draw(almost).await);
    assert_eq!(err, DrawError::CooldownActive(Countdown { hours: 0, minutes: 1, seconds: 0 }));
    assert!(err.user_message().unwrap().contains("0h 1m 0s"));
    assert_eq!(store.get("alice").await.unwrap(), first);

    assert!(matches!(
        wheel.draw(now() + Duration::hours(24) - Duration::milliseconds(1)).await,
        Err(DrawError::CooldownActive(_))
    ));

    assert_eq!(wheel.gate_state(almost), GateState::Waiting(Duration::minutes(1)));
    assert_eq!(wheel.countdown(almost).to_string(), "0h 1m 0s");

    let later = now() + Duration::hours(24);
    assert_ok!(wheel.draw(later).await);
    assert_eq!(store.get("alice").await.unwrap().drawn_at, later);
    assert_eq!(wheel.remaining(later), Duration::hours(24));
}

#[tokio::test]
async fn test_second_draw_while_spinning_is_rejected() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let config = WheelConfig {
        spin_duration_ms: 300,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(6), store.clone(), session.subscribe(), 45.0).await;

    let first = {
        let wheel = Arc::clone(&wheel);
        tokio::spawn(async move { wheel.draw(now()).await })
    };
    wait_for_view(&wheel, |v| v.spin.is_spinning()).await;

    let second = wheel.draw(now() + Duration::seconds(1)).await;
    assert_eq!(second.unwrap_err(), DrawError::AlreadySpinning);
    assert!(store.get("alice").await.is_none(), "nothing persisted mid-spin");

    let outcome = first.await.unwrap().expect("first draw completes");
    assert_eq!(store.get("alice").await.unwrap().drawn_at, now());
    assert_eq!(outcome.offer.id, "v5");
}

#[tokio::test]
async fn test_result_not_revealed_before_animation_ends() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let config = WheelConfig {
        spin_duration_ms: 250,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(3), memory_store(), session.subscribe(), 10.0).await;

    let started = std::time::Instant::now();
    wheel.draw(now()).await.unwrap();
    assert!(started.elapsed() >= std::time::Duration::from_millis(250));
}

#[tokio::test]
async fn test_logout_mid_spin_aborts_without_consuming_cooldown() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let config = WheelConfig {
        spin_duration_ms: 500,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(6), store.clone(), session.subscribe(), 45.0).await;

    let pending = {
        let wheel = Arc::clone(&wheel);
        tokio::spawn(async move { wheel.draw(now()).await })
    };
    wait_for_view(&wheel, |v| v.spin.is_spinning()).await;

    session.logout();
    let result = pending.await.unwrap();
    assert_eq!(result.unwrap_err(), DrawError::AnimationInterrupted);
    assert!(DrawError::AnimationInterrupted.user_message().is_none());
    wait_for_view(&wheel, |v| v.identity.is_anonymous()).await;
    assert!(store.get("alice").await.is_none());
    assert_eq!(wheel.view().spin, SpinState::Idle);

    session.login("alice");
    wait_for_view(&wheel, |v| v.identity == SessionIdentity::User("alice".into())).await;
    assert!(wheel.draw(now()).await.is_ok());
}

#[tokio::test]
async fn test_unmount_mid_spin_aborts() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let config = WheelConfig {
        spin_duration_ms: 500,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(2), store.clone(), session.subscribe(), 0.0).await;

    let pending = {
        let wheel = Arc::clone(&wheel);
        tokio::spawn(async move { wheel.draw(now()).await })
    };
    wait_for_view(&wheel, |v| v.spin.is_spinning()).await;

    wheel.unmount();
    assert_eq!(pending.await.unwrap().unwrap_err(), DrawError::AnimationInterrupted);
    assert!(store.get("alice").await.is_none());
}

#[tokio::test]
async fn test_failed_write_reports_store_unavailable_and_keeps_wheel_usable() {
    let mut repo = MockDrawRepo::new();
    repo.expect_get().returning(|_| Ok(None));
    repo.expect_put()
        .times(1)
        .returning(|_, _, _| Err(Error::Store("disk full".into())));

    let store = Arc::new(PersistentDrawStore::with_repository(Arc::new(repo)));
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let wheel = mounted_wheel(fast_config(), catalog(3), store, session.subscribe(), 10.0).await;

    let err = wheel.draw(now()).await.unwrap_err();
    assert!(matches!(err, DrawError::StoreUnavailable(_)));
    let view = wheel.view();
    assert_eq!(view.spin, SpinState::Idle);
    assert!(view.last_record.is_none());
}

#[tokio::test]
async fn test_put_is_called_with_the_awarded_offer() {
    let mut repo = MockDrawRepo::new();
    repo.expect_get().returning(|_| Ok(None));
    repo.expect_put()
        .withf(|user_id: &str, drawn_at: &DateTime<Utc>, offer: &VoucherOffer| {
            user_id == "bob" && *drawn_at == now() && offer.id == "v0"
        })
        .times(1)
        .returning(|_, _, _| Ok(()));

    let store = Arc::new(PersistentDrawStore::with_repository(Arc::new(repo)));
    let session = SessionHandle::new(SessionIdentity::User("bob".into()));
    // 2 segments, offset 300 => raw segment 1 => list index 0
    let wheel = mounted_wheel(fast_config(), catalog(2), store, session.subscribe(), 300.0).await;

    let outcome = wheel.draw(now()).await.unwrap();
    assert_eq!(outcome.offer.id, "v0");
}

#[tokio::test]
async fn test_unopenable_store_degrades_to_never_drawn() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(PersistentDrawStore::new(Some(
        dir.path().to_string_lossy().to_string(),
    )));
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let wheel = mounted_wheel(fast_config(), catalog(3), store.clone(), session.subscribe(), 10.0).await;

    assert!(store.is_degraded().await);
    assert!(wheel.draw(now()).await.is_ok());
}

#[tokio::test]
async fn test_events_follow_draw_lifecycle() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let wheel = mounted_wheel(fast_config(), catalog(6), memory_store(), session.subscribe(), 45.0).await;
    let mut events = wheel.subscribe_events(Some(16));

    wheel.draw(now()).await.unwrap();
    let _ = wheel.draw(now()).await;

    match events.recv().await.unwrap() {
        WheelEvent::SpinStarted { user_id, rotation } => {
            assert_eq!(user_id, "alice");
            assert_eq!(rotation, 1845.0);
        }
        other => panic!("expected SpinStarted, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        WheelEvent::DrawCommitted { offer, drawn_at, .. } => {
            assert_eq!(offer.id, "v5");
            assert_eq!(drawn_at, now());
        }
        other => panic!("expected DrawCommitted, got {other:?}"),
    }
    match events.recv().await.unwrap() {
        WheelEvent::DrawRejected { reason } => {
            assert!(matches!(reason, DrawError::CooldownActive(_)));
        }
        other => panic!("expected DrawRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_undrained_subscriber_does_not_hold_up_draw() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let wheel = mounted_wheel(fast_config(), catalog(3), store.clone(), session.subscribe(), 10.0).await;
    let _stalled = wheel.subscribe_events(Some(1));

    let outcome = tokio::time::timeout(std::time::Duration::from_secs(2), wheel.draw(now()))
        .await
        .expect("draw must not wait on event subscribers");
    assert!(outcome.is_ok());
    assert!(store.get("alice").await.is_some());

    let rejected = tokio::time::timeout(std::time::Duration::from_secs(2), wheel.draw(now())).await;
    assert!(matches!(rejected, Ok(Err(DrawError::CooldownActive(_)))));
}

#[tokio::test]
async fn test_logout_and_relogin_during_spin_still_aborts() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let config = WheelConfig {
        spin_duration_ms: 400,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(3), store.clone(), session.subscribe(), 10.0).await;

    let pending = {
        let wheel = Arc::clone(&wheel);
        tokio::spawn(async move { wheel.draw(now()).await })
    };
    wait_for_view(&wheel, |v| v.spin.is_spinning()).await;

    session.logout();
    session.login("alice");

    assert_eq!(pending.await.unwrap().unwrap_err(), DrawError::AnimationInterrupted);
    assert!(store.get("alice").await.is_none(), "cooldown must not be consumed");
    assert_ok!(wheel.draw(now()).await);
}

#[tokio::test]
async fn test_draw_right_after_account_switch_completes() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let config = WheelConfig {
        spin_duration_ms: 150,
        ..WheelConfig::default()
    };
    let wheel = mounted_wheel(config, catalog(6), store.clone(), session.subscribe(), 45.0).await;

    session.login("bob");
    let outcome = wheel.draw(now()).await.expect("bob's own spin must not be cancelled");
    assert_eq!(outcome.offer.id, "v5");
    assert_eq!(store.get("bob").await.unwrap().offer.id, "v5");

    let view = wheel.view();
    assert_eq!(view.identity, SessionIdentity::User("bob".into()));
    assert_eq!(view.spin, SpinState::Result(offer("v5")));
    assert_eq!(view.last_record.unwrap().user_id, "bob");
}

#[tokio::test]
async fn test_remount_after_unmount_restores_the_wheel() {
    let session = SessionHandle::new(SessionIdentity::User("alice".into()));
    let store = memory_store();
    let wheel = mounted_wheel(fast_config(), catalog(3), store.clone(), session.subscribe(), 10.0).await;
    wheel.draw(now()).await.unwrap();
    assert!(matches!(wheel.view().spin, SpinState::Result(_)));

    wheel.unmount();
    wheel.mount().await;

    let view = wheel.view();
    assert_eq!(view.spin, SpinState::Idle);
    assert_eq!(view.last_record.unwrap().drawn_at, now());

    let later = now() + Duration::hours(24);
    assert_ok!(wheel.draw(later).await);

    session.login("bob");
    wait_for_view(&wheel, |v| v.identity == SessionIdentity::User("bob".into())).await;
    assert_ok!(wheel.draw(later).await);
    assert_eq!(store.get("bob").await.unwrap().drawn_at, later);
}
