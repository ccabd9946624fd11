mod common;

use std::time::Duration;

use combat_runtime::{CloseReason, CombatSetup, InMemoryCombatRecords, OutboundKind, RuntimeError};
use serde_json::json;
use tokio::time;

use common::*;

/// No gym dodge: every roll is above 10.
const NO_DODGE: u32 = 100;

#[tokio::test(start_paused = true)]
async fn session_opens_with_combat_start() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10), caught("spare", 50, 5, 5)],
        vec![caught("gym", 100, 20, 10)],
    );

    let start = next(&mut session).await;
    assert_eq!(start.kind, OutboundKind::CombatStart);
    let payload = start.payload.unwrap();
    assert_eq!(payload["player_loomie"]["_id"], "mine");
    assert_eq!(payload["alive_user_loomies"], 2);
    assert_eq!(payload["gym_loomie"]["_id"], "gym");
    assert_eq!(payload["alive_gym_loomies"], 1);
    assert!(harness.registry.includes(GYM));
}

#[tokio::test(start_paused = true)]
async fn user_attack_reports_deterministic_damage() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    next(&mut session).await;

    session.send(frame("USER_ATTACK")).await;
    let update = next(&mut session).await;
    assert_eq!(update.kind, OutboundKind::UpdateGymLoomieHp);
    assert_eq!(update.payload, Some(json!({ "hp": 82 })));
}

#[tokio::test(start_paused = true)]
async fn gym_dodge_is_announced_without_damage() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), 5);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    next(&mut session).await;

    session.send(frame("USER_ATTACK")).await;
    assert_eq!(next(&mut session).await.kind, OutboundKind::UserAttackDodged);
    assert_eq!(harness.registry.metrics().snapshot().gym_dodges, 1);
}

#[tokio::test(start_paused = true)]
async fn attacks_inside_cooldown_are_silently_dropped() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    next(&mut session).await;

    session.send(frame("USER_ATTACK")).await;
    session.send(frame("USER_ATTACK")).await;
    assert_eq!(
        next(&mut session).await.payload,
        Some(json!({ "hp": 82 }))
    );
    assert!(silent(&mut session, Duration::from_millis(900)).await);

    time::sleep(Duration::from_millis(200)).await;
    session.send(frame("USER_ATTACK")).await;
    assert_eq!(
        next(&mut session).await.payload,
        Some(json!({ "hp": 64 }))
    );

    let metrics = harness.registry.metrics().snapshot();
    assert_eq!(metrics.player_attacks, 2);
    assert_eq!(metrics.rate_limited, 1);
}

#[tokio::test(start_paused = true)]
async fn weakening_last_gym_creature_wins_and_unregisters() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 100, 10)],
        vec![caught("gym", 30, 20, 0)],
    );
    next(&mut session).await;

    session.send(frame("USER_ATTACK")).await;
    let weakened = next(&mut session).await;
    assert_eq!(weakened.kind, OutboundKind::GymLoomieWeakened);
    assert_eq!(weakened.payload, Some(json!({ "loomie_id": "gym" })));
    assert_eq!(next(&mut session).await.kind, OutboundKind::UserHasWon);

    let handle = session.handle();
    assert_eq!(session.join().await.unwrap(), CloseReason::Won);
    assert!(handle.is_closed());
    assert!(!harness.registry.includes(GYM));

    // Clearing the combat record is fire-and-forget.
    time::sleep(Duration::from_millis(10)).await;
    assert_eq!(
        harness.records.cleared(),
        vec![(GYM.to_owned(), USER.to_owned())]
    );
    assert_eq!(harness.records.awards().len(), 1);
    assert_eq!(harness.registry.metrics().snapshot().sessions_won, 1);
}

#[tokio::test(start_paused = true)]
async fn next_gym_creature_is_announced_after_weakening() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 100, 10)],
        vec![caught("g1", 30, 20, 0), caught("g2", 60, 20, 0)],
    );
    next(&mut session).await;

    session.send(frame("USER_ATTACK")).await;
    assert_eq!(next(&mut session).await.kind, OutboundKind::GymLoomieWeakened);
    let update = next(&mut session).await;
    assert_eq!(update.kind, OutboundKind::UpdateGymLoomie);
    let payload = update.payload.unwrap();
    assert_eq!(payload["loomie"]["_id"], "g2");
    assert_eq!(payload["alive_loomies"], 1);
    assert!(harness.registry.includes(GYM));
}

#[tokio::test(start_paused = true)]
async fn undodged_gym_attack_damages_player() {
    let harness = Harness::new(steady_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 100, 20, 0)],
        vec![caught("gym", 100, 30, 0)],
    );
    next(&mut session).await;

    let started = time::Instant::now();
    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    let update = next(&mut session).await;
    assert_eq!(update.kind, OutboundKind::UpdateUserLoomieHp);
    assert_eq!(update.payload, Some(json!({ "hp": 70 })));
    // Two seconds of pacing plus the one second dodge window.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_millis(3_100));
}

#[tokio::test(start_paused = true)]
async fn dodge_inside_window_avoids_damage() {
    let harness = Harness::new(steady_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 100, 20, 0)],
        vec![caught("gym", 100, 30, 0)],
    );
    next(&mut session).await;

    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    time::sleep(Duration::from_millis(400)).await;
    session.send(frame("USER_DODGE")).await;
    session.send(frame("USER_DODGE")).await;

    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackDodged);
    // The extra dodge is drained before the next cycle.
    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    assert_eq!(next(&mut session).await.kind, OutboundKind::UpdateUserLoomieHp);
    assert_eq!(harness.registry.metrics().snapshot().player_dodges, 1);
}

#[tokio::test(start_paused = true)]
async fn dodge_before_announcement_is_stale() {
    let harness = Harness::new(steady_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 100, 20, 0)],
        vec![caught("gym", 100, 30, 0)],
    );
    next(&mut session).await;

    session.send(frame("USER_DODGE")).await;
    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    assert_eq!(next(&mut session).await.kind, OutboundKind::UpdateUserLoomieHp);
}

#[tokio::test(start_paused = true)]
async fn losing_every_player_creature_ends_the_session() {
    let harness = Harness::new(steady_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("first", 10, 20, 0), caught("second", 10, 20, 0)],
        vec![caught("gym", 100, 50, 0)],
    );
    next(&mut session).await;

    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    let weakened = next(&mut session).await;
    assert_eq!(weakened.kind, OutboundKind::UserLoomieWeakened);
    assert_eq!(weakened.payload, Some(json!({ "loomie_id": "first" })));
    let promoted = next(&mut session).await;
    assert_eq!(promoted.kind, OutboundKind::UpdatePlayerLoomie);
    assert_eq!(promoted.payload.unwrap()["loomie"]["_id"], "second");

    assert_eq!(next(&mut session).await.kind, OutboundKind::GymAttackCandidate);
    assert_eq!(next(&mut session).await.kind, OutboundKind::UserLoomieWeakened);
    assert_eq!(next(&mut session).await.kind, OutboundKind::UserHasLost);

    assert_eq!(session.join().await.unwrap(), CloseReason::Lost);
    assert!(!harness.registry.includes(GYM));
}

#[tokio::test(start_paused = true)]
async fn silent_client_is_closed_by_watchdog() {
    let config = combat_runtime::CombatConfig {
        inactivity_limit: Duration::from_secs(30),
        ..quiet_gym()
    };
    let harness = Harness::new(config, InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    next(&mut session).await;
    let started = time::Instant::now();

    assert!(session.recv().await.is_none());
    // Checked every 5 seconds; closed on the first check past 30 seconds.
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(30) && elapsed < Duration::from_millis(35_100));
    assert_eq!(session.join().await.unwrap(), CloseReason::Inactive);
    assert!(!harness.registry.includes(GYM));
}

#[tokio::test(start_paused = true)]
async fn greetings_keep_the_session_alive() {
    let config = combat_runtime::CombatConfig {
        inactivity_limit: Duration::from_secs(30),
        ..quiet_gym()
    };
    let harness = Harness::new(config, InMemoryCombatRecords::new(), NO_DODGE);
    let session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    let handle = session.handle();

    for _ in 0..3 {
        time::sleep(Duration::from_secs(20)).await;
        session.send(frame("GREETING")).await;
    }
    assert!(!handle.is_closed());

    // Malformed frames do not count as activity.
    session.send("{ not json").await;
    time::sleep(Duration::from_secs(36)).await;
    assert_eq!(handle.close_reason(), Some(CloseReason::Inactive));
}

#[tokio::test(start_paused = true)]
async fn unknown_and_client_gym_attack_frames_are_ignored() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let mut session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );
    next(&mut session).await;

    session.send(frame("GYM_ATTACK")).await;
    session.send(frame("DANCE")).await;
    session.send("garbage").await;
    assert!(silent(&mut session, Duration::from_secs(5)).await);
    assert!(!session.handle().is_closed());
}

#[tokio::test(start_paused = true)]
async fn second_session_on_same_gym_is_rejected() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );

    let setup = CombatSetup {
        gym_id: GYM.to_owned(),
        user_id: "bob".to_owned(),
        team: vec![caught("bobs", 80, 20, 10)],
        protectors: vec![caught("gym", 100, 20, 10)],
    };
    let err = harness.builder.spawn(setup.clone()).err().unwrap();
    assert!(matches!(err, RuntimeError::CombatInProgress { ref gym_id } if gym_id == GYM));

    session.handle().close();
    assert_eq!(session.join().await.unwrap(), CloseReason::Closed);
    assert!(harness.builder.spawn(setup).is_ok());
}

#[tokio::test(start_paused = true)]
async fn user_cannot_fight_two_gyms_at_once() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );

    let setup = CombatSetup {
        gym_id: "gym-2".to_owned(),
        user_id: USER.to_owned(),
        team: vec![caught("mine", 80, 20, 10)],
        protectors: vec![caught("other", 100, 20, 10)],
    };
    let err = harness.builder.spawn(setup.clone()).err().unwrap();
    assert!(matches!(err, RuntimeError::UserInCombat { ref user_id } if user_id == USER));
    assert!(!harness.registry.includes("gym-2"));
    assert_eq!(harness.registry.len(), 1);

    session.handle().close();
    assert_eq!(session.join().await.unwrap(), CloseReason::Closed);
    assert!(!harness.registry.includes_user(USER));
    assert!(harness.builder.spawn(setup).is_ok());
}

#[tokio::test(start_paused = true)]
async fn invalid_setups_never_register() {
    let harness = Harness::new(quiet_gym(), InMemoryCombatRecords::new(), NO_DODGE);

    let mut busy = caught("busy", 80, 20, 10);
    busy.is_busy = true;
    let err = harness
        .builder
        .spawn(CombatSetup {
            gym_id: GYM.to_owned(),
            user_id: USER.to_owned(),
            team: vec![busy],
            protectors: vec![caught("gym", 100, 20, 10)],
        })
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::CreatureBusy(_)));

    let err = harness
        .builder
        .spawn(CombatSetup {
            gym_id: GYM.to_owned(),
            user_id: USER.to_owned(),
            team: vec![caught("mine", 80, 20, 10)],
            protectors: vec![],
        })
        .err()
        .unwrap();
    assert!(matches!(err, RuntimeError::Setup(_)));
    assert!(harness.registry.is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_transport_tears_down() {
    let harness = Harness::new(steady_gym(), InMemoryCombatRecords::new(), NO_DODGE);
    let session = harness.spawn(
        vec![caught("mine", 80, 20, 10)],
        vec![caught("gym", 100, 20, 10)],
    );

    let parts = session.into_parts();
    drop(parts.inbound);
    assert_eq!(parts.task.join().await.unwrap(), CloseReason::TransportClosed);
    assert!(!harness.registry.includes(GYM));
    assert_eq!(harness.registry.metrics().active_sessions(), 0);
}
