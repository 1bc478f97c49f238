//! End-to-end controller scenarios on tokio's paused virtual clock: whole
//! sessions complete instantly and deterministically, with the mock store
//! recording every persistence call.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast::error::TryRecvError;
use tokio::time::sleep;

use focusflow::models::{Period, TaskRecord};
use focusflow::store::MockSessionStore;
use focusflow::timer::{FocusController, FocusEvent, FocusView};

fn controller_with(store: &MockSessionStore) -> FocusController {
    FocusController::new(Arc::new(store.clone()))
}

fn seeded_task(id: &str) -> TaskRecord {
    let now = Utc::now();
    TaskRecord {
        id: id.to_string(),
        text: "Deep work".to_string(),
        period: Period::Morning,
        duration: Some(25),
        completed: false,
        created_at: now,
        updated_at: now,
    }
}

/// Advance virtual time far enough for `n` one-second ticks to land.
async fn run_ticks(n: u64) {
    sleep(Duration::from_secs(n) + Duration::from_millis(500)).await;
}

#[tokio::test(start_paused = true)]
async fn full_countdown_completes_and_persists_once() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);
    let mut events = controller.subscribe();

    controller.start_session(None, 25).await;
    controller.toggle_play().await;
    run_ticks(1500).await;

    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration, 1500);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].task_id, None);
    assert_eq!(store.update_calls().len(), 1);

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    assert!(!snapshot.is_playing);
    let summary = snapshot.last_completion.expect("summary retained for the completion view");
    assert_eq!(summary.elapsed_secs, 1500);
    assert_eq!(summary.formatted_elapsed, "25:00");

    let mut completions = 0;
    loop {
        match events.try_recv() {
            Ok(FocusEvent::SessionCompleted(_)) => completions += 1,
            Ok(FocusEvent::StateChanged(_)) => {}
            Err(TryRecvError::Lagged(_)) => {}
            Err(_) => break,
        }
    }
    assert_eq!(completions, 1);
}

#[tokio::test(start_paused = true)]
async fn task_session_cascades_completion_onto_the_task() {
    let store = MockSessionStore::new().with_task(seeded_task("task1"));
    let controller = controller_with(&store);

    controller.start_session(Some("task1".into()), 1).await;
    controller.toggle_play().await;
    run_ticks(60).await;

    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].duration, 60);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].task_id.as_deref(), Some("task1"));
    assert!(store.task("task1").unwrap().completed);
}

#[tokio::test(start_paused = true)]
async fn abandoning_a_paused_session_discards_it() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 10).await;
    controller.toggle_play().await;
    run_ticks(3).await;
    controller.toggle_play().await;
    controller.on_leave_focus_page().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    assert_eq!(snapshot.last_completion, None);

    // The lazy create already ran, but nothing ever finalized it.
    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(!sessions[0].completed);
    assert!(store.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn leaving_the_page_while_playing_changes_nothing() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 10).await;
    controller.toggle_play().await;
    run_ticks(3).await;
    controller.on_leave_focus_page().await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::SessionActive);
    assert!(snapshot.is_playing);

    run_ticks(2).await;
    assert_eq!(controller.snapshot().remaining_secs, 595);
}

#[tokio::test(start_paused = true)]
async fn pausing_never_changes_total_ticks_to_zero() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 1).await;
    controller.toggle_play().await;
    run_ticks(30).await;
    controller.toggle_play().await;

    // A long pause contributes zero ticks.
    sleep(Duration::from_secs(100)).await;
    assert_eq!(controller.snapshot().remaining_secs, 30);

    controller.toggle_play().await;
    run_ticks(30).await;

    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].duration, 60);
}

#[tokio::test(start_paused = true)]
async fn seek_to_empty_while_playing_completes_at_full_elapsed() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.toggle_play().await;
    run_ticks(2).await;
    controller.seek_to_percent(0.0).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    let summary = snapshot.last_completion.unwrap();
    assert_eq!(summary.elapsed_secs, 1500);

    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].duration, 1500);
}

#[tokio::test(start_paused = true)]
async fn seek_to_full_rewinds_without_completing() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.toggle_play().await;
    run_ticks(5).await;
    controller.seek_to_percent(100.0).await;

    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::SessionActive);
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.remaining_secs, 1500);
    assert!(store.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn seeking_while_paused_is_local_only() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.seek_to_percent(0.0).await;

    // Paused at zero: no completion yet, nothing persisted.
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::SessionActive);
    assert_eq!(snapshot.remaining_secs, 0);
    assert!(store.is_empty());

    // Resuming a countdown already at zero finalizes it.
    controller.toggle_play().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(sessions[0].completed);
    assert_eq!(sessions[0].duration, 1500);
}

#[tokio::test(start_paused = true)]
async fn skip_forward_completes_and_skip_back_rewinds() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 10).await;
    controller.toggle_play().await;
    run_ticks(4).await;

    controller.skip_to_start().await;
    assert_eq!(controller.snapshot().remaining_secs, 600);

    controller.skip_to_end().await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    assert_eq!(snapshot.last_completion.unwrap().elapsed_secs, 600);
}

#[tokio::test(start_paused = true)]
async fn cancel_deletes_the_saved_record_and_returns_to_idle() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.toggle_play().await;
    run_ticks(2).await;
    controller.cancel_session().await;

    assert_eq!(controller.snapshot().view, FocusView::DurationSelect);
    assert!(store.is_empty());
    assert_eq!(store.deleted_ids().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancel_without_a_remote_record_still_returns_to_idle() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.cancel_session().await;

    assert_eq!(controller.snapshot().view, FocusView::DurationSelect);
    assert!(store.is_empty());
    assert!(store.deleted_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn cancel_returns_to_idle_even_when_the_delete_fails() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 25).await;
    controller.toggle_play().await;
    run_ticks(2).await;

    store.set_failing(true);
    controller.cancel_session().await;

    assert_eq!(controller.snapshot().view, FocusView::DurationSelect);
    assert_eq!(store.sessions().len(), 1);
    assert!(store.deleted_ids().is_empty());
}

#[tokio::test(start_paused = true)]
async fn completion_survives_a_failing_store() {
    let store = MockSessionStore::new().with_failures();
    let controller = controller_with(&store);

    controller.start_session(None, 1).await;
    controller.toggle_play().await;
    run_ticks(60).await;

    // Nothing persisted, but the machine finished cleanly and is reusable.
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    assert_eq!(snapshot.last_completion.unwrap().elapsed_secs, 60);
    assert!(store.is_empty());

    store.set_failing(false);
    controller.start_session(None, 25).await;
    assert_eq!(controller.snapshot().remaining_secs, 1500);
}

#[tokio::test(start_paused = true)]
async fn stale_create_response_is_discarded_after_cancel() {
    let store = MockSessionStore::new().with_create_delay(Duration::from_secs(5));
    let controller = controller_with(&store);

    controller.start_session(None, 10).await;
    controller.toggle_play().await;
    run_ticks(1).await;
    controller.cancel_session().await;

    // The create resolves after the session was reset; its id must not
    // resurrect into the idle controller.
    sleep(Duration::from_secs(10)).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.view, FocusView::DurationSelect);
    assert_eq!(snapshot.session_id, None);

    // The orphaned remote record exists but stays incomplete.
    let sessions = store.sessions();
    assert_eq!(sessions.len(), 1);
    assert!(!sessions[0].completed);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_durations_fall_back_to_the_default() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(None, 0).await;
    assert_eq!(controller.snapshot().planned_secs, 1500);

    controller.start_session(None, 121).await;
    assert_eq!(controller.snapshot().planned_secs, 1500);

    controller.start_session(None, 120).await;
    assert_eq!(controller.snapshot().planned_secs, 7200);
}

#[tokio::test(start_paused = true)]
async fn volume_percent_clamps_both_ways() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    assert_eq!(controller.set_volume(150.0), 100.0);
    assert_eq!(controller.volume(), 100.0);
    assert_eq!(controller.set_volume(-10.0), 0.0);
    assert_eq!(controller.volume(), 0.0);
}

#[tokio::test(start_paused = true)]
async fn starting_a_new_session_replaces_a_paused_one() {
    let store = MockSessionStore::new();
    let controller = controller_with(&store);

    controller.start_session(Some("task1".into()), 25).await;
    controller.toggle_play().await;
    run_ticks(3).await;
    controller.toggle_play().await;

    controller.start_session(None, 50).await;
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.planned_secs, 3000);
    assert_eq!(snapshot.remaining_secs, 3000);
    assert_eq!(snapshot.task_id, None);
    assert_eq!(snapshot.session_id, None);
    assert!(!snapshot.is_playing);
}
