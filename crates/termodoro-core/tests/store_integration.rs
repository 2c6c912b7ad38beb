//! Integration tests for the timer store.
//!
//! The store runs as a spawned task on a paused clock. `StoreHandle::snapshot`
//! round-trips through the task, so awaiting it guarantees every earlier
//! message has been applied.

use std::sync::Arc;
use std::time::Duration;

use termodoro_core::{
    Event, QueueWindow, SpeedPresets, StoreHandle, TimerCommand, TimerEngine, TimerMode,
    TimerSettings, TimerSnapshot, TimerStore, WindowRole,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;

fn spawn_store(settings: TimerSettings) -> StoreHandle {
    let store = TimerStore::new(TimerEngine::new(settings, SpeedPresets::default()));
    let (handle, _task) = store.spawn();
    handle
}

fn attach(handle: &StoreHandle, role: WindowRole) -> UnboundedReceiver<Event> {
    let (window, rx) = QueueWindow::new(role);
    handle.attach(Arc::new(window)).unwrap();
    rx
}

fn drain(rx: &mut UnboundedReceiver<Event>) -> Vec<TimerSnapshot> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::TimerStateUpdate(snapshot) = event {
            out.push(snapshot);
        }
    }
    out
}

#[tokio::test(start_paused = true)]
async fn attached_windows_see_identical_updates() {
    let handle = spawn_store(TimerSettings::default());
    let mut primary = attach(&handle, WindowRole::Primary);
    let mut popout = attach(&handle, WindowRole::Popout);
    handle.snapshot().await.unwrap();
    drain(&mut primary);
    drain(&mut popout);

    handle.dispatch(TimerCommand::Toggle).unwrap();
    sleep(Duration::from_millis(3500)).await;
    let now = handle.snapshot().await.unwrap();

    let primary_seen = drain(&mut primary);
    let popout_seen = drain(&mut popout);
    assert_eq!(primary_seen, popout_seen);
    assert_eq!(primary_seen.len(), 4);
    assert!(primary_seen[0].is_running);
    assert_eq!(primary_seen.last(), Some(&now));
    assert_eq!(now.time_remaining, 1497);
}

#[tokio::test(start_paused = true)]
async fn expiry_waits_for_debounce_then_advances() {
    let handle = spawn_store(TimerSettings::new(2, 5, 9, 4));
    handle.dispatch(TimerCommand::Toggle).unwrap();

    sleep(Duration::from_millis(2050)).await;
    let expired = handle.snapshot().await.unwrap();
    assert_eq!(expired.mode, TimerMode::Work);
    assert_eq!(expired.time_remaining, 0);

    // Skip is ignored while the transition is pending.
    handle.dispatch(TimerCommand::Skip).unwrap();
    let still = handle.snapshot().await.unwrap();
    assert_eq!(still.mode, TimerMode::Work);
    assert_eq!(still.completed_pomodoros, 0);

    sleep(Duration::from_millis(100)).await;
    let next = handle.snapshot().await.unwrap();
    assert_eq!(next.mode, TimerMode::ShortBreak);
    assert_eq!(next.time_remaining, 5);
    assert_eq!(next.completed_pomodoros, 1);
    assert!(next.is_running);
}

#[tokio::test(start_paused = true)]
async fn expiry_transitions_exactly_once() {
    let handle = spawn_store(TimerSettings::new(1, 60, 60, 4));
    let mut primary = attach(&handle, WindowRole::Primary);
    handle.dispatch(TimerCommand::Toggle).unwrap();

    sleep(Duration::from_millis(1500)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.mode, TimerMode::ShortBreak);
    assert_eq!(snap.completed_pomodoros, 1);

    let breaks = drain(&mut primary)
        .into_iter()
        .filter(|s| s.mode == TimerMode::ShortBreak && s.time_remaining == 60)
        .count();
    assert_eq!(breaks, 1);
}

#[tokio::test(start_paused = true)]
async fn stopping_cancels_ticks() {
    let handle = spawn_store(TimerSettings::default());
    handle.dispatch(TimerCommand::Toggle).unwrap();
    sleep(Duration::from_millis(1500)).await;
    handle.dispatch(TimerCommand::Toggle).unwrap();
    let paused = handle.snapshot().await.unwrap();
    assert_eq!(paused.time_remaining, 1499);
    assert!(!paused.is_running);

    sleep(Duration::from_secs(10)).await;
    assert_eq!(handle.snapshot().await.unwrap(), paused);
}

#[tokio::test(start_paused = true)]
async fn speed_change_while_running_speeds_up_countdown() {
    let handle = spawn_store(TimerSettings::default());
    handle.dispatch(TimerCommand::Toggle).unwrap();
    handle.dispatch(TimerCommand::ToggleSpeed).unwrap();

    sleep(Duration::from_millis(60)).await;
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.speed_multiplier.factor(), 60);
    assert!(snap.time_remaining <= 1500 - 120, "remaining {}", snap.time_remaining);
    assert_eq!(snap.time_remaining % 60, 0);

    handle.dispatch(TimerCommand::ToggleSpeed).unwrap();
    let back = handle.snapshot().await.unwrap();
    sleep(Duration::from_millis(1500)).await;
    let later = handle.snapshot().await.unwrap();
    assert_eq!(later.speed_multiplier.factor(), 1);
    assert_eq!(back.time_remaining - later.time_remaining, 1);
}

#[tokio::test(start_paused = true)]
async fn settings_reload_paused_session() {
    let handle = spawn_store(TimerSettings::default());
    handle
        .dispatch(TimerCommand::UpdateSettings(TimerSettings::new(600, 120, 0, 2)))
        .unwrap();
    let snap = handle.snapshot().await.unwrap();
    assert_eq!(snap.time_remaining, 600);
    assert_eq!(snap.settings.long_break_duration, 1);
    assert_eq!(snap.pomodoros_until_long_break, 2);
}

#[tokio::test(start_paused = true)]
async fn snapshot_requests_do_not_change_state() {
    let handle = spawn_store(TimerSettings::default());
    let mut primary = attach(&handle, WindowRole::Primary);
    handle.request_snapshot(WindowRole::Primary).unwrap();
    handle.request_snapshot(WindowRole::Primary).unwrap();
    let current = handle.snapshot().await.unwrap();

    let seen = drain(&mut primary);
    assert_eq!(seen.len(), 3);
    assert!(seen.iter().all(|s| *s == current));
}

#[tokio::test(start_paused = true)]
async fn closed_window_does_not_block_broadcast() {
    let handle = spawn_store(TimerSettings::default());
    let primary = attach(&handle, WindowRole::Primary);
    let mut popout = attach(&handle, WindowRole::Popout);
    handle.snapshot().await.unwrap();
    drain(&mut popout);
    drop(primary);

    handle.dispatch(TimerCommand::Skip).unwrap();
    handle.snapshot().await.unwrap();
    let seen = drain(&mut popout);
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].mode, TimerMode::ShortBreak);
}

#[tokio::test(start_paused = true)]
async fn shutdown_stops_the_task() {
    let store = TimerStore::new(TimerEngine::default());
    let (handle, task) = store.spawn();
    handle.shutdown().unwrap();
    task.await.unwrap();
    assert!(handle.is_closed());
    assert!(handle.snapshot().await.is_err());
}
