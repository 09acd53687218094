use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::time::{self, Instant};

use super::*;
use crate::counter::tests::{FailingStore, FixedClock};
use crate::counter::WeekKey;
use crate::feedback::FEEDBACK_MESSAGES;
use crate::storage::{InMemoryKvStore, KvStore};
use crate::task::next_task_id;

/// Resolves after `delay` and counts its calls.
struct StubSource {
    calls: AtomicUsize,
    delay: Duration,
}

impl StubSource {
    fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TaskSource for StubSource {
    async fn fetch(&self) -> Task {
        self.calls.fetch_add(1, Ordering::SeqCst);
        time::sleep(self.delay).await;
        Task {
            id: next_task_id(),
            category: "音乐".to_string(),
            text: "听一首歌。".to_string(),
            minutes: "3".to_string(),
            soft: "真好听。".to_string(),
        }
    }
}

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
}

fn counter_over(store: Arc<dyn KvStore>) -> WeeklyCounter {
    WeeklyCounter::with_clock(store, Arc::new(FixedClock::new(today())))
}

async fn spawn_with(source: Arc<StubSource>) -> (InteractionController, InMemoryKvStore) {
    let store = InMemoryKvStore::new();
    let controller = InteractionController::spawn(
        source,
        counter_over(Arc::new(store.clone())),
        Timings::default(),
    )
    .await;
    (controller, store)
}

/// Collect state changes until `target` is entered.
async fn states_until(
    rx: &mut broadcast::Receiver<ControllerEvent>,
    target: InteractionState,
) -> Vec<(InteractionState, Option<Task>)> {
    let mut seen = Vec::new();
    loop {
        if let ControllerEvent::StateChanged { state, task } = rx.recv().await.unwrap() {
            seen.push((state, task));
            if state == target {
                return seen;
            }
        }
    }
}

fn states(seen: &[(InteractionState, Option<Task>)]) -> Vec<InteractionState> {
    seen.iter().map(|(s, _)| *s).collect()
}

#[tokio::test(start_paused = true)]
async fn starts_idle_with_stored_week_count() {
    let store = InMemoryKvStore::new();
    store
        .set(&WeekKey::for_date(today()).to_string(), "4")
        .await
        .unwrap();
    let controller = InteractionController::spawn(
        StubSource::new(Duration::ZERO),
        counter_over(Arc::new(store)),
        Timings::default(),
    )
    .await;

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.state, InteractionState::Idle);
    assert!(snapshot.task.is_none());
    assert!(snapshot.feedback.is_none());
    assert_eq!(snapshot.week_count, 4);
    assert!(controller.theme().await.is_none());
}

#[tokio::test(start_paused = true)]
async fn draw_runs_full_sequence_to_task_shown() {
    let (controller, _) = spawn_with(StubSource::new(Duration::from_millis(100))).await;
    let mut rx = controller.subscribe();
    let started = Instant::now();

    assert_eq!(controller.draw().await, CommandOutcome::Accepted);
    let seen = states_until(&mut rx, InteractionState::TaskShown).await;

    assert_eq!(
        states(&seen),
        vec![
            InteractionState::Drawing,
            InteractionState::Revealed,
            InteractionState::Hatching,
            InteractionState::TaskShown,
        ]
    );
    assert!(seen[0].1.is_none());
    let revealed = seen[1].1.clone().unwrap();
    assert_eq!(seen[3].1.as_ref().map(|t| t.id), Some(revealed.id));

    let timings = Timings::default();
    assert!(started.elapsed() >= timings.shake + timings.reveal + timings.hatch);

    let task = controller.active_task().await.unwrap();
    assert_eq!(task.id, revealed.id);
    assert_eq!(
        controller.theme().await,
        Some(crate::theme::resolve(&task.category))
    );
}

#[tokio::test(start_paused = true)]
async fn double_draw_runs_one_cycle() {
    let source = StubSource::new(Duration::ZERO);
    let (controller, _) = spawn_with(Arc::clone(&source)).await;
    let mut rx = controller.subscribe();

    let (first, second) = tokio::join!(controller.draw(), controller.draw());
    assert_eq!(first, CommandOutcome::Accepted);
    assert_eq!(second, CommandOutcome::Ignored);

    let seen = states_until(&mut rx, InteractionState::TaskShown).await;
    assert_eq!(seen.len(), 4);
    assert_eq!(source.calls(), 1);

    time::sleep(Duration::from_secs(10)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(controller.state().await, InteractionState::TaskShown);
}

#[tokio::test(start_paused = true)]
async fn draw_while_busy_or_shown_is_ignored() {
    let source = StubSource::new(Duration::ZERO);
    let (controller, _) = spawn_with(Arc::clone(&source)).await;
    let mut rx = controller.subscribe();

    controller.draw().await;
    states_until(&mut rx, InteractionState::Revealed).await;
    assert_eq!(controller.draw().await, CommandOutcome::Ignored);

    states_until(&mut rx, InteractionState::TaskShown).await;
    assert_eq!(controller.draw().await, CommandOutcome::Ignored);
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_holds_drawing() {
    let (controller, _) = spawn_with(StubSource::new(Duration::from_secs(5))).await;
    let mut rx = controller.subscribe();
    let started = Instant::now();

    controller.draw().await;
    time::sleep(Duration::from_secs(2)).await;
    assert_eq!(controller.state().await, InteractionState::Drawing);
    assert!(controller.active_task().await.is_none());

    states_until(&mut rx, InteractionState::Revealed).await;
    assert!(started.elapsed() >= Duration::from_secs(5));
}

#[tokio::test(start_paused = true)]
async fn fast_fetch_still_waits_for_shake() {
    let (controller, _) = spawn_with(StubSource::new(Duration::ZERO)).await;
    let mut rx = controller.subscribe();
    let started = Instant::now();

    controller.draw().await;
    states_until(&mut rx, InteractionState::Revealed).await;
    assert!(started.elapsed() >= Timings::default().shake);
}

#[tokio::test(start_paused = true)]
async fn complete_counts_once_and_returns_to_idle() {
    let (controller, store) = spawn_with(StubSource::new(Duration::ZERO)).await;
    let mut rx = controller.subscribe();

    controller.draw().await;
    states_until(&mut rx, InteractionState::TaskShown).await;
    let task = controller.active_task().await.unwrap();

    let completed_at = Instant::now();
    assert_eq!(controller.complete().await, CommandOutcome::Accepted);
    assert_eq!(controller.complete().await, CommandOutcome::Ignored);

    let snapshot = controller.snapshot().await;
    assert_eq!(snapshot.state, InteractionState::Completed);
    assert_eq!(snapshot.week_count, 1);
    assert_eq!(snapshot.task.map(|t| t.id), Some(task.id));
    let feedback = snapshot.feedback.unwrap();
    assert!(FEEDBACK_MESSAGES.contains(&feedback.as_str()));

    let key = WeekKey::for_date(today()).to_string();
    assert_eq!(store.get(&key).await.unwrap().as_deref(), Some("1"));

    let mut cleared = false;
    loop {
        match rx.recv().await.unwrap() {
            ControllerEvent::WeekCountChanged { count } => assert_eq!(count, 1),
            ControllerEvent::FeedbackShown { message } => assert_eq!(message, feedback),
            ControllerEvent::FeedbackCleared => cleared = true,
            ControllerEvent::StateChanged { state, task } => {
                if state == InteractionState::Idle {
                    assert!(cleared);
                    assert!(task.is_none());
                    break;
                }
            }
        }
    }

    let timings = Timings::default();
    assert!(completed_at.elapsed() >= timings.celebrate + timings.unwind);
    let snapshot = controller.snapshot().await;
    assert!(snapshot.task.is_none());
    assert!(snapshot.feedback.is_none());
    assert_eq!(snapshot.week_count, 1);
}

#[tokio::test(start_paused = true)]
async fn swap_discards_task_and_redraws() {
    let source = StubSource::new(Duration::ZERO);
    let (controller, _) = spawn_with(Arc::clone(&source)).await;
    let mut rx = controller.subscribe();

    controller.draw().await;
    states_until(&mut rx, InteractionState::TaskShown).await;
    let first = controller.active_task().await.unwrap();

    assert_eq!(controller.swap().await, CommandOutcome::Accepted);
    assert_eq!(controller.state().await, InteractionState::Idle);
    assert!(controller.active_task().await.is_none());

    let seen = states_until(&mut rx, InteractionState::TaskShown).await;
    assert_eq!(
        states(&seen),
        vec![
            InteractionState::Idle,
            InteractionState::Drawing,
            InteractionState::Revealed,
            InteractionState::Hatching,
            InteractionState::TaskShown,
        ]
    );
    for (_, task) in &seen {
        assert_ne!(task.as_ref().map(|t| t.id), Some(first.id));
    }

    let second = controller.active_task().await.unwrap();
    assert_ne!(second.id, first.id);
    assert_eq!(source.calls(), 2);
    assert_eq!(controller.week_count().await, 0);
}

#[tokio::test(start_paused = true)]
async fn draw_during_swap_pause_replaces_redraw() {
    let source = StubSource::new(Duration::ZERO);
    let (controller, _) = spawn_with(Arc::clone(&source)).await;
    let mut rx = controller.subscribe();

    controller.draw().await;
    states_until(&mut rx, InteractionState::TaskShown).await;

    controller.swap().await;
    assert_eq!(controller.draw().await, CommandOutcome::Accepted);
    states_until(&mut rx, InteractionState::TaskShown).await;

    time::sleep(Duration::from_secs(10)).await;
    assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(source.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn swap_and_complete_outside_task_shown_are_ignored() {
    let (controller, store) = spawn_with(StubSource::new(Duration::ZERO)).await;
    let mut rx = controller.subscribe();

    assert_eq!(controller.swap().await, CommandOutcome::Ignored);
    assert_eq!(controller.complete().await, CommandOutcome::Ignored);
    assert_eq!(controller.state().await, InteractionState::Idle);

    controller.draw().await;
    states_until(&mut rx, InteractionState::Hatching).await;
    assert_eq!(controller.swap().await, CommandOutcome::Ignored);
    assert_eq!(controller.complete().await, CommandOutcome::Ignored);

    assert_eq!(controller.week_count().await, 0);
    let key = WeekKey::for_date(today()).to_string();
    assert_eq!(store.get(&key).await.unwrap(), None);
}

#[tokio::test(start_paused = true)]
async fn storage_failure_keeps_counting_each_completion() {
    let controller = InteractionController::spawn(
        StubSource::new(Duration::ZERO),
        counter_over(Arc::new(FailingStore)),
        Timings::default(),
    )
    .await;
    let mut rx = controller.subscribe();
    assert_eq!(controller.week_count().await, 0);

    for expected in 1..=2 {
        controller.draw().await;
        states_until(&mut rx, InteractionState::TaskShown).await;
        assert_eq!(controller.complete().await, CommandOutcome::Accepted);
        assert_eq!(controller.week_count().await, expected);

        states_until(&mut rx, InteractionState::Idle).await;
        assert_eq!(controller.week_count().await, expected);
    }
}
