//! Controller actor: owns the state machine and applies every transition.
//!
//! Timers and fetches never touch state directly. They report a [`Tick`]
//! tagged with the cycle that scheduled it; ticks from an older cycle (one
//! that a swap or completion has since replaced) are dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::time::{self, Instant};

use super::{
    CommandOutcome, ControlCommand, ControllerEvent, InteractionState, Snapshot, Timings,
};
use crate::counter::WeeklyCounter;
use crate::feedback::random_feedback;
use crate::source::TaskSource;
use crate::task::Task;

#[derive(Debug)]
pub(super) struct Tick {
    cycle: u64,
    step: Step,
}

#[derive(Debug)]
enum Step {
    /// Shake elapsed and the fetch resolved
    Reveal(Task),
    Hatch,
    Show,
    Redraw,
    DismissFeedback,
    Reset,
}

pub(super) struct Actor {
    source: Arc<dyn TaskSource>,
    counter: WeeklyCounter,
    timings: Timings,
    snapshot: Arc<RwLock<Snapshot>>,
    events_tx: broadcast::Sender<ControllerEvent>,
    tick_tx: mpsc::UnboundedSender<Tick>,
    cycle: u64,
}

impl Actor {
    pub(super) fn new(
        source: Arc<dyn TaskSource>,
        counter: WeeklyCounter,
        timings: Timings,
        snapshot: Arc<RwLock<Snapshot>>,
        events_tx: broadcast::Sender<ControllerEvent>,
        tick_tx: mpsc::UnboundedSender<Tick>,
    ) -> Self {
        Self {
            source,
            counter,
            timings,
            snapshot,
            events_tx,
            tick_tx,
            cycle: 0,
        }
    }

    /// Process commands and ticks until every controller handle is dropped.
    pub(super) async fn run(
        mut self,
        mut cmd_rx: mpsc::Receiver<ControlCommand>,
        mut tick_rx: mpsc::UnboundedReceiver<Tick>,
    ) {
        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => match cmd {
                    Some(cmd) => self.handle_command(cmd).await,
                    None => break,
                },
                Some(tick) = tick_rx.recv() => self.handle_tick(tick).await,
            }
        }
        tracing::debug!("Interaction controller stopped");
    }

    async fn handle_command(&mut self, cmd: ControlCommand) {
        match cmd {
            ControlCommand::Draw { respond } => {
                let outcome = self.draw().await;
                let _ = respond.send(outcome);
            }
            ControlCommand::Swap { respond } => {
                let outcome = self.swap().await;
                let _ = respond.send(outcome);
            }
            ControlCommand::Complete { respond } => {
                let outcome = self.complete().await;
                let _ = respond.send(outcome);
            }
        }
    }

    async fn handle_tick(&mut self, tick: Tick) {
        if tick.cycle != self.cycle {
            tracing::debug!(
                "Dropping stale {:?} from cycle {} (current {})",
                tick.step,
                tick.cycle,
                self.cycle
            );
            return;
        }

        let state = self.state().await;
        match (state, tick.step) {
            (InteractionState::Drawing, Step::Reveal(task)) => {
                tracing::debug!("Task {} revealed ({})", task.id, task.category);
                self.enter(InteractionState::Revealed, |s| s.task = Some(task))
                    .await;
                self.schedule(self.timings.reveal, Step::Hatch);
            }
            (InteractionState::Revealed, Step::Hatch) => {
                self.enter(InteractionState::Hatching, |_| {}).await;
                self.schedule(self.timings.hatch, Step::Show);
            }
            (InteractionState::Hatching, Step::Show) => {
                self.enter(InteractionState::TaskShown, |_| {}).await;
            }
            (InteractionState::Idle, Step::Redraw) => {
                self.draw().await;
            }
            (InteractionState::Completed, Step::DismissFeedback) => {
                self.snapshot.write().await.feedback = None;
                self.emit(ControllerEvent::FeedbackCleared);
                self.schedule(self.timings.unwind, Step::Reset);
            }
            (InteractionState::Completed, Step::Reset) => {
                self.enter(InteractionState::Idle, |s| {
                    s.task = None;
                    s.feedback = None;
                })
                .await;
            }
            (state, step) => {
                tracing::warn!("Unexpected {:?} in state {}", step, state);
            }
        }
    }

    async fn draw(&mut self) -> CommandOutcome {
        let state = self.state().await;
        if state != InteractionState::Idle {
            tracing::debug!("Draw ignored in state {}", state);
            return CommandOutcome::Ignored;
        }

        self.cycle += 1;
        let cycle = self.cycle;
        self.enter(InteractionState::Drawing, |_| {}).await;

        let source = Arc::clone(&self.source);
        let tick_tx = self.tick_tx.clone();
        let shake = self.timings.shake;
        tokio::spawn(async move {
            let task = fetch_with_shake(source.as_ref(), shake).await;
            let _ = tick_tx.send(Tick {
                cycle,
                step: Step::Reveal(task),
            });
        });

        CommandOutcome::Accepted
    }

    async fn swap(&mut self) -> CommandOutcome {
        let (state, task_id) = {
            let snapshot = self.snapshot.read().await;
            (snapshot.state, snapshot.task.as_ref().map(|t| t.id))
        };
        if state != InteractionState::TaskShown {
            tracing::debug!("Swap ignored in state {}", state);
            return CommandOutcome::Ignored;
        }

        if let Some(id) = task_id {
            tracing::debug!("Discarding task {}", id);
        }
        self.cycle += 1;
        self.enter(InteractionState::Idle, |s| s.task = None).await;
        self.schedule(self.timings.swap_pause, Step::Redraw);
        CommandOutcome::Accepted
    }

    async fn complete(&mut self) -> CommandOutcome {
        let (state, task_id) = {
            let snapshot = self.snapshot.read().await;
            (snapshot.state, snapshot.task.as_ref().map(|t| t.id))
        };
        if state != InteractionState::TaskShown {
            tracing::debug!("Complete ignored in state {}", state);
            return CommandOutcome::Ignored;
        }

        self.cycle += 1;
        let count = self.counter.increment().await;
        let message = random_feedback().to_string();
        let shown = message.clone();
        self.enter(InteractionState::Completed, move |s| {
            s.week_count = count;
            s.feedback = Some(shown);
        })
        .await;
        self.emit(ControllerEvent::WeekCountChanged { count });
        self.emit(ControllerEvent::FeedbackShown { message });
        tracing::info!(
            "Task {} completed, {} this week",
            task_id.unwrap_or_default(),
            count
        );

        self.schedule(self.timings.celebrate, Step::DismissFeedback);
        CommandOutcome::Accepted
    }

    async fn state(&self) -> InteractionState {
        self.snapshot.read().await.state
    }

    /// Switch state, apply `update` under the same lock, and notify.
    async fn enter<F>(&self, next: InteractionState, update: F)
    where
        F: FnOnce(&mut Snapshot) + Send,
    {
        let task = {
            let mut snapshot = self.snapshot.write().await;
            let prev = snapshot.state;
            snapshot.state = next;
            update(&mut snapshot);
            tracing::debug!("State {} -> {}", prev, next);
            snapshot.task.clone()
        };
        self.emit(ControllerEvent::StateChanged { state: next, task });
    }

    fn emit(&self, event: ControllerEvent) {
        // No subscribers is fine.
        let _ = self.events_tx.send(event);
    }

    fn schedule(&self, delay: Duration, step: Step) {
        let tick = Tick {
            cycle: self.cycle,
            step,
        };
        let tick_tx = self.tick_tx.clone();
        tokio::spawn(async move {
            time::sleep(delay).await;
            let _ = tick_tx.send(tick);
        });
    }
}

/// Join the shake timer with the fetch: resolves once both are done.
async fn fetch_with_shake(source: &dyn TaskSource, shake: Duration) -> Task {
    let deadline = Instant::now() + shake;
    let mut fetch = source.fetch();
    tokio::select! {
        task = &mut fetch => {
            time::sleep_until(deadline).await;
            task
        }
        _ = time::sleep_until(deadline) => {
            tracing::debug!("Shake finished before the task resolved, waiting for it");
            fetch.await
        }
    }
}
