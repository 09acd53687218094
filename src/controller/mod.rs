//! Interaction controller: the draw → egg → hatch → task state machine.
//!
//! The controller is an actor. [`InteractionController`] is a cheap handle
//! that queues commands to a single task which owns all state; timers and the
//! task fetch run as spawned tasks that report back to it.
//!
//! ```text
//!   Idle ──draw──▶ Drawing ──max(shake, fetch)──▶ Revealed ──reveal──▶ Hatching
//!    ▲                                                                    │
//!    │                                                                  hatch
//!    │                                                                    ▼
//!    ├──◀──swap (then auto draw after swap_pause)────────────────── TaskShown
//!    │                                                                    │
//!    └──◀──celebrate + unwind──── Completed ◀──────────complete───────────┘
//! ```
//!
//! `draw` is only accepted in `Idle`; `swap` and `complete` only in
//! `TaskShown`. Anything else is ignored, never an error.

mod actor;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{broadcast, mpsc, oneshot, RwLock};

use crate::counter::WeeklyCounter;
use crate::source::TaskSource;
use crate::task::Task;
use crate::theme::{self, ThemeDescriptor};

/// Visual/interaction state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionState {
    Idle,
    /// Machine shaking; task fetch in flight
    Drawing,
    /// Egg rolled out, coloured by the resolved task's theme
    Revealed,
    /// Egg cracking; task still hidden
    Hatching,
    /// Task, theme and actions visible
    TaskShown,
    /// Celebrating a completed task; returns to idle by itself
    Completed,
}

impl InteractionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            InteractionState::Idle => "idle",
            InteractionState::Drawing => "drawing",
            InteractionState::Revealed => "revealed",
            InteractionState::Hatching => "hatching",
            InteractionState::TaskShown => "task_shown",
            InteractionState::Completed => "completed",
        }
    }

    /// Whether a draw is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            InteractionState::Drawing | InteractionState::Revealed | InteractionState::Hatching
        )
    }
}

impl fmt::Display for InteractionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed animation durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Minimum time in `Drawing`
    pub shake: Duration,
    /// Time in `Revealed`
    pub reveal: Duration,
    /// Time in `Hatching`
    pub hatch: Duration,
    /// Empty pause between a swap and the automatic redraw
    pub swap_pause: Duration,
    /// Time the feedback message stays up after completing
    pub celebrate: Duration,
    /// Gap between clearing the feedback and returning to `Idle`
    pub unwind: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            shake: Duration::from_millis(1000),
            reveal: Duration::from_millis(2000),
            hatch: Duration::from_millis(1200),
            swap_pause: Duration::from_millis(300),
            celebrate: Duration::from_millis(2500),
            unwind: Duration::from_millis(500),
        }
    }
}

/// Result of a UI command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    Accepted,
    /// Not valid in the current state; nothing changed
    Ignored,
}

/// Read-only view of the controller.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub state: InteractionState,
    pub task: Option<Task>,
    pub week_count: u32,
    pub feedback: Option<String>,
}

impl Snapshot {
    /// Theme of the active task, if any.
    pub fn theme(&self) -> Option<ThemeDescriptor> {
        self.task.as_ref().map(|t| theme::resolve(&t.category))
    }
}

/// Notifications for the rendering layer.
#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged {
        state: InteractionState,
        task: Option<Task>,
    },
    FeedbackShown {
        message: String,
    },
    FeedbackCleared,
    WeekCountChanged {
        count: u32,
    },
}

/// Commands queued to the actor.
#[derive(Debug)]
enum ControlCommand {
    Draw {
        respond: oneshot::Sender<CommandOutcome>,
    },
    Swap {
        respond: oneshot::Sender<CommandOutcome>,
    },
    Complete {
        respond: oneshot::Sender<CommandOutcome>,
    },
}

/// Handle to a running controller. Dropping every clone stops the actor.
#[derive(Clone)]
pub struct InteractionController {
    cmd_tx: mpsc::Sender<ControlCommand>,
    events_tx: broadcast::Sender<ControllerEvent>,
    snapshot: Arc<RwLock<Snapshot>>,
}

impl InteractionController {
    /// Read the current week count and spawn the controller actor.
    pub async fn spawn(
        source: Arc<dyn TaskSource>,
        counter: WeeklyCounter,
        timings: Timings,
    ) -> Self {
        let week_count = counter.get().await;
        let (cmd_tx, cmd_rx) = mpsc::channel::<ControlCommand>(32);
        let (events_tx, _) = broadcast::channel::<ControllerEvent>(64);
        let snapshot = Arc::new(RwLock::new(Snapshot {
            state: InteractionState::Idle,
            task: None,
            week_count,
            feedback: None,
        }));

        tracing::info!("Interaction controller started (week count {})", week_count);

        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        let actor = actor::Actor::new(
            source,
            counter,
            timings,
            Arc::clone(&snapshot),
            events_tx.clone(),
            tick_tx,
        );
        tokio::spawn(actor.run(cmd_rx, tick_rx));

        Self {
            cmd_tx,
            events_tx,
            snapshot,
        }
    }

    /// Start a draw. Ignored unless idle.
    pub async fn draw(&self) -> CommandOutcome {
        self.send(|respond| ControlCommand::Draw { respond }).await
    }

    /// Discard the shown task and draw a new one. Ignored unless a task is shown.
    pub async fn swap(&self) -> CommandOutcome {
        self.send(|respond| ControlCommand::Swap { respond }).await
    }

    /// Mark the shown task as done. Ignored unless a task is shown.
    pub async fn complete(&self) -> CommandOutcome {
        self.send(|respond| ControlCommand::Complete { respond }).await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events_tx.subscribe()
    }

    pub async fn snapshot(&self) -> Snapshot {
        self.snapshot.read().await.clone()
    }

    pub async fn state(&self) -> InteractionState {
        self.snapshot.read().await.state
    }

    pub async fn active_task(&self) -> Option<Task> {
        self.snapshot.read().await.task.clone()
    }

    pub async fn theme(&self) -> Option<ThemeDescriptor> {
        self.snapshot.read().await.theme()
    }

    pub async fn week_count(&self) -> u32 {
        self.snapshot.read().await.week_count
    }

    pub async fn feedback(&self) -> Option<String> {
        self.snapshot.read().await.feedback.clone()
    }

    async fn send<F>(&self, build: F) -> CommandOutcome
    where
        F: FnOnce(oneshot::Sender<CommandOutcome>) -> ControlCommand,
    {
        let (tx, rx) = oneshot::channel();
        if let Err(e) = self.cmd_tx.send(build(tx)).await {
            tracing::error!("Failed to send controller command: {}", e);
            return CommandOutcome::Ignored;
        }
        match rx.await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!("Failed to receive controller response: {}", e);
                CommandOutcome::Ignored
            }
        }
    }
}

#[cfg(test)]
mod tests;
