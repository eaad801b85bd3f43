//! Runs [`SaveMachine`] effects against a real client and UI.

use super::affordance::Affordance;
use super::machine::{Effect, Event, SaveMachine, SaveOutcome, SavePolicy, SaveState, TimerId};
use crate::client::{EditorClient, SaveTarget};
use async_trait::async_trait;
use std::collections::VecDeque;
use tokio::time::Instant;
use tracing::{debug, info};

/// Presentation surface of an editor.
#[async_trait]
pub trait Ui: Send + Sync {
    fn render(&self, affordance: &Affordance);

    fn alert(&self, message: &str);

    /// Yes/no question; `true` means yes.
    async fn confirm(&self, message: &str) -> bool;
}

/// Failure reset armed while the control is usable again.
#[derive(Debug, Clone, Copy)]
struct PendingReset {
    id: TimerId,
    due: Instant,
}

/// Drives one editor's save control.
///
/// [`submit`](SaveDriver::submit) runs until the machine waits for the user: the next
/// submission, or the window closed / a re-login started. After a failure the control is
/// re-enabled right away and the reset is left pending; [`settle`](SaveDriver::settle)
/// waits for it, and a submission made earlier supersedes it.
pub struct SaveDriver<'a, U: Ui + ?Sized> {
    client: &'a EditorClient,
    ui: &'a U,
    target: SaveTarget,
    machine: SaveMachine,
    pending_reset: Option<PendingReset>,
}

impl<'a, U: Ui + ?Sized> SaveDriver<'a, U> {
    pub fn new(client: &'a EditorClient, ui: &'a U, target: SaveTarget) -> Self {
        let policy = SavePolicy::for_target(
            &target,
            &client.config().delays,
            client.session().is_in_client(),
        );
        Self::with_policy(client, ui, target, policy)
    }

    pub fn with_policy(
        client: &'a EditorClient,
        ui: &'a U,
        target: SaveTarget,
        policy: SavePolicy,
    ) -> Self {
        ui.render(&Affordance::idle());
        Self {
            client,
            ui,
            target,
            machine: SaveMachine::new(policy),
            pending_reset: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.machine.state()
    }

    pub fn input(&self) -> &str {
        self.machine.input()
    }

    pub fn target(&self) -> &SaveTarget {
        &self.target
    }

    pub fn has_pending_reset(&self) -> bool {
        self.pending_reset.is_some()
    }

    pub async fn submit(&mut self, text: &str) -> SaveState {
        if let Some(reset) = self.pending_reset {
            if reset.due <= Instant::now() {
                self.pending_reset = None;
                self.run(Event::TimerElapsed(reset.id)).await;
            }
        }
        self.run(Event::Submit(text.to_string())).await
    }

    /// Wait for a pending failure reset and apply it. Cancel-safe.
    pub async fn settle(&mut self) -> SaveState {
        let Some(reset) = self.pending_reset else {
            return self.machine.state();
        };
        tokio::time::sleep_until(reset.due).await;
        self.pending_reset = None;
        self.run(Event::TimerElapsed(reset.id)).await
    }

    async fn run(&mut self, event: Event) -> SaveState {
        let mut pending: VecDeque<Effect> = self.machine.handle(event).into();

        while let Some(effect) = pending.pop_front() {
            let next = match effect {
                Effect::Render(affordance) => {
                    self.ui.render(&affordance);
                    None
                }
                Effect::Alert(message) => {
                    self.ui.alert(&message);
                    None
                }
                Effect::StartSave(text) => {
                    // An accepted submission supersedes any pending reset.
                    self.pending_reset = None;
                    let result = self.client.save(&self.target, &text).await;
                    if let Err(e) = &result {
                        info!(error = %e, kind = ?e.kind(), "save did not complete");
                    }
                    Some(Event::Completed(SaveOutcome::from_result(&result)))
                }
                Effect::StartTimer { id, after } if self.machine.state() == SaveState::Failed => {
                    self.pending_reset = Some(PendingReset {
                        id,
                        due: Instant::now() + after,
                    });
                    None
                }
                Effect::StartTimer { id, after } => {
                    tokio::time::sleep(after).await;
                    Some(Event::TimerElapsed(id))
                }
                Effect::PromptReauth(message) => {
                    Some(Event::ReauthAnswered(self.ui.confirm(&message).await))
                }
                Effect::ForceRelogin => {
                    self.client.session().refresh_session().await;
                    None
                }
                Effect::CloseWindow => {
                    self.client.session().close_window().await;
                    None
                }
            };
            if let Some(event) = next {
                pending.extend(self.machine.handle(event));
            }
        }

        debug!(state = ?self.machine.state(), "save cycle settled");
        self.machine.state()
    }
}
