//! 保存状态机：Idle → Submitting → {Succeeded, AuthExpired, Failed} → Idle。
//!
//! Save/recovery state machine.
//!
//! The machine is pure: [`SaveMachine::handle`] consumes one [`Event`] and returns the
//! [`Effect`]s to perform. Timers are tagged, so an expiry from an earlier phase is
//! ignored. The machine never retries a request on its own; retry means the user
//! submits again.

use super::affordance::{Affordance, EDITED_LABEL, SAVED_LABEL};
use crate::client::messages::{validate_input, SaveTarget};
use crate::config::UiDelays;
use crate::Error;
use std::time::Duration;
use tracing::debug;

pub type TimerId = u64;

pub const REAUTH_PROMPT: &str = "Your session has expired. Reload the page and sign in again?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveState {
    Idle,
    Submitting,
    Succeeded,
    AuthExpired,
    /// Waiting for the user's answer to the re-login prompt.
    ConfirmingReauth,
    Failed,
    /// Forced re-login started; the page is about to be replaced.
    Reauthenticating,
    /// Host window closed after a successful save.
    Closed,
}

impl SaveState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SaveState::Reauthenticating | SaveState::Closed)
    }
}

/// Recovery-relevant result of one save attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Succeeded,
    AuthExpired,
    Failed(String),
}

impl SaveOutcome {
    pub fn from_result<T>(result: &crate::Result<T>) -> Self {
        match result {
            Ok(_) => SaveOutcome::Succeeded,
            Err(e) => Self::from_error(e),
        }
    }

    pub fn from_error(error: &Error) -> Self {
        if error.is_session_error() {
            SaveOutcome::AuthExpired
        } else {
            SaveOutcome::Failed(error.user_message())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Submit(String),
    Completed(SaveOutcome),
    TimerElapsed(TimerId),
    ReauthAnswered(bool),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render(Affordance),
    /// Synchronous validation message; no request is made.
    Alert(String),
    /// Run the save with the trimmed text.
    StartSave(String),
    StartTimer { id: TimerId, after: Duration },
    PromptReauth(String),
    ForceRelogin,
    CloseWindow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AfterSuccess {
    CloseWindow,
    Reset,
}

/// Labels and delays of one editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavePolicy {
    pub success_label: &'static str,
    pub after_success: AfterSuccess,
    pub success_delay: Duration,
    pub reauth_delay: Duration,
    pub failure_reset: Duration,
}

impl SavePolicy {
    /// Edit flows close the host window after success when running inside the host client;
    /// the OCR flow always resets so the user can continue.
    pub fn for_target(target: &SaveTarget, delays: &UiDelays, in_client: bool) -> Self {
        match target {
            SaveTarget::SendText => Self {
                success_label: SAVED_LABEL,
                after_success: AfterSuccess::Reset,
                success_delay: delays.ocr_reset,
                reauth_delay: delays.reauth_prompt,
                failure_reset: delays.ocr_reset,
            },
            SaveTarget::EditExisting { .. } | SaveTarget::EditText => Self {
                success_label: if matches!(target, SaveTarget::EditExisting { .. }) {
                    EDITED_LABEL
                } else {
                    SAVED_LABEL
                },
                after_success: if in_client {
                    AfterSuccess::CloseWindow
                } else {
                    AfterSuccess::Reset
                },
                success_delay: delays.success,
                reauth_delay: delays.reauth_prompt,
                failure_reset: delays.failure_reset,
            },
        }
    }
}

pub struct SaveMachine {
    state: SaveState,
    policy: SavePolicy,
    input: String,
    timer: Option<TimerId>,
    next_timer: TimerId,
}

impl SaveMachine {
    pub fn new(policy: SavePolicy) -> Self {
        Self {
            state: SaveState::Idle,
            policy,
            input: String::new(),
            timer: None,
            next_timer: 0,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    /// Text of the last accepted submission, kept across failures and declined re-logins.
    pub fn input(&self) -> &str {
        &self.input
    }

    fn arm(&mut self, after: Duration) -> Effect {
        self.next_timer += 1;
        self.timer = Some(self.next_timer);
        Effect::StartTimer {
            id: self.next_timer,
            after,
        }
    }

    fn fire(&mut self, id: TimerId) -> bool {
        if self.timer == Some(id) {
            self.timer = None;
            true
        } else {
            false
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match (self.state, event) {
            (SaveState::Idle | SaveState::Failed, Event::Submit(text)) => {
                let trimmed = match validate_input(&text) {
                    Ok(trimmed) => trimmed.to_string(),
                    Err(e) => return vec![Effect::Alert(e.user_message())],
                };
                self.input = text;
                self.timer = None;
                self.state = SaveState::Submitting;
                vec![Effect::Render(Affordance::busy()), Effect::StartSave(trimmed)]
            }
            (SaveState::Submitting, Event::Completed(outcome)) => match outcome {
                SaveOutcome::Succeeded => {
                    self.state = SaveState::Succeeded;
                    vec![
                        Effect::Render(Affordance::succeeded(self.policy.success_label)),
                        self.arm(self.policy.success_delay),
                    ]
                }
                SaveOutcome::AuthExpired => {
                    self.state = SaveState::AuthExpired;
                    vec![
                        Effect::Render(Affordance::session_expired()),
                        self.arm(self.policy.reauth_delay),
                    ]
                }
                SaveOutcome::Failed(message) => {
                    debug!(message = message.as_str(), "save failed");
                    self.state = SaveState::Failed;
                    vec![
                        Effect::Render(Affordance::failed()),
                        self.arm(self.policy.failure_reset),
                    ]
                }
            },
            (SaveState::Succeeded, Event::TimerElapsed(id)) if self.fire(id) => {
                match self.policy.after_success {
                    AfterSuccess::CloseWindow => {
                        self.state = SaveState::Closed;
                        vec![Effect::CloseWindow]
                    }
                    AfterSuccess::Reset => {
                        self.state = SaveState::Idle;
                        vec![Effect::Render(Affordance::idle())]
                    }
                }
            }
            (SaveState::AuthExpired, Event::TimerElapsed(id)) if self.fire(id) => {
                self.state = SaveState::ConfirmingReauth;
                vec![Effect::PromptReauth(REAUTH_PROMPT.to_string())]
            }
            (SaveState::ConfirmingReauth, Event::ReauthAnswered(true)) => {
                self.state = SaveState::Reauthenticating;
                vec![Effect::ForceRelogin]
            }
            (SaveState::ConfirmingReauth, Event::ReauthAnswered(false)) => {
                self.state = SaveState::Idle;
                vec![Effect::Render(Affordance::idle())]
            }
            (SaveState::Failed, Event::TimerElapsed(id)) if self.fire(id) => {
                self.state = SaveState::Idle;
                vec![Effect::Render(Affordance::idle())]
            }
            (state, event) => {
                debug!(?state, ?event, "event ignored");
                Vec::new()
            }
        }
    }
}
