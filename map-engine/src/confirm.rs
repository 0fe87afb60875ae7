//! Two-step delete confirmation
//!
//! Destructive actions arm on the first request and execute on the
//! second request for the same target inside the window. Focus loss or
//! timeout disarms. A tiny state machine rather than ad hoc booleans,
//! because the cancellation edge is part of the contract.

use std::time::{Duration, Instant};

/// How long an armed confirmation stays live
pub const CONFIRM_WINDOW: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum GateState {
    Disarmed,
    Armed { target: String, armed_at: Instant },
}

/// Result of a confirmation request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmOutcome {
    /// First request: armed, waiting for the confirming second request
    Armed,
    /// Second request inside the window: execute the action now
    Fired,
}

/// Per-action confirmation gate
#[derive(Debug)]
pub struct ConfirmGate {
    state: GateState,
    window: Duration,
}

impl Default for ConfirmGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfirmGate {
    pub fn new() -> Self {
        Self::with_window(CONFIRM_WINDOW)
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            state: GateState::Disarmed,
            window,
        }
    }

    /// Request the destructive action for `target`
    ///
    /// Arms on first request; fires when the same target is requested
    /// again inside the window. Requesting a different target re-arms
    /// for that target instead of firing.
    pub fn request(&mut self, target: &str) -> ConfirmOutcome {
        if let GateState::Armed { target: armed, armed_at } = &self.state {
            if armed == target && armed_at.elapsed() <= self.window {
                self.state = GateState::Disarmed;
                return ConfirmOutcome::Fired;
            }
        }
        self.state = GateState::Armed {
            target: target.to_string(),
            armed_at: Instant::now(),
        };
        ConfirmOutcome::Armed
    }

    /// Focus loss: drop any armed state
    pub fn blur(&mut self) {
        self.state = GateState::Disarmed;
    }

    /// Whether `target` is currently armed (for UI emphasis)
    pub fn is_armed_for(&self, target: &str) -> bool {
        matches!(
            &self.state,
            GateState::Armed { target: armed, armed_at }
                if armed == target && armed_at.elapsed() <= self.window
        )
    }
}
