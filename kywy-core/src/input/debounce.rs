//! Debounce state machine
//!
//! Converts noisy raw pin levels into a clean stream of transition
//! events. A transition is confirmed only after the raw level has held
//! for the full debounce interval; a level that reverts earlier is
//! rejected as contact bounce and produces nothing.

use heapless::Vec;

use super::event::{ButtonEvent, ButtonId, ButtonState};

/// Debounce configuration
#[derive(Debug, Clone, Copy)]
pub struct DebounceConfig {
    /// Minimum time a raw level must hold before the transition is
    /// confirmed, in milliseconds. Must exceed mechanical contact bounce
    /// while staying below perceptible input latency.
    pub interval_ms: u32,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self { interval_ms: 20 }
    }
}

/// Per-button machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Stable released, raw inactive
    IdleReleased,
    /// Raw went active, waiting out the interval
    ConfirmingPress,
    /// Stable pressed, raw active
    IdlePressed,
    /// Raw went inactive, waiting out the interval
    ConfirmingRelease,
}

/// Debounce machine for a single button
///
/// Advanced by an external periodic tick via [`Debouncer::update`];
/// performs no waiting of its own. Elapsed time is measured against a
/// wrapping millisecond timestamp.
#[derive(Debug, Clone)]
pub struct Debouncer {
    phase: Phase,
    /// Timestamp at which the current confirming phase was entered
    since_ms: u32,
    interval_ms: u32,
}

impl Debouncer {
    /// Create a debouncer in the released state
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            phase: Phase::IdleReleased,
            since_ms: 0,
            interval_ms: config.interval_ms,
        }
    }

    /// Current logical state
    ///
    /// A transition being confirmed does not change the logical state
    /// until it completes.
    pub fn state(&self) -> ButtonState {
        match self.phase {
            Phase::IdleReleased | Phase::ConfirmingPress => ButtonState::Released,
            Phase::IdlePressed | Phase::ConfirmingRelease => ButtonState::Pressed,
        }
    }

    /// Advance the machine with one raw sample
    ///
    /// Returns the confirmed transition, if this sample completed one.
    /// Repeated samples of an unchanged level never re-emit.
    pub fn update(&mut self, now_ms: u32, raw_active: bool) -> Option<ButtonState> {
        match (self.phase, raw_active) {
            (Phase::IdleReleased, true) => {
                self.phase = Phase::ConfirmingPress;
                self.since_ms = now_ms;
                None
            }
            (Phase::IdleReleased, false) => None,

            (Phase::ConfirmingPress, true) => {
                if now_ms.wrapping_sub(self.since_ms) >= self.interval_ms {
                    self.phase = Phase::IdlePressed;
                    Some(ButtonState::Pressed)
                } else {
                    None
                }
            }
            // Bounce: reverted before the interval elapsed
            (Phase::ConfirmingPress, false) => {
                self.phase = Phase::IdleReleased;
                None
            }

            (Phase::IdlePressed, false) => {
                self.phase = Phase::ConfirmingRelease;
                self.since_ms = now_ms;
                None
            }
            (Phase::IdlePressed, true) => None,

            (Phase::ConfirmingRelease, false) => {
                if now_ms.wrapping_sub(self.since_ms) >= self.interval_ms {
                    self.phase = Phase::IdleReleased;
                    Some(ButtonState::Released)
                } else {
                    None
                }
            }
            (Phase::ConfirmingRelease, true) => {
                self.phase = Phase::IdlePressed;
                None
            }
        }
    }
}

/// Debounce machines for the full button set
///
/// One scan advances every button with the raw levels sampled on the
/// same tick and collects the confirmed transitions. Events within one
/// scan are ordered by [`ButtonId::ALL`].
#[derive(Debug, Clone)]
pub struct ButtonBank {
    debouncers: [Debouncer; ButtonId::COUNT],
}

impl Default for ButtonBank {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

impl ButtonBank {
    /// Create a bank with every button released
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            debouncers: [
                Debouncer::new(config),
                Debouncer::new(config),
                Debouncer::new(config),
                Debouncer::new(config),
                Debouncer::new(config),
                Debouncer::new(config),
                Debouncer::new(config),
            ],
        }
    }

    /// Advance every button with one tick's raw levels
    ///
    /// `levels` is indexed by scan order ([`ButtonId::ALL`]), `true`
    /// meaning the raw line reads active. Returns the events confirmed
    /// by this scan, in scan order; nothing is retained for later calls.
    pub fn poll(
        &mut self,
        now_ms: u32,
        levels: &[bool; ButtonId::COUNT],
    ) -> Vec<ButtonEvent, { ButtonId::COUNT }> {
        let mut events = Vec::new();
        for (id, (debouncer, &raw)) in ButtonId::ALL
            .iter()
            .zip(self.debouncers.iter_mut().zip(levels.iter()))
        {
            if let Some(state) = debouncer.update(now_ms, raw) {
                // Cannot overflow: one event per button per scan
                let _ = events.push(ButtonEvent {
                    id: *id,
                    state,
                    at_ms: now_ms,
                });
            }
        }
        events
    }

    /// Debounced state of one button
    pub fn state(&self, id: ButtonId) -> ButtonState {
        self.debouncers[id.index()].state()
    }

    /// Returns true if the button is logically pressed
    pub fn is_pressed(&self, id: ButtonId) -> bool {
        self.state(id) == ButtonState::Pressed
    }
}
