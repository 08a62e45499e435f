//! Button scanner
//!
//! Samples the seven button lines once per tick and advances the core
//! debounce machines. The scanner performs no waiting; the caller
//! drives it from a periodic tick and consumes the events each scan
//! returns.

use heapless::Vec;

use kywy_core::input::{ButtonBank, ButtonEvent, ButtonId, ButtonState, DebounceConfig};
use kywy_core::traits::InputPin;

/// The board's button lines, one pin per [`ButtonId`]
pub struct ButtonPins<P> {
    pub left: P,
    pub right: P,
    pub dup: P,
    pub ddown: P,
    pub dleft: P,
    pub dright: P,
    pub dcenter: P,
}

impl<P> ButtonPins<P> {
    /// Pins in scan order ([`ButtonId::ALL`])
    fn into_array(self) -> [P; ButtonId::COUNT] {
        [
            self.left,
            self.right,
            self.dup,
            self.ddown,
            self.dleft,
            self.dright,
            self.dcenter,
        ]
    }
}

/// Debouncing scanner over the full button set
pub struct ButtonScanner<P> {
    pins: [P; ButtonId::COUNT],
    bank: ButtonBank,
}

impl<P: InputPin> ButtonScanner<P> {
    pub fn new(pins: ButtonPins<P>, config: DebounceConfig) -> Self {
        Self {
            pins: pins.into_array(),
            bank: ButtonBank::new(config),
        }
    }

    /// Sample every button once and return this tick's confirmed events
    ///
    /// `now_ms` is a wrapping millisecond timestamp from a monotonic
    /// source. Events are in scan order; nothing is buffered for later
    /// calls.
    pub fn poll(&mut self, now_ms: u32) -> Vec<ButtonEvent, { ButtonId::COUNT }> {
        let mut levels = [false; ButtonId::COUNT];
        for (level, pin) in levels.iter_mut().zip(self.pins.iter()) {
            *level = pin.is_active();
        }
        self.bank.poll(now_ms, &levels)
    }

    /// Debounced state of one button
    pub fn state(&self, id: ButtonId) -> ButtonState {
        self.bank.state(id)
    }

    /// Returns true if the button is logically pressed
    pub fn is_pressed(&self, id: ButtonId) -> bool {
        self.bank.is_pressed(id)
    }
}
