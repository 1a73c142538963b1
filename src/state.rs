//! State shared between the simulation loop and the algorithm's thread.
//!
//! One `SharedState` exists per simulation run. Every field is an atomic, so each read observes a
//! whole value and neither side ever blocks the other.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use serde::Deserialize;

pub const INPUT_BUTTON_COUNT: usize = 10;

/// Control surface an algorithm uses. Fixed for the lifetime of a run.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceType {
    Discrete,
    Continuous,
}

pub type SharedStateHandle = Arc<SharedState>;

#[derive(Debug)]
pub struct SharedState {
    interface_type: InterfaceType,
    paused: AtomicBool,
    crashed: AtomicBool,
    shutdown: AtomicBool,
    input_buttons: [AtomicBool; INPUT_BUTTON_COUNT],
}

impl SharedState {
    pub fn new(interface_type: InterfaceType) -> Self {
        Self {
            interface_type,
            paused: AtomicBool::new(false),
            crashed: AtomicBool::new(false),
            shutdown: AtomicBool::new(false),
            input_buttons: Default::default(),
        }
    }

    pub fn handle(interface_type: InterfaceType) -> SharedStateHandle {
        Arc::new(Self::new(interface_type))
    }

    pub fn interface_type(&self) -> InterfaceType {
        self.interface_type
    }

    pub fn paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Release);
    }

    pub fn crashed(&self) -> bool {
        self.crashed.load(Ordering::Acquire)
    }

    /// Latches the crashed flag. Returns whether this call was the one to set it.
    pub fn set_crashed(&self) -> bool {
        !self.crashed.swap(true, Ordering::AcqRel)
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }

    /// Asks the algorithm's thread to stop at its next interface call.
    pub fn request_shutdown(&self) {
        self.shutdown.store(true, Ordering::Release);
    }

    /// Whether a button has been pressed since it was last acknowledged. Unknown buttons read as
    /// not pressed.
    pub fn input_button_pressed(&self, button: usize) -> bool {
        self.input_buttons
            .get(button)
            .is_some_and(|b| b.load(Ordering::Acquire))
    }

    /// Unknown buttons are ignored.
    pub fn set_input_button_pressed(&self, button: usize, pressed: bool) {
        if let Some(b) = self.input_buttons.get(button) {
            b.store(pressed, Ordering::Release);
        }
    }
}
