//! Edge interrupt dispatch
//!
//! Each GPIO line is either unarmed or armed with exactly one handler:
//!
//! ```text
//! Unarmed --attach_interrupt--> Armed --detach_interrupt--> Unarmed
//! ```
//!
//! An armed line owns an open edge source subscribed with the reactor for
//! urgent readiness. Each readiness event is decoded into an [`EdgeEvent`]
//! and handed to the line's [`EdgeHandler`].

mod dispatcher;

use bonemux_hal::{GpioLine, Level};

use crate::error::Error;

/// Value change observed on an armed line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EdgeEvent {
    /// Key of the pin the handler was attached through
    pub pin: &'static str,
    pub line: GpioLine,
    /// Value read after the edge
    pub value: Level,
}

/// Completion report for an event the handler produced output for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Notification {
    pub pin: &'static str,
    pub line: GpioLine,
    pub value: Level,
    /// Value returned by [`EdgeHandler::on_edge`]
    pub output: i32,
}

/// Interrupt handler
///
/// `on_complete` only runs for events where `on_edge` returned non-zero
/// output; `None` and `Some(0)` both mean no output.
/// Handlers run with no registry borrow held and may call back into the
/// runtime, including detaching themselves.
pub trait EdgeHandler {
    /// Called for every readiness event on the line
    fn on_edge(&mut self, event: &EdgeEvent) -> Option<i32>;

    /// Called after `on_edge` produced output
    fn on_complete(&mut self, notification: &Notification) {
        let _ = notification;
    }
}

impl<F> EdgeHandler for F
where
    F: FnMut(&EdgeEvent) -> Option<i32>,
{
    fn on_edge(&mut self, event: &EdgeEvent) -> Option<i32> {
        self(event)
    }
}

/// Result of `attach_interrupt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AttachStatus {
    pub pin: &'static str,
    /// Handler is registered and the source subscribed
    pub attached: bool,
    /// Why arming failed after validation passed
    pub error: Option<Error>,
}

/// Result of `detach_interrupt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetachStatus {
    pub pin: &'static str,
    /// A handler was registered and has been removed
    pub detached: bool,
}
