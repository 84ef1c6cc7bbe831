//! Readiness notification reactor
//!
//! Edge interrupts on Linux are delivered as urgent (`EPOLLPRI`) readiness
//! on a GPIO value file. The reactor owns that notification mechanism; the
//! core only subscribes sources and consumes [`ReadyEvent`]s.

use crate::error::HwError;

/// Identifier of a subscribed source (e.g. a file descriptor)
pub type SourceId = u32;

/// Readiness interest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Interest {
    /// Urgent / priority data (edge interrupt on a sysfs value file)
    Urgent,
}

/// A source became ready
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReadyEvent {
    /// Source that became ready
    pub source: SourceId,
    /// Token supplied at subscription (the GPIO line)
    pub token: u16,
}

/// Readiness notification reactor
pub trait Reactor {
    /// Start watching a source
    fn subscribe(&self, source: SourceId, token: u16, interest: Interest) -> Result<(), HwError>;

    /// Stop watching a source
    ///
    /// Unsubscribing an unknown source is a no-op.
    fn unsubscribe(&self, source: SourceId);

    /// Wait for the next readiness event
    fn wait_ready(&self) -> impl core::future::Future<Output = ReadyEvent>;
}
