//! Board-agnostic pin-control runtime
//!
//! This crate contains the logic that keeps concurrent callers from
//! corrupting each other's pin state, independent of how the board is
//! actually accessed:
//!
//! - Resource registry (GPIO allocations, interrupt registrations, PWM owners)
//! - Mode resolution and allocation
//! - PWM conflict detection and analog output
//! - Edge interrupt dispatch
//! - Bit-banged shift-out
//! - Pin state introspection
//! - Runtime configuration
//!
//! All operations are methods on [`Runtime`], which owns the pin map,
//! the board, the readiness reactor and the registry.

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

// This mod MUST go first, so that the others see its macros.
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod interrupt;
pub mod introspect;
pub mod mode;
pub mod protocol;
pub mod pwm;
pub mod registry;
pub mod runtime;

pub use config::{ConfigError, RuntimeConfig};
pub use error::{Capability, Error, Operation, Result};
pub use interrupt::{AttachStatus, DetachStatus, EdgeEvent, EdgeHandler, Notification};
pub use introspect::{GpioSnapshot, PinModeSnapshot};
pub use mode::{ModePlan, PinMode};
pub use protocol::{BitOrder, ShiftOut, ShiftStep};
pub use runtime::Runtime;
