//! bonemux Hardware Abstraction Layer
//!
//! This crate defines the contracts between the pin-control core and the
//! collaborators that actually touch the board: the pin map that resolves
//! header identifiers, the board that reads and writes the kernel's GPIO,
//! PWM and ADC interfaces, and the readiness reactor that reports edge
//! interrupts.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  bonemux-core (Runtime, registry)       │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bonemux-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ sysfs board   │       │ bonemux-      │
//! │ (on target)   │       │ drivers::sim  │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`pin::PinMap`] - Pin identifier resolution
//! - [`board::Board`] - Mux, GPIO, ADC and PWM access
//! - [`gpio::EdgeSource`] - Open edge-triggered value file
//! - [`reactor::Reactor`] - Readiness notification for edge sources

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod error;
pub mod gpio;
pub mod pin;
pub mod pwm;
pub mod reactor;

// Re-export key types at crate root for convenience
pub use board::Board;
pub use error::HwError;
pub use gpio::{Direction, Edge, EdgeSource, GpioStatus, Level, PinState, Pull, Slew};
pub use pin::{GpioLine, MuxMode, PinDescriptor, PinMap, PwmCapability};
pub use pwm::PwmSetting;
pub use reactor::{Interest, ReadyEvent, Reactor, SourceId};
