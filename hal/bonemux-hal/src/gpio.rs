//! GPIO value types and edge sources
//!
//! Provides the logical level, direction and edge types shared between the
//! core and board implementations, plus the [`EdgeSource`] trait for an
//! open edge-triggered GPIO value file.

use crate::reactor::SourceId;

/// Logical level of a digital pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    /// Logic 0
    #[default]
    Low,
    /// Logic 1
    High,
}

impl Level {
    /// Check if the level is high (logic 1)
    pub fn is_high(self) -> bool {
        self == Level::High
    }

    /// Check if the level is low (logic 0)
    pub fn is_low(self) -> bool {
        !self.is_high()
    }

    /// Numeric value (0 or 1)
    pub fn as_u8(self) -> u8 {
        match self {
            Level::Low => 0,
            Level::High => 1,
        }
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// Any non-zero value is high
impl From<u8> for Level {
    fn from(value: u8) -> Self {
        Level::from(value != 0)
    }
}

impl From<Level> for bool {
    fn from(level: Level) -> Self {
        level.is_high()
    }
}

/// GPIO direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Input ("in")
    #[default]
    In,
    /// Output ("out")
    Out,
}

impl Direction {
    /// Name written to the sysfs direction file
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
        }
    }
}

/// Edge trigger for GPIO interrupts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// Low to high transition
    Rising,
    /// High to low transition
    Falling,
    /// Any transition
    Both,
}

impl Edge {
    /// Name written to the sysfs edge file
    pub fn as_str(self) -> &'static str {
        match self {
            Edge::Rising => "rising",
            Edge::Falling => "falling",
            Edge::Both => "both",
        }
    }

    /// Check if a transition from `from` to `to` triggers this edge
    pub fn triggers(self, from: Level, to: Level) -> bool {
        match self {
            Edge::Rising => from.is_low() && to.is_high(),
            Edge::Falling => from.is_high() && to.is_low(),
            Edge::Both => from != to,
        }
    }
}

/// Kernel-reported status of a GPIO line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioStatus {
    /// Line is exported and enabled by the kernel
    pub active: bool,
    /// Current direction
    pub direction: Direction,
}

/// Internal pull resistor setting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    /// No pull resistor
    #[default]
    Disabled,
    /// Pull-up enabled
    PullUp,
    /// Pull-down enabled
    PullDown,
}

/// Output slew rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Slew {
    /// Fast edges
    #[default]
    Fast,
    /// Slow edges
    Slow,
}

/// Electrical configuration of a pin as reported by the pinmux
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinState {
    /// Index of the selected mux mode
    pub mux: u8,
    /// Pull resistor setting
    pub pull: Pull,
    /// Slew rate
    pub slew: Slew,
    /// Input receiver enabled
    pub receiver_enabled: bool,
}

/// Open edge-triggered GPIO value file
///
/// Created by [`crate::Board::open_edge_source`]. Reading goes through the
/// board so implementations can keep the handle as plain data (e.g. an fd).
pub trait EdgeSource {
    /// Identifier registered with the readiness reactor
    fn id(&self) -> SourceId;
}
