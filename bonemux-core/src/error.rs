//! Runtime errors
//!
//! Caller-contract violations are reported before any hardware is touched.
//! Hardware failures carry the operation and pin they happened on.

use core::fmt;

use bonemux_hal::HwError;

/// Pin capability required by an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Capability {
    Gpio,
    Pwm,
    AnalogInput,
    /// LED pins only support plain output
    LedOutput,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::Gpio => "GPIO",
            Capability::Pwm => "PWM",
            Capability::AnalogInput => "analog input",
            Capability::LedOutput => "LED output",
        }
    }
}

/// Board operation that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Operation {
    EnableAnalog,
    ConfigureMux,
    ConfigureLed,
    ExportGpio,
    ReadDirection,
    ReadGpio,
    WriteGpio,
    ReadAnalog,
    WritePwm,
    ReadPwm,
    StartPwm,
    StopPwm,
    ReadPinState,
    OpenEdgeSource,
    ReadEdgeSource,
    Subscribe,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::EnableAnalog => "enable analog inputs",
            Operation::ConfigureMux => "configure pinmux",
            Operation::ConfigureLed => "configure LED",
            Operation::ExportGpio => "export GPIO",
            Operation::ReadDirection => "read GPIO direction",
            Operation::ReadGpio => "read GPIO",
            Operation::WriteGpio => "write GPIO",
            Operation::ReadAnalog => "read analog input",
            Operation::WritePwm => "write PWM",
            Operation::ReadPwm => "read PWM",
            Operation::StartPwm => "start PWM",
            Operation::StopPwm => "stop PWM",
            Operation::ReadPinState => "read pin state",
            Operation::OpenEdgeSource => "open edge source",
            Operation::ReadEdgeSource => "read edge source",
            Operation::Subscribe => "subscribe edge source",
        }
    }
}

/// Errors returned by [`crate::Runtime`] operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Malformed argument (mode token, bit order, duty cycle, frequency)
    InvalidArgument(&'static str),
    /// Pin identifier does not resolve to a header pin
    PinNotFound,
    /// Pin lacks the capability the operation needs
    UnsupportedCapability {
        pin: &'static str,
        capability: Capability,
    },
    /// PWM channel is owned by another pin
    ResourceConflict {
        pin: &'static str,
        channel: &'static str,
        owner: &'static str,
    },
    /// GPIO line has not been allocated through `set_mode`
    NotConfigured { pin: &'static str },
    /// An interrupt handler is already registered for the line
    AlreadyArmed { pin: &'static str },
    /// Registry capacity exhausted
    RegistryFull,
    /// Board or reactor call failed
    Hardware {
        pin: &'static str,
        op: Operation,
        source: HwError,
    },
}

impl Error {
    /// Wrap a hardware error with its context
    pub fn hardware(pin: &'static str, op: Operation, source: HwError) -> Self {
        Error::Hardware { pin, op, source }
    }

    /// Check if this is a hardware failure (as opposed to a rejected request)
    pub fn is_hardware(&self) -> bool {
        matches!(self, Error::Hardware { .. })
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
            Error::PinNotFound => f.write_str("pin not found"),
            Error::UnsupportedCapability { pin, capability } => {
                write!(f, "{} does not support {}", pin, capability.as_str())
            }
            Error::ResourceConflict {
                pin,
                channel,
                owner,
            } => write!(f, "{} requires {} but it is used by {}", pin, channel, owner),
            Error::NotConfigured { pin } => write!(f, "{} is not configured as GPIO", pin),
            Error::AlreadyArmed { pin } => write!(f, "{} already has an interrupt handler", pin),
            Error::RegistryFull => f.write_str("registry full"),
            Error::Hardware { pin, op, source } => {
                write!(f, "{} failed on {}: {}", op.as_str(), pin, source)
            }
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Hardware { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Result type for runtime operations
pub type Result<T> = core::result::Result<T, Error>;

/// Attach pin and operation context to a hardware result
pub(crate) trait HwResultExt<T> {
    fn during(self, pin: &'static str, op: Operation) -> Result<T>;
}

impl<T> HwResultExt<T> for core::result::Result<T, HwError> {
    fn during(self, pin: &'static str, op: Operation) -> Result<T> {
        self.map_err(|e| Error::hardware(pin, op, e))
    }
}
