//! Hardware collaborator errors

use core::fmt;

/// Errors reported by a board or reactor implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HwError {
    /// Kernel interface (value file, pinmux entry, PWM device) not present
    NotFound,
    /// Read or write on the kernel interface failed
    Io,
    /// Interface is held by another driver
    Busy,
    /// Operation not available for this pin or on this board
    Unsupported,
    /// Value rejected by the kernel interface
    InvalidValue,
    /// GPIO line was not exported before use
    NotExported,
    /// Operation did not complete in time
    Timeout,
}

impl fmt::Display for HwError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            HwError::NotFound => "interface not found",
            HwError::Io => "I/O error",
            HwError::Busy => "interface busy",
            HwError::Unsupported => "operation not supported",
            HwError::InvalidValue => "invalid value",
            HwError::NotExported => "GPIO not exported",
            HwError::Timeout => "timed out",
        };
        f.write_str(msg)
    }
}

impl core::error::Error for HwError {}
