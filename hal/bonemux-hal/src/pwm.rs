//! PWM value types

/// Frequency and duty cycle of a PWM output
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmSetting {
    /// Frequency in Hz (0 = never written)
    pub freq_hz: f32,
    /// Duty cycle as a fraction between 0.0 and 1.0
    pub duty: f32,
}

impl PwmSetting {
    /// Create a new setting
    pub const fn new(freq_hz: f32, duty: f32) -> Self {
        Self { freq_hz, duty }
    }
}
