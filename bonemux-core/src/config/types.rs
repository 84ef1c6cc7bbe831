//! Configuration type definitions

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default PWM frequency when `analog_write` is called without one (Hz)
pub const DEFAULT_PWM_FREQUENCY_HZ: f32 = 2000.0;

/// Default analog level above which `digital_read` reports high
pub const DEFAULT_ANALOG_HIGH_THRESHOLD: f32 = 0.5;

/// Runtime configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuntimeConfig {
    /// Frequency used by `analog_write` when the caller passes none (Hz)
    pub default_pwm_frequency_hz: f32,
    /// Analog inputs read through `digital_read` are high above this value
    pub analog_high_threshold: f32,
    /// Release a pin's PWM channel when it is switched to a GPIO mode
    pub release_pwm_on_reconfigure: bool,
    /// Enable the analog input subsystem in `Runtime::init`
    pub enable_analog_inputs: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_pwm_frequency_hz: DEFAULT_PWM_FREQUENCY_HZ,
            analog_high_threshold: DEFAULT_ANALOG_HIGH_THRESHOLD,
            release_pwm_on_reconfigure: true,
            enable_analog_inputs: true,
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// TOML parsing failed
    TomlParse,
    /// A value is out of range
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TomlParse => f.write_str("TOML parse error"),
            ConfigError::Invalid(what) => write!(f, "invalid configuration: {}", what),
        }
    }
}

impl core::error::Error for ConfigError {}

impl RuntimeConfig {
    /// Check that all values are in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.default_pwm_frequency_hz.is_finite() || self.default_pwm_frequency_hz <= 0.0 {
            return Err(ConfigError::Invalid("default_pwm_frequency_hz must be positive"));
        }
        if !(0.0..=1.0).contains(&self.analog_high_threshold) {
            return Err(ConfigError::Invalid(
                "analog_high_threshold must be between 0 and 1",
            ));
        }
        Ok(())
    }

    /// Parse the `[runtime]` table of a TOML document
    ///
    /// Missing keys (or a missing table) take their default values.
    ///
    /// ```toml
    /// [runtime]
    /// default_pwm_frequency_hz = 500.0
    /// release_pwm_on_reconfigure = false
    /// ```
    #[cfg(feature = "toml")]
    pub fn from_toml(input: &str) -> Result<Self, ConfigError> {
        #[derive(Deserialize, Default)]
        struct Document {
            #[serde(default)]
            runtime: RuntimeConfig,
        }

        let doc: Document = toml::from_str(input).map_err(|_| {
            warn!("failed to parse runtime configuration");
            ConfigError::TomlParse
        })?;
        doc.runtime.validate()?;
        Ok(doc.runtime)
    }
}
