//! Board hardware access
//!
//! The [`Board`] trait is the only path from the core to the hardware. On a
//! BeagleBone it is backed by the universal-cape pinmux helper and the
//! kernel's sysfs GPIO/PWM/IIO files; off-target it is backed by a simulator.
//!
//! All methods take `&self`: the core runs on a single executor thread and
//! several operations may be suspended on the same board at once, so
//! implementations keep any mutable state behind interior mutability.

use core::future::Future;

use crate::error::HwError;
use crate::gpio::{Direction, Edge, EdgeSource, GpioStatus, Level, PinState};
use crate::pin::{MuxMode, PinDescriptor};
use crate::pwm::PwmSetting;

/// Hardware access for one board
pub trait Board {
    /// Open edge-triggered value file
    type EdgeSource: EdgeSource;

    /// Enable the analog input subsystem
    fn enable_analog_inputs(&self) -> impl Future<Output = Result<(), HwError>>;

    /// Route a pin to the given peripheral through the pinmux
    fn configure_mux(
        &self,
        pin: &PinDescriptor,
        mode: MuxMode,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Hand an LED pin over from its LED trigger to plain GPIO output
    fn configure_led(&self, pin: &PinDescriptor) -> impl Future<Output = Result<(), HwError>>;

    /// Export a GPIO line and set its direction
    fn export_gpio(
        &self,
        pin: &PinDescriptor,
        direction: Direction,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Read the kernel-reported direction of a GPIO line
    fn read_gpio_direction(
        &self,
        pin: &PinDescriptor,
    ) -> impl Future<Output = Result<GpioStatus, HwError>>;

    /// Read a GPIO value
    fn read_gpio(&self, pin: &PinDescriptor) -> impl Future<Output = Result<Level, HwError>>;

    /// Write a GPIO value
    fn write_gpio(
        &self,
        pin: &PinDescriptor,
        level: Level,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Write a GPIO value without suspending
    fn write_gpio_sync(&self, pin: &PinDescriptor, level: Level) -> Result<(), HwError>;

    /// Read an analog input, scaled to 0.0..=1.0
    fn read_analog(&self, pin: &PinDescriptor) -> impl Future<Output = Result<f32, HwError>>;

    /// Write frequency and duty cycle to the pin's PWM channel
    ///
    /// `previous` is the last setting written through the core, so
    /// implementations can skip rewriting an unchanged period.
    fn write_pwm(
        &self,
        pin: &PinDescriptor,
        previous: PwmSetting,
        freq_hz: f32,
        duty: f32,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Read back the PWM channel state
    ///
    /// Boards without read-back return `cached`, the last setting written
    /// through the core.
    fn read_pwm(
        &self,
        pin: &PinDescriptor,
        cached: PwmSetting,
    ) -> impl Future<Output = Result<PwmSetting, HwError>> {
        let _ = pin;
        core::future::ready(Ok(cached))
    }

    /// Enable the PWM output
    fn start_pwm(
        &self,
        pin: &PinDescriptor,
        setting: PwmSetting,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Disable the PWM output
    fn stop_pwm(
        &self,
        pin: &PinDescriptor,
        setting: PwmSetting,
    ) -> impl Future<Output = Result<(), HwError>>;

    /// Read the pin's electrical configuration from the pinmux
    fn read_pin_state(&self, pin: &PinDescriptor)
        -> impl Future<Output = Result<PinState, HwError>>;

    /// Write the edge trigger and open the GPIO value file for polling
    fn open_edge_source(&self, pin: &PinDescriptor, edge: Edge)
        -> Result<Self::EdgeSource, HwError>;

    /// Read the current value from an open edge source
    fn read_edge(&self, source: &mut Self::EdgeSource) -> Result<Level, HwError>;

    /// Release an edge source
    fn close_edge_source(&self, source: Self::EdgeSource) {
        drop(source);
    }
}
