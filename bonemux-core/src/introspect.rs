//! Pin state snapshots

use bonemux_hal::{Board, Direction, Level, PinMap, PinState, PwmSetting, Reactor};

use crate::error::{HwResultExt, Operation, Result};
use crate::runtime::Runtime;

/// GPIO part of a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct GpioSnapshot {
    /// Exported and enabled according to the kernel
    pub active: bool,
    pub direction: Direction,
    /// Allocated through this runtime
    pub allocated: bool,
    /// Last value read by the interrupt dispatcher, while the line is armed
    pub edge_value: Option<Level>,
}

/// Current configuration of one pin
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinModeSnapshot {
    pub pin: &'static str,
    pub name: &'static str,
    pub options: Option<&'static [&'static str]>,
    /// Only present while this pin owns its PWM channel
    pub pwm: Option<PwmSetting>,
    /// Present for pins with a GPIO line
    pub gpio: Option<GpioSnapshot>,
    pub pin_state: PinState,
}

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Read back a pin's current configuration
    ///
    /// Any failed read fails the whole snapshot.
    pub async fn inspect(&self, pin: &str) -> Result<PinModeSnapshot> {
        let pin = self.pin(pin)?;
        debug!("inspect({})", pin.key);

        let owned = pin
            .pwm_channel()
            .and_then(|channel| self.with_registry(|r| r.pwm(channel)))
            .filter(|entry| entry.owner == pin.key);
        let pwm = match owned {
            Some(entry) => Some(
                self.board
                    .read_pwm(&pin, entry.setting)
                    .await
                    .during(pin.key, Operation::ReadPwm)
                    .inspect_err(|e| error!("{}", e))?,
            ),
            None => None,
        };

        let gpio = match pin.gpio {
            Some(line) => {
                let status = self
                    .board
                    .read_gpio_direction(&pin)
                    .await
                    .during(pin.key, Operation::ReadDirection)
                    .inspect_err(|e| error!("{}", e))?;
                let (allocated, edge_value) =
                    self.with_registry(|r| (r.gpio_allocated(line), r.edge_value(line)));
                Some(GpioSnapshot {
                    active: status.active,
                    direction: status.direction,
                    allocated,
                    edge_value,
                })
            }
            None => None,
        };

        let pin_state = self
            .board
            .read_pin_state(&pin)
            .await
            .during(pin.key, Operation::ReadPinState)
            .inspect_err(|e| error!("{}", e))?;

        Ok(PinModeSnapshot {
            pin: pin.key,
            name: pin.name,
            options: pin.options,
            pwm,
            gpio,
            pin_state,
        })
    }
}
