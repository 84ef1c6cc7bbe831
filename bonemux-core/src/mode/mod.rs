//! Pin mode resolution
//!
//! A requested [`PinMode`] is turned into a [`ModePlan`] before anything
//! is suspended: the mux setting and direction to apply, and which
//! registry entry the mode is backed by. The allocator then executes the
//! plan against the board.

mod allocator;

use core::str::FromStr;

use bonemux_hal::{Direction, GpioLine, MuxMode, PinDescriptor};

use crate::error::{Capability, Error, Result};

/// Logical pin mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    Input,
    Output,
    InputPullUp,
    InputPullDown,
    /// PWM output
    AnalogOutput,
}

impl PinMode {
    /// Every mode, in declaration order
    pub const ALL: [PinMode; 5] = [
        PinMode::Input,
        PinMode::Output,
        PinMode::InputPullUp,
        PinMode::InputPullDown,
        PinMode::AnalogOutput,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PinMode::Input => "INPUT",
            PinMode::Output => "OUTPUT",
            PinMode::InputPullUp => "INPUT_PULLUP",
            PinMode::InputPullDown => "INPUT_PULLDOWN",
            PinMode::AnalogOutput => "ANALOG_OUTPUT",
        }
    }

    /// Mux setting and direction for this mode
    pub fn resolve(self) -> (MuxMode, Direction) {
        match self {
            PinMode::InputPullUp => (MuxMode::GpioPullUp, Direction::In),
            PinMode::InputPullDown => (MuxMode::GpioPullDown, Direction::In),
            PinMode::Input => (MuxMode::Gpio, Direction::In),
            PinMode::Output => (MuxMode::Gpio, Direction::Out),
            PinMode::AnalogOutput => (MuxMode::Pwm, Direction::Out),
        }
    }

    /// Check if the mode is backed by a GPIO line
    pub fn is_gpio(self) -> bool {
        self.resolve().0.is_gpio()
    }
}

impl FromStr for PinMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INPUT" | "in" => Ok(PinMode::Input),
            "OUTPUT" | "out" => Ok(PinMode::Output),
            "INPUT_PULLUP" | "in_pullup" => Ok(PinMode::InputPullUp),
            "INPUT_PULLDOWN" | "in_pulldown" => Ok(PinMode::InputPullDown),
            "ANALOG_OUTPUT" | "analog_out" => Ok(PinMode::AnalogOutput),
            _ => Err(Error::InvalidArgument("unknown pin mode")),
        }
    }
}

/// Registry entry a mode is backed by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Route {
    /// On-board LED, released from its trigger instead of exported
    Led(GpioLine),
    /// Exported GPIO line
    Gpio(GpioLine),
    /// PWM channel
    Pwm(&'static str),
}

/// Validated mode change for one pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ModePlan {
    pub pin: PinDescriptor,
    pub mode: PinMode,
    pub mux: MuxMode,
    pub direction: Direction,
    pub route: Route,
}

impl ModePlan {
    /// Check the pin's capabilities against the mode
    pub fn new(pin: PinDescriptor, mode: PinMode) -> Result<Self> {
        let unsupported = |capability| Error::UnsupportedCapability {
            pin: pin.key,
            capability,
        };
        let (mux, direction) = mode.resolve();

        let route = if pin.led {
            if mode != PinMode::Output {
                return Err(unsupported(Capability::LedOutput));
            }
            Route::Led(pin.gpio.ok_or(unsupported(Capability::Gpio))?)
        } else if mode == PinMode::AnalogOutput {
            Route::Pwm(pin.pwm_channel().ok_or(unsupported(Capability::Pwm))?)
        } else {
            Route::Gpio(pin.gpio.ok_or(unsupported(Capability::Gpio))?)
        };

        Ok(Self {
            pin,
            mode,
            mux,
            direction,
            route,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bonemux_drivers::header::BEAGLEBONE_BLACK;
    use bonemux_hal::PinMap;
    use proptest::prelude::*;

    fn pin(id: &str) -> PinDescriptor {
        BEAGLEBONE_BLACK.lookup(id).unwrap()
    }

    #[test]
    fn test_parse_tokens() {
        assert_eq!("INPUT".parse::<PinMode>(), Ok(PinMode::Input));
        assert_eq!("out".parse::<PinMode>(), Ok(PinMode::Output));
        assert_eq!("in_pullup".parse::<PinMode>(), Ok(PinMode::InputPullUp));
        assert_eq!("INPUT_PULLDOWN".parse::<PinMode>(), Ok(PinMode::InputPullDown));
        assert_eq!("analog_out".parse::<PinMode>(), Ok(PinMode::AnalogOutput));
        assert!(matches!(
            "input".parse::<PinMode>(),
            Err(Error::InvalidArgument(_))
        ));
        assert!("".parse::<PinMode>().is_err());
    }

    #[test]
    fn test_resolution_table() {
        assert_eq!(PinMode::InputPullUp.resolve(), (MuxMode::GpioPullUp, Direction::In));
        assert_eq!(PinMode::InputPullDown.resolve(), (MuxMode::GpioPullDown, Direction::In));
        assert_eq!(PinMode::Input.resolve(), (MuxMode::Gpio, Direction::In));
        assert_eq!(PinMode::Output.resolve(), (MuxMode::Gpio, Direction::Out));
        assert_eq!(PinMode::AnalogOutput.resolve(), (MuxMode::Pwm, Direction::Out));
    }

    #[test]
    fn test_plan_routes() {
        let plan = ModePlan::new(pin("P9_14"), PinMode::AnalogOutput).unwrap();
        assert_eq!(plan.route, Route::Pwm("EHRPWM1A"));

        let plan = ModePlan::new(pin("P9_14"), PinMode::InputPullUp).unwrap();
        assert_eq!(plan.route, Route::Gpio(50));
        assert_eq!(plan.mux, MuxMode::GpioPullUp);

        let plan = ModePlan::new(pin("USR1"), PinMode::Output).unwrap();
        assert_eq!(plan.route, Route::Led(54));
    }

    #[test]
    fn test_plan_rejects_missing_capability() {
        assert_eq!(
            ModePlan::new(pin("P8_7"), PinMode::AnalogOutput),
            Err(Error::UnsupportedCapability {
                pin: "P8_7",
                capability: Capability::Pwm
            })
        );
        assert_eq!(
            ModePlan::new(pin("AIN0"), PinMode::Input),
            Err(Error::UnsupportedCapability {
                pin: "P9_39",
                capability: Capability::Gpio
            })
        );
        assert_eq!(
            ModePlan::new(pin("USR0"), PinMode::Input),
            Err(Error::UnsupportedCapability {
                pin: "USR0",
                capability: Capability::LedOutput
            })
        );
    }

    proptest! {
        #[test]
        fn prop_token_round_trip(idx in 0usize..5) {
            let mode = PinMode::ALL[idx];
            prop_assert_eq!(mode.as_str().parse::<PinMode>(), Ok(mode));
        }

        #[test]
        fn prop_plan_matches_capabilities(
            pin_idx in 0..BEAGLEBONE_BLACK.pins().len(),
            mode_idx in 0usize..5,
        ) {
            let pin = BEAGLEBONE_BLACK.pins()[pin_idx];
            let mode = PinMode::ALL[mode_idx];
            match ModePlan::new(pin, mode) {
                Ok(plan) => {
                    prop_assert_eq!((plan.mux, plan.direction), mode.resolve());
                    match plan.route {
                        Route::Led(line) => {
                            prop_assert!(pin.led);
                            prop_assert_eq!(Some(line), pin.gpio);
                        }
                        Route::Gpio(line) => {
                            prop_assert!(mode.is_gpio() && !pin.led);
                            prop_assert_eq!(Some(line), pin.gpio);
                        }
                        Route::Pwm(channel) => {
                            prop_assert_eq!(mode, PinMode::AnalogOutput);
                            prop_assert_eq!(Some(channel), pin.pwm_channel());
                        }
                    }
                }
                Err(e) => {
                    let is_unsupported = matches!(e, Error::UnsupportedCapability { .. });
                    prop_assert!(is_unsupported);
                }
            }
        }
    }
}
