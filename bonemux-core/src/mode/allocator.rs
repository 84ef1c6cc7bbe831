//! Mode allocator
//!
//! Executes a [`ModePlan`]: pre-claims the PWM channel, configures the
//! pinmux, exports the GPIO line and keeps the registry in step with what
//! the hardware calls actually achieved.

use bonemux_hal::{Board, PinMap, Reactor};

use super::{ModePlan, PinMode, Route};
use crate::error::{Error, HwResultExt, Operation, Result};
use crate::runtime::Runtime;

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Put a pin into a mode
    ///
    /// Returns the pin's canonical key. Capability errors are reported
    /// before any hardware call.
    pub async fn set_mode(&self, pin: &str, mode: PinMode) -> Result<&'static str> {
        let pin = self.pin(pin)?;
        debug!("set_mode({}, {})", pin.key, mode.as_str());
        let plan = ModePlan::new(pin, mode).inspect_err(|e| warn!("{}", e))?;
        self.apply_plan(plan).await?;
        Ok(pin.key)
    }

    pub(crate) async fn apply_plan(&self, plan: ModePlan) -> Result<()> {
        let pin = plan.pin;
        if let Route::Led(line) | Route::Gpio(line) = plan.route {
            // Checked up front so a full table never leaves a line exported
            self.with_registry(|r| r.check_gpio(line))
                .inspect_err(|e| warn!("{}", e))?;
        }
        match plan.route {
            Route::Led(line) => {
                self.board
                    .configure_led(&pin)
                    .await
                    .during(pin.key, Operation::ConfigureLed)
                    .inspect_err(|e| error!("{}", e))?;
                self.with_registry(|r| r.allocate_gpio(line))
            }
            Route::Gpio(line) => {
                self.configure_mux(&plan).await?;
                if let Err(e) = self.board.export_gpio(&pin, plan.direction).await {
                    self.release_line(line);
                    let e = Error::hardware(pin.key, Operation::ExportGpio, e);
                    error!("{}", e);
                    return Err(e);
                }
                let release_pwm = self.config.release_pwm_on_reconfigure;
                self.with_registry(|r| {
                    r.allocate_gpio(line)
                        .inspect_err(|_| error!("line {} exported but not tracked", line))?;
                    if let (true, Some(channel)) = (release_pwm, pin.pwm_channel()) {
                        if r.release_pwm(pin.key, channel) {
                            debug!("released {} from {}", channel, pin.key);
                        }
                    }
                    Ok(())
                })
            }
            Route::Pwm(channel) => {
                // Claimed before suspending so interleaved callers see the owner
                self.with_registry(|r| r.claim_pwm(pin.key, channel))
                    .inspect_err(|e| warn!("{}", e))?;
                self.configure_mux(&plan).await?;
                if let Some(line) = pin.gpio {
                    self.release_line(line);
                }
                Ok(())
            }
        }
    }

    async fn configure_mux(&self, plan: &ModePlan) -> Result<()> {
        self.board
            .configure_mux(&plan.pin, plan.mux)
            .await
            .during(plan.pin.key, Operation::ConfigureMux)
            .inspect_err(|e| error!("{}", e))
    }
}

#[cfg(test)]
mod tests {
    use bonemux_drivers::sim::{SimBoard, SimEvent, SimOp};
    use bonemux_hal::{Direction, Edge, GpioLine, HwError, Level, MuxMode, PwmSetting};
    use embassy_futures::{block_on, join::join};

    use crate::config::RuntimeConfig;
    use crate::error::{Capability, Error, Operation};
    use crate::interrupt::EdgeEvent;
    use crate::mode::PinMode;
    use crate::registry::MAX_GPIO_LINES;
    use crate::runtime::tests::{runtime, runtime_with};

    #[test]
    fn test_set_mode_gpio() {
        let rt = runtime();
        assert_eq!(block_on(rt.set_mode("ehrpwm1a", PinMode::InputPullDown)), Ok("P9_14"));
        assert_eq!(rt.board().mux("P9_14"), Some(MuxMode::GpioPullDown));
        assert_eq!(rt.board().exported(50), Some(Direction::In));
        assert_eq!(rt.is_allocated("P9_14"), Ok(true));
    }

    #[test]
    fn test_set_mode_unknown_pin() {
        let rt = runtime();
        assert_eq!(
            block_on(rt.set_mode("P12_1", PinMode::Output)),
            Err(Error::PinNotFound)
        );
    }

    #[test]
    fn test_analog_output_requires_pwm() {
        let rt = runtime();
        assert_eq!(
            block_on(rt.set_mode("P8_7", PinMode::AnalogOutput)),
            Err(Error::UnsupportedCapability {
                pin: "P8_7",
                capability: Capability::Pwm
            })
        );
        assert!(rt.board().events().is_empty());
    }

    #[test]
    fn test_led_rejects_input_and_keeps_entry() {
        let rt = runtime();
        assert_eq!(rt.is_allocated("USR2"), Ok(false));
        assert_eq!(
            block_on(rt.set_mode("USR2", PinMode::Input)),
            Err(Error::UnsupportedCapability {
                pin: "USR2",
                capability: Capability::LedOutput
            })
        );
        assert_eq!(rt.is_allocated("USR2"), Ok(false));

        block_on(rt.set_mode("USR2", PinMode::Output)).unwrap();
        assert_eq!(rt.is_allocated("USR2"), Ok(true));
        rt.board().clear_events();

        assert!(block_on(rt.set_mode("USR2", PinMode::InputPullUp)).is_err());
        assert_eq!(rt.is_allocated("USR2"), Ok(true));
        assert!(rt.board().events().is_empty());
    }

    #[test]
    fn test_led_output_skips_mux_and_export() {
        let rt = runtime();
        block_on(rt.set_mode("USR0", PinMode::Output)).unwrap();
        assert_eq!(
            rt.board().events().as_slice(),
            &[SimEvent::Led { pin: "USR0" }]
        );
        assert_eq!(rt.board().exported(53), None);
    }

    #[test]
    fn test_led_failure_mutates_nothing() {
        let rt = runtime();
        rt.board().fail_next(SimOp::ConfigureLed, HwError::Busy);
        assert_eq!(
            block_on(rt.set_mode("USR3", PinMode::Output)),
            Err(Error::Hardware {
                pin: "USR3",
                op: Operation::ConfigureLed,
                source: HwError::Busy
            })
        );
        assert_eq!(rt.is_allocated("USR3"), Ok(false));
    }

    #[test]
    fn test_mux_failure_leaves_registry() {
        let rt = runtime();
        block_on(rt.set_mode("P8_12", PinMode::Output)).unwrap();

        rt.board().fail_next(SimOp::ConfigureMux, HwError::Io);
        assert_eq!(
            block_on(rt.set_mode("P8_12", PinMode::Input)),
            Err(Error::Hardware {
                pin: "P8_12",
                op: Operation::ConfigureMux,
                source: HwError::Io
            })
        );
        assert_eq!(rt.is_allocated("P8_12"), Ok(true));
        assert_eq!(rt.board().exported(44), Some(Direction::Out));
    }

    #[test]
    fn test_mux_failure_keeps_pwm_claim() {
        let rt = runtime();
        rt.board().fail_next(SimOp::ConfigureMux, HwError::Io);
        assert!(block_on(rt.set_mode("P9_21", PinMode::AnalogOutput)).is_err());
        assert_eq!(rt.pwm_owner("EHRPWM0B").map(|o| o.owner), Some("P9_21"));
    }

    #[test]
    fn test_full_table_touches_no_hardware() {
        let rt = runtime();
        rt.with_registry(|r| {
            for line in 1000..1000 + MAX_GPIO_LINES as GpioLine {
                r.allocate_gpio(line).unwrap();
            }
        });
        assert_eq!(
            block_on(rt.set_mode("P8_15", PinMode::Output)),
            Err(Error::RegistryFull)
        );
        assert_eq!(
            block_on(rt.set_mode("USR2", PinMode::Output)),
            Err(Error::RegistryFull)
        );
        assert_eq!(rt.board().exported(47), None);
        assert!(rt.board().events().is_empty());
    }

    #[test]
    fn test_export_failure_leaves_no_entry() {
        let rt = runtime();
        rt.board().fail_next(SimOp::ExportGpio, HwError::Busy);
        assert_eq!(
            block_on(rt.set_mode("P8_15", PinMode::Output)),
            Err(Error::Hardware {
                pin: "P8_15",
                op: Operation::ExportGpio,
                source: HwError::Busy
            })
        );
        assert_eq!(rt.is_allocated("P8_15"), Ok(false));
    }

    #[test]
    fn test_export_failure_tears_down_interrupt() {
        let rt = runtime();
        block_on(rt.set_mode("P8_16", PinMode::Input)).unwrap();
        let status = rt.attach_interrupt("P8_16", Edge::Both, |_: &EdgeEvent| None).unwrap();
        assert!(status.attached);

        rt.board().fail_next(SimOp::ExportGpio, HwError::Io);
        assert!(block_on(rt.set_mode("P8_16", PinMode::InputPullUp)).is_err());
        assert_eq!(rt.is_allocated("P8_16"), Ok(false));
        assert_eq!(rt.board().open_sources(), 0);
        assert_eq!(rt.reactor().subscriptions(), 0);
    }

    #[test]
    fn test_pwm_mode_tears_down_interrupt() {
        let rt = runtime();
        block_on(rt.set_mode("P9_14", PinMode::Input)).unwrap();
        let status = rt
            .attach_interrupt("P9_14", Edge::Rising, |_: &EdgeEvent| Some(1))
            .unwrap();
        assert!(status.attached);

        block_on(rt.set_mode("P9_14", PinMode::AnalogOutput)).unwrap();
        assert_eq!(rt.is_allocated("P9_14"), Ok(false));
        assert_eq!(rt.board().open_sources(), 0);
        assert!(!rt.reactor().is_subscribed(50));
        assert_eq!(rt.board().mux("P9_14"), Some(MuxMode::Pwm));

        // The line can be armed again after switching back
        block_on(rt.set_mode("P9_14", PinMode::Input)).unwrap();
        let status = rt
            .attach_interrupt("P9_14", Edge::Rising, |_: &EdgeEvent| None)
            .unwrap();
        assert!(status.attached);
    }

    #[test]
    fn test_analog_output_conflict() {
        let rt = runtime();
        block_on(rt.set_mode("P9_22", PinMode::AnalogOutput)).unwrap();
        rt.board().clear_events();
        assert_eq!(
            block_on(rt.set_mode("P9_31", PinMode::AnalogOutput)),
            Err(Error::ResourceConflict {
                pin: "P9_31",
                channel: "EHRPWM0A",
                owner: "P9_22"
            })
        );
        assert!(rt.board().events().is_empty());
    }

    #[test]
    fn test_reclaim_keeps_cache() {
        let rt = runtime();
        block_on(rt.analog_write("P9_16", 0.25, Some(500.0))).unwrap();
        block_on(rt.set_mode("P9_16", PinMode::AnalogOutput)).unwrap();
        assert_eq!(
            rt.pwm_owner("EHRPWM1B").map(|o| o.setting),
            Some(PwmSetting::new(500.0, 0.25))
        );
    }

    #[test]
    fn test_gpio_mode_releases_pwm() {
        let rt = runtime();
        block_on(rt.analog_write("P9_21", 0.5, None)).unwrap();
        block_on(rt.set_mode("P9_21", PinMode::Output)).unwrap();
        assert_eq!(rt.pwm_owner("EHRPWM0B"), None);

        // The other pin on the channel can now take it
        block_on(rt.analog_write("P9_29", 0.1, None)).unwrap();
        assert_eq!(rt.pwm_owner("EHRPWM0B").map(|o| o.owner), Some("P9_29"));
    }

    #[test]
    fn test_gpio_mode_keeps_pwm_when_configured() {
        let config = RuntimeConfig {
            release_pwm_on_reconfigure: false,
            ..RuntimeConfig::default()
        };
        let rt = runtime_with(SimBoard::new(), config);
        block_on(rt.analog_write("P9_21", 0.5, None)).unwrap();
        block_on(rt.set_mode("P9_21", PinMode::Output)).unwrap();
        assert_eq!(rt.pwm_owner("EHRPWM0B").map(|o| o.owner), Some("P9_21"));
        assert!(matches!(
            block_on(rt.analog_write("P9_29", 0.1, None)),
            Err(Error::ResourceConflict { .. })
        ));
    }

    #[test]
    fn test_interleaved_claims_single_owner() {
        let rt = runtime_with(SimBoard::new().with_yield(true), RuntimeConfig::default());
        let (a, b) = block_on(join(
            rt.set_mode("P9_21", PinMode::AnalogOutput),
            rt.set_mode("P9_29", PinMode::AnalogOutput),
        ));
        assert_eq!(a, Ok("P9_21"));
        assert!(matches!(b, Err(Error::ResourceConflict { owner: "P9_21", .. })));
        assert_eq!(rt.board().mux("P9_29"), None);
    }

    #[test]
    fn test_interleaved_modes_on_one_pin() {
        let rt = runtime_with(SimBoard::new().with_yield(true), RuntimeConfig::default());
        let (a, b) = block_on(join(
            rt.set_mode("P8_17", PinMode::Output),
            rt.set_mode("P8_17", PinMode::Input),
        ));
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(rt.is_allocated("P8_17"), Ok(true));
        // Last export wins
        assert_eq!(rt.board().exported(27), Some(Direction::In));
        assert_eq!(block_on(rt.digital_read("P8_17")), Ok(Level::Low));
    }
}
