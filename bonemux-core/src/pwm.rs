//! PWM output and channel conflict detection
//!
//! Several header pins can be routed to the same PWM channel. The first pin
//! put into analog output mode owns the channel until it is switched to a
//! GPIO mode; writes from any other pin on the channel are rejected without
//! touching the hardware or the owner's cached setting.

use bonemux_hal::{Board, PinDescriptor, PinMap, PwmSetting, Reactor};

use crate::error::{Capability, Error, HwResultExt, Operation, Result};
use crate::mode::{ModePlan, PinMode};
use crate::runtime::Runtime;

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Write a duty cycle (0.0..=1.0) and optional frequency to a PWM pin
    ///
    /// The pin is put into analog output mode first if its channel is
    /// unclaimed. Without a frequency the configured default is used.
    pub async fn analog_write(&self, pin: &str, duty: f32, freq_hz: Option<f32>) -> Result<()> {
        let pin = self.pin(pin)?;
        let channel = pwm_channel(&pin)?;
        let freq_hz = freq_hz.unwrap_or(self.config.default_pwm_frequency_hz);
        if !(0.0..=1.0).contains(&duty) {
            return Err(Error::InvalidArgument("duty cycle must be between 0 and 1"));
        }
        if !freq_hz.is_finite() || freq_hz <= 0.0 {
            return Err(Error::InvalidArgument("frequency must be positive"));
        }
        debug!("analog_write({}, {}, {})", pin.key, duty, freq_hz);

        let previous = self.claim_output(&pin, channel).await?;
        self.board
            .write_pwm(&pin, previous, freq_hz, duty)
            .await
            .during(pin.key, Operation::WritePwm)
            .inspect_err(|e| error!("{}", e))?;

        let setting = PwmSetting::new(freq_hz, duty);
        if !self.with_registry(|r| r.update_pwm(pin.key, channel, setting)) {
            warn!("{} lost {} during write", pin.key, channel);
        }
        Ok(())
    }

    /// Enable the PWM output of a pin
    pub async fn start_analog(&self, pin: &str) -> Result<()> {
        let pin = self.pin(pin)?;
        let channel = pwm_channel(&pin)?;
        debug!("start_analog({})", pin.key);
        let setting = self.claim_output(&pin, channel).await?;
        self.board
            .start_pwm(&pin, setting)
            .await
            .during(pin.key, Operation::StartPwm)
            .inspect_err(|e| error!("{}", e))
    }

    /// Disable the PWM output of a pin
    pub async fn stop_analog(&self, pin: &str) -> Result<()> {
        let pin = self.pin(pin)?;
        let channel = pwm_channel(&pin)?;
        debug!("stop_analog({})", pin.key);
        let setting = self.claim_output(&pin, channel).await?;
        self.board
            .stop_pwm(&pin, setting)
            .await
            .during(pin.key, Operation::StopPwm)
            .inspect_err(|e| error!("{}", e))
    }

    /// Make sure `pin` owns `channel`, allocating it if unclaimed
    ///
    /// Returns the cached setting. Ownership is checked again after the
    /// allocation since other callers may have run meanwhile.
    async fn claim_output(
        &self,
        pin: &PinDescriptor,
        channel: &'static str,
    ) -> Result<PwmSetting> {
        let claimed = self
            .with_registry(|r| r.check_pwm(pin.key, channel).map(|()| r.pwm(channel).is_some()))
            .inspect_err(|e| warn!("{}", e))?;
        if !claimed {
            self.apply_plan(ModePlan::new(*pin, PinMode::AnalogOutput)?).await?;
        }
        self.with_registry(|r| r.claim_pwm(pin.key, channel))
            .inspect_err(|e| warn!("{}", e))
    }
}

fn pwm_channel(pin: &PinDescriptor) -> Result<&'static str> {
    pin.pwm_channel().ok_or(Error::UnsupportedCapability {
        pin: pin.key,
        capability: Capability::Pwm,
    })
}

#[cfg(test)]
mod tests {
    use bonemux_drivers::sim::{SimBoard, SimEvent, SimOp};
    use bonemux_hal::{HwError, MuxMode, PwmSetting};
    use embassy_futures::{block_on, join::join};

    use crate::config::RuntimeConfig;
    use crate::error::{Capability, Error, Operation};
    use crate::mode::PinMode;
    use crate::runtime::tests::{runtime, runtime_with};

    #[test]
    fn test_first_write_allocates() {
        let rt = runtime();
        block_on(rt.analog_write("P9_42", 0.5, None)).unwrap();
        assert_eq!(rt.board().mux("P9_42"), Some(MuxMode::Pwm));
        assert_eq!(rt.board().pwm("ECAPPWM0"), Some(PwmSetting::new(2000.0, 0.5)));
        let owner = rt.pwm_owner("ECAPPWM0").unwrap();
        assert_eq!(owner.owner, "P9_42");
        assert_eq!(owner.setting, PwmSetting::new(2000.0, 0.5));
    }

    #[test]
    fn test_configured_default_frequency() {
        let config = RuntimeConfig {
            default_pwm_frequency_hz: 50.0,
            ..RuntimeConfig::default()
        };
        let rt = runtime_with(SimBoard::new(), config);
        block_on(rt.analog_write("P8_13", 0.075, None)).unwrap();
        assert_eq!(rt.board().pwm("EHRPWM2B"), Some(PwmSetting::new(50.0, 0.075)));
    }

    #[test]
    fn test_invalid_arguments_touch_nothing() {
        let rt = runtime();
        for (duty, freq) in [
            (1.5, None),
            (-0.1, None),
            (f32::NAN, None),
            (0.5, Some(0.0)),
            (0.5, Some(-10.0)),
            (0.5, Some(f32::INFINITY)),
        ] {
            assert!(matches!(
                block_on(rt.analog_write("P9_14", duty, freq)),
                Err(Error::InvalidArgument(_))
            ));
        }
        assert!(rt.board().events().is_empty());
        assert_eq!(rt.pwm_owner("EHRPWM1A"), None);
    }

    #[test]
    fn test_write_requires_pwm() {
        let rt = runtime();
        assert_eq!(
            block_on(rt.analog_write("P8_8", 0.5, None)),
            Err(Error::UnsupportedCapability {
                pin: "P8_8",
                capability: Capability::Pwm
            })
        );
        assert!(matches!(
            block_on(rt.start_analog("USR0")),
            Err(Error::UnsupportedCapability { .. })
        ));
    }

    #[test]
    fn test_conflict_keeps_owner_cache() {
        let rt = runtime();
        block_on(rt.analog_write("P9_21", 0.3, Some(1000.0))).unwrap();
        rt.board().clear_events();

        assert_eq!(
            block_on(rt.analog_write("P9_29", 0.9, Some(10.0))),
            Err(Error::ResourceConflict {
                pin: "P9_29",
                channel: "EHRPWM0B",
                owner: "P9_21"
            })
        );
        let owner = rt.pwm_owner("EHRPWM0B").unwrap();
        assert_eq!(owner.owner, "P9_21");
        assert_eq!(owner.setting, PwmSetting::new(1000.0, 0.3));
        assert!(rt.board().events().is_empty());
    }

    #[test]
    fn test_rewrite_falls_back_to_default_frequency() {
        let rt = runtime();
        block_on(rt.analog_write("P9_16", 0.2, Some(100.0))).unwrap();
        block_on(rt.analog_write("P9_16", 0.4, None)).unwrap();
        let events = rt.board().events();
        let writes: heapless::Vec<PwmSetting, 4> = events
            .iter()
            .filter_map(|e| match e {
                SimEvent::Pwm { setting, .. } => Some(*setting),
                _ => None,
            })
            .collect();
        assert_eq!(
            writes.as_slice(),
            &[PwmSetting::new(100.0, 0.2), PwmSetting::new(2000.0, 0.4)]
        );
    }

    #[test]
    fn test_write_failure_keeps_cache() {
        let rt = runtime();
        block_on(rt.analog_write("P8_19", 0.5, Some(300.0))).unwrap();
        rt.board().fail_next(SimOp::WritePwm, HwError::InvalidValue);
        assert_eq!(
            block_on(rt.analog_write("P8_19", 0.7, Some(400.0))),
            Err(Error::Hardware {
                pin: "P8_19",
                op: Operation::WritePwm,
                source: HwError::InvalidValue
            })
        );
        assert_eq!(
            rt.pwm_owner("EHRPWM2A").map(|o| o.setting),
            Some(PwmSetting::new(300.0, 0.5))
        );
    }

    #[test]
    fn test_interleaved_writes_single_owner() {
        let rt = runtime_with(SimBoard::new().with_yield(true), RuntimeConfig::default());
        let (a, b) = block_on(join(
            rt.analog_write("P9_22", 0.25, None),
            rt.analog_write("P9_31", 0.75, None),
        ));
        assert!(a.is_ok());
        assert_eq!(
            b,
            Err(Error::ResourceConflict {
                pin: "P9_31",
                channel: "EHRPWM0A",
                owner: "P9_22"
            })
        );
        let owner = rt.pwm_owner("EHRPWM0A").unwrap();
        assert_eq!(owner.owner, "P9_22");
        assert_eq!(owner.setting.duty, 0.25);
    }

    #[test]
    fn test_release_during_write_is_detected() {
        let rt = runtime_with(SimBoard::new().with_yield(true), RuntimeConfig::default());
        block_on(rt.set_mode("P8_45", PinMode::AnalogOutput)).unwrap();

        // The owner moves to GPIO while its write is suspended
        let (write, reconfigure) = block_on(join(
            rt.analog_write("P8_45", 0.5, None),
            rt.set_mode("P8_45", PinMode::Output),
        ));
        assert!(write.is_ok());
        assert!(reconfigure.is_ok());
        assert_eq!(rt.pwm_owner("EHRPWM2A"), None);
    }

    #[test]
    fn test_start_stop() {
        let rt = runtime();
        block_on(rt.start_analog("P8_46")).unwrap();
        assert!(rt.board().pwm_running("EHRPWM2B"));
        assert_eq!(rt.pwm_owner("EHRPWM2B").map(|o| o.owner), Some("P8_46"));

        block_on(rt.stop_analog("P8_46")).unwrap();
        assert!(!rt.board().pwm_running("EHRPWM2B"));

        assert!(matches!(
            block_on(rt.start_analog("P8_13")),
            Err(Error::ResourceConflict { owner: "P8_46", .. })
        ));
    }
}
