//! Runtime state and digital/analog I/O
//!
//! [`Runtime`] is the single state object of the pin-control layer. It owns
//! the pin map, the board, the readiness reactor, the configuration and the
//! resource registry; every operation is a method on it. Methods are spread
//! over the modules that implement them (`mode`, `pwm`, `interrupt`,
//! `protocol`, `introspect`).
//!
//! # Concurrency
//!
//! All methods take `&self` and are meant to run on one executor thread.
//! Several operations may be suspended at once, interleaving on the same
//! pin. The registry lives in a blocking mutex around a `RefCell`; it is
//! only ever borrowed between suspension points, never across an `.await`.

use core::cell::RefCell;

use bonemux_hal::{Board, GpioLine, Level, PinDescriptor, PinMap, Reactor};
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use crate::config::RuntimeConfig;
use crate::error::{Capability, Error, HwResultExt, Operation, Result};
use crate::registry::{InterruptRegistration, PwmOwnership, Registry};

/// Pin-control runtime
pub struct Runtime<M, B: Board, R> {
    pub(crate) pins: M,
    pub(crate) board: B,
    pub(crate) reactor: R,
    pub(crate) config: RuntimeConfig,
    registry: Mutex<NoopRawMutex, RefCell<Registry<B::EdgeSource>>>,
}

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Create a runtime with an empty registry
    pub fn new(pins: M, board: B, reactor: R, config: RuntimeConfig) -> Self {
        Self {
            pins,
            board,
            reactor,
            config,
            registry: Mutex::new(RefCell::new(Registry::new())),
        }
    }

    /// Bring up board subsystems the runtime relies on
    pub async fn init(&self) -> Result<()> {
        if self.config.enable_analog_inputs {
            debug!("enabling analog inputs");
            self.board
                .enable_analog_inputs()
                .await
                .during("AIN", Operation::EnableAnalog)
                .inspect_err(|e| error!("{}", e))?;
        }
        Ok(())
    }

    pub fn board(&self) -> &B {
        &self.board
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Resolve a pin identifier
    pub fn pin(&self, id: &str) -> Result<PinDescriptor> {
        self.pins.lookup(id).ok_or_else(|| {
            warn!("unknown pin {}", id);
            Error::PinNotFound
        })
    }

    /// Check if the pin's GPIO line is allocated by this runtime
    pub fn is_allocated(&self, pin: &str) -> Result<bool> {
        let pin = self.pin(pin)?;
        Ok(pin
            .gpio
            .map(|line| self.with_registry(|r| r.gpio_allocated(line)))
            .unwrap_or(false))
    }

    /// Owner and cached setting of a PWM channel
    pub fn pwm_owner(&self, channel: &str) -> Option<PwmOwnership> {
        self.with_registry(|r| r.pwm(channel))
    }

    pub(crate) fn with_registry<T>(
        &self,
        f: impl FnOnce(&mut Registry<B::EdgeSource>) -> T,
    ) -> T {
        self.registry.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Unsubscribe and close a removed interrupt registration
    pub(crate) fn teardown(&self, registration: InterruptRegistration<B::EdgeSource>) {
        debug!("tearing down interrupt on {}", registration.pin);
        self.reactor.unsubscribe(registration.subscription);
        self.board.close_edge_source(registration.source);
    }

    /// Remove a line's allocation together with its interrupt registration
    pub(crate) fn release_line(&self, line: GpioLine) {
        if let Some(registration) = self.with_registry(|r| r.release_gpio(line)) {
            self.teardown(registration);
        }
    }

    pub(crate) fn gpio_line(pin: &PinDescriptor) -> Result<GpioLine> {
        pin.gpio.ok_or(Error::UnsupportedCapability {
            pin: pin.key,
            capability: Capability::Gpio,
        })
    }

    // ---- Digital I/O ----

    /// Drive a GPIO pin
    ///
    /// Accepts anything convertible to a [`Level`]; integers are high when
    /// non-zero.
    pub async fn digital_write(&self, pin: &str, level: impl Into<Level>) -> Result<()> {
        let pin = self.pin(pin)?;
        let level = level.into();
        Self::gpio_line(&pin)?;
        trace!("digital_write({}, {})", pin.key, level.as_u8());
        self.board
            .write_gpio(&pin, level)
            .await
            .during(pin.key, Operation::WriteGpio)
            .inspect_err(|e| error!("{}", e))
    }

    /// Drive a GPIO pin without suspending
    pub fn digital_write_sync(&self, pin: &str, level: impl Into<Level>) -> Result<()> {
        let pin = self.pin(pin)?;
        let level = level.into();
        Self::gpio_line(&pin)?;
        trace!("digital_write_sync({}, {})", pin.key, level.as_u8());
        self.board
            .write_gpio_sync(&pin, level)
            .during(pin.key, Operation::WriteGpio)
            .inspect_err(|e| error!("{}", e))
    }

    /// Read a digital level
    ///
    /// Analog inputs are read through the ADC and compared against
    /// [`RuntimeConfig::analog_high_threshold`].
    pub async fn digital_read(&self, pin: &str) -> Result<Level> {
        let pin = self.pin(pin)?;
        trace!("digital_read({})", pin.key);
        if pin.ain.is_some() {
            let value = self.read_ain(&pin).await?;
            return Ok(Level::from(value > self.config.analog_high_threshold));
        }
        Self::gpio_line(&pin)?;
        self.board
            .read_gpio(&pin)
            .await
            .during(pin.key, Operation::ReadGpio)
            .inspect_err(|e| error!("{}", e))
    }

    // ---- Analog input ----

    /// Read an analog value between 0.0 and 1.0
    ///
    /// Pins without an analog channel are read digitally (1.0 = high).
    pub async fn analog_read(&self, pin: &str) -> Result<f32> {
        let pin = self.pin(pin)?;
        trace!("analog_read({})", pin.key);
        if pin.ain.is_some() {
            return self.read_ain(&pin).await;
        }
        if pin.gpio.is_none() {
            return Err(Error::UnsupportedCapability {
                pin: pin.key,
                capability: Capability::AnalogInput,
            });
        }
        let level = self
            .board
            .read_gpio(&pin)
            .await
            .during(pin.key, Operation::ReadGpio)
            .inspect_err(|e| error!("{}", e))?;
        Ok(if level.is_high() { 1.0 } else { 0.0 })
    }

    async fn read_ain(&self, pin: &PinDescriptor) -> Result<f32> {
        self.board
            .read_analog(pin)
            .await
            .during(pin.key, Operation::ReadAnalog)
            .inspect_err(|e| error!("{}", e))
    }
}
