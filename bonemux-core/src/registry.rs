//! Resource registry
//!
//! Bookkeeping of what this process owns:
//!
//! - GPIO line -> allocation flag
//! - GPIO line -> interrupt registration
//! - PWM channel -> owning pin and last written setting
//!
//! The registry itself never touches hardware. Entries that need hardware
//! teardown (interrupt registrations) are handed back to the caller when
//! they are removed.

use alloc::boxed::Box;

use bonemux_hal::{GpioLine, Level, PwmSetting, SourceId};
use heapless::FnvIndexMap;

use crate::error::{Error, Result};
use crate::interrupt::EdgeHandler;

/// Maximum number of allocated GPIO lines
pub const MAX_GPIO_LINES: usize = 128;

/// Maximum number of armed interrupt lines
pub const MAX_INTERRUPTS: usize = 64;

/// Maximum number of owned PWM channels
pub const MAX_PWM_CHANNELS: usize = 16;

/// Owner and cached state of a PWM channel
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmOwnership {
    /// Key of the pin that claimed the channel
    pub owner: &'static str,
    /// Last setting written through the runtime (frequency 0 = never written)
    pub setting: PwmSetting,
}

/// Armed interrupt on one GPIO line
pub(crate) struct InterruptRegistration<S> {
    /// Key of the pin the handler was attached through
    pub pin: &'static str,
    /// Open edge source
    pub source: S,
    /// Reactor subscription
    pub subscription: SourceId,
    /// Last value read from the source
    pub buffer: Level,
    /// User handler, `None` while it is being invoked
    pub handler: Option<Box<dyn EdgeHandler>>,
    /// Distinguishes this registration from later ones on the same line
    pub generation: u32,
}

/// Resource registry
pub(crate) struct Registry<S> {
    gpio: FnvIndexMap<GpioLine, bool, MAX_GPIO_LINES>,
    interrupts: FnvIndexMap<GpioLine, InterruptRegistration<S>, MAX_INTERRUPTS>,
    pwm: FnvIndexMap<&'static str, PwmOwnership, MAX_PWM_CHANNELS>,
    generation: u32,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            gpio: FnvIndexMap::new(),
            interrupts: FnvIndexMap::new(),
            pwm: FnvIndexMap::new(),
            generation: 0,
        }
    }

    // ---- GPIO allocations ----

    /// Check if the line was allocated by this process
    pub fn gpio_allocated(&self, line: GpioLine) -> bool {
        self.gpio.get(&line).copied().unwrap_or(false)
    }

    /// Fail if allocating `line` would overflow the table
    pub fn check_gpio(&self, line: GpioLine) -> Result<()> {
        if self.gpio.contains_key(&line) || self.gpio.len() < self.gpio.capacity() {
            Ok(())
        } else {
            Err(Error::RegistryFull)
        }
    }

    /// Record the line as allocated
    pub fn allocate_gpio(&mut self, line: GpioLine) -> Result<()> {
        self.gpio
            .insert(line, true)
            .map(|_| ())
            .map_err(|_| Error::RegistryFull)
    }

    /// Remove the line's allocation
    ///
    /// The line's interrupt registration goes with it and is returned for
    /// teardown.
    pub fn release_gpio(&mut self, line: GpioLine) -> Option<InterruptRegistration<S>> {
        self.gpio.remove(&line);
        self.interrupts.remove(&line)
    }

    // ---- PWM ownership ----

    /// Current owner of a channel
    pub fn pwm(&self, channel: &str) -> Option<PwmOwnership> {
        self.pwm.get(channel).copied()
    }

    /// Fail if another pin owns the channel
    pub fn check_pwm(&self, pin: &'static str, channel: &'static str) -> Result<()> {
        match self.pwm.get(channel) {
            Some(entry) if entry.owner != pin => Err(Error::ResourceConflict {
                pin,
                channel,
                owner: entry.owner,
            }),
            _ => Ok(()),
        }
    }

    /// Claim a channel for a pin
    ///
    /// A new entry starts with an unwritten setting. Re-claiming by the
    /// owner keeps the cached setting, which is returned.
    pub fn claim_pwm(&mut self, pin: &'static str, channel: &'static str) -> Result<PwmSetting> {
        self.check_pwm(pin, channel)?;
        if let Some(entry) = self.pwm.get(channel) {
            return Ok(entry.setting);
        }
        let entry = PwmOwnership {
            owner: pin,
            setting: PwmSetting::default(),
        };
        self.pwm
            .insert(channel, entry)
            .map_err(|_| Error::RegistryFull)?;
        Ok(entry.setting)
    }

    /// Update the cached setting if `pin` still owns the channel
    pub fn update_pwm(&mut self, pin: &'static str, channel: &str, setting: PwmSetting) -> bool {
        match self.pwm.get_mut(channel) {
            Some(entry) if entry.owner == pin => {
                entry.setting = setting;
                true
            }
            _ => false,
        }
    }

    /// Clear the channel if `pin` owns it
    pub fn release_pwm(&mut self, pin: &'static str, channel: &str) -> bool {
        let owned = matches!(self.pwm.get(channel), Some(entry) if entry.owner == pin);
        if owned {
            self.pwm.remove(channel);
        }
        owned
    }

    // ---- Interrupt registrations ----

    pub fn is_armed(&self, line: GpioLine) -> bool {
        self.interrupts.contains_key(&line)
    }

    /// Generation number for a new registration
    pub fn next_generation(&mut self) -> u32 {
        self.generation = self.generation.wrapping_add(1);
        self.generation
    }

    /// Store a registration
    ///
    /// On a full table the registration is handed back for teardown.
    pub fn arm(
        &mut self,
        line: GpioLine,
        registration: InterruptRegistration<S>,
    ) -> core::result::Result<(), InterruptRegistration<S>> {
        if self.interrupts.contains_key(&line) {
            return Err(registration);
        }
        self.interrupts
            .insert(line, registration)
            .map(|_| ())
            .map_err(|(_, r)| r)
    }

    /// Remove a registration
    pub fn disarm(&mut self, line: GpioLine) -> Option<InterruptRegistration<S>> {
        self.interrupts.remove(&line)
    }

    /// Last value read from the line's edge source, if armed
    pub fn edge_value(&self, line: GpioLine) -> Option<Level> {
        self.interrupts.get(&line).map(|reg| reg.buffer)
    }

    pub fn interrupt_mut(&mut self, line: GpioLine) -> Option<&mut InterruptRegistration<S>> {
        self.interrupts.get_mut(&line)
    }

    /// Return a handler taken for dispatch
    ///
    /// If the registration was replaced or removed meanwhile the handler is
    /// handed back to be dropped by the caller.
    pub fn restore_handler(
        &mut self,
        line: GpioLine,
        generation: u32,
        handler: Box<dyn EdgeHandler>,
    ) -> Option<Box<dyn EdgeHandler>> {
        match self.interrupts.get_mut(&line) {
            Some(reg) if reg.generation == generation && reg.handler.is_none() => {
                reg.handler = Some(handler);
                None
            }
            _ => Some(handler),
        }
    }
}
