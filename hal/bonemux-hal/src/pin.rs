//! Pin descriptors and pin identifier resolution
//!
//! A [`PinDescriptor`] is the immutable capability record for one physical
//! header pin. Descriptors live in static tables owned by a [`PinMap`]
//! implementation and are copied out on lookup; the core never mutates them.

/// Kernel GPIO line number (e.g. 50 for GPIO1_18)
pub type GpioLine = u16;

/// PWM capability of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PwmCapability {
    /// Channel name, shared by every pin routed to the same PWM output
    pub channel: &'static str,
    /// PWM module the channel belongs to (e.g. "ehrpwm1")
    pub module: &'static str,
    /// Output index within the module (0 = A, 1 = B)
    pub index: u8,
}

impl PwmCapability {
    /// Create a PWM capability record
    pub const fn new(channel: &'static str, module: &'static str, index: u8) -> Self {
        Self {
            channel,
            module,
            index,
        }
    }
}

/// Immutable capability record for one physical pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinDescriptor {
    /// Canonical header key (e.g. "P9_14")
    pub key: &'static str,
    /// Display name (e.g. "EHRPWM1A")
    pub name: &'static str,
    /// Mux option names, indexed by mux mode
    pub options: Option<&'static [&'static str]>,
    /// PWM output routed to this pin, if any
    pub pwm: Option<PwmCapability>,
    /// GPIO line, if the pin can be used as GPIO
    pub gpio: Option<GpioLine>,
    /// Analog input channel, if any
    pub ain: Option<u8>,
    /// Pin drives an on-board LED (pre-exported, output only)
    pub led: bool,
}

impl PinDescriptor {
    /// Create a descriptor with no capabilities
    pub const fn new(key: &'static str, name: &'static str) -> Self {
        Self {
            key,
            name,
            options: None,
            pwm: None,
            gpio: None,
            ain: None,
            led: false,
        }
    }

    /// Attach a GPIO line
    pub const fn with_gpio(mut self, line: GpioLine) -> Self {
        self.gpio = Some(line);
        self
    }

    /// Attach a PWM output
    pub const fn with_pwm(mut self, pwm: PwmCapability) -> Self {
        self.pwm = Some(pwm);
        self
    }

    /// Attach an analog input channel
    pub const fn with_ain(mut self, channel: u8) -> Self {
        self.ain = Some(channel);
        self
    }

    /// Attach the mux option list
    pub const fn with_options(mut self, options: &'static [&'static str]) -> Self {
        self.options = Some(options);
        self
    }

    /// Mark as an on-board LED pin
    pub const fn as_led(mut self) -> Self {
        self.led = true;
        self
    }

    /// PWM channel name, if the pin is PWM capable
    pub fn pwm_channel(&self) -> Option<&'static str> {
        self.pwm.map(|p| p.channel)
    }
}

/// Multiplexer setting selecting the peripheral a pin routes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MuxMode {
    /// GPIO, no pull
    Gpio,
    /// GPIO with internal pull-up
    GpioPullUp,
    /// GPIO with internal pull-down
    GpioPullDown,
    /// PWM output
    Pwm,
}

impl MuxMode {
    /// Name used by the universal cape pinmux helper
    pub fn as_str(self) -> &'static str {
        match self {
            MuxMode::Gpio => "gpio",
            MuxMode::GpioPullUp => "gpio_pu",
            MuxMode::GpioPullDown => "gpio_pd",
            MuxMode::Pwm => "pwm",
        }
    }

    /// Check if this is one of the GPIO modes
    pub fn is_gpio(self) -> bool {
        matches!(self, MuxMode::Gpio | MuxMode::GpioPullUp | MuxMode::GpioPullDown)
    }
}

/// Pin identifier resolution
///
/// Implementations own the static descriptor table for a board.
pub trait PinMap {
    /// Look up a pin by header key or name
    fn lookup(&self, id: &str) -> Option<PinDescriptor>;
}

impl<T: PinMap + ?Sized> PinMap for &T {
    fn lookup(&self, id: &str) -> Option<PinDescriptor> {
        (**self).lookup(id)
    }
}
