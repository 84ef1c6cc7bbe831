//! In-memory board
//!
//! Keeps the state the kernel would keep for a real board (pinmux
//! selection, exported lines, values, PWM channels) in plain maps so the
//! core can be exercised off-target. Every call can be made to fail once
//! with [`SimBoard::fail_next`], and every async call can be made to yield
//! to the executor first with [`SimBoard::with_yield`].

use core::cell::RefCell;

use bonemux_hal::{
    Board, Direction, Edge, EdgeSource, GpioLine, GpioStatus, HwError, Level, MuxMode,
    PinDescriptor, PinState, Pull, PwmSetting, Slew, SourceId,
};
use heapless::{FnvIndexMap, Vec};

/// Maximum number of recorded events
pub const EVENT_LOG_LEN: usize = 256;

/// Board operation, used to target fault injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimOp {
    EnableAnalog,
    ConfigureMux,
    ConfigureLed,
    ExportGpio,
    ReadDirection,
    ReadGpio,
    WriteGpio,
    ReadAnalog,
    WritePwm,
    ReadPwm,
    StartPwm,
    StopPwm,
    ReadPinState,
    OpenEdgeSource,
    ReadEdge,
}

/// Hardware-visible side effect recorded by the simulator
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimEvent {
    /// Pinmux changed
    Mux { pin: &'static str, mode: MuxMode },
    /// LED trigger released
    Led { pin: &'static str },
    /// GPIO line exported
    Export { line: GpioLine, direction: Direction },
    /// GPIO value written
    Write { pin: &'static str, level: Level },
    /// PWM period/duty written
    Pwm { channel: &'static str, setting: PwmSetting },
    /// PWM output enabled or disabled
    PwmRun { channel: &'static str, running: bool },
}

/// Edge source handed out by [`SimBoard`]
#[derive(Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimEdgeSource {
    line: GpioLine,
}

impl EdgeSource for SimEdgeSource {
    fn id(&self) -> SourceId {
        SourceId::from(self.line)
    }
}

#[derive(Default)]
struct State {
    analog_enabled: bool,
    mux: FnvIndexMap<&'static str, MuxMode, 64>,
    leds: FnvIndexMap<GpioLine, Level, 8>,
    exported: FnvIndexMap<GpioLine, Direction, 128>,
    levels: FnvIndexMap<GpioLine, Level, 128>,
    analog: FnvIndexMap<u8, f32, 8>,
    pwm: FnvIndexMap<&'static str, PwmSetting, 16>,
    running: FnvIndexMap<&'static str, bool, 16>,
    sources: FnvIndexMap<GpioLine, Edge, 64>,
    faults: Vec<(SimOp, HwError), 8>,
    events: Vec<SimEvent, EVENT_LOG_LEN>,
}

impl State {
    fn check(&mut self, op: SimOp) -> Result<(), HwError> {
        match self.faults.iter().position(|(o, _)| *o == op) {
            Some(i) => Err(self.faults.remove(i).1),
            None => Ok(()),
        }
    }

    fn record(&mut self, event: SimEvent) {
        // Oldest entries are kept; tests clear the log between phases
        let _ = self.events.push(event);
    }

    fn line_level(&self, line: GpioLine) -> Result<Level, HwError> {
        if let Some(level) = self.leds.get(&line) {
            return Ok(*level);
        }
        if !self.exported.contains_key(&line) {
            return Err(HwError::NotExported);
        }
        Ok(self.levels.get(&line).copied().unwrap_or_default())
    }

    fn write_line(&mut self, pin: &PinDescriptor, level: Level) -> Result<(), HwError> {
        let line = pin.gpio.ok_or(HwError::Unsupported)?;
        if let Some(led) = self.leds.get_mut(&line) {
            *led = level;
        } else {
            match self.exported.get(&line) {
                Some(Direction::Out) => {}
                Some(Direction::In) => return Err(HwError::InvalidValue),
                None => return Err(HwError::NotExported),
            }
            self.levels
                .insert(line, level)
                .map_err(|_| HwError::Busy)?;
        }
        self.record(SimEvent::Write {
            pin: pin.key,
            level,
        });
        Ok(())
    }
}

/// Simulated board
pub struct SimBoard {
    state: RefCell<State>,
    yielding: bool,
}

impl Default for SimBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBoard {
    /// Create a board with every pin unconfigured
    pub fn new() -> Self {
        Self {
            state: RefCell::new(State::default()),
            yielding: false,
        }
    }

    /// Yield to the executor at the start of every async call
    pub fn with_yield(mut self, yielding: bool) -> Self {
        self.yielding = yielding;
        self
    }

    /// Make the next call of `op` fail with `error`
    pub fn fail_next(&self, op: SimOp, error: HwError) {
        let _ = self.state.borrow_mut().faults.push((op, error));
    }

    /// Drive an input line from outside
    ///
    /// Returns true if an open edge source on the line triggers on the
    /// transition, i.e. the kernel would flag it ready.
    pub fn set_level(&self, line: GpioLine, level: Level) -> bool {
        let mut state = self.state.borrow_mut();
        let previous = state.levels.get(&line).copied().unwrap_or_default();
        let _ = state.levels.insert(line, level);
        state
            .sources
            .get(&line)
            .is_some_and(|edge| edge.triggers(previous, level))
    }

    /// Set the value an analog channel reports (clamped to 0.0..=1.0)
    pub fn set_analog(&self, ain: u8, value: f32) {
        let _ = self
            .state
            .borrow_mut()
            .analog
            .insert(ain, value.clamp(0.0, 1.0));
    }

    /// Current level of a line, if it is exported or an LED
    pub fn level(&self, line: GpioLine) -> Option<Level> {
        self.state.borrow().line_level(line).ok()
    }

    /// Current pinmux selection for a pin key
    pub fn mux(&self, key: &str) -> Option<MuxMode> {
        self.state.borrow().mux.get(key).copied()
    }

    /// Direction of an exported line
    pub fn exported(&self, line: GpioLine) -> Option<Direction> {
        self.state.borrow().exported.get(&line).copied()
    }

    /// Last setting written to a PWM channel
    pub fn pwm(&self, channel: &str) -> Option<PwmSetting> {
        self.state.borrow().pwm.get(channel).copied()
    }

    /// Check if a PWM channel output is enabled
    pub fn pwm_running(&self, channel: &str) -> bool {
        self.state
            .borrow()
            .running
            .get(channel)
            .copied()
            .unwrap_or(false)
    }

    /// Check if the analog subsystem was enabled
    pub fn analog_enabled(&self) -> bool {
        self.state.borrow().analog_enabled
    }

    /// Number of edge sources currently open
    pub fn open_sources(&self) -> usize {
        self.state.borrow().sources.len()
    }

    /// Copy of the event log
    pub fn events(&self) -> Vec<SimEvent, EVENT_LOG_LEN> {
        self.state.borrow().events.clone()
    }

    /// Clear the event log
    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }

    async fn pause(&self) {
        if self.yielding {
            embassy_futures::yield_now().await;
        }
    }
}

impl Board for SimBoard {
    type EdgeSource = SimEdgeSource;

    async fn enable_analog_inputs(&self) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::EnableAnalog)?;
        state.analog_enabled = true;
        Ok(())
    }

    async fn configure_mux(&self, pin: &PinDescriptor, mode: MuxMode) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ConfigureMux)?;
        if mode == MuxMode::Pwm && pin.pwm.is_none() {
            return Err(HwError::Unsupported);
        }
        if mode.is_gpio() && pin.gpio.is_none() {
            return Err(HwError::Unsupported);
        }
        state.mux.insert(pin.key, mode).map_err(|_| HwError::Busy)?;
        state.record(SimEvent::Mux { pin: pin.key, mode });
        Ok(())
    }

    async fn configure_led(&self, pin: &PinDescriptor) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ConfigureLed)?;
        let line = match (pin.led, pin.gpio) {
            (true, Some(line)) => line,
            _ => return Err(HwError::Unsupported),
        };
        if !state.leds.contains_key(&line) {
            state
                .leds
                .insert(line, Level::Low)
                .map_err(|_| HwError::Busy)?;
        }
        state.record(SimEvent::Led { pin: pin.key });
        Ok(())
    }

    async fn export_gpio(&self, pin: &PinDescriptor, direction: Direction) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ExportGpio)?;
        let line = pin.gpio.ok_or(HwError::Unsupported)?;
        state
            .exported
            .insert(line, direction)
            .map_err(|_| HwError::Busy)?;
        state.record(SimEvent::Export { line, direction });
        Ok(())
    }

    async fn read_gpio_direction(&self, pin: &PinDescriptor) -> Result<GpioStatus, HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadDirection)?;
        let line = pin.gpio.ok_or(HwError::Unsupported)?;
        let status = if state.leds.contains_key(&line) {
            GpioStatus {
                active: true,
                direction: Direction::Out,
            }
        } else {
            match state.exported.get(&line) {
                Some(direction) => GpioStatus {
                    active: true,
                    direction: *direction,
                },
                None => GpioStatus {
                    active: false,
                    direction: Direction::In,
                },
            }
        };
        Ok(status)
    }

    async fn read_gpio(&self, pin: &PinDescriptor) -> Result<Level, HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadGpio)?;
        let line = pin.gpio.ok_or(HwError::Unsupported)?;
        state.line_level(line)
    }

    async fn write_gpio(&self, pin: &PinDescriptor, level: Level) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::WriteGpio)?;
        state.write_line(pin, level)
    }

    fn write_gpio_sync(&self, pin: &PinDescriptor, level: Level) -> Result<(), HwError> {
        let mut state = self.state.borrow_mut();
        state.check(SimOp::WriteGpio)?;
        state.write_line(pin, level)
    }

    async fn read_analog(&self, pin: &PinDescriptor) -> Result<f32, HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadAnalog)?;
        let ain = pin.ain.ok_or(HwError::Unsupported)?;
        if !state.analog_enabled {
            return Err(HwError::NotFound);
        }
        Ok(state.analog.get(&ain).copied().unwrap_or(0.0))
    }

    async fn write_pwm(
        &self,
        pin: &PinDescriptor,
        _previous: PwmSetting,
        freq_hz: f32,
        duty: f32,
    ) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::WritePwm)?;
        let channel = pin.pwm_channel().ok_or(HwError::Unsupported)?;
        if !(freq_hz > 0.0) || !(0.0..=1.0).contains(&duty) {
            return Err(HwError::InvalidValue);
        }
        let setting = PwmSetting::new(freq_hz, duty);
        state
            .pwm
            .insert(channel, setting)
            .map_err(|_| HwError::Busy)?;
        state.record(SimEvent::Pwm { channel, setting });
        Ok(())
    }

    async fn read_pwm(
        &self,
        pin: &PinDescriptor,
        cached: PwmSetting,
    ) -> Result<PwmSetting, HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadPwm)?;
        let channel = pin.pwm_channel().ok_or(HwError::Unsupported)?;
        Ok(state.pwm.get(channel).copied().unwrap_or(cached))
    }

    async fn start_pwm(&self, pin: &PinDescriptor, _setting: PwmSetting) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::StartPwm)?;
        let channel = pin.pwm_channel().ok_or(HwError::Unsupported)?;
        state
            .running
            .insert(channel, true)
            .map_err(|_| HwError::Busy)?;
        state.record(SimEvent::PwmRun {
            channel,
            running: true,
        });
        Ok(())
    }

    async fn stop_pwm(&self, pin: &PinDescriptor, _setting: PwmSetting) -> Result<(), HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::StopPwm)?;
        let channel = pin.pwm_channel().ok_or(HwError::Unsupported)?;
        state
            .running
            .insert(channel, false)
            .map_err(|_| HwError::Busy)?;
        state.record(SimEvent::PwmRun {
            channel,
            running: false,
        });
        Ok(())
    }

    async fn read_pin_state(&self, pin: &PinDescriptor) -> Result<PinState, HwError> {
        self.pause().await;
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadPinState)?;
        let pin_state = match state.mux.get(pin.key) {
            Some(MuxMode::Pwm) => PinState {
                mux: pwm_mux_index(pin),
                pull: Pull::Disabled,
                slew: Slew::Fast,
                receiver_enabled: false,
            },
            Some(mode) => PinState {
                mux: 7,
                pull: match mode {
                    MuxMode::GpioPullUp => Pull::PullUp,
                    MuxMode::GpioPullDown => Pull::PullDown,
                    _ => Pull::Disabled,
                },
                slew: Slew::Fast,
                receiver_enabled: true,
            },
            None => PinState::default(),
        };
        Ok(pin_state)
    }

    fn open_edge_source(&self, pin: &PinDescriptor, edge: Edge) -> Result<SimEdgeSource, HwError> {
        let mut state = self.state.borrow_mut();
        state.check(SimOp::OpenEdgeSource)?;
        let line = pin.gpio.ok_or(HwError::Unsupported)?;
        if !state.exported.contains_key(&line) {
            return Err(HwError::NotExported);
        }
        state
            .sources
            .insert(line, edge)
            .map_err(|_| HwError::Busy)?;
        Ok(SimEdgeSource { line })
    }

    fn read_edge(&self, source: &mut SimEdgeSource) -> Result<Level, HwError> {
        let mut state = self.state.borrow_mut();
        state.check(SimOp::ReadEdge)?;
        state.line_level(source.line)
    }

    fn close_edge_source(&self, source: SimEdgeSource) {
        self.state.borrow_mut().sources.remove(&source.line);
    }
}

/// Mux index of the pin's PWM option, 0 if the option list does not name it
fn pwm_mux_index(pin: &PinDescriptor) -> u8 {
    pin.options
        .and_then(|opts| opts.iter().position(|o| o.contains("pwm")))
        .map(|i| i as u8)
        .unwrap_or(0)
}
