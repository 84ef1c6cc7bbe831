use bonemux_hal::{Board, Level, PinMap, Reactor};

use super::{BitOrder, ShiftOut, ShiftStep};
use crate::error::Result;
use crate::runtime::Runtime;

impl<M: PinMap, B: Board, R: Reactor> Runtime<M, B, R> {
    /// Shift a byte out on `data`, strobing `clock` after every bit
    ///
    /// Both pins are checked before the first write. The first failed write
    /// aborts the sequence; bits already sent stay sent.
    pub async fn shift_out(
        &self,
        data: &str,
        clock: &str,
        order: BitOrder,
        value: u8,
    ) -> Result<()> {
        let data = self.pin(data)?;
        let clock = self.pin(clock)?;
        Self::gpio_line(&data)?;
        Self::gpio_line(&clock)?;
        debug!(
            "shift_out({}, {}, {}, {})",
            data.key,
            clock.key,
            order.as_str(),
            value
        );

        for step in ShiftOut::new(value, order) {
            let (pin, level) = match step {
                ShiftStep::Data(level) => (data.key, level),
                ShiftStep::ClockHigh => (clock.key, Level::High),
                ShiftStep::ClockLow => (clock.key, Level::Low),
            };
            self.digital_write(pin, level).await?;
        }
        Ok(())
    }
}
