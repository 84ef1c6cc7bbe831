//! Bit-banged serial output
//!
//! [`ShiftOut`] yields the write sequence for one byte: for every bit the
//! data level, then a clock high and a clock low. The runtime drives it one
//! step at a time through `digital_write`.

mod shift_out;

use core::str::FromStr;

use bonemux_hal::Level;

use crate::error::Error;

/// Bits in one shifted value
pub const SHIFT_BITS: u8 = 8;

/// Writes per bit: data, clock high, clock low
const PHASES: u8 = 3;

/// Order bits are shifted out in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitOrder {
    LsbFirst,
    MsbFirst,
}

impl BitOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            BitOrder::LsbFirst => "LSBFIRST",
            BitOrder::MsbFirst => "MSBFIRST",
        }
    }

    /// Bit of `value` sent in slot `index`
    fn bit(self, value: u8, index: u8) -> Level {
        let shift = match self {
            BitOrder::LsbFirst => index,
            BitOrder::MsbFirst => SHIFT_BITS - 1 - index,
        };
        Level::from((value >> shift) & 1)
    }
}

impl FromStr for BitOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "LSBFIRST" => Ok(BitOrder::LsbFirst),
            "MSBFIRST" => Ok(BitOrder::MsbFirst),
            _ => Err(Error::InvalidArgument("unknown bit order")),
        }
    }
}

/// Single write in a shift-out sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ShiftStep {
    /// Drive the data pin
    Data(Level),
    ClockHigh,
    ClockLow,
}

/// Shift-out sequencer
#[derive(Debug, Clone)]
pub struct ShiftOut {
    value: u8,
    order: BitOrder,
    step: u8,
}

impl ShiftOut {
    pub fn new(value: u8, order: BitOrder) -> Self {
        Self {
            value,
            order,
            step: 0,
        }
    }

    /// Index of the bit the next step belongs to
    pub fn bit_index(&self) -> u8 {
        self.step / PHASES
    }

    pub fn is_done(&self) -> bool {
        self.step >= SHIFT_BITS * PHASES
    }
}

impl Iterator for ShiftOut {
    type Item = ShiftStep;

    fn next(&mut self) -> Option<ShiftStep> {
        if self.is_done() {
            return None;
        }
        let step = match self.step % PHASES {
            0 => ShiftStep::Data(self.order.bit(self.value, self.bit_index())),
            1 => ShiftStep::ClockHigh,
            _ => ShiftStep::ClockLow,
        };
        self.step += 1;
        Some(step)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = usize::from(SHIFT_BITS * PHASES - self.step.min(SHIFT_BITS * PHASES));
        (left, Some(left))
    }
}

impl ExactSizeIterator for ShiftOut {}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec;
    use proptest::prelude::*;

    fn data_bits(shift: ShiftOut) -> Vec<u8, 8> {
        shift
            .filter_map(|s| match s {
                ShiftStep::Data(level) => Some(level.as_u8()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_lsb_first() {
        let bits = data_bits(ShiftOut::new(0b1011_0000, BitOrder::LsbFirst));
        assert_eq!(bits.as_slice(), &[0, 0, 0, 0, 1, 1, 0, 1]);
    }

    #[test]
    fn test_msb_first() {
        let bits = data_bits(ShiftOut::new(0b1011_0000, BitOrder::MsbFirst));
        assert_eq!(bits.as_slice(), &[1, 0, 1, 1, 0, 0, 0, 0]);
    }

    #[test]
    fn test_step_pattern() {
        let mut shift = ShiftOut::new(0xFF, BitOrder::MsbFirst);
        assert_eq!(shift.len(), 24);
        assert_eq!(shift.next(), Some(ShiftStep::Data(Level::High)));
        assert_eq!(shift.next(), Some(ShiftStep::ClockHigh));
        assert_eq!(shift.next(), Some(ShiftStep::ClockLow));
        assert_eq!(shift.bit_index(), 1);
        assert_eq!(shift.len(), 21);
    }

    #[test]
    fn test_parse_order() {
        assert_eq!("LSBFIRST".parse::<BitOrder>(), Ok(BitOrder::LsbFirst));
        assert_eq!("MSBFIRST".parse::<BitOrder>(), Ok(BitOrder::MsbFirst));
        assert!(matches!(
            "msbfirst".parse::<BitOrder>(),
            Err(Error::InvalidArgument(_))
        ));
        for order in [BitOrder::LsbFirst, BitOrder::MsbFirst] {
            assert_eq!(order.as_str().parse::<BitOrder>(), Ok(order));
        }
    }

    proptest! {
        #[test]
        fn prop_sequence_shape(value: u8, lsb: bool) {
            let order = if lsb { BitOrder::LsbFirst } else { BitOrder::MsbFirst };
            let mut shift = ShiftOut::new(value, order);
            let mut rebuilt = 0u8;
            for i in 0..SHIFT_BITS {
                let Some(ShiftStep::Data(level)) = shift.next() else {
                    panic!("expected data step");
                };
                prop_assert_eq!(shift.next(), Some(ShiftStep::ClockHigh));
                prop_assert_eq!(shift.next(), Some(ShiftStep::ClockLow));
                let pos = if lsb { i } else { SHIFT_BITS - 1 - i };
                rebuilt |= level.as_u8() << pos;
            }
            prop_assert!(shift.is_done());
            prop_assert_eq!(shift.next(), None);
            prop_assert_eq!(rebuilt, value);
        }
    }
}
