//! Header pin maps
//!
//! Static descriptor tables implementing [`PinMap`] for supported boards.

mod beaglebone;

pub use beaglebone::BEAGLEBONE_BLACK;

use bonemux_hal::{PinDescriptor, PinMap};

/// Pin map backed by a static descriptor table
#[derive(Debug, Clone, Copy)]
pub struct HeaderMap {
    pins: &'static [PinDescriptor],
}

impl HeaderMap {
    /// Create a map over a descriptor table
    pub const fn new(pins: &'static [PinDescriptor]) -> Self {
        Self { pins }
    }

    /// All descriptors in table order
    pub fn pins(&self) -> &'static [PinDescriptor] {
        self.pins
    }
}

impl PinMap for HeaderMap {
    /// Keys and names are matched ignoring ASCII case
    fn lookup(&self, id: &str) -> Option<PinDescriptor> {
        self.pins
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(id) || p.name.eq_ignore_ascii_case(id))
            .copied()
    }
}
