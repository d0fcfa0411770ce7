use std::fmt;

use crate::raw::input::input_id;

/// Bus, vendor, product and version identifiers of a device.
///
/// Virtual devices often leave these at zero.
///
/// Returned by [`Device::input_id`][crate::Device::input_id].
#[derive(Clone, Copy, PartialEq, Eq, Default)]
#[repr(transparent)]
pub struct InputId(pub(crate) input_id);

impl InputId {
    #[inline]
    pub const fn new(bus: Bus, vendor: u16, product: u16, version: u16) -> Self {
        Self(input_id {
            bustype: bus.0,
            vendor,
            product,
            version,
        })
    }

    /// The bus the device is attached through.
    #[inline]
    pub fn bus(&self) -> Bus {
        Bus(self.0.bustype)
    }

    /// For USB devices, the `idVendor` from the device descriptor.
    #[inline]
    pub fn vendor(&self) -> u16 {
        self.0.vendor
    }

    #[inline]
    pub fn product(&self) -> u16 {
        self.0.product
    }

    #[inline]
    pub fn version(&self) -> u16 {
        self.0.version
    }
}

impl fmt::Debug for InputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InputId {{ bus: {:?}, vendor: {:04x}, product: {:04x}, version: {:04x} }}",
            self.bus(),
            self.vendor(),
            self.product(),
            self.version(),
        )
    }
}

ffi_enum! {
    /// `BUS_*`: how a device is attached to the system.
    pub enum Bus: u16 {
        PCI         = 0x01,
        ISAPNP      = 0x02,
        USB         = 0x03,
        HIL         = 0x04,
        BLUETOOTH   = 0x05,
        VIRTUAL     = 0x06,
        ISA         = 0x10,
        I8042       = 0x11,
        XTKBD       = 0x12,
        RS232       = 0x13,
        GAMEPORT    = 0x14,
        PARPORT     = 0x15,
        AMIGA       = 0x16,
        ADB         = 0x17,
        I2C         = 0x18,
        HOST        = 0x19,
        GSC         = 0x1A,
        ATARI       = 0x1B,
        SPI         = 0x1C,
        RMI         = 0x1D,
        CEC         = 0x1E,
        INTEL_ISHTP = 0x1F,
        AMD_SFH     = 0x20,
    }
}

impl fmt::Debug for Bus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.variant_name() {
            Some(name) => write!(f, "BUS_{name}"),
            None => write!(f, "Bus({:#x})", self.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug() {
        assert_eq!(format!("{:?}", Bus::USB), "BUS_USB");
        assert_eq!(format!("{:?}", Bus(0xffff)), "Bus(0xffff)");
        assert_eq!(
            format!("{:?}", InputId::new(Bus::USB, 0x046d, 0xc52b, 0x111)),
            "InputId { bus: BUS_USB, vendor: 046d, product: c52b, version: 0111 }",
        );
    }
}
