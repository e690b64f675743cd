//! i386 gate descriptors.
//!
//! ```text
//!  63          48 47 46 45 44 43  40 39    32 31         16 15          0
//! +--------------+--+-----+--+------+--------+-------------+-------------+
//! | offset 31:16 |P | DPL |0 | type |  zero  |  selector   | offset 15:0 |
//! +--------------+--+-----+--+------+--------+-------------+-------------+
//! ```

use x86_64::structures::gdt::SegmentSelector;
use x86_64::PrivilegeLevel;

const GATE_PRESENT: u8 = 0x80;
const GATE_DPL_SHIFT: u8 = 5;
const GATE_TYPE_MASK: u8 = 0x0F;

/// Gate kinds the kernel installs.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateType {
    /// Clears IF on entry, so the handler runs with interrupts masked.
    Interrupt32 = 0xE,
    /// Leaves IF untouched.
    Trap32 = 0xF,
}

impl GateType {
    pub const fn from_bits(bits: u8) -> Option<Self> {
        match bits & GATE_TYPE_MASK {
            0xE => Some(GateType::Interrupt32),
            0xF => Some(GateType::Trap32),
            _ => None,
        }
    }
}

/// One IDT entry in hardware layout.
#[derive(Clone, Copy, PartialEq, Eq)]
#[repr(C)]
pub struct GateDescriptor {
    offset_low: u16,
    selector: u16,
    reserved: u8,
    type_attr: u8,
    offset_high: u16,
}

const _: () = assert!(core::mem::size_of::<GateDescriptor>() == 8);

impl GateDescriptor {
    /// Not-present gate. Using it raises a general protection fault.
    pub const fn missing() -> Self {
        Self {
            offset_low: 0,
            selector: 0,
            reserved: 0,
            type_attr: 0,
            offset_high: 0,
        }
    }

    /// Present gate entering `handler` through `selector`. `dpl` is the
    /// least-privileged ring allowed to raise the vector with `int`.
    pub const fn new(
        handler: u32,
        selector: SegmentSelector,
        gate_type: GateType,
        dpl: PrivilegeLevel,
    ) -> Self {
        Self {
            offset_low: (handler & 0xFFFF) as u16,
            selector: selector.0,
            reserved: 0,
            type_attr: GATE_PRESENT | ((dpl as u8) << GATE_DPL_SHIFT) | gate_type as u8,
            offset_high: (handler >> 16) as u16,
        }
    }

    pub const fn handler_addr(&self) -> u32 {
        (self.offset_high as u32) << 16 | self.offset_low as u32
    }

    pub const fn selector(&self) -> SegmentSelector {
        SegmentSelector(self.selector)
    }

    pub const fn is_present(&self) -> bool {
        self.type_attr & GATE_PRESENT != 0
    }

    pub const fn gate_type(&self) -> Option<GateType> {
        GateType::from_bits(self.type_attr)
    }

    pub fn privilege_level(&self) -> PrivilegeLevel {
        PrivilegeLevel::from_u16(((self.type_attr >> GATE_DPL_SHIFT) & 0x3) as u16)
    }

    /// The descriptor as the CPU sees it.
    pub const fn as_u64(&self) -> u64 {
        (self.offset_high as u64) << 48
            | (self.type_attr as u64) << 40
            | (self.reserved as u64) << 32
            | (self.selector as u64) << 16
            | self.offset_low as u64
    }
}

impl core::fmt::Debug for GateDescriptor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GateDescriptor")
            .field("handler", &format_args!("0x{:08x}", self.handler_addr()))
            .field("selector", &format_args!("0x{:04x}", self.selector))
            .field("type", &self.gate_type())
            .field("dpl", &self.privilege_level())
            .field("present", &self.is_present())
            .finish()
    }
}
