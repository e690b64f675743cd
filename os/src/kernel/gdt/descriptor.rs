//! GDT descriptor table management
//!
//! This module builds the i386 Global Descriptor Table: flat 4 GiB code and
//! data segments for ring 0 and ring 3 plus the single task-state segment.

use bitflags::bitflags;

use super::tss::TaskState;
use super::{GDT_ENTRIES, TSS_INDEX};
use crate::arch::x86::DescriptorTablePointer;

bitflags! {
    /// Bits of an 8-byte segment descriptor, at their hardware positions.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DescriptorFlags: u64 {
        const ACCESSED = 1 << 40;
        /// Writable for data segments, readable for code segments.
        const WRITABLE = 1 << 41;
        const CONFORMING = 1 << 42;
        const EXECUTABLE = 1 << 43;
        /// Code/data segment (as opposed to a system segment such as a TSS).
        const USER_SEGMENT = 1 << 44;
        const DPL_RING_3 = 3 << 45;
        const PRESENT = 1 << 47;
        const AVAILABLE = 1 << 52;
        /// 32-bit operands and addresses.
        const DEFAULT_SIZE = 1 << 54;
        /// Limit counts 4 KiB units.
        const GRANULARITY = 1 << 55;
        const LIMIT_0_15 = 0xFFFF;
        const LIMIT_16_19 = 0xF << 48;

        const COMMON = Self::USER_SEGMENT.bits()
            | Self::PRESENT.bits()
            | Self::DEFAULT_SIZE.bits()
            | Self::GRANULARITY.bits()
            | Self::LIMIT_0_15.bits()
            | Self::LIMIT_16_19.bits();
        const KERNEL_CODE = Self::COMMON.bits() | Self::EXECUTABLE.bits() | Self::WRITABLE.bits();
        const KERNEL_DATA = Self::COMMON.bits() | Self::WRITABLE.bits();
        const USER_CODE = Self::KERNEL_CODE.bits() | Self::DPL_RING_3.bits();
        const USER_DATA = Self::KERNEL_DATA.bits() | Self::DPL_RING_3.bits();
    }
}

/// System segment type of an available (not busy) 32-bit TSS.
pub const STS_T32A: u64 = 0x9;

/// One raw 8-byte GDT entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(transparent)]
pub struct SegmentDescriptor(u64);

impl SegmentDescriptor {
    pub const fn null() -> Self {
        Self(0)
    }

    /// Flat code or data segment (base 0, limit 4 GiB).
    pub const fn segment(flags: DescriptorFlags) -> Self {
        Self(flags.bits())
    }

    /// 32-bit TSS descriptor with byte granularity.
    pub const fn task_state(base: u32, limit: u32) -> Self {
        let base = base as u64;
        let limit = limit as u64;
        let mut raw = limit & 0xFFFF;
        raw |= (limit & 0xF_0000) << 32;
        raw |= (base & 0xFF_FFFF) << 16;
        raw |= (base & 0xFF00_0000) << 32;
        raw |= STS_T32A << 40;
        raw |= DescriptorFlags::PRESENT.bits();
        Self(raw)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }

    pub fn flags(self) -> DescriptorFlags {
        DescriptorFlags::from_bits_truncate(self.0)
    }

    pub const fn base(self) -> u32 {
        (((self.0 >> 16) & 0xFF_FFFF) | ((self.0 >> 32) & 0xFF00_0000)) as u32
    }

    /// Raw 20-bit limit field.
    pub const fn limit(self) -> u32 {
        ((self.0 & 0xFFFF) | ((self.0 >> 32) & 0xF_0000)) as u32
    }

    /// The 4-bit type field (meaningful for system segments).
    pub const fn system_type(self) -> u64 {
        (self.0 >> 40) & 0xF
    }

    pub const fn dpl(self) -> u8 {
        ((self.0 >> 45) & 0x3) as u8
    }

    pub const fn is_present(self) -> bool {
        self.0 & DescriptorFlags::PRESENT.bits() != 0
    }
}

/// The kernel's GDT. Layout is fixed; see the selector constants in
/// [`super`].
#[derive(Debug, Clone)]
#[repr(C, align(8))]
pub struct GlobalDescriptorTable {
    entries: [SegmentDescriptor; GDT_ENTRIES],
}

impl GlobalDescriptorTable {
    /// Build the table with the TSS descriptor pointing at `tss`.
    pub fn new(tss: &'static TaskState) -> Self {
        let mut entries = [SegmentDescriptor::null(); GDT_ENTRIES];
        entries[1] = SegmentDescriptor::segment(DescriptorFlags::KERNEL_CODE);
        entries[2] = SegmentDescriptor::segment(DescriptorFlags::KERNEL_DATA);
        entries[3] = SegmentDescriptor::segment(DescriptorFlags::USER_CODE);
        entries[4] = SegmentDescriptor::segment(DescriptorFlags::USER_DATA);
        entries[TSS_INDEX] = SegmentDescriptor::task_state(tss.base(), TaskState::LIMIT);
        Self { entries }
    }

    pub fn entry(&self, index: usize) -> Option<SegmentDescriptor> {
        self.entries.get(index).copied()
    }

    pub fn entries(&self) -> &[SegmentDescriptor; GDT_ENTRIES] {
        &self.entries
    }

    /// Operand for `lgdt`. Only a `'static` table may be handed to the CPU.
    pub fn pointer(&'static self) -> DescriptorTablePointer {
        DescriptorTablePointer::new(
            self.entries.as_ptr() as usize,
            core::mem::size_of::<[SegmentDescriptor; GDT_ENTRIES]>(),
        )
    }
}
