//! Global Descriptor Table (GDT) subsystem
//!
//! # Layout
//!
//! | index | selector | segment |
//! |-------|----------|---------|
//! | 0 | `0x00` | null |
//! | 1 | `0x08` | kernel code (ring 0) |
//! | 2 | `0x10` | kernel data (ring 0) |
//! | 3 | `0x18` | user code (ring 3) |
//! | 4 | `0x20` | user data (ring 3) |
//! | 5 | `0x28` | Task State Segment |
//!
//! The TSS supplies the ring 0 stack for user -> kernel transitions.

pub mod descriptor;
pub mod tss;

#[cfg(test)]
mod tests;

use spin::Once;
use x86_64::structures::gdt::SegmentSelector;
use x86_64::PrivilegeLevel;

pub use descriptor::{DescriptorFlags, GlobalDescriptorTable, SegmentDescriptor};
pub use tss::TaskState;

/// Number of GDT slots.
pub const GDT_ENTRIES: usize = 6;

/// GDT slot of the task-state segment.
pub const TSS_INDEX: usize = 5;

pub const KERNEL_CODE_SELECTOR: SegmentSelector = SegmentSelector::new(1, PrivilegeLevel::Ring0);
pub const KERNEL_DATA_SELECTOR: SegmentSelector = SegmentSelector::new(2, PrivilegeLevel::Ring0);
pub const USER_CODE_SELECTOR: SegmentSelector = SegmentSelector::new(3, PrivilegeLevel::Ring3);
pub const USER_DATA_SELECTOR: SegmentSelector = SegmentSelector::new(4, PrivilegeLevel::Ring3);
pub const TSS_SELECTOR: SegmentSelector =
    SegmentSelector::new(TSS_INDEX as u16, PrivilegeLevel::Ring0);

/// Boot-time storage. Written once by [`crate::kernel::early_init`].
pub(crate) static TSS: Once<TaskState> = Once::new();
pub(crate) static GDT: Once<GlobalDescriptorTable> = Once::new();

/// Log GDT/TSS configuration
pub fn log_gdt_info(gdt: &GlobalDescriptorTable, tss: &TaskState) {
    crate::klog_info!(
        "GDT: code=0x{:04x} data=0x{:04x} tss=0x{:04x}",
        KERNEL_CODE_SELECTOR.0,
        KERNEL_DATA_SELECTOR.0,
        TSS_SELECTOR.0
    );
    if crate::klog::klog_is_enabled(crate::klog::KlogLevel::Debug) {
        for (index, entry) in gdt.entries().iter().enumerate() {
            crate::klog_debug!("GDT[{}] = 0x{:016x}", index, entry.as_u64());
        }
    }
    crate::klog_info!("TSS: esp0=0x{:08x} ss0=0x{:04x}", tss.esp0, tss.ss0);
}
