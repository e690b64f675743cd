//! Trap subsystem bring-up.
//!
//! [`early_init`] builds the TSS, GDT and IDT exactly once and loads them.
//! It must run before interrupts are enabled and before the first switch to
//! user mode.

pub mod error;
pub mod gdt;
pub mod idt;

#[cfg(test)]
mod tests;

use x86_64::structures::gdt::SegmentSelector;

use crate::arch::x86::Cpu;
use crate::klog::{klog_get_level, klog_set_level, KlogLevel};
use crate::memlayout::{is_page_aligned, KSTACKTOP};

pub use error::{KernelInitError, KernelInitResult};
use gdt::{GlobalDescriptorTable, TaskState, KERNEL_DATA_SELECTOR, TSS_SELECTOR};
use idt::{EntryTable, InterruptDescriptorTable, MonitorFn};

/// Boot-time parameters of the trap subsystem.
#[derive(Clone, Copy)]
pub struct BootConfig {
    /// `esp0` of the TSS.
    pub kernel_stack_top: u32,
    /// `ss0` of the TSS.
    pub kernel_stack_segment: SegmentSelector,
    pub log_level: KlogLevel,
    /// Entered on breakpoints and page faults.
    pub monitor: MonitorFn,
}

impl BootConfig {
    pub const fn new(monitor: MonitorFn) -> Self {
        Self {
            kernel_stack_top: KSTACKTOP,
            kernel_stack_segment: KERNEL_DATA_SELECTOR,
            log_level: KlogLevel::Info,
            monitor,
        }
    }

    pub fn validate(&self) -> KernelInitResult<()> {
        if self.kernel_stack_top == 0 {
            return Err(KernelInitError::NullKernelStack);
        }
        if !is_page_aligned(self.kernel_stack_top) {
            return Err(KernelInitError::MisalignedKernelStack {
                top: self.kernel_stack_top,
            });
        }
        Ok(())
    }
}

/// The hardware-visible tables, built once and never modified.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorTables {
    pub task_state: &'static TaskState,
    pub gdt: &'static GlobalDescriptorTable,
    pub idt: &'static InterruptDescriptorTable,
}

impl DescriptorTables {
    /// Load the tables: `lgdt`, `ltr`, then `lidt`.
    pub fn install<C: Cpu>(&self, cpu: &mut C) {
        unsafe {
            cpu.load_gdt(&self.gdt.pointer());
            cpu.load_task_register(TSS_SELECTOR);
            cpu.load_idt(&self.idt.pointer());
        }
    }
}

/// Build and load the trap tables.
///
/// `entries` holds the entry stub of every vector.
pub fn early_init<C: Cpu>(
    cpu: &mut C,
    config: &BootConfig,
    entries: &EntryTable,
) -> KernelInitResult<DescriptorTables> {
    if let Err(err) = config.validate() {
        crate::klog_error!("trap init: {}", err);
        return Err(err);
    }
    if idt::storage::IDT_STORAGE.is_completed() {
        crate::klog_warn!("trap init: {}", KernelInitError::AlreadyInitialized);
        return Err(KernelInitError::AlreadyInitialized);
    }

    klog_set_level(config.log_level);
    crate::klog_debug!("trap init: log level {:?}", klog_get_level());
    idt::attach_monitor(config.monitor);

    let task_state = gdt::TSS.call_once(|| {
        TaskState::for_kernel_stack(config.kernel_stack_top, config.kernel_stack_segment)
    });
    let gdt_table = gdt::GDT.call_once(|| GlobalDescriptorTable::new(task_state));
    let idt_table = idt::storage::IDT_STORAGE.call_once(|| InterruptDescriptorTable::build(entries));

    let tables = DescriptorTables {
        task_state,
        gdt: gdt_table,
        idt: idt_table,
    };
    tables.install(cpu);

    gdt::log_gdt_info(gdt_table, task_state);
    idt::log_idt_info(idt_table);

    Ok(tables)
}

#[cfg(target_arch = "x86")]
extern "C" {
    /// Emitted by the trap entry stubs: one address per vector.
    static trap_entry_table: EntryTable;
}

/// Bring up the serial console and the trap subsystem on real hardware.
#[cfg(target_arch = "x86")]
pub fn trap_init(config: &BootConfig) -> KernelInitResult<DescriptorTables> {
    crate::serial::init();
    crate::klog::klog_attach_serial();
    crate::klog_info!("Zion: trap init");

    let entries = unsafe { &*core::ptr::addr_of!(trap_entry_table) };
    early_init(&mut crate::arch::x86::X86Cpu, config, entries)
}
