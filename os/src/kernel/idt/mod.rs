//! Public API for IDT

pub mod frame;
pub mod gate;
pub mod handlers;
pub mod print;
pub mod storage;
pub mod vector;


pub use frame::{Origin, Registers, Trap, TrapFrame};
pub use gate::{GateDescriptor, GateType};
pub use handlers::{attach_monitor, dispatch, fatal, handle_trap, Monitor, MonitorFn};
pub use print::{print_regs, print_trapframe};
pub use storage::{EntryTable, InterruptDescriptorTable, IDT_ENTRIES};
pub use vector::{trap_name, TrapClass, TrapVector, T_SYSCALL};

/// Log IDT configuration
pub fn log_idt_info(idt: &InterruptDescriptorTable) {
    let present = idt.gates().iter().filter(|gate| gate.is_present()).count();
    crate::klog_info!("IDT: configured {} of {} vectors", present, IDT_ENTRIES);
    crate::klog_info!(
        "IDT: syscall vector {} dpl={:?}",
        T_SYSCALL,
        idt.gate(T_SYSCALL as u8).privilege_level()
    );
}
