//! Bring-up tests: configuration checks, the load sequence and the trap entry.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};

use x86_64::PrivilegeLevel;

use super::gdt::{GDT_ENTRIES, KERNEL_CODE_SELECTOR, TSS_INDEX, USER_CODE_SELECTOR};
use super::idt::handlers::{trap, KERNEL_TRAP_PANIC, NO_MONITOR_PANIC};
use super::idt::vector::T_BRKPT;
use super::idt::{handle_trap, EntryTable, TrapFrame, IDT_ENTRIES, T_SYSCALL};
use super::*;
use crate::arch::x86::DescriptorTablePointer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    LoadGdt { limit: u16, base: usize },
    LoadTaskRegister(u16),
    LoadIdt { limit: u16, base: usize },
}

#[derive(Default)]
struct RecordingCpu {
    ops: Vec<Op>,
}

impl Cpu for RecordingCpu {
    unsafe fn load_gdt(&mut self, gdt: &DescriptorTablePointer) {
        let (limit, base) = (gdt.limit, gdt.base);
        self.ops.push(Op::LoadGdt { limit, base });
    }

    unsafe fn load_task_register(&mut self, selector: SegmentSelector) {
        self.ops.push(Op::LoadTaskRegister(selector.0));
    }

    unsafe fn load_idt(&mut self, idt: &DescriptorTablePointer) {
        let (limit, base) = (idt.limit, idt.base);
        self.ops.push(Op::LoadIdt { limit, base });
    }
}

fn noop_monitor(_: &mut TrapFrame) {}

fn entry_table() -> EntryTable {
    let mut entries = [0u32; IDT_ENTRIES];
    for (vector, entry) in entries.iter_mut().enumerate() {
        *entry = 0xF010_4000 + (vector as u32) * 10;
    }
    entries
}

fn leaked_tables() -> DescriptorTables {
    let task_state: &'static TaskState = Box::leak(Box::new(TaskState::for_kernel_stack(
        KSTACKTOP,
        KERNEL_DATA_SELECTOR,
    )));
    let gdt: &'static GlobalDescriptorTable =
        Box::leak(Box::new(GlobalDescriptorTable::new(task_state)));
    let idt: &'static InterruptDescriptorTable =
        Box::leak(Box::new(InterruptDescriptorTable::build(&entry_table())));
    DescriptorTables {
        task_state,
        gdt,
        idt,
    }
}

#[test]
fn install_loads_gdt_then_tss_then_idt() {
    let tables = leaked_tables();
    let mut cpu = RecordingCpu::default();

    tables.install(&mut cpu);

    assert_eq!(
        cpu.ops,
        [
            Op::LoadGdt {
                limit: (GDT_ENTRIES * 8 - 1) as u16,
                base: tables.gdt.entries().as_ptr() as usize,
            },
            Op::LoadTaskRegister(0x28),
            Op::LoadIdt {
                limit: 0x7FF,
                base: tables.idt.gates().as_ptr() as usize,
            },
        ]
    );
}

#[test]
fn default_config_uses_kernel_stack() {
    let config = BootConfig::new(noop_monitor);

    assert_eq!(config.kernel_stack_top, KSTACKTOP);
    assert_eq!(config.kernel_stack_segment, KERNEL_DATA_SELECTOR);
    assert_eq!(config.log_level, KlogLevel::Info);
    assert_eq!(config.validate(), Ok(()));
}

#[test]
fn config_rejects_unusable_stack_tops() {
    let mut config = BootConfig::new(noop_monitor);

    config.kernel_stack_top = 0;
    assert_eq!(config.validate(), Err(KernelInitError::NullKernelStack));

    config.kernel_stack_top = 0xF000_0010;
    let err = config.validate().unwrap_err();
    assert_eq!(err, KernelInitError::MisalignedKernelStack { top: 0xF000_0010 });
    assert_eq!(
        err.to_string(),
        "kernel stack top is not page aligned: 0xf0000010"
    );
}

#[test]
fn invalid_config_loads_nothing() {
    let mut config = BootConfig::new(noop_monitor);
    config.kernel_stack_top = 0x1234;
    let mut cpu = RecordingCpu::default();

    let result = early_init(&mut cpu, &config, &entry_table());

    assert!(matches!(
        result,
        Err(KernelInitError::MisalignedKernelStack { top: 0x1234 })
    ));
    assert!(cpu.ops.is_empty());
}

static BREAKPOINTS: AtomicUsize = AtomicUsize::new(0);

/// Counts breakpoints and steps over the `int3`.
fn counting_monitor(frame: &mut TrapFrame) {
    BREAKPOINTS.fetch_add(1, Ordering::SeqCst);
    frame.eip += 1;
}

fn halt_cause(run: impl FnOnce()) -> String {
    let payload = panic::catch_unwind(AssertUnwindSafe(run)).expect_err("trap must halt");
    match payload.downcast::<String>() {
        Ok(message) => *message,
        Err(payload) => payload
            .downcast_ref::<&str>()
            .map(|s| String::from(*s))
            .unwrap_or_default(),
    }
}

// The tables and the monitor live in process-wide statics, so bring-up and
// the trap entry are exercised in this one test only.
#[test]
fn trap_entry_and_early_init_in_boot_order() {
    // A trap that beats bring-up halts with its own cause.
    let mut early = TrapFrame::new(T_BRKPT, KERNEL_CODE_SELECTOR);
    assert_eq!(halt_cause(|| handle_trap(&mut early)), NO_MONITOR_PANIC);
    assert_eq!(BREAKPOINTS.load(Ordering::SeqCst), 0);

    let config = BootConfig::new(counting_monitor);
    let entries = entry_table();
    let mut cpu = RecordingCpu::default();

    let tables = early_init(&mut cpu, &config, &entries).expect("first bring-up succeeds");

    assert_eq!(tables.task_state.esp0, KSTACKTOP);
    assert_eq!(tables.task_state.ss0, 0x10);

    let tss = tables.gdt.entry(TSS_INDEX).expect("TSS slot");
    assert_eq!(tss.base(), tables.task_state.base());
    assert_eq!(tss.limit(), TaskState::LIMIT);

    let syscall = tables.idt.gate(T_SYSCALL as u8);
    assert_eq!(syscall.privilege_level(), PrivilegeLevel::Ring3);
    assert_eq!(syscall.handler_addr(), entries[T_SYSCALL as usize]);
    assert!(tables.idt.gates().iter().all(|gate| gate.is_present()));

    assert_eq!(cpu.ops.len(), 3);
    assert_eq!(cpu.ops[1], Op::LoadTaskRegister(TSS_SELECTOR.0));

    // The C entry routes a breakpoint to the attached monitor and returns.
    let mut bp = TrapFrame::new(T_BRKPT, USER_CODE_SELECTOR);
    bp.eip = 0x0080_0030;
    unsafe { trap(&mut bp) };
    assert_eq!(BREAKPOINTS.load(Ordering::SeqCst), 1);
    assert_eq!(bp.eip, 0x0080_0031);

    // An interrupted holder of the console lock must not stall the halt.
    let console = crate::serial::SERIAL.lock();
    let mut irq = TrapFrame::new(32, KERNEL_CODE_SELECTOR);
    assert_eq!(halt_cause(|| handle_trap(&mut irq)), KERNEL_TRAP_PANIC);
    drop(console);
    assert_eq!(BREAKPOINTS.load(Ordering::SeqCst), 1);

    let mut again = RecordingCpu::default();
    assert_eq!(
        early_init(&mut again, &config, &entries).map(|_| ()),
        Err(KernelInitError::AlreadyInitialized)
    );
    assert!(again.ops.is_empty());
}
