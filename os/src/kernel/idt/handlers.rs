//! Trap dispatch.
//!
//! Every trap funnels through [`trap`], called by the entry stubs with the
//! frame they built. Breakpoints and page faults stop in the kernel monitor
//! and resume the interrupted context; anything else is a bug in the kernel
//! or in the user program and halts the machine.

use core::fmt::Write;

use spin::Once;
use x86_64::structures::idt::PageFaultErrorCode;

use super::frame::{Origin, Trap, TrapFrame};
use super::print::print_trapframe;
use super::vector::TrapClass;

pub const KERNEL_TRAP_PANIC: &str = "unhandled trap in kernel";
pub const USER_TRAP_PANIC: &str = "unhandled trap in user mode";
pub const NO_MONITOR_PANIC: &str = "trap before kernel monitor was attached";

/// The interactive kernel monitor. It may rewrite any saved register in the
/// frame; the changes take effect when the trap returns.
pub trait Monitor {
    fn enter(&mut self, frame: &mut TrapFrame);
}

impl<F: FnMut(&mut TrapFrame)> Monitor for F {
    fn enter(&mut self, frame: &mut TrapFrame) {
        self(frame)
    }
}

/// Monitor entry point as registered at boot.
pub type MonitorFn = fn(&mut TrapFrame);

static MONITOR: Once<MonitorFn> = Once::new();

/// Register the monitor used by [`trap`]. Only the first call has an effect.
pub fn attach_monitor(monitor: MonitorFn) {
    MONITOR.call_once(|| monitor);
}

/// Handle one trap to completion: either return, resuming the interrupted
/// context, or halt.
pub fn dispatch(frame: &mut TrapFrame, console: &mut dyn Write, monitor: &mut dyn Monitor) {
    let trap = Trap::capture(frame);

    match trap.vector.class() {
        TrapClass::Breakpoint => {
            let _ = writeln!(console, "Bp...");
            monitor.enter(trap.frame);
        }
        TrapClass::PageFault => {
            let _ = writeln!(console, "Page Fault...");
            let code = PageFaultErrorCode::from_bits_truncate(u64::from(trap.frame.err));
            crate::klog_debug!(
                "page fault at eip=0x{:08x} err={:?} ({:?})",
                trap.frame.eip,
                code,
                trap.origin
            );
            monitor.enter(trap.frame);
        }
        TrapClass::Unexpected => {
            let _ = writeln!(console, "Default...");
            print_trapframe(console, trap.frame);
            match trap.origin {
                Origin::Kernel => fatal(KERNEL_TRAP_PANIC),
                Origin::User => fatal(USER_TRAP_PANIC),
            }
        }
    }
}

/// Halt the kernel with `cause`. Never returns.
pub fn fatal(cause: &str) -> ! {
    panic!("{}", cause)
}

/// Route a trap through the monitor registered at boot, reporting on the
/// serial console. Halts if no monitor has been attached yet.
pub fn handle_trap(frame: &mut TrapFrame) {
    // Interrupt gates already cleared IF; `iret` restores it on return.
    crate::arch::x86::disable_interrupts();

    let Some(&monitor) = MONITOR.get() else {
        let _ = writeln!(crate::serial::TrapConsole, "trap {} before monitor", frame.trapno);
        fatal(NO_MONITOR_PANIC)
    };
    let mut monitor = monitor;
    dispatch(frame, &mut crate::serial::TrapConsole, &mut monitor);
}

/// C entry point of the trap path.
///
/// # Safety
///
/// `tf` must point at the trap frame the entry stub just pushed on the
/// kernel stack, and nothing else may reference it until this returns.
#[no_mangle]
pub unsafe extern "C" fn trap(tf: *mut TrapFrame) {
    handle_trap(&mut *tf);
}
