//! Zion kernel: protected-mode trap subsystem.
//!
//! Builds the i386 interrupt descriptor table and task-state segment, and
//! routes every trap taken by the processor to the kernel monitor or to a
//! labelled halt.

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod kernel;
pub mod klog;
pub mod memlayout;
pub mod serial;

#[cfg(any(test, target_os = "none"))]
static PANIC_IN_PROGRESS: core::sync::atomic::AtomicBool =
    core::sync::atomic::AtomicBool::new(false);

/// Claim the panic path. False if a panic is already being reported.
#[cfg(any(test, target_os = "none"))]
fn begin_panic() -> bool {
    !PANIC_IN_PROGRESS.swap(true, core::sync::atomic::Ordering::SeqCst)
}

#[cfg(all(target_os = "none", not(test)))]
#[panic_handler]
fn panic(info: &core::panic::PanicInfo) -> ! {
    use core::fmt::Write;

    arch::x86::disable_interrupts();
    if !begin_panic() {
        let _ = serial::TrapConsole.write_str("\nrecursive panic, halting\n");
        arch::x86::halt_forever()
    }

    let _ = writeln!(serial::TrapConsole, "kernel panic: {}", info.message());
    arch::x86::halt_forever()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_first_panic_reports() {
        assert!(begin_panic());
        assert!(!begin_panic());
        assert!(!begin_panic());
    }
}
