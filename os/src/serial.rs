//! Serial port (COM1 @ 0x3F8). Console for trap diagnostics and the kernel log.

use core::fmt::{self, Write};
use core::sync::atomic::{AtomicBool, Ordering};
use spin::Mutex;
use uart_16550::SerialPort;

const COM1: u16 = 0x3F8;

pub static SERIAL: Mutex<SerialPort> = Mutex::new(unsafe { SerialPort::new(COM1) });

/// Set once the UART has been programmed. Before that, [`TrapConsole`] and
/// [`try_write_fmt`] drop their output.
static READY: AtomicBool = AtomicBool::new(false);

/// Initialize COM1. Safe to call once at boot, before any output.
pub fn init() {
    SERIAL.lock().init();
    READY.store(true, Ordering::Release);
}

pub fn is_ready() -> bool {
    READY.load(Ordering::Acquire)
}

/// Console for the trap and panic paths. Runs with interrupts disabled and
/// never spins on [`SERIAL`]: the only possible holder is the context the
/// trap interrupted, which cannot run until we return, so its lock is broken.
/// Its output may interleave with ours.
pub struct TrapConsole;

impl Write for TrapConsole {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let mut port = match SERIAL.try_lock() {
            Some(port) => port,
            None => {
                unsafe { SERIAL.force_unlock() };
                SERIAL.try_lock().ok_or(fmt::Error)?
            }
        };
        if !is_ready() {
            return Ok(());
        }
        port.write_str(s)
    }
}

/// Write to the port unless it is busy or not yet initialized. Never waits.
/// Returns whether the text was written.
pub fn try_write_fmt(args: fmt::Arguments) -> bool {
    if !is_ready() {
        return false;
    }
    match SERIAL.try_lock() {
        Some(mut port) => port.write_fmt(args).is_ok(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_console_breaks_a_held_lock() {
        let guard = SERIAL.lock();

        // Not initialized on the host: the text is dropped, but the call
        // must come back instead of spinning.
        assert_eq!(TrapConsole.write_str("Default...\n"), Ok(()));

        drop(guard);
    }

    #[test]
    fn logging_write_skips_uninitialized_port() {
        assert!(!try_write_fmt(format_args!("dropped {}\n", 1)));
    }
}
