//! Trap frame dumps.
//!
//! Output is line-oriented and column-stable: 32-bit values as `0x%08x`,
//! selectors as `0x----%04x`. Write errors from the sink are ignored.

use core::fmt::Write;

use super::frame::{Registers, TrapFrame};
use super::vector::trap_name;

pub fn print_trapframe(out: &mut dyn Write, tf: &TrapFrame) {
    let _ = writeln!(out, "TRAP frame at 0x{:08x}", tf as *const TrapFrame as usize);
    let _ = writeln!(out, "  es   0x----{:04x}", tf.es);
    let _ = writeln!(out, "  ds   0x----{:04x}", tf.ds);
    let _ = writeln!(out, "  trap 0x{:08x} {}", tf.trapno, trap_name(tf.trapno));
    let _ = writeln!(out, "  err  0x{:08x}", tf.err);
    let _ = writeln!(out, "  eip  0x{:08x}", tf.eip);
    let _ = writeln!(out, "  cs   0x----{:04x}", tf.cs);
    let _ = writeln!(out, "  flag 0x{:08x}", tf.eflags);
    let _ = writeln!(out, "  esp  0x{:08x}", tf.esp);
    let _ = writeln!(out, "  ss   0x----{:04x}", tf.ss);
    print_regs(out, &tf.regs);
}

pub fn print_regs(out: &mut dyn Write, regs: &Registers) {
    let _ = writeln!(out, "  edi  0x{:08x}", regs.edi);
    let _ = writeln!(out, "  esi  0x{:08x}", regs.esi);
    let _ = writeln!(out, "  ebp  0x{:08x}", regs.ebp);
    let _ = writeln!(out, "  oesp  0x{:08x}", regs.oesp);
    let _ = writeln!(out, "  ebx  0x{:08x}", regs.ebx);
    let _ = writeln!(out, "  edx  0x{:08x}", regs.edx);
    let _ = writeln!(out, "  ecx  0x{:08x}", regs.ecx);
    let _ = writeln!(out, "  eax  0x{:08x}", regs.eax);
}
