//! i386 protected-mode instructions used while bringing up the trap tables.
//!
//! Everything that touches a CPU register goes through [`Cpu`], so the table
//! builders and the boot sequence can run without real hardware.

use x86_64::structures::gdt::SegmentSelector;

/// Operand of `lgdt`/`lidt`: table limit (size - 1) and linear base address.
///
/// Packed to the 6-byte layout the CPU reads on i386.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(C, packed(2))]
pub struct DescriptorTablePointer {
    pub limit: u16,
    pub base: usize,
}

impl DescriptorTablePointer {
    /// Pointer describing `size` bytes of table at `base`.
    pub fn new(base: usize, size: usize) -> Self {
        Self {
            limit: (size - 1) as u16,
            base,
        }
    }
}

/// Loads descriptor tables into the processor.
///
/// # Safety
///
/// Implementations write hardware registers. Callers must only pass pointers
/// to tables that stay valid and unmoved for the rest of the kernel's life.
pub trait Cpu {
    /// `lgdt`, then reload every segment register from the new table.
    unsafe fn load_gdt(&mut self, gdt: &DescriptorTablePointer);

    /// `ltr`: select the task-state segment used on privilege changes.
    unsafe fn load_task_register(&mut self, selector: SegmentSelector);

    /// `lidt`
    unsafe fn load_idt(&mut self, idt: &DescriptorTablePointer);
}

/// The processor we are running on.
#[cfg(target_arch = "x86")]
pub struct X86Cpu;

#[cfg(target_arch = "x86")]
impl Cpu for X86Cpu {
    unsafe fn load_gdt(&mut self, gdt: &DescriptorTablePointer) {
        use crate::kernel::gdt::{KERNEL_CODE_SELECTOR, KERNEL_DATA_SELECTOR, USER_DATA_SELECTOR};
        use core::arch::asm;

        asm!("lgdt [{}]", in(reg) gdt, options(readonly, nostack, preserves_flags));

        // The kernel never uses %gs or %fs; leave them user-accessible.
        let user = u32::from(USER_DATA_SELECTOR.0);
        asm!("mov gs, {0:e}", "mov fs, {0:e}", in(reg) user, options(nostack, preserves_flags));

        let kernel = u32::from(KERNEL_DATA_SELECTOR.0);
        asm!(
            "mov es, {0:e}",
            "mov ds, {0:e}",
            "mov ss, {0:e}",
            in(reg) kernel,
            options(nostack, preserves_flags)
        );

        // Far return to reload %cs.
        asm!(
            "push {sel:e}",
            "lea {tmp:e}, [55f]",
            "push {tmp:e}",
            "retf",
            "55:",
            sel = in(reg) u32::from(KERNEL_CODE_SELECTOR.0),
            tmp = lateout(reg) _,
            options(preserves_flags),
        );
    }

    unsafe fn load_task_register(&mut self, selector: SegmentSelector) {
        core::arch::asm!("ltr {0:x}", in(reg) selector.0, options(nostack, preserves_flags));
    }

    unsafe fn load_idt(&mut self, idt: &DescriptorTablePointer) {
        core::arch::asm!("lidt [{}]", in(reg) idt, options(readonly, nostack, preserves_flags));
    }
}

/// `cli`
#[cfg(target_arch = "x86")]
#[inline(always)]
pub fn disable_interrupts() {
    unsafe { core::arch::asm!("cli", options(nomem, nostack)) };
}

#[cfg(not(target_arch = "x86"))]
#[inline(always)]
pub fn disable_interrupts() {}

/// Disable interrupts and stop the processor for good.
#[cfg(target_arch = "x86")]
pub fn halt_forever() -> ! {
    loop {
        unsafe { core::arch::asm!("cli", "hlt", options(nomem, nostack)) };
    }
}

/// Spin forever when there is no i386 `hlt` to execute.
#[cfg(not(target_arch = "x86"))]
pub fn halt_forever() -> ! {
    loop {
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_limit_is_size_minus_one() {
        let ptr = DescriptorTablePointer::new(0x1000, 256 * 8);
        let limit = ptr.limit;
        let base = ptr.base;
        assert_eq!(limit, 0x7FF);
        assert_eq!(base, 0x1000);
    }
}
