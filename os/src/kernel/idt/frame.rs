//! Saved CPU state at the time of a trap.
//!
//! The entry stubs build a [`TrapFrame`] on the kernel stack, bottom to top:
//! `pushal` registers, `%ds`/`%es`, the trap number, then whatever the CPU
//! pushed (error code or a zero placeholder, `%eip`, `%cs`, `%eflags`, and on
//! a privilege change `%esp`/`%ss`).

use x86_64::structures::gdt::SegmentSelector;

use super::vector::TrapVector;
use crate::kernel::gdt::KERNEL_CODE_SELECTOR;

/// General-purpose registers in `pushal` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct Registers {
    pub edi: u32,
    pub esi: u32,
    pub ebp: u32,
    /// `%esp` at the time of `pushal`; ignored by `popal`.
    pub oesp: u32,
    pub ebx: u32,
    pub edx: u32,
    pub ecx: u32,
    pub eax: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TrapFrame {
    pub regs: Registers,
    pub es: u16,
    _pad1: u16,
    pub ds: u16,
    _pad2: u16,
    pub trapno: u32,
    /// Error code pushed by the CPU, or 0 when the exception has none.
    pub err: u32,
    pub eip: u32,
    pub cs: u16,
    _pad3: u16,
    pub eflags: u32,
    /// Only meaningful when the trap crossed from user mode.
    pub esp: u32,
    pub ss: u16,
    _pad4: u16,
}

const _: () = assert!(core::mem::size_of::<TrapFrame>() == 68);

impl TrapFrame {
    /// Frame for trap `trapno` taken while running in code segment `cs`.
    pub fn new(trapno: u32, cs: SegmentSelector) -> Self {
        Self {
            trapno,
            cs: cs.0,
            ..Self::default()
        }
    }

    pub fn code_segment(&self) -> SegmentSelector {
        SegmentSelector(self.cs)
    }

    pub fn vector(&self) -> TrapVector {
        TrapVector::from_trapno(self.trapno)
    }
}

/// Privilege context a trap interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Kernel,
    User,
}

impl Origin {
    /// Classify from the saved `%cs`. Kernel code always runs in the kernel
    /// code segment; anything else is user code.
    pub fn from_code_segment(cs: SegmentSelector) -> Self {
        if cs.0 == KERNEL_CODE_SELECTOR.0 {
            Origin::Kernel
        } else {
            Origin::User
        }
    }
}

/// A trap frame together with what it was classified as on entry.
#[derive(Debug)]
pub struct Trap<'a> {
    pub vector: TrapVector,
    pub origin: Origin,
    pub frame: &'a mut TrapFrame,
}

impl<'a> Trap<'a> {
    /// Decode the vector and origin of a freshly pushed frame.
    pub fn capture(frame: &'a mut TrapFrame) -> Self {
        Self {
            vector: frame.vector(),
            origin: Origin::from_code_segment(frame.code_segment()),
            frame,
        }
    }
}
