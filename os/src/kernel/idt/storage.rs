//! The interrupt descriptor table and its boot-time storage.

use spin::Once;
use x86_64::PrivilegeLevel;

use super::gate::{GateDescriptor, GateType};
use super::vector::T_SYSCALL;
use crate::arch::x86::DescriptorTablePointer;
use crate::kernel::gdt::KERNEL_CODE_SELECTOR;

/// Number of vectors the CPU can deliver.
pub const IDT_ENTRIES: usize = 256;

/// Entry stub address for every vector, in vector order.
pub type EntryTable = [u32; IDT_ENTRIES];

#[derive(Debug, Clone)]
#[repr(C, align(8))]
pub struct InterruptDescriptorTable {
    gates: [GateDescriptor; IDT_ENTRIES],
}

/// Written once by [`crate::kernel::early_init`], read by the CPU on every
/// trap afterwards.
pub(crate) static IDT_STORAGE: Once<InterruptDescriptorTable> = Once::new();

impl InterruptDescriptorTable {
    /// Table whose gates are all not-present.
    pub const fn empty() -> Self {
        Self {
            gates: [GateDescriptor::missing(); IDT_ENTRIES],
        }
    }

    /// Install an interrupt gate for every vector, entering the matching stub
    /// in `entries` on the kernel code segment.
    pub fn build(entries: &EntryTable) -> Self {
        let mut idt = Self::empty();
        for (vector, &handler) in entries.iter().enumerate() {
            idt.set_gate(vector, handler, gate_privilege(vector as u32));
        }
        idt
    }

    fn set_gate(&mut self, vector: usize, handler: u32, dpl: PrivilegeLevel) {
        self.gates[vector] =
            GateDescriptor::new(handler, KERNEL_CODE_SELECTOR, GateType::Interrupt32, dpl);
    }

    pub fn gate(&self, vector: u8) -> &GateDescriptor {
        &self.gates[vector as usize]
    }

    pub fn gates(&self) -> &[GateDescriptor; IDT_ENTRIES] {
        &self.gates
    }

    /// Operand for `lidt`. Only a `'static` table may be handed to the CPU.
    pub fn pointer(&'static self) -> DescriptorTablePointer {
        DescriptorTablePointer::new(
            self.gates.as_ptr() as usize,
            core::mem::size_of::<[GateDescriptor; IDT_ENTRIES]>(),
        )
    }
}

/// Ring allowed to raise `vector` with a software interrupt. Only the system
/// call gate is open to user code; `int $n` on any other vector from ring 3
/// raises a general protection fault instead.
pub const fn gate_privilege(vector: u32) -> PrivilegeLevel {
    if vector == T_SYSCALL {
        PrivilegeLevel::Ring3
    } else {
        PrivilegeLevel::Ring0
    }
}
