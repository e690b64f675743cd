//! Task State Segment (TSS)
//!
//! On i386 the kernel only needs the TSS for one thing: when a trap or
//! interrupt raises the privilege level from ring 3 to ring 0, the CPU loads
//! `ss0:esp0` from here before pushing the trap frame. There is a single
//! kernel stack, so the segment is configured once and never touched again.

use x86_64::structures::gdt::SegmentSelector;

/// 32-bit hardware task-state segment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[repr(C)]
pub struct TaskState {
    link: u32,
    /// Stack pointer loaded on a switch to ring 0.
    pub esp0: u32,
    /// Stack segment loaded on a switch to ring 0.
    pub ss0: u16,
    _pad0: u16,
    esp1: u32,
    ss1: u16,
    _pad1: u16,
    esp2: u32,
    ss2: u16,
    _pad2: u16,
    cr3: u32,
    eip: u32,
    eflags: u32,
    eax: u32,
    ecx: u32,
    edx: u32,
    ebx: u32,
    esp: u32,
    ebp: u32,
    esi: u32,
    edi: u32,
    es: u16,
    _pad3: u16,
    cs: u16,
    _pad4: u16,
    ss: u16,
    _pad5: u16,
    ds: u16,
    _pad6: u16,
    fs: u16,
    _pad7: u16,
    gs: u16,
    _pad8: u16,
    ldt: u16,
    _pad9: u16,
    /// Debug trap on task switch.
    trap: u16,
    /// Offset of the I/O permission bitmap.
    pub iomb: u16,
}

const _: () = assert!(core::mem::size_of::<TaskState>() == 104);

impl TaskState {
    /// Descriptor limit covering the whole segment.
    pub const LIMIT: u32 = core::mem::size_of::<TaskState>() as u32 - 1;

    /// TSS that switches to `stack_top` in segment `stack_segment` on every
    /// privilege elevation. The I/O map base points past the end of the
    /// segment, so user code gets no port access.
    pub fn for_kernel_stack(stack_top: u32, stack_segment: SegmentSelector) -> Self {
        Self {
            esp0: stack_top,
            ss0: stack_segment.0,
            iomb: core::mem::size_of::<TaskState>() as u16,
            ..Self::default()
        }
    }

    /// Ring 0 stack selector as configured.
    pub fn kernel_stack_segment(&self) -> SegmentSelector {
        SegmentSelector(self.ss0)
    }

    /// Linear address of this segment, as stored in its GDT descriptor.
    ///
    /// On i386 the cast is lossless.
    pub fn base(&self) -> u32 {
        self as *const TaskState as usize as u32
    }
}
