//! Kernel virtual memory layout.
//!
//! ```text
//!  4 Gig -------->  +------------------------------+
//!                   |  remapped physical memory    |
//!  KERNBASE ----->  +------------------------------+ <- KSTACKTOP
//!                   |  kernel stack                |
//!                   + - - - - - - - - - - - - - - -+
//!                   :              .               :
//! ```

/// Bytes mapped by a page.
pub const PGSIZE: u32 = 4096;

/// All physical memory is mapped at this address.
pub const KERNBASE: u32 = 0xF000_0000;

/// Top of the kernel stack. The TSS hands this to the CPU on every
/// user -> kernel privilege transition.
pub const KSTACKTOP: u32 = KERNBASE;

/// Returns true if `addr` is aligned to a page boundary.
pub const fn is_page_aligned(addr: u32) -> bool {
    addr % PGSIZE == 0
}
