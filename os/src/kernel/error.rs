//! Error types for trap subsystem bring-up

/// Reasons [`super::early_init`] refuses to install the trap tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelInitError {
    /// Kernel stack top is zero
    NullKernelStack,

    /// Kernel stack top is not page aligned
    ///
    /// The ring 0 stack pointer handed to the TSS must sit on a page
    /// boundary so the first push lands in the last page of the stack.
    MisalignedKernelStack {
        /// The rejected stack top
        top: u32,
    },

    /// The trap tables were already built and loaded
    ///
    /// The tables are read by the CPU on every trap and are never rebuilt.
    AlreadyInitialized,
}

impl KernelInitError {
    /// Returns a human-readable description of the error
    pub fn description(&self) -> &'static str {
        match self {
            Self::NullKernelStack => "kernel stack top is null",
            Self::MisalignedKernelStack { .. } => "kernel stack top is not page aligned",
            Self::AlreadyInitialized => "trap tables already initialized",
        }
    }
}

/// Convenience type alias for Results with KernelInitError
pub type KernelInitResult<T> = Result<T, KernelInitError>;

impl core::fmt::Display for KernelInitError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MisalignedKernelStack { top } => {
                write!(f, "{}: 0x{:08x}", self.description(), top)
            }
            _ => write!(f, "{}", self.description()),
        }
    }
}
