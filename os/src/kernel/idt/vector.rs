//! Trap numbers and their names.

// Processor-defined exceptions.
pub const T_DIVIDE: u32 = 0;
pub const T_DEBUG: u32 = 1;
pub const T_NMI: u32 = 2;
pub const T_BRKPT: u32 = 3;
pub const T_OFLOW: u32 = 4;
pub const T_BOUND: u32 = 5;
pub const T_ILLOP: u32 = 6;
pub const T_DEVICE: u32 = 7;
pub const T_DBLFLT: u32 = 8;
pub const T_COPROC: u32 = 9;
pub const T_TSS: u32 = 10;
pub const T_SEGNP: u32 = 11;
pub const T_STACK: u32 = 12;
pub const T_GPFLT: u32 = 13;
pub const T_PGFLT: u32 = 14;
pub const T_RES: u32 = 15;
pub const T_FPERR: u32 = 16;
pub const T_ALIGN: u32 = 17;
pub const T_MCHK: u32 = 18;
pub const T_SIMDERR: u32 = 19;

/// Software interrupt used for system calls. Its gate is user-callable.
pub const T_SYSCALL: u32 = 48;

/// Trap number reserved for "no particular vector". No gate delivers it, so
/// it always decodes to [`TrapVector::Other`] and is dispatched as unexpected.
pub const T_DEFAULT: u32 = 500;

pub const UNKNOWN_TRAP_NAME: &str = "(unknown trap)";

/// A decoded trap number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapVector {
    DivideError,
    Debug,
    NonMaskableInterrupt,
    Breakpoint,
    Overflow,
    BoundRangeExceeded,
    InvalidOpcode,
    DeviceNotAvailable,
    DoubleFault,
    CoprocessorSegmentOverrun,
    InvalidTss,
    SegmentNotPresent,
    StackFault,
    GeneralProtection,
    PageFault,
    Reserved,
    FloatingPointError,
    AlignmentCheck,
    MachineCheck,
    SimdFloatingPoint,
    SystemCall,
    /// Anything else, including numbers no gate can deliver.
    Other(u32),
}

/// What the dispatcher does with a trap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrapClass {
    /// Stop in the kernel monitor, then resume.
    Breakpoint,
    /// Stop in the kernel monitor, then resume. Fault resolution belongs to
    /// the virtual memory system, which hooks in here.
    PageFault,
    /// Dump the frame and halt.
    Unexpected,
}

impl TrapVector {
    pub const fn from_trapno(trapno: u32) -> Self {
        match trapno {
            T_DIVIDE => TrapVector::DivideError,
            T_DEBUG => TrapVector::Debug,
            T_NMI => TrapVector::NonMaskableInterrupt,
            T_BRKPT => TrapVector::Breakpoint,
            T_OFLOW => TrapVector::Overflow,
            T_BOUND => TrapVector::BoundRangeExceeded,
            T_ILLOP => TrapVector::InvalidOpcode,
            T_DEVICE => TrapVector::DeviceNotAvailable,
            T_DBLFLT => TrapVector::DoubleFault,
            T_COPROC => TrapVector::CoprocessorSegmentOverrun,
            T_TSS => TrapVector::InvalidTss,
            T_SEGNP => TrapVector::SegmentNotPresent,
            T_STACK => TrapVector::StackFault,
            T_GPFLT => TrapVector::GeneralProtection,
            T_PGFLT => TrapVector::PageFault,
            T_RES => TrapVector::Reserved,
            T_FPERR => TrapVector::FloatingPointError,
            T_ALIGN => TrapVector::AlignmentCheck,
            T_MCHK => TrapVector::MachineCheck,
            T_SIMDERR => TrapVector::SimdFloatingPoint,
            T_SYSCALL => TrapVector::SystemCall,
            other => TrapVector::Other(other),
        }
    }

    pub const fn trapno(self) -> u32 {
        match self {
            TrapVector::DivideError => T_DIVIDE,
            TrapVector::Debug => T_DEBUG,
            TrapVector::NonMaskableInterrupt => T_NMI,
            TrapVector::Breakpoint => T_BRKPT,
            TrapVector::Overflow => T_OFLOW,
            TrapVector::BoundRangeExceeded => T_BOUND,
            TrapVector::InvalidOpcode => T_ILLOP,
            TrapVector::DeviceNotAvailable => T_DEVICE,
            TrapVector::DoubleFault => T_DBLFLT,
            TrapVector::CoprocessorSegmentOverrun => T_COPROC,
            TrapVector::InvalidTss => T_TSS,
            TrapVector::SegmentNotPresent => T_SEGNP,
            TrapVector::StackFault => T_STACK,
            TrapVector::GeneralProtection => T_GPFLT,
            TrapVector::PageFault => T_PGFLT,
            TrapVector::Reserved => T_RES,
            TrapVector::FloatingPointError => T_FPERR,
            TrapVector::AlignmentCheck => T_ALIGN,
            TrapVector::MachineCheck => T_MCHK,
            TrapVector::SimdFloatingPoint => T_SIMDERR,
            TrapVector::SystemCall => T_SYSCALL,
            TrapVector::Other(trapno) => trapno,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TrapVector::DivideError => "Divide error",
            TrapVector::Debug => "Debug",
            TrapVector::NonMaskableInterrupt => "Non-Maskable Interrupt",
            TrapVector::Breakpoint => "Breakpoint",
            TrapVector::Overflow => "Overflow",
            TrapVector::BoundRangeExceeded => "BOUND Range Exceeded",
            TrapVector::InvalidOpcode => "Invalid Opcode",
            TrapVector::DeviceNotAvailable => "Device Not Available",
            TrapVector::DoubleFault => "Double Fault",
            TrapVector::CoprocessorSegmentOverrun => "Coprocessor Segment Overrun",
            TrapVector::InvalidTss => "Invalid TSS",
            TrapVector::SegmentNotPresent => "Segment Not Present",
            TrapVector::StackFault => "Stack Fault",
            TrapVector::GeneralProtection => "General Protection",
            TrapVector::PageFault => "Page Fault",
            TrapVector::Reserved => "Reserved",
            TrapVector::FloatingPointError => "x87 FPU Floating-Point Error",
            TrapVector::AlignmentCheck => "Alignment Check",
            TrapVector::MachineCheck => "Machine-Check",
            TrapVector::SimdFloatingPoint => "SIMD Floating-Point Exception",
            TrapVector::SystemCall => "System call",
            TrapVector::Other(_) => UNKNOWN_TRAP_NAME,
        }
    }

    /// Handling policy. Every variant is listed so a new trap kind cannot
    /// fall through to a default by accident.
    pub const fn class(self) -> TrapClass {
        match self {
            TrapVector::Breakpoint => TrapClass::Breakpoint,
            TrapVector::PageFault => TrapClass::PageFault,
            TrapVector::DivideError
            | TrapVector::Debug
            | TrapVector::NonMaskableInterrupt
            | TrapVector::Overflow
            | TrapVector::BoundRangeExceeded
            | TrapVector::InvalidOpcode
            | TrapVector::DeviceNotAvailable
            | TrapVector::DoubleFault
            | TrapVector::CoprocessorSegmentOverrun
            | TrapVector::InvalidTss
            | TrapVector::SegmentNotPresent
            | TrapVector::StackFault
            | TrapVector::GeneralProtection
            | TrapVector::Reserved
            | TrapVector::FloatingPointError
            | TrapVector::AlignmentCheck
            | TrapVector::MachineCheck
            | TrapVector::SimdFloatingPoint
            | TrapVector::SystemCall
            | TrapVector::Other(_) => TrapClass::Unexpected,
        }
    }
}

/// Human-readable name of a trap number. Total: unknown numbers get
/// [`UNKNOWN_TRAP_NAME`].
pub const fn trap_name(trapno: u32) -> &'static str {
    TrapVector::from_trapno(trapno).name()
}
