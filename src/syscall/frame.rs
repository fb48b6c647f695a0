//! Syscall Call Frame
//!
//! The register state a handler sees when the runtime dispatches a syscall,
//! and the identity of the process that issued it.
//!
//! # Calling Convention
//! - `nr`: syscall number (eax on i386)
//! - `args`: the six argument registers in order (ebx, ecx, edx, esi, edi, ebp)

/// Process identifier.
pub type Pid = i32;

/// User identifier.
pub type Uid = u32;

/// The superuser.
pub const ROOT_UID: Uid = 0;

/// Number of argument registers passed to a syscall.
pub const SYSCALL_ARGS: usize = 6;

/// Register state of one syscall invocation.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallFrame {
    /// Syscall number
    pub nr: usize,
    /// Argument registers
    pub args: [u64; SYSCALL_ARGS],
}

impl SyscallFrame {
    /// Create a frame for syscall `nr`.
    pub const fn new(nr: usize, args: [u64; SYSCALL_ARGS]) -> Self {
        Self { nr, args }
    }

    /// Frame for a control request, laid out as `(cmd, syscall, pid)`.
    ///
    /// Signed values are sign-extended so they survive the register round trip.
    pub const fn control(nr: usize, cmd: i32, syscall: i32, pid: i32) -> Self {
        Self {
            nr,
            args: [cmd as i64 as u64, syscall as i64 as u64, pid as i64 as u64, 0, 0, 0],
        }
    }

    /// Read argument `idx` as a signed 32-bit value.
    #[inline]
    pub const fn arg_i32(&self, idx: usize) -> i32 {
        self.args[idx] as i32
    }
}

/// The process on whose behalf a syscall runs (the kernel's `current`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub pid: Pid,
    pub uid: Uid,
}

impl Caller {
    pub const fn new(pid: Pid, uid: Uid) -> Self {
        Self { pid, uid }
    }

    /// Check whether the caller runs as the superuser.
    #[inline]
    pub const fn is_root(&self) -> bool {
        self.uid == ROOT_UID
    }
}
