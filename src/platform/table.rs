//! Syscall Dispatch Table
//!
//! The live mapping from syscall number to handler, and the memory
//! protection toggle guarding it.
//!
//! # Protection Model
//! ```text
//! ┌──────────────┐ enable_write ┌──────────────┐
//! │  read-only   │ ───────────▶ │   writable   │
//! │  (dispatch)  │ ◀─────────── │  (one swap)  │
//! └──────────────┘ restore      └──────────────┘
//! ```
//! The table is read-only except for the duration of a single entry swap.
//! Writes attempted while protected fail with `TableError::WriteProtected`.

use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicU8, Ordering};

use bitflags::bitflags;
use spin::RwLock;

use crate::syscall::{Caller, SyscallFrame, ENOSYS};

/// A syscall implementation.
pub trait SyscallHandler: Send + Sync {
    /// Run the syscall and produce the value for the return register.
    fn call(&self, caller: &Caller, frame: &SyscallFrame) -> i64;
}

impl<F> SyscallHandler for F
where
    F: Fn(&Caller, &SyscallFrame) -> i64 + Send + Sync,
{
    fn call(&self, caller: &Caller, frame: &SyscallFrame) -> i64 {
        self(caller, frame)
    }
}

/// Shared reference to a table entry.
pub type Handler = Arc<dyn SyscallHandler>;

/// Check whether two handlers are the same table entry.
#[inline]
pub fn same_handler(a: &Handler, b: &Handler) -> bool {
    core::ptr::eq(Arc::as_ptr(a) as *const (), Arc::as_ptr(b) as *const ())
}

/// Error type for dispatch table writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableError {
    /// The table memory is read-only.
    WriteProtected,
    /// The syscall number is outside the table.
    OutOfRange,
}

impl core::fmt::Display for TableError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::WriteProtected => write!(f, "dispatch table is write-protected"),
            Self::OutOfRange => write!(f, "syscall number out of range"),
        }
    }
}

/// A live dispatch table owned by the host.
pub trait DispatchTable: Send + Sync {
    /// Number of entries.
    fn len(&self) -> usize;

    /// Check if the table has no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current handler for `nr`.
    fn entry(&self, nr: usize) -> Option<Handler>;

    /// Make the table's backing memory writable.
    ///
    /// # Safety
    /// Must be paired with `restore_protect` before any other code can
    /// observe the table, and callers must serialize swaps among themselves.
    unsafe fn enable_write(&self);

    /// Return the table's backing memory to read-only.
    ///
    /// # Safety
    /// Must follow a matching `enable_write`.
    unsafe fn restore_protect(&self);

    /// Check if the table is currently writable.
    fn is_writable(&self) -> bool;

    /// Replace the handler for `nr`, returning the previous one.
    fn set_entry(&self, nr: usize, handler: Handler) -> Result<Handler, TableError>;
}

/// Dispatch a syscall through the live table.
///
/// # Returns
/// The handler's return value, or `ENOSYS` for numbers outside the table.
///
/// The entry is cloned out of the table before it runs, so no table
/// state is held while the handler executes.
pub fn dispatch(table: &dyn DispatchTable, caller: &Caller, frame: &SyscallFrame) -> i64 {
    match table.entry(frame.nr) {
        Some(handler) => handler.call(caller, frame),
        None => {
            log::debug!("[SYSCALL] Unknown syscall: {}", frame.nr);
            ENOSYS
        }
    }
}

/// Default handler for unimplemented entries.
pub fn ni_syscall(_caller: &Caller, _frame: &SyscallFrame) -> i64 {
    ENOSYS
}

bitflags! {
    /// Page protection bits of the table's backing memory.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PageFlags: u8 {
        /// Mapped.
        const PRESENT = 1 << 0;
        /// Writable.
        const WRITABLE = 1 << 1;
    }
}

/// In-memory dispatch table.
///
/// Entries start as `ni_syscall`; real handlers are registered while the
/// table is still being built, before it is shared.
pub struct SyscallTable {
    entries: RwLock<Vec<Handler>>,
    len: usize,
    flags: AtomicU8,
}

impl SyscallTable {
    /// Create a table of `len` unimplemented entries.
    pub fn new(len: usize) -> Self {
        let ni: Handler = Arc::new(ni_syscall);
        Self {
            entries: RwLock::new(vec![ni; len]),
            len,
            flags: AtomicU8::new(PageFlags::PRESENT.bits()),
        }
    }

    /// Register a handler while building the table.
    ///
    /// Numbers outside the table are ignored.
    pub fn with_handler(mut self, nr: usize, handler: Handler) -> Self {
        if let Some(slot) = self.entries.get_mut().get_mut(nr) {
            *slot = handler;
        }
        self
    }

    /// Current protection bits.
    pub fn flags(&self) -> PageFlags {
        PageFlags::from_bits_truncate(self.flags.load(Ordering::Acquire))
    }
}

impl DispatchTable for SyscallTable {
    fn len(&self) -> usize {
        self.len
    }

    fn entry(&self, nr: usize) -> Option<Handler> {
        self.entries.read().get(nr).cloned()
    }

    unsafe fn enable_write(&self) {
        self.flags
            .fetch_or(PageFlags::WRITABLE.bits(), Ordering::AcqRel);
    }

    unsafe fn restore_protect(&self) {
        self.flags
            .fetch_and(!PageFlags::WRITABLE.bits(), Ordering::AcqRel);
    }

    fn is_writable(&self) -> bool {
        self.flags().contains(PageFlags::WRITABLE)
    }

    fn set_entry(&self, nr: usize, handler: Handler) -> Result<Handler, TableError> {
        if !self.is_writable() {
            return Err(TableError::WriteProtected);
        }
        let mut entries = self.entries.write();
        let slot = entries.get_mut(nr).ok_or(TableError::OutOfRange)?;
        Ok(core::mem::replace(slot, handler))
    }
}
