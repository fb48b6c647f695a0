//! Dispatch Table Write Window
//!
//! The only place the interceptor lifts the dispatch table's write
//! protection. A `WriteWindow` flips the table writable when opened and
//! read-only again when dropped, so the table can never be left writable
//! past the swap that needed it, error paths included.

use alloc::vec::Vec;

use spin::RwLockWriteGuard;

use crate::platform::{DispatchTable, Handler, TableError};

use super::slot::SyscallSlot;

/// Scoped write access to a dispatch table.
pub struct WriteWindow<'a> {
    table: &'a dyn DispatchTable,
}

impl<'a> WriteWindow<'a> {
    /// Open the table for writing.
    ///
    /// Requires the slot table's write guard as proof that no other swap
    /// is in progress.
    pub fn open(
        table: &'a dyn DispatchTable,
        _held: &RwLockWriteGuard<'_, Vec<SyscallSlot>>,
    ) -> Self {
        // SAFETY:
        // - Drop restores protection on every exit path
        // - The slot table write lock serializes all windows
        unsafe {
            table.enable_write();
        }
        Self { table }
    }

    /// Replace the live entry for `nr`, returning the previous one.
    #[inline]
    pub fn swap(&self, nr: usize, handler: Handler) -> Result<Handler, TableError> {
        self.table.set_entry(nr, handler)
    }
}

impl Drop for WriteWindow<'_> {
    fn drop(&mut self) {
        // SAFETY: paired with the enable_write in open()
        unsafe {
            self.table.restore_protect();
        }
    }
}
