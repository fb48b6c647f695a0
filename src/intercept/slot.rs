//! Syscall Slots
//!
//! One record per dispatch table entry, remembering the handler that was
//! live before interception.
//!
//! # Invariants
//! - A slot is intercepted exactly when it holds an original handler
//! - While intercepted, the live table entry is the interception wrapper
//! - Release writes the saved handler back verbatim

use crate::platform::{Handler, TableError};
use crate::syscall::RequestError;

use super::protect::WriteWindow;

/// Error type for slot transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotError {
    /// The slot is already intercepted.
    AlreadyIntercepted,
    /// The slot is not intercepted.
    NotIntercepted,
    /// The table refused the swap.
    Table(TableError),
}

impl core::fmt::Display for SlotError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::AlreadyIntercepted => write!(f, "syscall already intercepted"),
            Self::NotIntercepted => write!(f, "syscall not intercepted"),
            Self::Table(e) => write!(f, "table swap failed: {}", e),
        }
    }
}

impl From<TableError> for SlotError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

impl From<SlotError> for RequestError {
    fn from(err: SlotError) -> Self {
        match err {
            SlotError::AlreadyIntercepted => RequestError::Busy,
            SlotError::NotIntercepted => RequestError::InvalidArgument,
            SlotError::Table(_) => RequestError::Busy,
        }
    }
}

/// Interception state of one syscall.
#[derive(Clone, Default)]
pub struct SyscallSlot {
    original: Option<Handler>,
}

impl SyscallSlot {
    pub const fn new() -> Self {
        Self { original: None }
    }

    #[inline]
    pub fn is_intercepted(&self) -> bool {
        self.original.is_some()
    }

    /// Handler that was live before interception.
    #[inline]
    pub fn original(&self) -> Option<&Handler> {
        self.original.as_ref()
    }

    /// Route syscall `nr` through `wrapper`, saving the live handler.
    pub fn intercept(
        &mut self,
        nr: usize,
        window: &WriteWindow<'_>,
        wrapper: Handler,
    ) -> Result<(), SlotError> {
        if self.is_intercepted() {
            return Err(SlotError::AlreadyIntercepted);
        }
        let previous = window.swap(nr, wrapper)?;
        self.original = Some(previous);
        Ok(())
    }

    /// Put the saved handler back as the live entry for `nr`.
    ///
    /// On failure the slot stays intercepted.
    pub fn release(&mut self, nr: usize, window: &WriteWindow<'_>) -> Result<(), SlotError> {
        let original = self.original.take().ok_or(SlotError::NotIntercepted)?;
        if let Err(e) = window.swap(nr, original.clone()) {
            self.original = Some(original);
            return Err(e.into());
        }
        Ok(())
    }
}

impl core::fmt::Debug for SyscallSlot {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_intercepted() {
            write!(f, "Slot(intercepted)")
        } else {
            write!(f, "Slot(live)")
        }
    }
}
