//! Syscall Interception
//!
//! Redirects selected dispatch table entries to a logging wrapper and
//! tracks which processes are monitored for each of them.
//!
//! # Design
//! - One slot per table entry, indexed by syscall number
//! - Table entries change only inside a `WriteWindow`
//! - Installed handlers reach the interceptor through weak references
//!
//! # Security Properties
//! - Only the superuser can swap table entries
//! - Unintercepted syscalls are never touched
//! - Intercepted syscalls return exactly what the original returns
//! - Detaching restores the table to its state before attach

pub mod gate;
pub mod interceptor;
pub mod protect;
pub mod slot;

pub use gate::{ControlGate, ExitHook, InterceptionWrapper};
pub use interceptor::{Interceptor, SlotStatus, StartError};
pub use protect::WriteWindow;
pub use slot::{SlotError, SyscallSlot};
