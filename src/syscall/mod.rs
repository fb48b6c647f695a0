//! System Call Interface
//!
//! Call frames, control request decoding and validation for the
//! interceptor's control syscall.
//!
//! # Security Model
//! - All parameters are validated before any state is touched
//! - Invalid inputs return errors, never panic
//! - Errors are negative errno values, returned verbatim to the caller

mod frame;
mod handler;
mod validate;

pub use frame::{Caller, Pid, SyscallFrame, Uid, ROOT_UID, SYSCALL_ARGS};
pub use handler::{to_retval, Command, ControlRequest, RequestError, ENOSYS};
pub use validate::{validate_pid, validate_syscall, MonitorTarget, SyscallId};
