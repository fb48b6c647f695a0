//! Control Request Decoding
//!
//! Decodes the four control commands carried by the interceptor's own
//! syscall and defines the error codes returned to the caller.
//!
//! # Error Codes
//! Every failure maps onto a negative errno value so the control syscall
//! can hand it straight back in the return register.

use crate::config::numbers;

use super::frame::{Pid, SyscallFrame};

/// Control request error codes
#[repr(i64)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestError {
    /// Operation not permitted
    PermissionDenied = -1,
    /// Out of memory
    OutOfMemory = -12,
    /// Resource busy
    Busy = -16,
    /// Invalid argument
    InvalidArgument = -22,
}

impl RequestError {
    /// Get the negative errno value.
    #[inline]
    pub const fn as_errno(self) -> i64 {
        self as i64
    }
}

impl core::fmt::Display for RequestError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PermissionDenied => write!(f, "operation not permitted"),
            Self::OutOfMemory => write!(f, "out of memory"),
            Self::Busy => write!(f, "resource busy"),
            Self::InvalidArgument => write!(f, "invalid argument"),
        }
    }
}

/// Unknown syscall number
pub const ENOSYS: i64 = -38;

/// Control commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Intercept,
    Release,
    StartMonitor,
    StopMonitor,
}

impl Command {
    /// Decode a raw command code.
    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            numbers::REQUEST_SYSCALL_INTERCEPT => Some(Self::Intercept),
            numbers::REQUEST_SYSCALL_RELEASE => Some(Self::Release),
            numbers::REQUEST_START_MONITORING => Some(Self::StartMonitor),
            numbers::REQUEST_STOP_MONITORING => Some(Self::StopMonitor),
            _ => None,
        }
    }

    /// Check whether this command manages monitoring rather than interception.
    #[inline]
    pub const fn is_monitoring(self) -> bool {
        matches!(self, Self::StartMonitor | Self::StopMonitor)
    }
}

/// A decoded control request.
///
/// `syscall` and `pid` are kept exactly as the caller passed them; they
/// are validated later against the live table and process list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlRequest {
    pub command: Command,
    pub syscall: i32,
    /// Target pid, 0 means every pid
    pub pid: Pid,
}

impl ControlRequest {
    pub const fn new(command: Command, syscall: i32, pid: Pid) -> Self {
        Self {
            command,
            syscall,
            pid,
        }
    }

    /// Decode raw control arguments.
    ///
    /// # Returns
    /// * `Err(InvalidArgument)` - `cmd` names no known command
    pub fn decode(cmd: i32, syscall: i32, pid: Pid) -> Result<Self, RequestError> {
        let command = Command::from_code(cmd).ok_or(RequestError::InvalidArgument)?;
        Ok(Self::new(command, syscall, pid))
    }

    /// Decode a request from the control syscall's argument registers.
    pub fn from_frame(frame: &SyscallFrame) -> Result<Self, RequestError> {
        Self::decode(frame.arg_i32(0), frame.arg_i32(1), frame.arg_i32(2))
    }
}

/// Collapse a request outcome into the value returned to user space.
#[inline]
pub fn to_retval(result: Result<(), RequestError>) -> i64 {
    match result {
        Ok(()) => 0,
        Err(e) => e.as_errno(),
    }
}
