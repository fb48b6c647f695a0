//! Control Request Validation
//!
//! Shape checks applied to every control request before any permission
//! or state check runs.
//!
//! # Rules
//! - A syscall number must index the dispatch table and must not be the
//!   control syscall itself
//! - A pid must be non-negative; a nonzero pid must name a live process
//! - Failures are always `InvalidArgument`, whoever the caller is

use crate::platform::ProcessTable;

use super::frame::Pid;
use super::handler::RequestError;

/// A validated syscall number.
///
/// This type guarantees that:
/// - The number indexes the dispatch table
/// - The number is not the control syscall
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(transparent)]
pub struct SyscallId(usize);

impl SyscallId {
    /// Get the table index.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Which processes a monitoring request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorTarget {
    /// pid 0: every process
    All,
    /// One existing process
    Pid(Pid),
}

/// Validate a raw syscall number.
///
/// # Arguments
/// * `raw` - Syscall number as passed by the caller
/// * `table_len` - Number of entries in the dispatch table
/// * `control` - Number of the control syscall
pub fn validate_syscall(
    raw: i32,
    table_len: usize,
    control: usize,
) -> Result<SyscallId, RequestError> {
    let nr = usize::try_from(raw).map_err(|_| RequestError::InvalidArgument)?;
    if nr >= table_len || nr == control {
        return Err(RequestError::InvalidArgument);
    }
    Ok(SyscallId(nr))
}

/// Validate a raw monitoring target.
///
/// # Returns
/// * `Ok(MonitorTarget::All)` - pid is 0
/// * `Ok(MonitorTarget::Pid)` - pid names a live process
/// * `Err(InvalidArgument)` - pid is negative or names no process
pub fn validate_pid(raw: Pid, processes: &dyn ProcessTable) -> Result<MonitorTarget, RequestError> {
    if raw < 0 {
        return Err(RequestError::InvalidArgument);
    }
    if raw == 0 {
        return Ok(MonitorTarget::All);
    }
    if !processes.exists(raw) {
        return Err(RequestError::InvalidArgument);
    }
    Ok(MonitorTarget::Pid(raw))
}
