//! Installed Handlers
//!
//! The three handlers the interceptor places in the dispatch table:
//! - `InterceptionWrapper`: stands in for every intercepted syscall
//! - `ExitHook`: stands in for process termination
//! - `ControlGate`: the control syscall itself
//!
//! Each holds a weak reference back to the interceptor so the table never
//! keeps it alive, plus the handler it replaced. Once the interceptor is
//! gone a handler still fetched by some caller behaves as its original.
//! The wrapper and the hook always return whatever the original returned.

use alloc::sync::Weak;

use crate::platform::{Handler, SyscallHandler};
use crate::syscall::{to_retval, Caller, ControlRequest, SyscallFrame};

use super::interceptor::Core;

/// Replacement handler for intercepted syscalls.
pub struct InterceptionWrapper {
    core: Weak<Core>,
    original: Handler,
}

impl InterceptionWrapper {
    pub(crate) fn new(core: Weak<Core>, original: Handler) -> Self {
        Self { core, original }
    }
}

impl SyscallHandler for InterceptionWrapper {
    fn call(&self, caller: &Caller, frame: &SyscallFrame) -> i64 {
        if let Some(core) = self.core.upgrade() {
            core.record(caller, frame);
        }
        self.original.call(caller, frame)
    }
}

/// Replacement handler for process termination.
///
/// Drops the exiting pid from every watchlist, then runs the real exit.
/// The pid is refused as a monitoring target until the real exit returns.
pub struct ExitHook {
    core: Weak<Core>,
    original: Handler,
}

impl ExitHook {
    pub(crate) fn new(core: Weak<Core>, original: Handler) -> Self {
        Self { core, original }
    }
}

impl SyscallHandler for ExitHook {
    fn call(&self, caller: &Caller, frame: &SyscallFrame) -> i64 {
        let Some(core) = self.core.upgrade() else {
            return self.original.call(caller, frame);
        };
        core.begin_exit(caller.pid);
        let ret = self.original.call(caller, frame);
        core.finish_exit(caller.pid);
        ret
    }
}

/// Handler for the control syscall.
///
/// Arguments: `(cmd, syscall, pid)`. Returns 0 or a negative errno.
pub struct ControlGate {
    core: Weak<Core>,
    original: Handler,
}

impl ControlGate {
    pub(crate) fn new(core: Weak<Core>, original: Handler) -> Self {
        Self { core, original }
    }
}

impl SyscallHandler for ControlGate {
    fn call(&self, caller: &Caller, frame: &SyscallFrame) -> i64 {
        let Some(core) = self.core.upgrade() else {
            return self.original.call(caller, frame);
        };
        to_retval(ControlRequest::from_frame(frame).and_then(|req| core.handle(caller, req)))
    }
}
