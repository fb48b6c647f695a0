//! Interceptor Configuration
//!
//! Syscall numbering and limits used when the interceptor attaches to a
//! dispatch table. Defaults follow the i386 Linux table layout.

/// Well-known syscall and request numbers.
pub mod numbers {
    /// Number of entries in the dispatch table.
    pub const NR_SYSCALLS: usize = 337;
    /// Slot that carries the interceptor's own control syscall.
    pub const MY_CUSTOM_SYSCALL: usize = 0;
    /// Process termination (`exit_group`).
    pub const NR_EXIT_GROUP: usize = 252;

    /// Redirect a syscall to the interception wrapper.
    pub const REQUEST_SYSCALL_INTERCEPT: i32 = 1;
    /// Restore a syscall's original handler.
    pub const REQUEST_SYSCALL_RELEASE: i32 = 2;
    /// Start logging a pid's calls to a syscall.
    pub const REQUEST_START_MONITORING: i32 = 3;
    /// Stop logging a pid's calls to a syscall.
    pub const REQUEST_STOP_MONITORING: i32 = 4;
}

/// Default upper bound on monitored pids per syscall.
pub const DEFAULT_MAX_PIDS: usize = 1024;

/// Interceptor configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterceptorConfig {
    /// Syscall number of the control entry point.
    pub control_syscall: usize,
    /// Syscall number of process termination.
    pub exit_syscall: usize,
    /// Maximum pids a single syscall's monitor list may hold.
    pub max_pids_per_syscall: usize,
}

impl InterceptorConfig {
    /// Configuration with the default numbering.
    pub const fn new() -> Self {
        Self {
            control_syscall: numbers::MY_CUSTOM_SYSCALL,
            exit_syscall: numbers::NR_EXIT_GROUP,
            max_pids_per_syscall: DEFAULT_MAX_PIDS,
        }
    }

    /// Use a different control syscall number.
    pub const fn with_control_syscall(mut self, nr: usize) -> Self {
        self.control_syscall = nr;
        self
    }

    /// Use a different termination syscall number.
    pub const fn with_exit_syscall(mut self, nr: usize) -> Self {
        self.exit_syscall = nr;
        self
    }

    /// Bound each monitor list to `max` pids.
    pub const fn with_max_pids(mut self, max: usize) -> Self {
        self.max_pids_per_syscall = max;
        self
    }

    /// Check the configuration against a table of `table_len` entries.
    pub fn fits(&self, table_len: usize) -> bool {
        self.control_syscall < table_len
            && self.exit_syscall < table_len
            && self.control_syscall != self.exit_syscall
    }
}

impl Default for InterceptorConfig {
    fn default() -> Self {
        Self::new()
    }
}
