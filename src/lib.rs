//! PantherOS Syscall Interceptor
//!
//! Redirects selected system calls to a logging wrapper and records which
//! processes invoke them, without changing what any syscall returns.
//!
//! # Components
//! - Control syscall: intercept, release, start and stop monitoring
//! - Interception wrapper: logs monitored callers, forwards to the original
//! - Exit hook: drops exiting processes from every monitor list
//!
//! # Security Features
//! - Table entries are swapped only inside a scoped write window
//! - Superuser-only interception; owner-only monitoring for other users
//! - All control parameters are validated before use
//!
//! # Usage
//! ```
//! use std::sync::Arc;
//! use interceptor::config::numbers::{MY_CUSTOM_SYSCALL, REQUEST_SYSCALL_INTERCEPT};
//! use interceptor::platform::{dispatch, KernelLog, ProcessRegistry, SyscallTable};
//! use interceptor::{Caller, Interceptor, InterceptorConfig, SyscallFrame};
//!
//! let table = Arc::new(SyscallTable::new(337));
//! let procs = Arc::new(ProcessRegistry::new());
//! let interceptor =
//!     Interceptor::start(InterceptorConfig::default(), table.clone(), procs, Arc::new(KernelLog))
//!         .unwrap();
//!
//! let root = Caller::new(1, 0);
//! let frame = SyscallFrame::control(MY_CUSTOM_SYSCALL, REQUEST_SYSCALL_INTERCEPT, 7, 0);
//! assert_eq!(dispatch(&*table, &root, &frame), 0);
//! assert!(interceptor.is_intercepted(7));
//! ```

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_op_in_unsafe_fn)]

extern crate alloc;

pub mod config;
pub mod intercept;
pub mod monitor;
pub mod platform;
pub mod security;
pub mod syscall;

pub use config::InterceptorConfig;
pub use intercept::{Interceptor, SlotStatus, StartError};
pub use monitor::MonitorMode;
pub use syscall::{Caller, Command, ControlRequest, Pid, RequestError, SyscallFrame, Uid};
