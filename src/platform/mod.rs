//! Host Platform Interfaces
//!
//! The pieces of the surrounding kernel the interceptor depends on:
//! - The live syscall dispatch table and its write protection
//! - Process existence and ownership lookup
//! - The sink that receives monitored call records
//!
//! Each is a trait so the interceptor can attach to any host; in-memory
//! implementations are provided for hosted use and testing.

pub mod process;
pub mod sink;
pub mod table;

pub use process::{ProcessRegistry, ProcessTable};
pub use sink::{KernelLog, LogRecord, LogSink, MemorySink, SinkError};
pub use table::{
    dispatch, ni_syscall, same_handler, DispatchTable, Handler, PageFlags, SyscallHandler,
    SyscallTable, TableError,
};
