//! Process Lookup
//!
//! Answers the two questions the interceptor asks about processes:
//! does a pid exist, and which user owns it.

use alloc::collections::BTreeMap;

use spin::RwLock;

use crate::syscall::{Pid, Uid};

/// Process and credential lookup provided by the host.
pub trait ProcessTable: Send + Sync {
    /// Check if `pid` names a live process.
    fn exists(&self, pid: Pid) -> bool;

    /// Real uid owning `pid`, if it exists.
    fn owner_of(&self, pid: Pid) -> Option<Uid>;
}

/// In-memory process table.
#[derive(Debug, Default)]
pub struct ProcessRegistry {
    procs: RwLock<BTreeMap<Pid, Uid>>,
}

impl ProcessRegistry {
    pub const fn new() -> Self {
        Self {
            procs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Record a new process owned by `uid`.
    pub fn spawn(&self, pid: Pid, uid: Uid) {
        self.procs.write().insert(pid, uid);
    }

    /// Remove a terminated process.
    ///
    /// Returns the owner it had, if any.
    pub fn reap(&self, pid: Pid) -> Option<Uid> {
        self.procs.write().remove(&pid)
    }
}

impl ProcessTable for ProcessRegistry {
    fn exists(&self, pid: Pid) -> bool {
        self.procs.read().contains_key(&pid)
    }

    fn owner_of(&self, pid: Pid) -> Option<Uid> {
        self.procs.read().get(&pid).copied()
    }
}
