//! Monitored Pid Set
//!
//! The set of process ids being monitored for one syscall.
//!
//! # Design
//! - Unique members, order irrelevant
//! - Bounded: a set refuses new members once it holds `limit` pids, and
//!   storage growth is fallible, so insertion reports `OutOfMemory`
//!   instead of aborting

use alloc::vec::Vec;

use crate::syscall::{Pid, RequestError};

/// Error type for pid set operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PidSetError {
    /// No storage for another member.
    OutOfMemory,
    /// The pid is not a member.
    NotFound,
}

impl core::fmt::Display for PidSetError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "pid set full"),
            Self::NotFound => write!(f, "pid not monitored"),
        }
    }
}

impl From<PidSetError> for RequestError {
    fn from(err: PidSetError) -> Self {
        match err {
            PidSetError::OutOfMemory => RequestError::OutOfMemory,
            PidSetError::NotFound => RequestError::InvalidArgument,
        }
    }
}

/// Set of monitored pids.
#[derive(Debug, Clone)]
pub struct PidSet {
    pids: Vec<Pid>,
    limit: usize,
}

impl PidSet {
    /// Create an empty set holding at most `limit` pids.
    pub const fn new(limit: usize) -> Self {
        Self {
            pids: Vec::new(),
            limit,
        }
    }

    /// Add `pid` to the set.
    ///
    /// Adding a member that is already present changes nothing.
    pub fn insert(&mut self, pid: Pid) -> Result<(), PidSetError> {
        if self.contains(pid) {
            return Ok(());
        }
        if self.pids.len() >= self.limit {
            return Err(PidSetError::OutOfMemory);
        }
        self.pids
            .try_reserve(1)
            .map_err(|_| PidSetError::OutOfMemory)?;
        self.pids.push(pid);
        Ok(())
    }

    /// Remove `pid` from the set.
    pub fn remove(&mut self, pid: Pid) -> Result<(), PidSetError> {
        let pos = self
            .pids
            .iter()
            .position(|&p| p == pid)
            .ok_or(PidSetError::NotFound)?;
        self.pids.swap_remove(pos);
        Ok(())
    }

    #[inline]
    pub fn contains(&self, pid: Pid) -> bool {
        self.pids.contains(&pid)
    }

    /// Drop every member and release the storage.
    pub fn clear(&mut self) {
        self.pids = Vec::new();
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pids.is_empty()
    }

    /// Iterate over the members in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = Pid> + '_ {
        self.pids.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut set = PidSet::new(8);
        assert!(set.insert(10).is_ok());
        assert!(set.insert(11).is_ok());
        assert!(set.contains(10));
        assert!(set.remove(10).is_ok());
        assert!(!set.contains(10));
        assert_eq!(set.remove(10), Err(PidSetError::NotFound));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_members_unique() {
        let mut set = PidSet::new(8);
        set.insert(5).unwrap();
        set.insert(5).unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_limit_reports_oom() {
        let mut set = PidSet::new(2);
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        assert_eq!(set.insert(3), Err(PidSetError::OutOfMemory));
        assert!(!set.contains(3));
        assert_eq!(RequestError::from(PidSetError::OutOfMemory), RequestError::OutOfMemory);
    }

    #[test]
    fn test_clear() {
        let mut set = PidSet::new(4);
        set.insert(1).unwrap();
        set.insert(2).unwrap();
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.iter().count(), 0);
    }
}
