//! Per-Syscall Watchlists
//!
//! Tracks, for each syscall, which calling processes get logged.
//!
//! # Monitoring Modes
//! ```text
//!   Off ──start(pid)──▶ Selected ──last pid leaves──▶ Off
//!    │                     │
//!    └──start(all)──▶ All ◀┘
//!                     │
//!                     └──stop(all)──▶ Selected (pids left) / Off
//! ```
//! - `Selected` always has at least one member
//! - `All` covers every pid and is only left through `stop(all)`;
//!   members coming and going underneath it do not change the mode

use alloc::vec::Vec;

use crate::syscall::{MonitorTarget, Pid, RequestError};

use super::pidset::PidSet;

/// Who gets logged for a syscall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MonitorMode {
    /// Nobody
    #[default]
    Off,
    /// The pids in the watchlist
    Selected,
    /// Every pid
    All,
}

/// Monitoring state of one syscall.
#[derive(Debug, Clone)]
pub struct Watchlist {
    mode: MonitorMode,
    pids: PidSet,
}

impl Watchlist {
    pub const fn new(limit: usize) -> Self {
        Self {
            mode: MonitorMode::Off,
            pids: PidSet::new(limit),
        }
    }

    #[inline]
    pub fn mode(&self) -> MonitorMode {
        self.mode
    }

    #[inline]
    pub fn pids(&self) -> &PidSet {
        &self.pids
    }

    /// Check whether calls from `pid` are logged.
    #[inline]
    pub fn is_watching(&self, pid: Pid) -> bool {
        match self.mode {
            MonitorMode::Off => false,
            MonitorMode::Selected => self.pids.contains(pid),
            MonitorMode::All => true,
        }
    }

    /// Check whether `target` has been started explicitly.
    pub fn is_started(&self, target: MonitorTarget) -> bool {
        match target {
            MonitorTarget::All => self.mode == MonitorMode::All,
            MonitorTarget::Pid(pid) => self.pids.contains(pid),
        }
    }

    /// Begin monitoring `target`.
    ///
    /// # Returns
    /// * `Err(Busy)` - target already monitored
    /// * `Err(OutOfMemory)` - no room for the pid; nothing changed
    pub fn start(&mut self, target: MonitorTarget) -> Result<(), RequestError> {
        if self.is_started(target) {
            return Err(RequestError::Busy);
        }
        match target {
            MonitorTarget::All => self.mode = MonitorMode::All,
            MonitorTarget::Pid(pid) => {
                self.pids.insert(pid)?;
                if self.mode != MonitorMode::All {
                    self.mode = MonitorMode::Selected;
                }
            }
        }
        Ok(())
    }

    /// Stop monitoring `target`.
    ///
    /// # Returns
    /// * `Err(InvalidArgument)` - target was never started
    pub fn stop(&mut self, target: MonitorTarget) -> Result<(), RequestError> {
        if !self.is_started(target) {
            return Err(RequestError::InvalidArgument);
        }
        match target {
            MonitorTarget::All => {
                self.mode = if self.pids.is_empty() {
                    MonitorMode::Off
                } else {
                    MonitorMode::Selected
                };
            }
            MonitorTarget::Pid(pid) => {
                self.pids.remove(pid)?;
                self.settle();
            }
        }
        Ok(())
    }

    /// Remove `pid` if present.
    ///
    /// Returns true if the pid was a member.
    pub fn purge(&mut self, pid: Pid) -> bool {
        if self.pids.remove(pid).is_err() {
            return false;
        }
        self.settle();
        true
    }

    /// Forget every pid and turn monitoring off.
    pub fn clear(&mut self) {
        self.pids.clear();
        self.mode = MonitorMode::Off;
    }

    fn settle(&mut self) {
        if self.pids.is_empty() && self.mode == MonitorMode::Selected {
            self.mode = MonitorMode::Off;
        }
    }
}

/// Watchlists for every syscall, indexed by syscall number.
///
/// Also tracks pids whose exit is in progress. Such a pid still exists in
/// the process table but must not be added to any watchlist.
#[derive(Debug)]
pub struct MonitorBoard {
    lists: Vec<Watchlist>,
    exiting: Vec<Pid>,
}

impl MonitorBoard {
    /// Create `len` empty watchlists, each bounded to `limit` pids.
    pub fn new(len: usize, limit: usize) -> Self {
        let mut lists = Vec::with_capacity(len);
        lists.resize_with(len, || Watchlist::new(limit));
        Self {
            lists,
            exiting: Vec::new(),
        }
    }

    #[inline]
    pub fn get(&self, nr: usize) -> Option<&Watchlist> {
        self.lists.get(nr)
    }

    #[inline]
    pub fn get_mut(&mut self, nr: usize) -> Option<&mut Watchlist> {
        self.lists.get_mut(nr)
    }

    /// Check whether calls to `nr` from `pid` are logged.
    pub fn is_watching(&self, nr: usize, pid: Pid) -> bool {
        self.get(nr).map_or(false, |list| list.is_watching(pid))
    }

    /// Remove `pid` from every watchlist.
    ///
    /// Returns the number of lists it was removed from.
    pub fn purge_everywhere(&mut self, pid: Pid) -> usize {
        self.lists
            .iter_mut()
            .map(|list| list.purge(pid))
            .filter(|&removed| removed)
            .count()
    }

    /// Mark `pid` as exiting and remove it from every watchlist.
    ///
    /// Returns the number of lists it was removed from.
    pub fn begin_exit(&mut self, pid: Pid) -> usize {
        // Without room for the mark, finish_exit still purges the late arrivals
        if self.exiting.try_reserve(1).is_ok() {
            self.exiting.push(pid);
        }
        self.purge_everywhere(pid)
    }

    /// Drop one exiting mark for `pid` and purge it again.
    pub fn finish_exit(&mut self, pid: Pid) -> usize {
        if let Some(idx) = self.exiting.iter().position(|&p| p == pid) {
            self.exiting.swap_remove(idx);
        }
        self.purge_everywhere(pid)
    }

    /// Check whether `pid` is between `begin_exit` and `finish_exit`.
    #[inline]
    pub fn is_exiting(&self, pid: Pid) -> bool {
        self.exiting.contains(&pid)
    }

    /// Clear every watchlist.
    pub fn clear_all(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }
}
