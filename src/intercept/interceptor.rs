//! Syscall Interceptor
//!
//! Owns the per-syscall slots and watchlists, executes control requests
//! and records intercepted calls from watched processes.
//!
//! # Locking
//! - `slots`: interception state. Written for every table swap, read by
//!   the wrapper and held shared across a monitoring request so a release
//!   cannot interleave with it.
//! - `watch`: watchlists (monitored pids and modes).
//!
//! Lock order is always `slots` then `watch`. Neither lock is held while
//! an original handler runs or while a record is handed to the sink.
//!
//! # Request Pipeline
//! 1. Shape: syscall number and pid (`InvalidArgument`)
//! 2. Context: release/stop need prior intercept/start (`InvalidArgument`)
//! 3. Permission (`PermissionDenied`)
//! 4. Conflict: repeated intercept/start (`Busy`)
//! 5. Execute; a failed step leaves no partial change behind

use alloc::sync::{Arc, Weak};
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use log::{debug, info, warn};
use spin::RwLock;

use crate::config::InterceptorConfig;
use crate::monitor::{MonitorBoard, MonitorMode};
use crate::platform::{
    DispatchTable, Handler, LogRecord, LogSink, ProcessTable, TableError,
};
use crate::security::{authorize, Access};
use crate::syscall::{
    to_retval, validate_pid, validate_syscall, Caller, Command, ControlRequest, MonitorTarget,
    Pid, RequestError, SyscallFrame, SyscallId,
};

use super::gate::{ControlGate, ExitHook, InterceptionWrapper};
use super::protect::WriteWindow;
use super::slot::SyscallSlot;

/// Error type for attaching the interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartError {
    /// Control or exit syscall does not fit the table.
    InvalidConfig,
    /// The table refused to install a handler.
    Table(TableError),
}

impl core::fmt::Display for StartError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidConfig => write!(f, "invalid interceptor configuration"),
            Self::Table(e) => write!(f, "failed to install handler: {}", e),
        }
    }
}

impl From<TableError> for StartError {
    fn from(err: TableError) -> Self {
        Self::Table(err)
    }
}

/// Snapshot of one syscall's interception and monitoring state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotStatus {
    pub nr: usize,
    pub intercepted: bool,
    pub mode: MonitorMode,
    pub pids: Vec<Pid>,
}

pub(crate) struct Core {
    config: InterceptorConfig,
    table: Arc<dyn DispatchTable>,
    processes: Arc<dyn ProcessTable>,
    sink: Arc<dyn LogSink>,
    slots: RwLock<Vec<SyscallSlot>>,
    watch: RwLock<MonitorBoard>,
    this: Weak<Core>,
    control_original: Handler,
    exit_original: Handler,
    running: AtomicBool,
}

impl Core {
    /// Execute one control request.
    pub(crate) fn handle(&self, caller: &Caller, req: ControlRequest) -> Result<(), RequestError> {
        let id = validate_syscall(req.syscall, self.table.len(), self.config.control_syscall)?;

        let result = match req.command {
            Command::Intercept | Command::Release => self.handle_table(caller, req.command, id),
            Command::StartMonitor | Command::StopMonitor => {
                let target = validate_pid(req.pid, &*self.processes)?;
                self.handle_monitor(caller, req.command, id, target)
            }
        };

        match result {
            Ok(()) => debug!(
                "[CONTROL] {:?} syscall={} pid={} by pid {}",
                req.command, req.syscall, req.pid, caller.pid
            ),
            Err(e) => debug!(
                "[CONTROL] {:?} syscall={} pid={} by pid {} rejected: {}",
                req.command, req.syscall, req.pid, caller.pid, e
            ),
        }
        result
    }

    fn handle_table(
        &self,
        caller: &Caller,
        command: Command,
        id: SyscallId,
    ) -> Result<(), RequestError> {
        let nr = id.index();
        let mut slots = self.slots.write();
        if !self.running.load(Ordering::Acquire) {
            return Err(RequestError::InvalidArgument);
        }

        if command == Command::Release && !slots[nr].is_intercepted() {
            return Err(RequestError::InvalidArgument);
        }
        authorize(caller, Access::Table, &*self.processes)?;
        if command == Command::Intercept && slots[nr].is_intercepted() {
            return Err(RequestError::Busy);
        }

        let window = WriteWindow::open(&*self.table, &slots);
        if command == Command::Intercept {
            // The slots write lock keeps the live entry stable until the swap
            let live = self.table.entry(nr).ok_or(RequestError::InvalidArgument)?;
            let wrapper: Handler = Arc::new(InterceptionWrapper::new(self.this.clone(), live));
            slots[nr].intercept(nr, &window, wrapper)?;
            info!("[INTERCEPT] Syscall {} intercepted", nr);
        } else {
            slots[nr].release(nr, &window)?;
            if let Some(list) = self.watch.write().get_mut(nr) {
                list.clear();
            }
            info!("[INTERCEPT] Syscall {} released", nr);
        }
        Ok(())
    }

    fn handle_monitor(
        &self,
        caller: &Caller,
        command: Command,
        id: SyscallId,
        target: MonitorTarget,
    ) -> Result<(), RequestError> {
        let nr = id.index();
        let slots = self.slots.read();
        if !self.running.load(Ordering::Acquire) {
            return Err(RequestError::InvalidArgument);
        }

        if command == Command::StopMonitor {
            let started = self
                .watch
                .read()
                .get(nr)
                .map_or(false, |list| list.is_started(target));
            if !slots[nr].is_intercepted() || !started {
                return Err(RequestError::InvalidArgument);
            }
        }
        authorize(caller, Access::Monitor(target), &*self.processes)?;

        let mut watch = self.watch.write();
        if let (Command::StartMonitor, MonitorTarget::Pid(pid)) = (command, target) {
            // The target may have started exiting since validation
            if watch.is_exiting(pid) || !self.processes.exists(pid) {
                return Err(RequestError::InvalidArgument);
            }
        }
        let list = watch.get_mut(nr).ok_or(RequestError::InvalidArgument)?;
        if command == Command::StartMonitor {
            list.start(target)?;
        } else {
            list.stop(target)?;
        }
        debug!("[MONITOR] Syscall {} now {:?}", nr, list.mode());
        Ok(())
    }

    /// Hand the call to the sink if its caller is watched.
    ///
    /// Sink failures are dropped; the caller never sees them.
    pub(crate) fn record(&self, caller: &Caller, frame: &SyscallFrame) {
        let watched = {
            let slots = self.slots.read();
            // A wrapper fetched just before a release can still run
            slots.get(frame.nr).map_or(false, SyscallSlot::is_intercepted)
                && self.watch.read().is_watching(frame.nr, caller.pid)
        };
        if !watched {
            return;
        }
        let record = LogRecord {
            pid: caller.pid,
            syscall: frame.nr,
            args: frame.args,
        };
        let _ = self.sink.log_message(&record);
    }

    /// Drop an exiting `pid` from every watchlist and refuse it as a
    /// monitoring target until `finish_exit`.
    pub(crate) fn begin_exit(&self, pid: Pid) {
        let removed = self.watch.write().begin_exit(pid);
        if removed > 0 {
            debug!("[MONITOR] Exiting pid {} removed from {} watchlists", pid, removed);
        }
    }

    /// Called once the real exit has run.
    pub(crate) fn finish_exit(&self, pid: Pid) {
        let removed = self.watch.write().finish_exit(pid);
        if removed > 0 {
            debug!(
                "[MONITOR] Late entries for pid {} removed from {} watchlists",
                pid, removed
            );
        }
    }

    fn stop(&self) {
        let mut slots = self.slots.write();
        if !self.running.swap(false, Ordering::AcqRel) {
            return;
        }

        self.watch.write().clear_all();

        let window = WriteWindow::open(&*self.table, &slots);
        for (nr, slot) in slots.iter_mut().enumerate() {
            if !slot.is_intercepted() {
                continue;
            }
            warn!("[INTERCEPT] Force-releasing syscall {}", nr);
            if let Err(e) = slot.release(nr, &window) {
                warn!("[INTERCEPT] Release of syscall {} failed: {}", nr, e);
            }
        }

        let restores = [
            (self.config.control_syscall, &self.control_original),
            (self.config.exit_syscall, &self.exit_original),
        ];
        for (nr, original) in restores {
            if let Err(e) = window.swap(nr, original.clone()) {
                warn!("[INTERCEPT] Restore of syscall {} failed: {}", nr, e);
            }
        }
        drop(window);

        info!("[INTERCEPT] Detached from dispatch table");
    }
}

/// Syscall interception subsystem attached to a live dispatch table.
///
/// Dropping the interceptor detaches it.
pub struct Interceptor {
    core: Arc<Core>,
}

impl Interceptor {
    /// Attach to `table`.
    ///
    /// Captures the control and exit handlers and installs the control
    /// gate and exit hook in their place. Every slot starts released with
    /// monitoring off.
    pub fn start(
        config: InterceptorConfig,
        table: Arc<dyn DispatchTable>,
        processes: Arc<dyn ProcessTable>,
        sink: Arc<dyn LogSink>,
    ) -> Result<Self, StartError> {
        let len = table.len();
        if !config.fits(len) {
            return Err(StartError::InvalidConfig);
        }
        let control_original = table
            .entry(config.control_syscall)
            .ok_or(StartError::InvalidConfig)?;
        let exit_original = table
            .entry(config.exit_syscall)
            .ok_or(StartError::InvalidConfig)?;

        let mut slots = Vec::new();
        slots.resize_with(len, SyscallSlot::new);

        let core = Arc::new_cyclic(|weak| Core {
            config,
            table,
            processes,
            sink,
            slots: RwLock::new(slots),
            watch: RwLock::new(MonitorBoard::new(len, config.max_pids_per_syscall)),
            this: weak.clone(),
            control_original,
            exit_original: exit_original.clone(),
            running: AtomicBool::new(false),
        });

        let gate: Handler = Arc::new(ControlGate::new(
            Arc::downgrade(&core),
            core.control_original.clone(),
        ));
        let hook: Handler = Arc::new(ExitHook::new(Arc::downgrade(&core), exit_original));
        {
            let slots = core.slots.write();
            let window = WriteWindow::open(&*core.table, &slots);
            let previous = window.swap(config.control_syscall, gate)?;
            if let Err(e) = window.swap(config.exit_syscall, hook) {
                let _ = window.swap(config.control_syscall, previous);
                return Err(e.into());
            }
            core.running.store(true, Ordering::Release);
        }

        info!(
            "[INTERCEPT] Attached: control={} exit={} table={}",
            config.control_syscall, config.exit_syscall, len
        );
        Ok(Self { core })
    }

    /// Run a raw control request.
    ///
    /// # Returns
    /// 0 on success, otherwise a negative errno.
    pub fn request(&self, caller: &Caller, cmd: i32, syscall: i32, pid: Pid) -> i64 {
        let result = ControlRequest::decode(cmd, syscall, pid);
        to_retval(result.and_then(|req| self.handle(caller, req)))
    }

    /// Run a decoded control request.
    pub fn handle(&self, caller: &Caller, req: ControlRequest) -> Result<(), RequestError> {
        self.core.handle(caller, req)
    }

    /// Detach from the dispatch table.
    ///
    /// Clears every watchlist, releases every intercepted syscall and puts
    /// the control and exit handlers back. Later requests fail with
    /// `InvalidArgument`. Calling it again does nothing.
    pub fn stop(&self) {
        self.core.stop();
    }

    pub fn is_running(&self) -> bool {
        self.core.running.load(Ordering::Acquire)
    }

    pub fn config(&self) -> &InterceptorConfig {
        &self.core.config
    }

    pub fn is_intercepted(&self, nr: usize) -> bool {
        self.core
            .slots
            .read()
            .get(nr)
            .map_or(false, SyscallSlot::is_intercepted)
    }

    /// Handler that was live for `nr` before it was intercepted.
    pub fn original_handler(&self, nr: usize) -> Option<Handler> {
        self.core
            .slots
            .read()
            .get(nr)
            .and_then(SyscallSlot::original)
            .cloned()
    }

    /// Monitoring mode of `nr`; `Off` for numbers outside the table.
    pub fn monitor_mode(&self, nr: usize) -> MonitorMode {
        self.core
            .watch
            .read()
            .get(nr)
            .map_or(MonitorMode::Off, |list| list.mode())
    }

    /// Check whether `pid` is in the watchlist of `nr`.
    pub fn is_monitored(&self, nr: usize, pid: Pid) -> bool {
        self.core
            .watch
            .read()
            .get(nr)
            .map_or(false, |list| list.pids().contains(pid))
    }

    /// State of every syscall that is intercepted or monitored.
    pub fn status(&self) -> Vec<SlotStatus> {
        let slots = self.core.slots.read();
        let watch = self.core.watch.read();
        slots
            .iter()
            .enumerate()
            .filter_map(|(nr, slot)| {
                let list = watch.get(nr)?;
                let idle = list.mode() == MonitorMode::Off && list.pids().is_empty();
                if !slot.is_intercepted() && idle {
                    return None;
                }
                Some(SlotStatus {
                    nr,
                    intercepted: slot.is_intercepted(),
                    mode: list.mode(),
                    pids: list.pids().iter().collect(),
                })
            })
            .collect()
    }
}

impl Drop for Interceptor {
    fn drop(&mut self) {
        self.core.stop();
    }
}
