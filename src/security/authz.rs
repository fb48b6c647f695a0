//! Request Authorization
//!
//! Decides whether a caller may act on the dispatch table or on a
//! process's monitoring state. Pure: no state is read or written beyond
//! the process lookups.
//!
//! # Rules
//! - Intercept/release: superuser only
//! - Start/stop monitoring: the superuser always; anyone else only for a
//!   specific pid owned by the same user. Monitoring every pid (pid 0) is
//!   reserved to the superuser.

use crate::platform::ProcessTable;
use crate::syscall::{Caller, Command, MonitorTarget, RequestError};

/// What a request wants to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Swap a dispatch table entry.
    Table,
    /// Change who is monitored for a syscall.
    Monitor(MonitorTarget),
}

impl Access {
    /// Access needed to run `command` against `target`.
    pub fn for_command(command: Command, target: MonitorTarget) -> Self {
        if command.is_monitoring() {
            Self::Monitor(target)
        } else {
            Self::Table
        }
    }
}

/// Check that `caller` may perform `access`.
///
/// # Returns
/// * `Ok(())` - permitted
/// * `Err(PermissionDenied)` - denied
pub fn authorize(
    caller: &Caller,
    access: Access,
    processes: &dyn ProcessTable,
) -> Result<(), RequestError> {
    if caller.is_root() {
        return Ok(());
    }

    match access {
        Access::Table => Err(RequestError::PermissionDenied),
        Access::Monitor(MonitorTarget::All) => Err(RequestError::PermissionDenied),
        Access::Monitor(MonitorTarget::Pid(pid)) => {
            // A process that vanished since validation has no owner to match
            match processes.owner_of(pid) {
                Some(owner) if owner == caller.uid => Ok(()),
                _ => Err(RequestError::PermissionDenied),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ProcessRegistry;
    use crate::syscall::ROOT_UID;

    fn registry() -> ProcessRegistry {
        let procs = ProcessRegistry::new();
        procs.spawn(100, 1000);
        procs.spawn(200, 2000);
        procs
    }

    #[test]
    fn test_table_access_root_only() {
        let procs = registry();
        assert!(authorize(&Caller::new(1, ROOT_UID), Access::Table, &procs).is_ok());
        assert_eq!(
            authorize(&Caller::new(100, 1000), Access::Table, &procs),
            Err(RequestError::PermissionDenied)
        );
    }

    #[test]
    fn test_all_pids_root_only() {
        let procs = registry();
        let all = Access::Monitor(MonitorTarget::All);
        assert!(authorize(&Caller::new(1, ROOT_UID), all, &procs).is_ok());
        assert_eq!(
            authorize(&Caller::new(100, 1000), all, &procs),
            Err(RequestError::PermissionDenied)
        );
    }

    #[test]
    fn test_same_owner_only() {
        let procs = registry();
        let caller = Caller::new(100, 1000);
        assert!(authorize(&caller, Access::Monitor(MonitorTarget::Pid(100)), &procs).is_ok());
        assert_eq!(
            authorize(&caller, Access::Monitor(MonitorTarget::Pid(200)), &procs),
            Err(RequestError::PermissionDenied)
        );
        assert!(authorize(
            &Caller::new(1, ROOT_UID),
            Access::Monitor(MonitorTarget::Pid(200)),
            &procs
        )
        .is_ok());
    }

    #[test]
    fn test_vanished_target_denied() {
        let procs = registry();
        procs.reap(100);
        assert_eq!(
            authorize(
                &Caller::new(101, 1000),
                Access::Monitor(MonitorTarget::Pid(100)),
                &procs
            ),
            Err(RequestError::PermissionDenied)
        );
    }

    #[test]
    fn test_access_for_command() {
        assert_eq!(
            Access::for_command(Command::Intercept, MonitorTarget::All),
            Access::Table
        );
        assert_eq!(
            Access::for_command(Command::StopMonitor, MonitorTarget::Pid(3)),
            Access::Monitor(MonitorTarget::Pid(3))
        );
    }
}
