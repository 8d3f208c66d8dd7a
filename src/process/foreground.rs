use std::sync::atomic::{AtomicI32, Ordering};

use libc::pid_t;

const NO_CHILD: pid_t = 0;

/// The one foreground child currently being waited on, or none.
///
/// A plain atomic rather than a mutex so the interrupt handler and the
/// reaping thread can consult it without any lock-ordering concerns
/// against the executor's blocking wait. Background children are never
/// recorded here.
pub struct ForegroundSlot(AtomicI32);

impl ForegroundSlot {
    pub const fn new() -> Self {
        ForegroundSlot(AtomicI32::new(NO_CHILD))
    }

    pub fn set(&self, pid: pid_t) {
        self.0.store(pid, Ordering::SeqCst);
    }

    pub fn clear(&self) {
        self.0.store(NO_CHILD, Ordering::SeqCst);
    }

    pub fn get(&self) -> Option<pid_t> {
        match self.0.load(Ordering::SeqCst) {
            NO_CHILD => None,
            pid => Some(pid),
        }
    }

    pub fn matches(&self, pid: pid_t) -> bool {
        self.0.load(Ordering::SeqCst) == pid
    }
}

impl Default for ForegroundSlot {
    fn default() -> Self {
        Self::new()
    }
}
