use std::sync::Arc;
use std::thread::{self, JoinHandle};

use libc::pid_t;
use signal_hook::consts::SIGCHLD;
use signal_hook::iterator::backend::Handle;
use signal_hook::iterator::Signals;

use super::{ForegroundSlot, ProcessError};

/// Routes asynchronous signals back into ordinary thread context.
///
/// SIGCHLD deliveries are consumed by a dedicated relay thread that reaps
/// and reports children; SIGINT is forwarded to whatever foreground child
/// the slot names, so the shell itself survives the interrupt key.
pub struct SignalRelay {
    handle: Handle,
    thread: Option<JoinHandle<()>>,
}

impl SignalRelay {
    pub fn install(foreground: Arc<ForegroundSlot>) -> Result<Self, ProcessError> {
        let interrupt_slot = Arc::clone(&foreground);
        ctrlc::set_handler(move || forward_interrupt(&interrupt_slot))
            .map_err(|e| ProcessError::SignalSetup(e.to_string()))?;

        let mut signals =
            Signals::new([SIGCHLD]).map_err(|e| ProcessError::SignalSetup(e.to_string()))?;
        let handle = signals.handle();

        let thread = thread::Builder::new()
            .name("signal-relay".to_string())
            .spawn(move || {
                for _ in signals.forever() {
                    drain_children(&foreground);
                }
            })
            .map_err(|e| ProcessError::SignalSetup(e.to_string()))?;

        Ok(SignalRelay {
            handle,
            thread: Some(thread),
        })
    }

    /// Ends the relay thread. Called once both shell threads are done, so
    /// no more children can appear.
    pub fn shutdown(mut self) {
        self.handle.close();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn forward_interrupt(foreground: &ForegroundSlot) {
    if let Some(pid) = foreground.get() {
        unsafe {
            libc::kill(pid, libc::SIGINT);
        }
    }
}

/// Collects every child with a pending state change. One SIGCHLD may
/// stand for several terminations, hence the non-blocking loop.
fn drain_children(foreground: &ForegroundSlot) {
    loop {
        let mut status: libc::c_int = 0;
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG | libc::WUNTRACED) };
        if pid <= 0 {
            break;
        }

        // The executor's own wait observes the foreground child; printing
        // here as well would report it twice.
        if foreground.matches(pid) {
            continue;
        }

        eprintln!("{}", notification(pid, ChildStatus::classify(status)));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChildStatus {
    Exited(i32),
    Signaled(i32),
    Stopped(i32),
}

impl ChildStatus {
    fn classify(status: libc::c_int) -> Self {
        if libc::WIFEXITED(status) {
            ChildStatus::Exited(libc::WEXITSTATUS(status))
        } else if libc::WIFSIGNALED(status) {
            ChildStatus::Signaled(libc::WTERMSIG(status))
        } else {
            ChildStatus::Stopped(libc::WSTOPSIG(status))
        }
    }
}

fn notification(pid: pid_t, status: ChildStatus) -> String {
    match status {
        ChildStatus::Exited(code) => {
            format!("Process [{}] finished with return code: {}", pid, code)
        }
        ChildStatus::Signaled(sig) => {
            format!("Process [{}] terminated with signal: {}", pid, sig)
        }
        ChildStatus::Stopped(sig) => {
            format!("Process [{}] stopped with signal: {}", pid, sig)
        }
    }
}
