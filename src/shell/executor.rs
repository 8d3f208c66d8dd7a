use std::sync::Arc;

use libc::pid_t;

use super::handoff::Handoff;
use crate::parse::{self, ParsedCommand};
use crate::process::{spawn_command, wait_foreground, ForegroundSlot};

/// The consuming half of the shell: takes one line at a time off the
/// handoff, makes the spawn decision, and releases the slot only once the
/// line is fully handled.
pub(crate) struct Executor {
    handoff: Arc<Handoff>,
    foreground: Arc<ForegroundSlot>,
}

impl Executor {
    pub fn new(handoff: Arc<Handoff>, foreground: Arc<ForegroundSlot>) -> Self {
        Executor { handoff, foreground }
    }

    pub fn run(&self) {
        while let Some(line) = self.handoff.collect() {
            let command = parse::parse(&line);

            if command.is_empty() {
                self.handoff.release();
                continue;
            }

            if command.is_exit() {
                // Close instead of release: the reader wakes from its
                // consumption wait and stops instead of prompting again.
                self.handoff.close();
                break;
            }

            self.dispatch(&command);
            self.handoff.release();
        }
    }

    fn dispatch(&self, command: &ParsedCommand) {
        let child = match spawn_command(command) {
            Ok(child) => child,
            Err(e) => {
                eprintln!("tandem: {}", e);
                return;
            }
        };

        if command.background {
            // Not recorded, not waited on; the signal relay reaps it and
            // reports its termination.
            return;
        }

        let pid = child.id() as pid_t;
        self.foreground.set(pid);
        if let Err(e) = wait_foreground(pid) {
            eprintln!("tandem: {}", e);
        }
        self.foreground.clear();
    }
}
