use std::sync::Arc;
use std::thread;

use rustyline::DefaultEditor;

mod executor;
mod handoff;
mod reader;

use crate::error::ShellError;
use crate::process::{ForegroundSlot, SignalRelay};
use executor::Executor;
use handoff::Handoff;
use reader::Reader;

/// Owns the shared state and both halves of the shell. The reader runs on
/// the calling thread; the executor gets a thread of its own.
pub struct Shell {
    editor: DefaultEditor,
    handoff: Arc<Handoff>,
    foreground: Arc<ForegroundSlot>,
    relay: SignalRelay,
}

impl Shell {
    pub fn new() -> Result<Self, ShellError> {
        let editor = DefaultEditor::new()?;
        let handoff = Arc::new(Handoff::new());
        let foreground = Arc::new(ForegroundSlot::new());

        // Registered before the first command can possibly spawn.
        let relay = SignalRelay::install(Arc::clone(&foreground))?;

        Ok(Shell {
            editor,
            handoff,
            foreground,
            relay,
        })
    }

    pub fn run(self) -> Result<(), ShellError> {
        let Shell {
            editor,
            handoff,
            foreground,
            relay,
        } = self;

        let executor = Executor::new(Arc::clone(&handoff), foreground);
        let worker = thread::Builder::new()
            .name("executor".to_string())
            .spawn(move || executor.run())?;

        let mut reader = Reader::new(editor, Arc::clone(&handoff));
        reader.run();

        // Whichever side stopped first already closed the channel; closing
        // again is a no-op but guarantees the executor is not left blocked.
        handoff.close();
        worker
            .join()
            .map_err(|_| ShellError::Thread("executor thread panicked".to_string()))?;

        relay.shutdown();
        Ok(())
    }
}
