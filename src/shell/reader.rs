use std::sync::Arc;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::handoff::Handoff;

pub(crate) const PROMPT: &str = "$ ";

/// Longest accepted command line, in bytes, excluding the terminator.
pub(crate) const LINE_CAPACITY: usize = 512;

/// The producing half of the shell: prompts, reads one line, hands it
/// over, and stays blocked until the executor has finished with it.
pub(crate) struct Reader {
    editor: DefaultEditor,
    handoff: Arc<Handoff>,
}

impl Reader {
    pub fn new(editor: DefaultEditor, handoff: Arc<Handoff>) -> Self {
        Reader { editor, handoff }
    }

    pub fn run(&mut self) {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if line.len() > LINE_CAPACITY {
                        eprintln!(
                            "tandem: input line exceeds {} bytes, discarded",
                            LINE_CAPACITY
                        );
                        continue;
                    }
                    if self.handoff.deposit(line).is_err() {
                        break;
                    }
                }
                // Ctrl-C at the prompt: no child is running, nothing to
                // forward.
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => {
                    self.handoff.close();
                    break;
                }
                Err(e) => {
                    eprintln!("tandem: failed to read input: {}", e);
                    self.handoff.close();
                    break;
                }
            }
        }
    }
}
