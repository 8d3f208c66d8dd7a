use std::fs::File;
use std::io;
use std::process::{Child, Command, Stdio};

use libc::pid_t;

use super::ProcessError;
use crate::parse::ParsedCommand;

/// Spawns the parsed command. `arguments` must be non-empty.
///
/// Redirect files are opened here, in the parent, so their failures come
/// back as distinct errors before anything is forked; descriptor
/// replacement and exec happen in the child, which on exec failure never
/// falls back into running shell code.
pub fn spawn_command(parsed: &ParsedCommand) -> Result<Child, ProcessError> {
    let mut command = Command::new(&parsed.arguments[0]);
    command
        .args(&parsed.arguments[1..])
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());

    if let Some(path) = &parsed.input_redirect {
        let file = File::open(path).map_err(|e| ProcessError::InputRedirect(path.clone(), e))?;
        command.stdin(file);
    }

    if let Some(path) = &parsed.output_redirect {
        let file = File::create(path).map_err(|e| ProcessError::OutputRedirect(path.clone(), e))?;
        command.stdout(file);
    }

    command.spawn().map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            ProcessError::CommandNotFound(parsed.arguments[0].clone())
        } else {
            ProcessError::Spawn(e)
        }
    })
}

/// Blocks until the given child exits or is stopped.
///
/// Runs with no lock held so the signal relay stays free to reap other
/// children concurrently. If the relay drains this child first the wait
/// ends with ECHILD, which is quiet success here.
pub fn wait_foreground(pid: pid_t) -> Result<(), ProcessError> {
    let mut status: libc::c_int = 0;
    loop {
        let reaped = unsafe { libc::waitpid(pid, &mut status, libc::WUNTRACED) };
        if reaped != -1 {
            return Ok(());
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINTR) => continue,
            Some(libc::ECHILD) => return Ok(()),
            _ => return Err(ProcessError::Wait(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use std::env;
    use std::fs;

    fn spawn_line(line: &str) -> Result<Child, ProcessError> {
        spawn_command(&parse::parse(line))
    }

    #[test]
    fn test_spawn_and_wait_foreground() {
        let child = spawn_line("true").unwrap();
        assert!(wait_foreground(child.id() as pid_t).is_ok());
    }

    #[test]
    fn test_command_not_found() {
        let result = spawn_line("tandem-no-such-command-anywhere");
        assert!(matches!(result, Err(ProcessError::CommandNotFound(_))));
    }

    #[test]
    fn test_missing_input_redirect_is_distinct() {
        let result = spawn_line("cat </no/such/file");
        assert!(matches!(result, Err(ProcessError::InputRedirect(_, _))));
    }

    #[test]
    fn test_unwritable_output_redirect_is_distinct() {
        let result = spawn_line("echo hi >/no/such/dir/out.txt");
        assert!(matches!(result, Err(ProcessError::OutputRedirect(_, _))));
    }

    #[test]
    fn test_output_redirect_writes_file() {
        let path = env::temp_dir().join("tandem_test_out.txt");
        let child = spawn_line(&format!("echo redirected >{}", path.display())).unwrap();
        wait_foreground(child.id() as pid_t).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written.trim(), "redirected");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_input_redirect_feeds_child() {
        let input = env::temp_dir().join("tandem_test_in.txt");
        let output = env::temp_dir().join("tandem_test_copied.txt");
        fs::write(&input, "line from file\n").unwrap();

        let line = format!("cat <{} >{}", input.display(), output.display());
        let child = spawn_line(&line).unwrap();
        wait_foreground(child.id() as pid_t).unwrap();

        assert_eq!(fs::read_to_string(&output).unwrap(), "line from file\n");
        fs::remove_file(&input).unwrap();
        fs::remove_file(&output).unwrap();
    }

    #[test]
    fn test_wait_tolerates_already_reaped_child() {
        let child = spawn_line("true").unwrap();
        let pid = child.id() as pid_t;
        wait_foreground(pid).unwrap();
        // Second wait hits ECHILD, the same outcome the signal relay
        // winning the reaping race produces.
        assert!(wait_foreground(pid).is_ok());
    }
}
