use std::process::ExitStatus;
use tokio::process::Command;

///
/// Returns a command for `program` that runs in its own process group.
///
/// A Ctrl-C in the terminal then reaches the auditor only, and the child
/// finishes its current work before the run stops.
///
pub fn isolated_command(program: &str) -> Command {
    #[allow(unused_mut)]
    let mut command = std::process::Command::new(program);
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        command.process_group(0);
    }
    Command::from(command)
}

/// Returns the signal that terminated a child, if any.
#[cfg(unix)]
pub fn terminating_signal(status: &ExitStatus) -> Option<i32> {
    use std::os::unix::process::ExitStatusExt;
    status.signal()
}

#[cfg(not(unix))]
pub fn terminating_signal(_status: &ExitStatus) -> Option<i32> {
    None
}
