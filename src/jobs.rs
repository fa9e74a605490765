//! Background job reaping.
//!
//! There is no job table: background children are found by asking the
//! kernel for any child that has already finished.

use std::io::{self, Write};

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;

use crate::status::Termination;

/// Collects every finished child without blocking and reports each one.
/// Returns how many were reaped.
pub fn reap_finished<W: Write>(out: &mut W) -> io::Result<usize> {
    reap_with(
        || waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)),
        out,
    )
}

pub(crate) fn reap_with<F, W>(mut poll: F, out: &mut W) -> io::Result<usize>
where
    F: FnMut() -> nix::Result<WaitStatus>,
    W: Write,
{
    let mut reaped = 0;

    loop {
        match poll() {
            // nothing finished yet, or no children at all
            Ok(WaitStatus::StillAlive) | Err(Errno::ECHILD) => break,
            Ok(status) => {
                if let Some((pid, termination)) = Termination::from_wait(status) {
                    log::debug!("reaped background child {pid}: {termination}");
                    writeln!(out, "background pid {pid} is done: {termination}")?;
                    reaped += 1;
                }
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => {
                log::warn!("waitpid failed while reaping: {errno}");
                break;
            }
        }
    }

    out.flush()?;
    Ok(reaped)
}
