use std::fmt;
use std::io::{self, Write};

use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// How a child ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Termination {
    /// Terminal states only; stopped or continued children give `None`.
    pub fn from_wait(status: WaitStatus) -> Option<(Pid, Self)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, Termination::Exited(code))),
            WaitStatus::Signaled(pid, signal, _) => {
                Some((pid, Termination::Signaled(signal as i32)))
            }
            _ => None,
        }
    }

    /// Shell-style exit code: the status itself, or 128 plus the signal.
    pub fn code(self) -> i32 {
        match self {
            Termination::Exited(code) => code,
            Termination::Signaled(signal) => 128 + signal,
        }
    }
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Exited(0)
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit value {code}"),
            Termination::Signaled(signal) => write!(f, "terminated by signal: {signal}"),
        }
    }
}

/// Last foreground result, shown by the `status` builtin.
#[derive(Debug, Default)]
pub struct StatusTracker {
    last: Termination,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, termination: Termination) {
        self.last = termination;
    }

    pub fn last(&self) -> Termination {
        self.last
    }

    pub fn report<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "{}", self.last)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nix::sys::signal::Signal;

    #[test]
    fn starts_as_clean_exit() {
        let tracker = StatusTracker::new();
        assert_eq!(tracker.last(), Termination::Exited(0));

        let mut out = Vec::new();
        tracker.report(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "exit value 0\n");
    }

    #[test]
    fn reports_most_recent_record() {
        let mut tracker = StatusTracker::new();
        tracker.record(Termination::Exited(1));
        tracker.record(Termination::Signaled(2));

        let mut out = Vec::new();
        tracker.report(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "terminated by signal: 2\n");
    }

    #[test]
    fn wait_statuses_map_to_terminations() {
        let pid = Pid::from_raw(1234);
        assert_eq!(
            Termination::from_wait(WaitStatus::Exited(pid, 3)),
            Some((pid, Termination::Exited(3)))
        );
        assert_eq!(
            Termination::from_wait(WaitStatus::Signaled(pid, Signal::SIGTERM, false)),
            Some((pid, Termination::Signaled(15)))
        );
        assert_eq!(Termination::from_wait(WaitStatus::StillAlive), None);
        assert_eq!(
            Termination::from_wait(WaitStatus::Stopped(pid, Signal::SIGSTOP)),
            None
        );
    }

    #[test]
    fn signal_codes_follow_shell_convention() {
        assert_eq!(Termination::Exited(7).code(), 7);
        assert_eq!(Termination::Signaled(9).code(), 137);
    }
}
