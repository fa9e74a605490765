//! Runs external commands in a forked child.
//!
//! Everything the child needs (argv, redirection paths) is converted to C
//! strings before the fork, including the null-terminated argv pointer
//! array. Between fork and exec the child only makes raw system calls: no
//! allocation, no logging, no Rust stdio.

use std::ffi::{CStr, CString};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

use nix::errno::Errno;
use nix::sys::wait::waitpid;
use nix::unistd::{fork, ForkResult, Pid};

use crate::command::Command;
use crate::error::{ChildFailure, Result, ShellError};
use crate::signals;
use crate::status::{StatusTracker, Termination};

const OUTPUT_MODE: libc::c_uint = 0o644;

/// What happened to a launched command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launch {
    Foreground(Termination),
    Background(Pid),
}

impl Launch {
    /// Exit code of a foreground command; background launches count as 0.
    pub fn exit_code(self) -> i32 {
        match self {
            Launch::Foreground(termination) => termination.code(),
            Launch::Background(_) => 0,
        }
    }
}

struct ChildPlan {
    argv: Vec<CString>,
    // points into `argv`; the CString buffers stay put when the Vec moves
    argv_ptrs: Vec<*const libc::c_char>,
    input: Option<CString>,
    output: Option<CString>,
    background: bool,
}

impl ChildPlan {
    fn new(command: &Command) -> Result<Self> {
        let argv = command
            .args
            .iter()
            .map(|arg| CString::new(arg.as_bytes()))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(std::ptr::null()))
            .collect();
        let path = |path: &Option<PathBuf>| {
            path.as_deref()
                .map(|p| CString::new(p.as_os_str().as_bytes()))
                .transpose()
        };

        Ok(ChildPlan {
            argv,
            argv_ptrs,
            input: path(&command.input)?,
            output: path(&command.output)?,
            background: command.background,
        })
    }
}

/// Forks and runs `command`. Foreground commands are waited for and their
/// result recorded in `status`; background commands are announced on `out`
/// and left for the reaper.
pub fn execute<W: Write>(
    command: &Command,
    status: &mut StatusTracker,
    out: &mut W,
) -> Result<Launch> {
    let plan = ChildPlan::new(command)?;
    if plan.argv.is_empty() {
        return Ok(Launch::Foreground(status.last()));
    }

    // pending output must not be duplicated into the child
    out.flush()?;
    io::stdout().flush()?;
    io::stderr().flush()?;

    match unsafe { fork() } {
        Err(errno) => {
            log::error!("fork failed: {errno}");
            Err(ShellError::Fork(errno))
        }
        Ok(ForkResult::Child) => run_child(&plan),
        Ok(ForkResult::Parent { child }) => {
            log::debug!(
                "forked {child} for {:?} (background: {})",
                command.args,
                plan.background
            );

            if plan.background {
                writeln!(out, "background pid is {child}")?;
                out.flush()?;
                return Ok(Launch::Background(child));
            }

            let termination = wait_foreground(child)?;
            log::debug!("foreground child {child} finished: {termination}");
            status.record(termination);
            if let Termination::Signaled(_) = termination {
                writeln!(out, "{termination}")?;
                out.flush()?;
            }
            Ok(Launch::Foreground(termination))
        }
    }
}

fn wait_foreground(child: Pid) -> Result<Termination> {
    loop {
        match waitpid(child, None) {
            Ok(status) => {
                if let Some((_, termination)) = Termination::from_wait(status) {
                    return Ok(termination);
                }
            }
            Err(Errno::EINTR) => continue,
            Err(errno) => return Err(ShellError::Wait(errno)),
        }
    }
}

fn run_child(plan: &ChildPlan) -> ! {
    // sigaction only fails for invalid signal numbers
    let _ = signals::prepare_child(plan.background);

    if let Some(path) = &plan.input {
        if let Err(failure) = redirect(path, libc::O_RDONLY, libc::STDIN_FILENO, b"input") {
            exit_child(failure);
        }
    }
    if let Some(path) = &plan.output {
        let flags = libc::O_WRONLY | libc::O_CREAT | libc::O_TRUNC;
        if let Err(failure) = redirect(path, flags, libc::STDOUT_FILENO, b"output") {
            exit_child(failure);
        }
    }

    let program = plan.argv[0].as_c_str();
    unsafe { libc::execvp(program.as_ptr(), plan.argv_ptrs.as_ptr()) };
    let errno = Errno::last();
    report(&[program.to_bytes(), b": ", errno.desc().as_bytes()]);
    exit_child(ChildFailure::Exec)
}

/// Opens `path` and moves it onto `target`. Runs in the child only.
fn redirect(
    path: &CStr,
    flags: libc::c_int,
    target: RawFd,
    direction: &[u8],
) -> std::result::Result<(), ChildFailure> {
    let fd = Errno::result(unsafe { libc::open(path.as_ptr(), flags, OUTPUT_MODE) })
        .map_err(|errno| {
            report(&[
                b"cannot open ",
                path.to_bytes(),
                b" for ",
                direction,
                b": ",
                errno.desc().as_bytes(),
            ]);
            ChildFailure::RedirectionOpen
        })?;

    Errno::result(unsafe { libc::dup2(fd, target) }).map_err(|errno| {
        report(&[b"cannot redirect ", direction, b": ", errno.desc().as_bytes()]);
        ChildFailure::RedirectionWire
    })?;

    // open may have handed back the target itself when it was closed;
    // marking it close-on-exec would then drop the redirection at exec
    if fd != target {
        // the opened descriptor must not leak into the new program image
        unsafe { libc::fcntl(fd, libc::F_SETFD, libc::FD_CLOEXEC) };
    }
    Ok(())
}

/// Writes `smallsh: <parts>\n` to stderr with raw write(2) calls.
fn report(parts: &[&[u8]]) {
    let prefix: &[u8] = b"smallsh: ";
    for part in std::iter::once(prefix)
        .chain(parts.iter().copied())
        .chain(std::iter::once(&b"\n"[..]))
    {
        unsafe { libc::write(libc::STDERR_FILENO, part.as_ptr().cast(), part.len()) };
    }
}

fn exit_child(failure: ChildFailure) -> ! {
    unsafe { libc::_exit(failure.exit_code()) }
}
