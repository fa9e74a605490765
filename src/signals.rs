//! Signal dispositions for the interpreter and the children it forks.
//!
//! The interpreter ignores SIGINT and uses SIGTSTP as a switch for
//! foreground-only mode. Children get SIGINT back (unless they run in the
//! background) and never stop on SIGTSTP.

use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

use crate::error::{Result, ShellError};

static FOREGROUND_ONLY: AtomicBool = AtomicBool::new(false);

const ENTER_FOREGROUND_ONLY: &[u8] = b"\nEntering foreground-only mode (& is now ignored)\n: ";
const EXIT_FOREGROUND_ONLY: &[u8] = b"\nExiting foreground-only mode\n: ";

/// Whether a trailing `&` is currently ignored.
pub fn foreground_only() -> bool {
    FOREGROUND_ONLY.load(Ordering::SeqCst)
}

/// Flips the mode and returns the new value. Async-signal-safe.
fn toggle_foreground_only() -> bool {
    !FOREGROUND_ONLY.fetch_xor(true, Ordering::SeqCst)
}

fn notification(entered: bool) -> &'static [u8] {
    if entered {
        ENTER_FOREGROUND_ONLY
    } else {
        EXIT_FOREGROUND_ONLY
    }
}

// No allocation, no stdio locks: one atomic flip and one write(2).
extern "C" fn handle_sigtstp(_: libc::c_int) {
    let message = notification(toggle_foreground_only());
    unsafe {
        libc::write(
            libc::STDOUT_FILENO,
            message.as_ptr().cast(),
            message.len(),
        );
    }
}

/// Installs the interpreter's own dispositions. Called once at startup.
pub fn install_shell_handlers() -> Result<()> {
    let ignore = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());
    let toggle = SigAction::new(
        SigHandler::Handler(handle_sigtstp),
        SaFlags::SA_RESTART,
        SigSet::all(),
    );

    unsafe {
        sigaction(Signal::SIGINT, &ignore).map_err(ShellError::Signal)?;
        sigaction(Signal::SIGTSTP, &toggle).map_err(ShellError::Signal)?;
    }
    log::debug!("shell signal dispositions installed");
    Ok(())
}

/// Sets the dispositions a freshly forked child runs with. Only called
/// between fork and exec, so it must stay async-signal-safe.
pub fn prepare_child(background: bool) -> nix::Result<()> {
    let interrupt = if background {
        SigHandler::SigIgn
    } else {
        SigHandler::SigDfl
    };
    let interrupt = SigAction::new(interrupt, SaFlags::empty(), SigSet::empty());
    let stop = SigAction::new(SigHandler::SigIgn, SaFlags::empty(), SigSet::empty());

    unsafe {
        sigaction(Signal::SIGINT, &interrupt)?;
        sigaction(Signal::SIGTSTP, &stop)?;
    }
    Ok(())
}
