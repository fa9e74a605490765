use std::env;
use std::io::Write;
use std::path::PathBuf;

use crate::command::Builtin;
use crate::error::{Result, ShellError};
use crate::status::StatusTracker;

/// Runs a builtin. Returns `false` when the shell should stop.
pub fn run<W: Write>(builtin: Builtin<'_>, status: &StatusTracker, out: &mut W) -> Result<bool> {
    match builtin {
        Builtin::Exit => return Ok(false),
        Builtin::Cd(path) => change_directory(path)?,
        Builtin::Status => status.report(out)?,
    }
    Ok(true)
}

/// `cd` with no argument goes to `$HOME`, or `/` when it is unset.
fn change_directory(path: Option<&str>) -> Result<()> {
    let target = match path {
        Some(path) => PathBuf::from(path),
        None => env::var_os("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/")),
    };

    env::set_current_dir(&target)
        .map_err(|source| ShellError::DirectoryChange { path: target, source })
}
