use std::path::PathBuf;

use crate::error::{Result, ShellError};
use crate::expand::expand_pid;

/// One parsed input line, ready for dispatch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Command {
    pub args: Vec<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub background: bool,
}

/// Commands handled inside the interpreter instead of a child process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin<'a> {
    Exit,
    Cd(Option<&'a str>),
    Status,
}

impl Command {
    /// Expands `$$` to `pid`, splits on whitespace and pulls out
    /// redirections and the trailing background marker.
    ///
    /// Blank lines and comments give an empty command. A `<` or `>` with
    /// nothing after it rejects the whole line.
    pub fn parse(line: &str, pid: u32, foreground_only: bool) -> Result<Self> {
        let expanded = expand_pid(line, pid);
        let mut tokens = expanded.split_whitespace();
        let mut command = Command::default();

        while let Some(token) = tokens.next() {
            match token {
                "<" => {
                    let path = tokens
                        .next()
                        .ok_or(ShellError::MalformedRedirection { operator: '<' })?;
                    command.input = Some(PathBuf::from(path));
                }
                ">" => {
                    let path = tokens
                        .next()
                        .ok_or(ShellError::MalformedRedirection { operator: '>' })?;
                    command.output = Some(PathBuf::from(path));
                }
                // a word starting with '#' comments out the rest of the line
                comment if comment.starts_with('#') => break,
                _ => command.args.push(token.to_string()),
            }
        }

        if command.args.last().map(String::as_str) == Some("&") {
            command.args.pop();
            command.background = !foreground_only;
        }

        Ok(command)
    }

    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }

    pub fn builtin(&self) -> Option<Builtin<'_>> {
        match self.program()? {
            "exit" => Some(Builtin::Exit),
            "cd" => Some(Builtin::Cd(self.args.get(1).map(String::as_str))),
            "status" => Some(Builtin::Status),
            _ => None,
        }
    }
}
