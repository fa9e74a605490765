use std::io::{self, StdinLock};
use std::process;

use crate::builtins;
use crate::command::Command;
use crate::config::Config;
use crate::error::{Result, ShellError};
use crate::exec;
use crate::input::LineReader;
use crate::jobs;
use crate::prompt::Prompt;
use crate::signals;
use crate::status::StatusTracker;

pub struct Shell {
    prompt: Prompt,
    reader: LineReader<StdinLock<'static>>,
    status: StatusTracker,
    pid: u32,
    running: bool,
}

impl Shell {
    pub fn new(config: &Config) -> Self {
        Self {
            prompt: Prompt::new(),
            reader: LineReader::new(io::stdin().lock(), config.max_line),
            status: StatusTracker::new(),
            pid: process::id(),
            running: true,
        }
    }

    /// Read-eval loop. Returns when `exit` is run or input ends; an error
    /// means the interpreter cannot continue.
    pub fn run(&mut self) -> Result<()> {
        while self.running {
            let mut stdout = io::stdout();
            jobs::reap_finished(&mut stdout)?;
            self.prompt.display(&mut stdout)?;

            let line = match self.reader.read_line() {
                Ok(Some(line)) => line,
                Ok(None) => {
                    log::debug!("end of input");
                    break;
                }
                Err(e @ ShellError::LineTooLong { .. }) => {
                    report(&e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            if let Err(e) = self.dispatch(&line) {
                if e.is_fatal() {
                    return Err(e);
                }
                report(&e);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, line: &str) -> Result<()> {
        let foreground_only = signals::foreground_only();
        let command = Command::parse(line, self.pid, foreground_only)?;
        if command.is_empty() {
            return Ok(());
        }
        if foreground_only {
            log::debug!("foreground-only mode active for {:?}", command.args);
        }

        let mut stdout = io::stdout();
        match command.builtin() {
            Some(builtin) => {
                self.running = builtins::run(builtin, &self.status, &mut stdout)?;
            }
            None => {
                let launch = exec::execute(&command, &mut self.status, &mut stdout)?;
                log::debug!("{:?} returned {}", command.args, launch.exit_code());
            }
        }
        Ok(())
    }
}

fn report(error: &ShellError) {
    log::debug!("recoverable error: {error:?}");
    eprintln!("smallsh: {error}");
}
