use crate::error::{Result, ShellError};

/// Longest accepted command line, in bytes.
pub const DEFAULT_MAX_LINE: usize = 2048;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub max_line: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_line: DEFAULT_MAX_LINE,
        }
    }
}

/// What the command line asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Run(Config),
    Help,
    Version,
}

impl Config {
    pub fn from_args<I>(args: I) -> Result<Invocation>
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Config::default();
        let mut args = args.into_iter();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "-h" | "--help" => return Ok(Invocation::Help),
                "-v" | "-V" | "--version" => return Ok(Invocation::Version),
                "--max-line" => {
                    let value = args
                        .next()
                        .ok_or_else(|| ShellError::Usage("--max-line needs a value".into()))?;
                    config.max_line = parse_max_line(&value)?;
                }
                other => {
                    if let Some(value) = other.strip_prefix("--max-line=") {
                        config.max_line = parse_max_line(value)?;
                    } else {
                        return Err(ShellError::Usage(format!("unknown option '{other}'")));
                    }
                }
            }
        }

        Ok(Invocation::Run(config))
    }
}

fn parse_max_line(value: &str) -> Result<usize> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ShellError::Usage(format!(
            "invalid --max-line value '{value}'"
        ))),
    }
}
