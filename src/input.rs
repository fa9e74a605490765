use std::io::{BufRead, Read};

use crate::error::{Result, ShellError};

/// Reads command lines with a hard upper bound on their length.
pub struct LineReader<R> {
    reader: R,
    max_line: usize,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(reader: R, max_line: usize) -> Self {
        Self { reader, max_line }
    }

    /// Next line without its newline, or `None` at end of input.
    ///
    /// A line longer than the limit is consumed entirely and rejected, so
    /// its tail is never read back as a separate command.
    pub fn read_line(&mut self) -> Result<Option<String>> {
        let mut buf = Vec::new();
        let limit = self.max_line as u64 + 1;
        let read = (&mut self.reader).take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }

        if buf.last() == Some(&b'\n') {
            buf.pop();
        } else if buf.len() > self.max_line {
            self.discard_rest_of_line()?;
            return Err(ShellError::LineTooLong {
                limit: self.max_line,
            });
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    fn discard_rest_of_line(&mut self) -> Result<()> {
        loop {
            let available = self.reader.fill_buf()?;
            if available.is_empty() {
                return Ok(());
            }
            match available.iter().position(|&b| b == b'\n') {
                Some(at) => {
                    self.reader.consume(at + 1);
                    return Ok(());
                }
                None => {
                    let len = available.len();
                    self.reader.consume(len);
                }
            }
        }
    }
}
