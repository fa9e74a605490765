use std::io::{self, Write};

/// Marker written before every command line. The foreground-only
/// notifications in `signals` end with the same marker.
pub const PROMPT_MARKER: &str = ": ";

pub struct Prompt {
    marker: &'static str,
}

impl Prompt {
    pub fn new() -> Self {
        Self {
            marker: PROMPT_MARKER,
        }
    }

    pub fn display<W: Write>(&self, out: &mut W) -> io::Result<()> {
        out.write_all(self.marker.as_bytes())?;
        out.flush()
    }
}
