use std::fmt::Display;
use std::io::{self, BufRead, Write};

/// Typing this at any prompt backs out of the current screen.
pub const EXIT_SENTINEL: &str = "--";

/// Line-oriented terminal over any reader/writer pair.
pub struct Console<R, W> {
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(input: R, out: W) -> Self {
        Self { input, out }
    }

    pub fn say(&mut self, line: impl Display) -> io::Result<()> {
        writeln!(self.out, "{line}")
    }

    /// Trimmed input line. `None` on end of input or the exit sentinel.
    pub fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.out, "{label}: ")?;
        self.out.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        let line = line.trim();
        if line == EXIT_SENTINEL {
            return Ok(None);
        }
        Ok(Some(line.to_string()))
    }

    /// A number in `1..=max`, asking again until one arrives.
    pub fn choose(&mut self, label: &str, max: u8) -> io::Result<Option<u8>> {
        loop {
            let Some(line) = self.prompt(label)? else {
                return Ok(None);
            };
            match line.parse::<u8>() {
                Ok(n) if (1..=max).contains(&n) => return Ok(Some(n)),
                _ => self.say(format!("Enter a number from 1 to {max}, or {EXIT_SENTINEL} to leave."))?,
            }
        }
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.out
    }
}
