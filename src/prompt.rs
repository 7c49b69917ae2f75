//! Terminal implementation of the [`Disambiguator`] capability.

use std::io::{BufRead, Write};

use tf_core::{Error, Result};
use tf_rules::{Disambiguator, SlotRequest, TrackChoice};

/// Asks the user over a line-oriented reader/writer pair.
///
/// An empty answer, end of input, or `q` cancels the whole run. Anything
/// else that is not a listed number re-prompts.
pub struct TerminalDisambiguator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalDisambiguator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, header: &str, lines: &[String]) -> Result<usize> {
        writeln!(self.output, "--- {header} ---")?;
        for (i, line) in lines.iter().enumerate() {
            writeln!(self.output, "{}) {line}", i + 1)?;
        }

        loop {
            write!(self.output, "Choice [1-{}, q to quit]: ", lines.len())?;
            self.output.flush()?;

            let mut answer = String::new();
            if self.input.read_line(&mut answer)? == 0 {
                return Err(Error::Cancelled);
            }
            let answer = answer.trim();
            if answer.is_empty() || answer.eq_ignore_ascii_case("q") {
                return Err(Error::Cancelled);
            }
            match answer.parse::<usize>() {
                Ok(n) if (1..=lines.len()).contains(&n) => return Ok(n - 1),
                _ => writeln!(self.output, "Invalid choice '{answer}'")?,
            }
        }
    }
}

impl<R: BufRead, W: Write> Disambiguator for TerminalDisambiguator<R, W> {
    fn choose_track(&mut self, slot: &SlotRequest, candidates: &[TrackChoice]) -> Result<usize> {
        let lines: Vec<String> = candidates.iter().map(ToString::to_string).collect();
        self.ask(&slot.to_string(), &lines)
    }

    fn choose_option(&mut self, question: &str, options: &[String]) -> Result<usize> {
        self.ask(question, options)
    }
}
