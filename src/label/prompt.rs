use std::io::{self, BufRead, Write};
use tracing::warn;

use super::{LabelOperator, ServingType};

/// Asks on `output`, reads answers from `input`. A blank answer or end of
/// input stops the session.
pub struct PromptOperator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptOperator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, row: usize, text: &str) -> io::Result<Option<String>> {
        let choices: Vec<&str> = ServingType::ACCEPTED.iter().map(|t| t.as_str()).collect();
        writeln!(self.output, "\n--- row {} ---\n{}", row, text)?;
        write!(
            self.output,
            "serving type [{}] (blank to stop): ",
            choices.join("/")
        )?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 || line.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(line))
    }
}

impl<R: BufRead, W: Write> LabelOperator for PromptOperator<R, W> {
    fn propose(&mut self, row: usize, text: &str) -> Option<String> {
        match self.ask(row, text) {
            Ok(answer) => answer,
            Err(e) => {
                warn!("prompt failed: {}", e);
                None
            }
        }
    }

    fn rejected(&mut self, _row: usize, reason: &str) {
        if let Err(e) = writeln!(self.output, "{}", reason) {
            warn!("could not show rejection: {}", e);
        }
    }
}
