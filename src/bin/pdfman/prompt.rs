use std::io::{BufRead, Write};

use pdfman::library::{Assignment, Reader, ReaderId};
use pdfman::resolve::{PromptOutcome, ReaderPrompt};

/// Asks on the terminal which reader should open a file.
///
/// Blank input without a preselection, or `q`, cancels; the session then
/// opens the default reader without storing anything. "Remember" defaults to yes.
pub(crate) struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn read_line(&mut self) -> Option<String> {
        let _ = self.output.flush();
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }

    fn ask_remember(&mut self) -> bool {
        let _ = write!(self.output, "Remember this choice? [Y/n] ");
        match self.read_line() {
            Some(answer) => !matches!(answer.to_ascii_lowercase().as_str(), "n" | "no"),
            None => true,
        }
    }
}

impl<R: BufRead, W: Write> ReaderPrompt for TerminalPrompt<R, W> {
    fn choose_reader(
        &mut self,
        assignment: &Assignment,
        readers: &[Reader],
        preselected: Option<&ReaderId>,
    ) -> PromptOutcome {
        let _ = writeln!(self.output, "Open {} with:", assignment.file_name());
        let preselected_index = preselected
            .and_then(|id| readers.iter().position(|reader| &reader.id == id));
        for (index, reader) in readers.iter().enumerate() {
            let marker = if Some(index) == preselected_index { "*" } else { " " };
            let _ = writeln!(self.output, " {marker}{}. {}", index + 1, reader.name);
        }
        loop {
            let _ = write!(self.output, "Reader number (Enter for *, q for the default reader): ");
            let Some(answer) = self.read_line() else {
                return PromptOutcome::Cancelled;
            };
            if answer.eq_ignore_ascii_case("q") {
                return PromptOutcome::Cancelled;
            }
            let index = if answer.is_empty() {
                match preselected_index {
                    Some(index) => index,
                    None => return PromptOutcome::Cancelled,
                }
            } else {
                match answer.parse::<usize>() {
                    Ok(number) if (1..=readers.len()).contains(&number) => number - 1,
                    _ => {
                        let _ = writeln!(self.output, "Enter a number between 1 and {}", readers.len());
                        continue;
                    }
                }
            };
            let remember = self.ask_remember();
            return PromptOutcome::Selected {
                reader_id: readers[index].id.clone(),
                remember,
            };
        }
    }
}
