use std::io::{self, BufRead, Write};

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::{error::ReadlineError, DefaultEditor};

use crate::wizard::{ControlWord, Prompter};

/// Line-edited prompter for interactive sessions. Ctrl-C answers `cancel`.
pub struct ConsolePrompter {
    editor: DefaultEditor,
}

impl ConsolePrompter {
    pub fn new() -> rustyline::Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl Prompter for ConsolePrompter {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        match self.editor.readline(message) {
            Ok(line) => Ok(line),
            Err(ReadlineError::Interrupted) => Ok(ControlWord::Cancel.as_str().to_string()),
            Err(ReadlineError::Eof) => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed",
            )),
            Err(ReadlineError::Io(err)) => Err(err),
            Err(err) => Err(io::Error::new(io::ErrorKind::Other, err.to_string())),
        }
    }
}

/// Reads answers line by line and echoes each prompt with its answer, so a
/// scripted session leaves a readable transcript.
pub struct LinePrompter<R> {
    reader: R,
}

impl<R: BufRead> LinePrompter<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> Prompter for LinePrompter<R> {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        let mut line = String::new();
        if self.reader.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no input left for `{}`", message.trim()),
            ));
        }
        let answer = line.trim_end_matches(['\r', '\n']).to_string();
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{message}{answer}")?;
        stdout.flush()?;
        Ok(answer)
    }
}

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(prompt: &str) -> Result<bool, dialoguer::Error> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(false)
        .interact()
}
