use std::collections::VecDeque;
use std::io;

use super::keywords::ControlWord;
use crate::cli::output;

/// Input collaborator used by every wizard step.
pub trait Prompter {
    /// Returns the literal text typed, control words included.
    fn ask(&mut self, message: &str) -> io::Result<String>;

    /// Shows a line of context (summaries, validation hints).
    fn show(&mut self, message: &str) {
        output::info(message);
    }
}

impl<P: Prompter + ?Sized> Prompter for &mut P {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        (**self).ask(message)
    }

    fn show(&mut self, message: &str) {
        (**self).show(message)
    }
}

impl<P: Prompter + ?Sized> Prompter for Box<P> {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        (**self).ask(message)
    }

    fn show(&mut self, message: &str) {
        (**self).show(message)
    }
}

/// Outcome of a yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YesNo {
    Yes,
    No,
    Control(ControlWord),
}

/// Asks until the answer is `y`/`n` (or `yes`/`no`) or a control word.
pub fn ask_yes_no<P: Prompter + ?Sized>(prompter: &mut P, question: &str) -> io::Result<YesNo> {
    let message = format!("{question} (y/n): ");
    loop {
        let answer = prompter.ask(&message)?;
        if let Some(word) = ControlWord::parse(&answer) {
            return Ok(YesNo::Control(word));
        }
        match answer.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(YesNo::Yes),
            "n" | "no" => return Ok(YesNo::No),
            _ => continue,
        }
    }
}

/// Replays a fixed list of answers; used to drive wizards without a terminal.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    asked: Vec<String>,
    shown: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            asked: Vec::new(),
            shown: Vec::new(),
        }
    }

    /// Every prompt issued so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    pub fn shown(&self) -> &[String] {
        &self.shown
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, message: &str) -> io::Result<String> {
        self.asked.push(message.to_string());
        self.answers.pop_front().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("no scripted answer for `{}`", message.trim()),
            )
        })
    }

    fn show(&mut self, message: &str) {
        self.shown.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_no_reprompts_until_understood() {
        let mut prompter = ScriptedPrompter::new(["maybe", "", "Y"]);
        assert_eq!(ask_yes_no(&mut prompter, "Sure?").unwrap(), YesNo::Yes);
        assert_eq!(prompter.asked().len(), 3);
        assert_eq!(prompter.asked()[0], "Sure? (y/n): ");
    }

    #[test]
    fn yes_no_passes_control_words_through() {
        let mut prompter = ScriptedPrompter::new(["back"]);
        assert_eq!(
            ask_yes_no(&mut prompter, "Sure?").unwrap(),
            YesNo::Control(ControlWord::Back)
        );
    }

    #[test]
    fn exhausted_script_is_eof() {
        let mut prompter = ScriptedPrompter::new(Vec::<String>::new());
        let err = prompter.ask("Anything: ").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }
}
