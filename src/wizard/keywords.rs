use std::fmt;

/// Sentinel that ends the category sub-flow.
pub const DONE: &str = "done";

/// Reserved navigation words a user may type at any prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlWord {
    Back,
    Repeat,
    Cancel,
    Quit,
}

impl ControlWord {
    pub const ALL: [ControlWord; 4] = [
        ControlWord::Back,
        ControlWord::Repeat,
        ControlWord::Cancel,
        ControlWord::Quit,
    ];

    /// Matches trimmed input, ignoring case.
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = input.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|word| word.as_str() == normalized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ControlWord::Back => "back",
            ControlWord::Repeat => "repeat",
            ControlWord::Cancel => "cancel",
            ControlWord::Quit => "quit",
        }
    }

    /// `cancel` and `quit` abandon the whole wizard.
    pub fn halts(&self) -> bool {
        matches!(self, ControlWord::Cancel | ControlWord::Quit)
    }
}

impl fmt::Display for ControlWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn is_reserved(name: &str) -> bool {
    ControlWord::parse(name).is_some()
}

pub fn is_done(input: &str) -> bool {
    input.trim().eq_ignore_ascii_case(DONE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_control_words_loosely() {
        assert_eq!(ControlWord::parse(" BACK "), Some(ControlWord::Back));
        assert_eq!(ControlWord::parse("Quit"), Some(ControlWord::Quit));
        assert_eq!(ControlWord::parse("backwards"), None);
        assert!(ControlWord::Cancel.halts());
        assert!(!ControlWord::Repeat.halts());
    }

    #[test]
    fn done_is_not_a_control_word() {
        assert!(is_done("Done"));
        assert!(!is_reserved("done"));
        assert!(is_reserved("repeat"));
    }
}
