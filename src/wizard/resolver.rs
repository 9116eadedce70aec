use std::io;

use strsim::levenshtein;
use tracing::debug;

use super::keywords::is_reserved;
use super::prompt::{ask_yes_no, Prompter, YesNo};
use crate::errors::{LedgerError, Result};

/// Fuzzy matcher that maps free text onto a known name, asking the user to
/// confirm each plausible guess.
#[derive(Debug, Clone, Default)]
pub struct AccountResolver {
    names: Vec<String>,
}

impl AccountResolver {
    /// Fails when a known name collides with a control word, since such a
    /// name could never be typed at a prompt.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if let Some(reserved) = names.iter().find(|name| is_reserved(name)) {
            return Err(LedgerError::ReservedName(reserved.clone()));
        }
        Ok(Self { names })
    }

    /// Returns the confirmed known name, a control word typed in place of
    /// `y`/`n`, or the candidate unchanged when nothing was accepted.
    pub fn resolve<P: Prompter + ?Sized>(
        &self,
        candidate: &str,
        prompter: &mut P,
    ) -> io::Result<String> {
        let candidate = candidate.trim();
        if candidate.is_empty() || self.names.iter().any(|name| name == candidate) {
            return Ok(candidate.to_string());
        }

        for name in self.names.iter().filter(|name| is_similar(candidate, name)) {
            match ask_yes_no(prompter, &format!("Did you mean: {name}?"))? {
                YesNo::Yes => {
                    debug!(candidate, resolved = %name, "resolved fuzzy name");
                    return Ok(name.clone());
                }
                YesNo::No => continue,
                YesNo::Control(word) => return Ok(word.as_str().to_string()),
            }
        }
        Ok(candidate.to_string())
    }
}

/// Edit distance within `max(|len(a) - len(b)| - 1, min(len(a), len(b)) / 2)`,
/// or one string containing the other.
pub fn is_similar(candidate: &str, name: &str) -> bool {
    if candidate.contains(name) || name.contains(candidate) {
        return true;
    }
    let candidate_len = candidate.chars().count() as f64;
    let name_len = name.chars().count() as f64;
    let threshold =
        ((candidate_len - name_len).abs() - 1.0).max(candidate_len.min(name_len) / 2.0);
    levenshtein(candidate, name) as f64 <= threshold
}
