use crate::errors::{LedgerError, Result};
use crate::wizard::keywords::is_reserved;

/// Ordered set of ledger-internal accounts whose balances are tracked.
///
/// Anything outside this set is an external party.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountDirectory {
    names: Vec<String>,
}

impl AccountDirectory {
    /// Builds a directory, keeping the first occurrence of each name.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut directory = Self::default();
        for name in names {
            let name = name.into();
            if !directory.contains(&name) {
                directory.names.push(name);
            }
        }
        directory
    }

    /// Exact, case-sensitive membership test.
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|known| known == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::InvalidRecord("account name is empty".into()));
        }
        if is_reserved(name) {
            return Err(LedgerError::ReservedName(name.to_string()));
        }
        if self.contains(name) {
            return Err(LedgerError::DuplicateAccount(name.to_string()));
        }
        self.names.push(name.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_keep_first_position() {
        let accounts = AccountDirectory::new(["Checking", "Savings", "Checking"]);
        assert_eq!(accounts.names(), ["Checking", "Savings"]);
        assert!(accounts.contains("Savings"));
        assert!(!accounts.contains("savings"));
    }

    #[test]
    fn add_rejects_reserved_and_duplicate_names() {
        let mut accounts = AccountDirectory::new(["Checking"]);
        assert!(matches!(
            accounts.add("Cancel"),
            Err(LedgerError::ReservedName(_))
        ));
        assert!(matches!(
            accounts.add("Checking"),
            Err(LedgerError::DuplicateAccount(_))
        ));
        accounts.add(" Brokerage ").unwrap();
        assert_eq!(accounts.len(), 2);
        assert!(accounts.contains("Brokerage"));
    }
}
