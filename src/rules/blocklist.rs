//! Blocklist rule - checks if the password is a known leaked password.

use super::{RuleInput, RuleResult};

/// Fails when the password is in the blocklist. Lookup errors are passed
/// through so the engine can report them.
pub fn blocklist_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(!input.blocklist.lookup(input.password())?)
}

pub fn blocklist_message(_input: &RuleInput<'_>) -> String {
    "Password cannot be found within the leaked password blocklist".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blocklist::{FileBlocklist, InMemoryBlocklist};
    use crate::config::PolicyThresholds;
    use crate::rules::test_support::secret;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn setup_with_tempfile(passwords: &[&str]) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        for pwd in passwords {
            writeln!(temp_file, "{}", pwd).expect("Failed to write");
        }
        temp_file
    }

    #[test]
    fn test_blocklist_rule_common_password() {
        let temp_file = setup_with_tempfile(&["password123", "123456", "qwerty"]);
        let blocklist = FileBlocklist::new(temp_file.path());
        let thresholds = PolicyThresholds::default();
        let pwd = secret("password123");

        let input = RuleInput::new("bob", &pwd, &thresholds, &blocklist);
        assert_eq!(blocklist_rule(&input).ok(), Some(false));
    }

    #[test]
    fn test_blocklist_rule_strong_password() {
        let blocklist = InMemoryBlocklist::new(["123456", "qwerty"]);
        let thresholds = PolicyThresholds::default();
        let pwd = secret("password123");

        let input = RuleInput::new("bob", &pwd, &thresholds, &blocklist);
        assert_eq!(blocklist_rule(&input).ok(), Some(true));
    }

    #[test]
    fn test_blocklist_rule_unavailable_is_error() {
        let blocklist = FileBlocklist::new("/nonexistent/path/rockyou.txt");
        let thresholds = PolicyThresholds::default();
        let pwd = secret("password123");

        let input = RuleInput::new("bob", &pwd, &thresholds, &blocklist);
        assert!(blocklist_rule(&input).is_err());
    }
}
