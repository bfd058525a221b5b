//! Disallowed characters rule.

use super::{RuleInput, RuleResult};
use crate::classifier::{CharacterClass, DisallowedCharacters};

/// Distinct disallowed characters found in the password.
fn offending(input: &RuleInput<'_>) -> DisallowedCharacters {
    let classifier = input.classifier();
    DisallowedCharacters::new(
        input
            .password()
            .chars()
            .filter(|&c| classifier.matches(c, CharacterClass::Disallowed)),
    )
}

pub fn disallowed_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(input
        .classifier()
        .count(input.password(), CharacterClass::Disallowed)
        == 0)
}

/// Lists the offending characters, or the whole disallowed set when the
/// password is clean.
pub fn disallowed_message(input: &RuleInput<'_>) -> String {
    let found = offending(input);
    let listed = if found.is_empty() {
        &input.thresholds.disallowed
    } else {
        &found
    };
    format!("Password cannot contain the characters {}", listed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PolicyThresholds;
    use crate::rules::test_support::{with_input, with_thresholds};

    #[test]
    fn test_disallowed_newline() {
        assert_eq!(with_input("bob", "abc\ndef", disallowed_rule).ok(), Some(false));
        assert_eq!(with_input("bob", "abc def", disallowed_rule).ok(), Some(true));
    }

    #[test]
    fn test_disallowed_message_lists_distinct_offenders() {
        let t = PolicyThresholds::default()
            .with_disallowed(DisallowedCharacters::new(['\n', ' ', '#']));

        assert_eq!(with_thresholds(&t, "bob", "a b c\n", disallowed_rule).ok(), Some(false));
        let message = with_thresholds(&t, "bob", "a b c\n", disallowed_message);
        assert_eq!(message, "Password cannot contain the characters \\n, ");
    }

    #[test]
    fn test_disallowed_message_when_clean() {
        let message = with_input("bob", "clean", disallowed_message);
        assert_eq!(message, "Password cannot contain the characters \\n");
    }
}
