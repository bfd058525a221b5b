//! Containment rules - neither credential may contain the other.
//!
//! Comparison is a case-insensitive literal substring search.

use super::{RuleInput, RuleResult};

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

pub fn password_contains_username_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(!contains_ignore_case(input.password(), input.username))
}

pub fn password_contains_username_message(_input: &RuleInput<'_>) -> String {
    "Password cannot contain the username".to_string()
}

pub fn username_contains_password_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(!contains_ignore_case(input.username, input.password()))
}

pub fn username_contains_password_message(_input: &RuleInput<'_>) -> String {
    "Username cannot contain the password".to_string()
}
