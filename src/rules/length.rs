//! Length rule - checks password minimum length.

use super::{RuleInput, RuleResult};

/// Passes when the password has at least `min_length` code points.
pub fn length_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(input.password_len() >= input.thresholds.min_length)
}

pub fn length_message(input: &RuleInput<'_>) -> String {
    format!(
        "Password must be at least {} characters long",
        input.thresholds.min_length
    )
}
