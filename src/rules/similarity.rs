//! Similarity rule - the password must be far enough from the username.

use super::{RuleInput, RuleResult};
use crate::classifier::required_count;
use crate::distance::distance;

/// Edit distance the password must exceed.
fn min_distance(input: &RuleInput<'_>) -> usize {
    required_count(
        input.password_len(),
        input.thresholds.min_username_distance_pct,
    )
}

pub fn similarity_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(distance(input.username, input.password()) > min_distance(input))
}

pub fn similarity_message(input: &RuleInput<'_>) -> String {
    format!(
        "Password cannot be similar to the username (edit distance must exceed {}, {}% of password length)",
        min_distance(input),
        input.thresholds.min_username_distance_pct
    )
}
