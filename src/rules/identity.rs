//! Identity rule - the password must differ from the username.

use super::{RuleInput, RuleResult};

pub fn identity_rule(input: &RuleInput<'_>) -> RuleResult {
    Ok(input.username != input.password())
}

pub fn identity_message(_input: &RuleInput<'_>) -> String {
    "Password cannot be the same as the username".to_string()
}
