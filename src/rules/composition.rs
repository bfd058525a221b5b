//! Composition rules - minimum share of digits, specials, upper and lower case.
//!
//! Each rule reads its own percentage for both the predicate and the message.

use super::{RuleInput, RuleResult};
use crate::classifier::{required_count, CharacterClass};

struct Composition {
    class: CharacterClass,
    noun: &'static str,
    pct: fn(&RuleInput<'_>) -> u8,
}

fn number_pct(input: &RuleInput<'_>) -> u8 {
    input.thresholds.min_number_pct
}

fn special_pct(input: &RuleInput<'_>) -> u8 {
    input.thresholds.min_special_pct
}

fn upper_pct(input: &RuleInput<'_>) -> u8 {
    input.thresholds.min_upper_pct
}

fn lower_pct(input: &RuleInput<'_>) -> u8 {
    input.thresholds.min_lower_pct
}

const DIGITS: Composition = Composition {
    class: CharacterClass::Digit,
    noun: "numbers",
    pct: number_pct,
};

const SPECIALS: Composition = Composition {
    class: CharacterClass::Special,
    noun: "special characters",
    pct: special_pct,
};

const UPPERCASE: Composition = Composition {
    class: CharacterClass::Upper,
    noun: "uppercase letters",
    pct: upper_pct,
};

const LOWERCASE: Composition = Composition {
    class: CharacterClass::Lower,
    noun: "lowercase letters",
    pct: lower_pct,
};

impl Composition {
    fn required(&self, input: &RuleInput<'_>) -> usize {
        required_count(input.password_len(), (self.pct)(input))
    }

    fn test(&self, input: &RuleInput<'_>) -> RuleResult {
        let found = input.classifier().count(input.password(), self.class);
        Ok(found >= self.required(input))
    }

    fn message(&self, input: &RuleInput<'_>) -> String {
        format!(
            "Password must have at least {} {} ({}% of password length)",
            self.required(input),
            self.noun,
            (self.pct)(input)
        )
    }
}

pub fn digits_rule(input: &RuleInput<'_>) -> RuleResult {
    DIGITS.test(input)
}

pub fn digits_message(input: &RuleInput<'_>) -> String {
    DIGITS.message(input)
}

pub fn specials_rule(input: &RuleInput<'_>) -> RuleResult {
    SPECIALS.test(input)
}

pub fn specials_message(input: &RuleInput<'_>) -> String {
    SPECIALS.message(input)
}

pub fn uppercase_rule(input: &RuleInput<'_>) -> RuleResult {
    UPPERCASE.test(input)
}

pub fn uppercase_message(input: &RuleInput<'_>) -> String {
    UPPERCASE.message(input)
}

pub fn lowercase_rule(input: &RuleInput<'_>) -> RuleResult {
    LOWERCASE.test(input)
}

pub fn lowercase_message(input: &RuleInput<'_>) -> String {
    LOWERCASE.message(input)
}
