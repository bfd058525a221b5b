//! Policy rules
//!
//! Each rule checks one independent property of a username/password pair
//! and describes what it checks. Rules are plain data: a kind, a predicate
//! and a message function, both reading the same thresholds.

mod blocklist;
mod composition;
mod containment;
mod disallowed;
mod identity;
mod length;
mod similarity;

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::blocklist::{BlocklistError, BlocklistSource};
use crate::classifier::CharClassifier;
use crate::config::PolicyThresholds;

/// Result type for rule predicates.
/// - `Ok(true)` - Rule passed
/// - `Ok(false)` - Rule failed
/// - `Err(_)` - An external collaborator could not be consulted
pub type RuleResult = Result<bool, BlocklistError>;

/// Everything a rule may look at.
pub struct RuleInput<'a> {
    pub username: &'a str,
    password: &'a SecretString,
    pub thresholds: &'a PolicyThresholds,
    pub blocklist: &'a dyn BlocklistSource,
}

impl<'a> RuleInput<'a> {
    pub fn new(
        username: &'a str,
        password: &'a SecretString,
        thresholds: &'a PolicyThresholds,
        blocklist: &'a dyn BlocklistSource,
    ) -> Self {
        Self {
            username,
            password,
            thresholds,
            blocklist,
        }
    }

    pub fn password(&self) -> &str {
        self.password.expose_secret()
    }

    /// Password length in code points.
    pub fn password_len(&self) -> usize {
        self.password().chars().count()
    }

    pub fn classifier(&self) -> CharClassifier<'a> {
        CharClassifier::new(&self.thresholds.disallowed)
    }
}

/// Identifies a rule in the standard catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    Identity,
    Similarity,
    PasswordContainsUsername,
    UsernameContainsPassword,
    DisallowedCharacters,
    MinLength,
    MinDigits,
    MinSpecials,
    MinUppercase,
    MinLowercase,
    Blocklist,
}

impl RuleKind {
    /// Catalogue order.
    pub const ALL: [RuleKind; 11] = [
        RuleKind::Identity,
        RuleKind::Similarity,
        RuleKind::PasswordContainsUsername,
        RuleKind::UsernameContainsPassword,
        RuleKind::DisallowedCharacters,
        RuleKind::MinLength,
        RuleKind::MinDigits,
        RuleKind::MinSpecials,
        RuleKind::MinUppercase,
        RuleKind::MinLowercase,
        RuleKind::Blocklist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RuleKind::Identity => "identity",
            RuleKind::Similarity => "similarity",
            RuleKind::PasswordContainsUsername => "password_contains_username",
            RuleKind::UsernameContainsPassword => "username_contains_password",
            RuleKind::DisallowedCharacters => "disallowed_characters",
            RuleKind::MinLength => "min_length",
            RuleKind::MinDigits => "min_digits",
            RuleKind::MinSpecials => "min_specials",
            RuleKind::MinUppercase => "min_uppercase",
            RuleKind::MinLowercase => "min_lowercase",
            RuleKind::Blocklist => "blocklist",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

type TestFn = fn(&RuleInput<'_>) -> RuleResult;
type MessageFn = fn(&RuleInput<'_>) -> String;

/// A single named check.
#[derive(Clone, Copy)]
pub struct Rule {
    kind: RuleKind,
    test: TestFn,
    message: MessageFn,
}

impl Rule {
    pub fn of(kind: RuleKind) -> Self {
        let (test, message): (TestFn, MessageFn) = match kind {
            RuleKind::Identity => (identity::identity_rule, identity::identity_message),
            RuleKind::Similarity => (similarity::similarity_rule, similarity::similarity_message),
            RuleKind::PasswordContainsUsername => (
                containment::password_contains_username_rule,
                containment::password_contains_username_message,
            ),
            RuleKind::UsernameContainsPassword => (
                containment::username_contains_password_rule,
                containment::username_contains_password_message,
            ),
            RuleKind::DisallowedCharacters => {
                (disallowed::disallowed_rule, disallowed::disallowed_message)
            }
            RuleKind::MinLength => (length::length_rule, length::length_message),
            RuleKind::MinDigits => (composition::digits_rule, composition::digits_message),
            RuleKind::MinSpecials => (composition::specials_rule, composition::specials_message),
            RuleKind::MinUppercase => (composition::uppercase_rule, composition::uppercase_message),
            RuleKind::MinLowercase => (composition::lowercase_rule, composition::lowercase_message),
            RuleKind::Blocklist => (blocklist::blocklist_rule, blocklist::blocklist_message),
        };
        Self {
            kind,
            test,
            message,
        }
    }

    pub fn kind(&self) -> RuleKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn test(&self, input: &RuleInput<'_>) -> RuleResult {
        (self.test)(input)
    }

    pub fn message(&self, input: &RuleInput<'_>) -> String {
        (self.message)(input)
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Rule").field(&self.kind).finish()
    }
}

/// An ordered sequence of rules. Order only affects report ordering.
#[derive(Debug, Clone)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    /// All eleven rules in catalogue order.
    pub fn standard() -> Self {
        Self::from_kinds(RuleKind::ALL)
    }

    pub fn from_kinds<I: IntoIterator<Item = RuleKind>>(kinds: I) -> Self {
        Self {
            rules: kinds.into_iter().map(Rule::of).collect(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::blocklist::InMemoryBlocklist;

    pub fn secret(s: &str) -> SecretString {
        SecretString::new(s.to_string().into())
    }

    /// Runs `f` with an input built from default thresholds and an empty blocklist.
    pub fn with_input<R>(username: &str, password: &str, f: impl FnOnce(&RuleInput<'_>) -> R) -> R {
        with_thresholds(&PolicyThresholds::default(), username, password, f)
    }

    pub fn with_thresholds<R>(
        thresholds: &PolicyThresholds,
        username: &str,
        password: &str,
        f: impl FnOnce(&RuleInput<'_>) -> R,
    ) -> R {
        let pwd = secret(password);
        let blocklist = InMemoryBlocklist::default();
        let input = RuleInput::new(username, &pwd, thresholds, &blocklist);
        f(&input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_rule_set_order() {
        let set = RuleSet::standard();
        assert_eq!(set.len(), 11);
        let kinds: Vec<RuleKind> = set.rules().iter().map(Rule::kind).collect();
        assert_eq!(kinds, RuleKind::ALL.to_vec());
    }

    #[test]
    fn test_rule_names_are_unique() {
        let names: std::collections::HashSet<&str> =
            RuleKind::ALL.iter().map(RuleKind::name).collect();
        assert_eq!(names.len(), RuleKind::ALL.len());
    }

    #[test]
    fn test_from_kinds_subset() {
        let set = RuleSet::from_kinds([RuleKind::MinLength, RuleKind::Identity]);
        assert_eq!(set.rules()[0].name(), "min_length");
        assert_eq!(set.rules()[1].name(), "identity");
    }
}
