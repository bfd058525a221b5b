//! Character classes and percentage thresholds.

use std::borrow::Cow;
use std::fmt;

/// A named partition of characters used by the composition rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CharacterClass {
    /// ASCII `0`-`9`.
    Digit,
    /// Anything that is not an ASCII letter or digit.
    Special,
    /// ASCII `A`-`Z`.
    Upper,
    /// ASCII `a`-`z`.
    Lower,
    /// Characters that must never appear in a password.
    Disallowed,
}

/// The set of characters a password may never contain.
///
/// Kept sorted and deduplicated so messages listing it are stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisallowedCharacters(Cow<'static, [char]>);

impl DisallowedCharacters {
    /// Newline only.
    pub const DEFAULT: DisallowedCharacters = DisallowedCharacters(Cow::Borrowed(&['\n']));

    pub fn new<I: IntoIterator<Item = char>>(chars: I) -> Self {
        let mut chars: Vec<char> = chars.into_iter().collect();
        chars.sort_unstable();
        chars.dedup();
        Self(Cow::Owned(chars))
    }

    /// Builds the set from a string where `\n`, `\r`, `\t` and `\\` are
    /// decoded; every other character stands for itself.
    pub fn parse_escaped(raw: &str) -> Self {
        let mut chars = Vec::new();
        let mut iter = raw.chars();
        while let Some(c) = iter.next() {
            if c != '\\' {
                chars.push(c);
                continue;
            }
            match iter.next() {
                Some('n') => chars.push('\n'),
                Some('r') => chars.push('\r'),
                Some('t') => chars.push('\t'),
                Some(other) => chars.push(other),
                None => chars.push('\\'),
            }
        }
        Self::new(chars)
    }

    pub fn contains(&self, c: char) -> bool {
        self.0.binary_search(&c).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.0.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for DisallowedCharacters {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for DisallowedCharacters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_char_list(f, self.iter())
    }
}

/// Writes characters comma-separated, escaping control characters.
pub(crate) fn write_char_list<I>(f: &mut fmt::Formatter<'_>, chars: I) -> fmt::Result
where
    I: IntoIterator<Item = char>,
{
    for (i, c) in chars.into_iter().enumerate() {
        if i > 0 {
            f.write_str(",")?;
        }
        write!(f, "{}", c.escape_debug())?;
    }
    Ok(())
}

/// Counts characters of a [`CharacterClass`] in a string.
#[derive(Debug, Clone, Copy)]
pub struct CharClassifier<'a> {
    disallowed: &'a DisallowedCharacters,
}

impl<'a> CharClassifier<'a> {
    pub fn new(disallowed: &'a DisallowedCharacters) -> Self {
        Self { disallowed }
    }

    /// Returns whether `c` belongs to `class`.
    pub fn matches(&self, c: char, class: CharacterClass) -> bool {
        match class {
            CharacterClass::Digit => c.is_ascii_digit(),
            CharacterClass::Special => !c.is_ascii_alphanumeric(),
            CharacterClass::Upper => c.is_ascii_uppercase(),
            CharacterClass::Lower => c.is_ascii_lowercase(),
            CharacterClass::Disallowed => self.disallowed.contains(c),
        }
    }

    /// Number of code points in `text` belonging to `class`.
    pub fn count(&self, text: &str, class: CharacterClass) -> usize {
        text.chars().filter(|&c| self.matches(c, class)).count()
    }
}

static DEFAULT_DISALLOWED: DisallowedCharacters = DisallowedCharacters::DEFAULT;

impl Default for CharClassifier<'static> {
    fn default() -> Self {
        Self {
            disallowed: &DEFAULT_DISALLOWED,
        }
    }
}

/// `ceil(length * pct / 100)`, the number of characters a percentage
/// threshold demands of a password with `length` code points.
pub fn required_count(length: usize, pct: u8) -> usize {
    (length * usize::from(pct)).div_ceil(100)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [CharacterClass; 5] = [
        CharacterClass::Digit,
        CharacterClass::Special,
        CharacterClass::Upper,
        CharacterClass::Lower,
        CharacterClass::Disallowed,
    ];

    #[test]
    fn test_count_empty_string() {
        let classifier = CharClassifier::default();
        for class in ALL {
            assert_eq!(classifier.count("", class), 0);
        }
    }

    #[test]
    fn test_count_one_of_each() {
        let classifier = CharClassifier::default();
        assert_eq!(classifier.count("Ab3!", CharacterClass::Upper), 1);
        assert_eq!(classifier.count("Ab3!", CharacterClass::Lower), 1);
        assert_eq!(classifier.count("Ab3!", CharacterClass::Digit), 1);
        assert_eq!(classifier.count("Ab3!", CharacterClass::Special), 1);
        assert_eq!(classifier.count("Ab3!", CharacterClass::Disallowed), 0);
    }

    #[test]
    fn test_count_non_ascii_is_special_per_code_point() {
        let classifier = CharClassifier::default();
        assert_eq!(classifier.count("ÄÖü", CharacterClass::Special), 3);
        assert_eq!(classifier.count("ÄÖü", CharacterClass::Upper), 0);
        assert_eq!(classifier.count("ÄÖü", CharacterClass::Lower), 0);
    }

    #[test]
    fn test_count_disallowed_default_is_newline() {
        let classifier = CharClassifier::default();
        assert_eq!(classifier.count("a\nb\n", CharacterClass::Disallowed), 2);
        assert_eq!(classifier.count("a\tb", CharacterClass::Disallowed), 0);
    }

    #[test]
    fn test_count_disallowed_custom_set() {
        let set = DisallowedCharacters::new([' ', '\t']);
        let classifier = CharClassifier::new(&set);
        assert_eq!(classifier.count("a b\tc\n", CharacterClass::Disallowed), 2);
    }

    #[test]
    fn test_parse_escaped() {
        let set = DisallowedCharacters::parse_escaped(r"\n\t #\\");
        assert!(set.contains('\n'));
        assert!(set.contains('\t'));
        assert!(set.contains(' '));
        assert!(set.contains('#'));
        assert!(set.contains('\\'));
        assert!(!set.contains('n'));
    }

    #[test]
    fn test_disallowed_display_escapes() {
        let set = DisallowedCharacters::new(['\n', '#', '#']);
        assert_eq!(set.to_string(), "\\n,#");
    }

    #[test]
    fn test_required_count_rounds_up() {
        assert_eq!(required_count(0, 5), 0);
        assert_eq!(required_count(1, 5), 1);
        assert_eq!(required_count(16, 5), 1);
        assert_eq!(required_count(20, 5), 1);
        assert_eq!(required_count(21, 5), 2);
        assert_eq!(required_count(16, 75), 12);
        assert_eq!(required_count(10, 100), 10);
        assert_eq!(required_count(10, 0), 0);
    }
}
