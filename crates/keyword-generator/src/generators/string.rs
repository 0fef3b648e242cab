//! Random string generator.
//!
//! Strings are drawn from an accumulated source character set, either built
//! up through [`RandomStringBuilder`] or described by a `[randstring]`
//! keyword string:
//!
//! - `{uppercase}`, `{lowercase}`, `{numeric}`, `{spaces}`, `{specialchars}` add a character class
//! - `{include=[chars]}` adds the characters between the brackets
//! - `{length=N}` or `{length=N-M}` sets an exact or ranged length (once)
//!
//! With no class selected the set is alphanumeric, and the default length is
//! [`DEFAULT_LENGTH`].

use crate::error::{KeywordError, Result};
use crate::keyword::{parse_number, Cardinality, Grammar, KeywordFamily, Modifier};
use rand::Rng;
use std::sync::LazyLock;

/// Length used when no length has been set.
pub const DEFAULT_LENGTH: usize = 10;

/// Characters added by `uppercase()` / `{uppercase}`.
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Characters added by `lowercase()` / `{lowercase}`.
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Characters added by `numeric()` / `{numeric}`.
pub const NUMBERS: &str = "0123456789";

/// Characters added by `special_chars()` / `{specialchars}`.
pub const SPECIAL_CHARACTERS: &str = "~!@#$%^&*()_+`-={}|[]\\:\";'<>?,./";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StringModifier {
    Include,
    Length,
    Uppercase,
    Lowercase,
    Numeric,
    Spaces,
    SpecialChars,
}

// `{include=[...]}` runs first: its payload may contain text that looks like
// another modifier.
static GRAMMAR: LazyLock<Grammar<StringModifier>> = LazyLock::new(|| {
    Grammar::new(KeywordFamily::RandomString)
        .rule(
            StringModifier::Include,
            "include",
            r"(?i)\{\s*include\s*=\s*\[(.*?)\]\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            StringModifier::Length,
            "length",
            r"(?i)\{\s*length\s*=([^}]*)\}",
            Cardinality::AtMostOne,
        )
        .rule(
            StringModifier::Uppercase,
            "uppercase",
            r"(?i)\{\s*uppercase\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            StringModifier::Lowercase,
            "lowercase",
            r"(?i)\{\s*lowercase\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            StringModifier::Numeric,
            "numeric",
            r"(?i)\{\s*numeric\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            StringModifier::Spaces,
            "spaces",
            r"(?i)\{\s*spaces\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            StringModifier::SpecialChars,
            "specialchars",
            r"(?i)\{\s*specialchars\s*\}",
            Cardinality::Repeatable,
        )
});

/// Check whether the text is a `[randstring]` keyword string.
pub fn is_random_string_keyword(text: &str) -> bool {
    crate::keyword::is_keyword(text, KeywordFamily::RandomString)
}

/// Generate a random string from a `[randstring]` keyword string.
pub fn generate(parameter_string: &str) -> Result<String> {
    generate_with(&mut rand::rng(), parameter_string)
}

/// Generate a random string from a keyword string using the given RNG.
pub fn generate_with<R: Rng>(rng: &mut R, parameter_string: &str) -> Result<String> {
    let parsed = GRAMMAR.parse(parameter_string)?;
    let mut builder = RandomStringBuilder::new();

    if parsed.has(StringModifier::Uppercase) {
        builder.uppercase();
    }
    if parsed.has(StringModifier::Lowercase) {
        builder.lowercase();
    }
    if parsed.has(StringModifier::Numeric) {
        builder.numeric();
    }
    if parsed.has(StringModifier::Spaces) {
        builder.spaces();
    }
    if parsed.has(StringModifier::SpecialChars) {
        builder.special_chars();
    }
    for include in parsed.all(StringModifier::Include) {
        if include.payload().is_empty() {
            return Err(KeywordError::format(format!(
                "{{include}} must contain at least one character: '{}'",
                include.fragment
            )));
        }
        builder.include(include.payload());
    }

    if let Some(length) = parsed.first(StringModifier::Length) {
        match parse_length(length)? {
            (exact, None) => builder.length(exact)?,
            (min, Some(max)) => builder.length_range_with(rng, min, max)?,
        };
    }

    tracing::debug!(
        length = builder.length,
        source_size = builder.source_chars.chars().count(),
        "resolved random string spec"
    );
    Ok(builder.build_with(rng))
}

/// Split a `{length=...}` payload into an exact length or a `min-max` pair.
fn parse_length(modifier: &Modifier<StringModifier>) -> Result<(usize, Option<usize>)> {
    let payload = modifier.payload();
    match payload.split_once('-') {
        None => Ok((parse_number(payload, &modifier.fragment)?, None)),
        Some((min, max)) => Ok((
            parse_number(min, &modifier.fragment)?,
            Some(parse_number(max, &modifier.fragment)?),
        )),
    }
}

/// Builder for random strings.
///
/// Character classes accumulate in call order. Adding the same characters
/// more than once is allowed and makes them proportionally more likely to be
/// drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomStringBuilder {
    source_chars: String,
    length: usize,
    length_set: bool,
}

impl Default for RandomStringBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomStringBuilder {
    /// Create a builder with no character classes and the default length.
    pub fn new() -> Self {
        Self {
            source_chars: String::new(),
            length: DEFAULT_LENGTH,
            length_set: false,
        }
    }

    /// Allow uppercase letters.
    pub fn uppercase(&mut self) -> &mut Self {
        self.source_chars.push_str(UPPERCASE);
        self
    }

    /// Allow lowercase letters.
    pub fn lowercase(&mut self) -> &mut Self {
        self.source_chars.push_str(LOWERCASE);
        self
    }

    /// Allow digits.
    pub fn numeric(&mut self) -> &mut Self {
        self.source_chars.push_str(NUMBERS);
        self
    }

    /// Allow spaces. The result may start or end with one.
    pub fn spaces(&mut self) -> &mut Self {
        self.source_chars.push(' ');
        self
    }

    /// Allow the characters in [`SPECIAL_CHARACTERS`].
    pub fn special_chars(&mut self) -> &mut Self {
        self.source_chars.push_str(SPECIAL_CHARACTERS);
        self
    }

    /// Allow the given characters. They may or may not appear in the result.
    pub fn include(&mut self, chars: &str) -> &mut Self {
        self.source_chars.push_str(chars);
        self
    }

    /// Set an exact length. Fails if a length was already set or `length` is 0.
    pub fn length(&mut self, length: usize) -> Result<&mut Self> {
        if length == 0 {
            return Err(KeywordError::argument("length must be > 0, got 0"));
        }
        self.ensure_length_unset()?;
        self.length = length;
        self.length_set = true;
        Ok(self)
    }

    /// Set a length range; the length is drawn now, uniformly in `[min, max]`.
    pub fn length_range(&mut self, min: usize, max: usize) -> Result<&mut Self> {
        self.length_range_with(&mut rand::rng(), min, max)
    }

    /// Like [`length_range`](Self::length_range) with the given RNG.
    pub fn length_range_with<R: Rng>(
        &mut self,
        rng: &mut R,
        min: usize,
        max: usize,
    ) -> Result<&mut Self> {
        self.ensure_length_unset()?;
        if min < 1 {
            return Err(KeywordError::argument(format!(
                "minimum length must be >= 1, got {min}"
            )));
        }
        if max < min {
            return Err(KeywordError::argument(format!(
                "maximum length must be >= minimum length, got {min}-{max}"
            )));
        }
        self.length = rng.random_range(min..=max);
        self.length_set = true;
        Ok(self)
    }

    fn ensure_length_unset(&self) -> Result<()> {
        if self.length_set {
            return Err(KeywordError::argument(format!(
                "length can only be set once (already set to {})",
                self.length
            )));
        }
        Ok(())
    }

    /// The length the next built string will have.
    pub fn resolved_length(&self) -> usize {
        self.length
    }

    /// Build a random string from the current settings.
    pub fn build(&self) -> String {
        self.build_with(&mut rand::rng())
    }

    /// Build a random string using the given RNG.
    pub fn build_with<R: Rng>(&self, rng: &mut R) -> String {
        let source: Vec<char> = if self.source_chars.is_empty() {
            LOWERCASE.chars().chain(UPPERCASE.chars()).chain(NUMBERS.chars()).collect()
        } else {
            self.source_chars.chars().collect()
        };

        (0..self.length)
            .map(|_| source[rng.random_range(0..source.len())])
            .collect()
    }

    /// Build a string, then reset the builder.
    pub fn build_and_clear(&mut self) -> String {
        let value = self.build();
        self.clear();
        value
    }

    /// Reset every setting to its default.
    pub fn clear(&mut self) {
        self.source_chars.clear();
        self.length = DEFAULT_LENGTH;
        self.length_set = false;
    }
}
