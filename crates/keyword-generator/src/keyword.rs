//! Shared keyword grammar.
//!
//! Every keyword family follows the same shape:
//!
//! ```text
//! [ <family> {modifier} {modifier=value} ... ]
//! ```
//!
//! A family is described by a [`Grammar`], a table of modifier rules. Parsing
//! locates every rule's matches, enforces cardinality and exclusivity, then
//! strips all recognized modifiers from the text. Whatever remains must be the
//! bare `[family]` envelope, otherwise the keyword string is rejected.

use crate::error::{KeywordError, Result};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

/// The three supported keyword families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordFamily {
    /// `[randstring ...]`
    RandomString,
    /// `[randint ...]`
    RandomInteger,
    /// `[datetime ...]`
    DateTime,
}

impl KeywordFamily {
    /// All families, in detection order.
    pub const ALL: [KeywordFamily; 3] = [
        KeywordFamily::RandomString,
        KeywordFamily::RandomInteger,
        KeywordFamily::DateTime,
    ];

    /// The keyword name that opens the envelope.
    pub fn name(self) -> &'static str {
        match self {
            KeywordFamily::RandomString => "randstring",
            KeywordFamily::RandomInteger => "randint",
            KeywordFamily::DateTime => "datetime",
        }
    }

    /// Find the family whose envelope matches the text, if any.
    pub fn detect(text: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|family| is_keyword(text, *family))
    }

    fn envelope(self) -> &'static Regex {
        static RANDSTRING: LazyLock<Regex> = LazyLock::new(|| envelope_pattern("randstring", ".*"));
        static RANDINT: LazyLock<Regex> = LazyLock::new(|| envelope_pattern("randint", ".*"));
        static DATETIME: LazyLock<Regex> = LazyLock::new(|| envelope_pattern("datetime", ".*"));
        match self {
            KeywordFamily::RandomString => &RANDSTRING,
            KeywordFamily::RandomInteger => &RANDINT,
            KeywordFamily::DateTime => &DATETIME,
        }
    }

    fn bare_envelope(self) -> &'static Regex {
        static RANDSTRING: LazyLock<Regex> =
            LazyLock::new(|| envelope_pattern("randstring", r"\s*"));
        static RANDINT: LazyLock<Regex> = LazyLock::new(|| envelope_pattern("randint", r"\s*"));
        static DATETIME: LazyLock<Regex> = LazyLock::new(|| envelope_pattern("datetime", r"\s*"));
        match self {
            KeywordFamily::RandomString => &RANDSTRING,
            KeywordFamily::RandomInteger => &RANDINT,
            KeywordFamily::DateTime => &DATETIME,
        }
    }
}

impl fmt::Display for KeywordFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn envelope_pattern(name: &str, body: &str) -> Regex {
    Regex::new(&format!(r"(?i)^\[\s*{name}{body}\]$")).expect("envelope pattern is valid")
}

/// Check whether the text is a keyword string of the given family.
///
/// Leading and trailing whitespace is ignored, but any other character
/// outside the brackets makes this return false: `  [ randint ]  ` is a
/// keyword, `foo[randint]bar` is not. The modifiers themselves are not
/// inspected.
pub fn is_keyword(text: &str, family: KeywordFamily) -> bool {
    family.envelope().is_match(text.trim())
}

/// How many times a modifier may appear in one keyword string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    /// Zero or more occurrences
    Repeatable,
    /// Zero or one occurrence
    AtMostOne,
}

/// One row of a grammar table.
#[derive(Debug)]
pub struct ModifierRule<K> {
    kind: K,
    label: &'static str,
    pattern: Regex,
    cardinality: Cardinality,
}

/// A modifier occurrence found in a keyword string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier<K> {
    /// Which rule matched
    pub kind: K,
    /// The full matched text, braces included
    pub fragment: String,
    /// The first capture group of the rule's pattern, if it has one
    pub payload: Option<String>,
}

impl<K> Modifier<K> {
    /// The payload, or an empty string for modifiers without one.
    pub fn payload(&self) -> &str {
        self.payload.as_deref().unwrap_or_default()
    }
}

/// Declarative grammar for one keyword family.
///
/// Rules are applied in table order and each one strips its matches before
/// the next runs, so a rule whose payload may contain other modifiers'
/// syntax must come first.
#[derive(Debug)]
pub struct Grammar<K> {
    family: KeywordFamily,
    rules: Vec<ModifierRule<K>>,
    exclusive: Vec<(K, K)>,
}

impl<K: Copy + Eq + fmt::Debug> Grammar<K> {
    /// Start an empty grammar for the family.
    pub fn new(family: KeywordFamily) -> Self {
        Self {
            family,
            rules: Vec::new(),
            exclusive: Vec::new(),
        }
    }

    /// Add a modifier rule.
    ///
    /// Grammars are built once from literal patterns, so an invalid pattern
    /// is a programming error and panics.
    pub fn rule(
        mut self,
        kind: K,
        label: &'static str,
        pattern: &str,
        cardinality: Cardinality,
    ) -> Self {
        let pattern = Regex::new(pattern)
            .unwrap_or_else(|e| panic!("invalid pattern for {{{label}}} modifier: {e}"));
        self.rules.push(ModifierRule {
            kind,
            label,
            pattern,
            cardinality,
        });
        self
    }

    /// Declare two modifiers that cannot appear together.
    pub fn exclusive(mut self, a: K, b: K) -> Self {
        self.exclusive.push((a, b));
        self
    }

    /// The family this grammar parses.
    pub fn family(&self) -> KeywordFamily {
        self.family
    }

    fn label(&self, kind: K) -> &'static str {
        self.rules
            .iter()
            .find(|rule| rule.kind == kind)
            .map(|rule| rule.label)
            .unwrap_or("?")
    }

    /// Parse and validate a keyword string.
    pub fn parse(&self, text: &str) -> Result<ParsedKeyword<K>> {
        let family = self.family;
        if !is_keyword(text, family) {
            return Err(KeywordError::format(format!(
                "'{text}' must contain the '[{family}]' keyword"
            )));
        }

        let trimmed = text.trim();
        let mut residual = trimmed.to_string();
        let mut modifiers = Vec::new();

        for rule in &self.rules {
            let found: Vec<Modifier<K>> = rule
                .pattern
                .captures_iter(&residual)
                .map(|caps| Modifier {
                    kind: rule.kind,
                    fragment: caps[0].to_string(),
                    payload: caps.get(1).map(|m| m.as_str().to_string()),
                })
                .collect();

            if found.is_empty() {
                continue;
            }
            if rule.cardinality == Cardinality::AtMostOne && found.len() > 1 {
                return Err(KeywordError::format(format!(
                    "only one {{{}}} modifier is allowed per [{family}]: '{trimmed}'",
                    rule.label
                )));
            }

            residual = rule.pattern.replace_all(&residual, " ").into_owned();
            modifiers.extend(found);
        }

        let parsed = ParsedKeyword { family, modifiers };

        for (a, b) in &self.exclusive {
            if parsed.has(*a) && parsed.has(*b) {
                return Err(KeywordError::format(format!(
                    "cannot use both {{{}}} and {{{}}} in '{trimmed}'",
                    self.label(*a),
                    self.label(*b)
                )));
            }
        }

        tracing::trace!(%family, residual = %residual, "stripped recognized modifiers");
        if !family.bare_envelope().is_match(residual.trim()) {
            return Err(KeywordError::format(format!(
                "unrecognized content in '{trimmed}'; with the valid modifiers removed it reads '{}'",
                residual.trim()
            )));
        }

        tracing::debug!(%family, modifiers = parsed.modifiers.len(), "parsed keyword string");
        Ok(parsed)
    }
}

/// The validated modifiers of one keyword string, in rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedKeyword<K> {
    family: KeywordFamily,
    modifiers: Vec<Modifier<K>>,
}

impl<K: Copy + Eq> ParsedKeyword<K> {
    /// The family of the parsed keyword.
    pub fn family(&self) -> KeywordFamily {
        self.family
    }

    /// Whether at least one modifier of this kind is present.
    pub fn has(&self, kind: K) -> bool {
        self.modifiers.iter().any(|m| m.kind == kind)
    }

    /// The first modifier of this kind.
    pub fn first(&self, kind: K) -> Option<&Modifier<K>> {
        self.modifiers.iter().find(|m| m.kind == kind)
    }

    /// All modifiers of this kind, in the order they were found.
    pub fn all(&self, kind: K) -> impl Iterator<Item = &Modifier<K>> {
        self.modifiers.iter().filter(move |m| m.kind == kind)
    }

    /// Every modifier found.
    pub fn modifiers(&self) -> &[Modifier<K>] {
        &self.modifiers
    }
}

/// Parse a signed integer payload, reporting the enclosing fragment on failure.
pub(crate) fn parse_number<T>(raw: &str, fragment: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        KeywordError::format(format!(
            "'{}' in '{fragment}' is not a valid number: {e}",
            raw.trim()
        ))
    })
}
