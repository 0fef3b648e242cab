//! Keyword dispatcher for producing values from any keyword family.

use crate::error::{KeywordError, Result};
use crate::generators::{datetime::DateTimeGenerator, integer, string};
use crate::keyword::KeywordFamily;
use crate::value::GeneratedValue;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Generator that recognizes the family of a keyword string and produces
/// the matching value.
///
/// The generator owns its RNG, so a fixed seed reproduces the same strings
/// and integers across runs. Datetimes depend on the current instant unless
/// generated with [`generate_at`](Self::generate_at).
#[derive(Debug)]
pub struct KeywordGenerator {
    /// Random number generator shared by the string and integer families
    rng: StdRng,
    /// Zone handling for `[datetime]` keywords
    datetime: DateTimeGenerator,
    /// Number of values produced so far
    generated: u64,
}

impl Default for KeywordGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeywordGenerator {
    /// Create a generator seeded from the operating system.
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_os_rng())
    }

    /// Create a generator with a fixed seed.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            datetime: DateTimeGenerator::new(),
            generated: 0,
        }
    }

    /// Replace the datetime generator (zone policy and system zone).
    pub fn with_datetime(mut self, datetime: DateTimeGenerator) -> Self {
        self.datetime = datetime;
        self
    }

    /// The datetime generator in use.
    pub fn datetime(&self) -> &DateTimeGenerator {
        &self.datetime
    }

    /// Number of values produced so far.
    pub fn generated_count(&self) -> u64 {
        self.generated
    }

    /// Find the family of a keyword string without validating its modifiers.
    pub fn family_of(text: &str) -> Option<KeywordFamily> {
        KeywordFamily::detect(text)
    }

    /// Generate a value for any keyword string.
    pub fn generate(&mut self, text: &str) -> Result<GeneratedValue> {
        self.generate_at(text, Utc::now())
    }

    /// Generate a value, using `now` as the current instant for datetimes.
    pub fn generate_at(&mut self, text: &str, now: DateTime<Utc>) -> Result<GeneratedValue> {
        let family = Self::family_of(text).ok_or_else(|| not_a_keyword(text))?;

        let value = match family {
            KeywordFamily::RandomString => {
                GeneratedValue::Text(string::generate_with(&mut self.rng, text)?)
            }
            KeywordFamily::RandomInteger => {
                GeneratedValue::Integer(integer::generate_with(&mut self.rng, text)?)
            }
            KeywordFamily::DateTime => {
                GeneratedValue::DateTime(self.datetime.generate_at(text, now)?)
            }
        };

        self.generated += 1;
        Ok(value)
    }

    /// Generate `count` values for one keyword string.
    ///
    /// Returns an iterator that lazily generates values. Text that is not a
    /// keyword of any family is rejected up front.
    pub fn values<'a>(&'a mut self, text: &'a str, count: u64) -> Result<ValueIterator<'a>> {
        if Self::family_of(text).is_none() {
            return Err(not_a_keyword(text));
        }

        Ok(ValueIterator {
            generator: self,
            text,
            remaining: count,
        })
    }
}

fn not_a_keyword(text: &str) -> KeywordError {
    KeywordError::format(format!(
        "'{}' is not a [randstring], [randint] or [datetime] keyword",
        text.trim()
    ))
}

/// Iterator that lazily generates values for one keyword string.
pub struct ValueIterator<'a> {
    generator: &'a mut KeywordGenerator,
    text: &'a str,
    remaining: u64,
}

impl Iterator for ValueIterator<'_> {
    type Item = Result<GeneratedValue>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        self.remaining -= 1;
        Some(self.generator.generate(self.text))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.remaining as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for ValueIterator<'_> {}
