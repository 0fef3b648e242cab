//! Random integer generator.
//!
//! Keyword form: `[randint{range=min:max}{even}]`. Without `{range}` the
//! whole `i64` range is used; `{even}` and `{odd}` cannot be combined.

use crate::error::{KeywordError, Result};
use crate::keyword::{parse_number, Cardinality, Grammar, KeywordFamily, Modifier};
use rand::Rng;
use std::fmt;
use std::sync::LazyLock;

/// Parity constraint for generated integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    Even,
    Odd,
}

impl Parity {
    fn matches(self, value: i128) -> bool {
        match self {
            Parity::Even => value.rem_euclid(2) == 0,
            Parity::Odd => value.rem_euclid(2) == 1,
        }
    }

    /// Move each bound inward by at most one so it has this parity.
    fn narrow(self, min: i64, max: i64) -> (i128, i128) {
        let (mut lo, mut hi) = (i128::from(min), i128::from(max));
        if !self.matches(lo) {
            lo += 1;
        }
        if !self.matches(hi) {
            hi -= 1;
        }
        (lo, hi)
    }
}

impl fmt::Display for Parity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parity::Even => f.write_str("even"),
            Parity::Odd => f.write_str("odd"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IntegerModifier {
    Range,
    Even,
    Odd,
}

static GRAMMAR: LazyLock<Grammar<IntegerModifier>> = LazyLock::new(|| {
    Grammar::new(KeywordFamily::RandomInteger)
        .rule(
            IntegerModifier::Range,
            "range",
            r"(?i)\{\s*range\s*=([^}]*)\}",
            Cardinality::AtMostOne,
        )
        .rule(
            IntegerModifier::Even,
            "even",
            r"(?i)\{\s*even\s*\}",
            Cardinality::Repeatable,
        )
        .rule(
            IntegerModifier::Odd,
            "odd",
            r"(?i)\{\s*odd\s*\}",
            Cardinality::Repeatable,
        )
        .exclusive(IntegerModifier::Even, IntegerModifier::Odd)
});

/// Check whether the text is a `[randint]` keyword string.
pub fn is_random_integer_keyword(text: &str) -> bool {
    crate::keyword::is_keyword(text, KeywordFamily::RandomInteger)
}

/// Generate a random integer anywhere in the `i64` range.
pub fn generate_full<R: Rng>(rng: &mut R) -> i64 {
    rng.random::<i64>()
}

/// Generate a random integer in `[min, max]`. Requires `max > min`.
pub fn generate_in_range<R: Rng>(rng: &mut R, min: i64, max: i64) -> Result<i64> {
    if max <= min {
        return Err(KeywordError::argument(format!(
            "maximum must be greater than minimum, got range {min}:{max}"
        )));
    }
    Ok(rng.random_range(min..=max))
}

/// Generate a random even integer in `[min, max]`.
///
/// An odd `min` is raised by one and an odd `max` lowered by one. Fails if no
/// even value remains.
pub fn generate_even<R: Rng>(rng: &mut R, min: i64, max: i64) -> Result<i64> {
    generate_with_parity(rng, min, max, Parity::Even)
}

/// Generate a random odd integer in `[min, max]`.
///
/// An even `min` is raised by one and an even `max` lowered by one. Fails if
/// no odd value remains.
pub fn generate_odd<R: Rng>(rng: &mut R, min: i64, max: i64) -> Result<i64> {
    generate_with_parity(rng, min, max, Parity::Odd)
}

/// Generate a random even integer anywhere in the `i64` range.
pub fn generate_even_full<R: Rng>(rng: &mut R) -> i64 {
    sample_lattice(rng, Parity::Even.narrow(i64::MIN, i64::MAX))
}

/// Generate a random odd integer anywhere in the `i64` range.
pub fn generate_odd_full<R: Rng>(rng: &mut R) -> i64 {
    sample_lattice(rng, Parity::Odd.narrow(i64::MIN, i64::MAX))
}

/// Generate a random integer of the given parity in `[min, max]`.
pub fn generate_with_parity<R: Rng>(
    rng: &mut R,
    min: i64,
    max: i64,
    parity: Parity,
) -> Result<i64> {
    let bounds = parity.narrow(min, max);
    if bounds.0 > bounds.1 {
        return Err(KeywordError::argument(format!(
            "no {parity} value in range {min}:{max}"
        )));
    }
    Ok(sample_lattice(rng, bounds))
}

/// Pick uniformly among `lo, lo + 2, ..., hi`. Both bounds lie inside the
/// `i64` range and `lo <= hi`.
fn sample_lattice<R: Rng>(rng: &mut R, (lo, hi): (i128, i128)) -> i64 {
    let steps = ((hi - lo) / 2) as u64;
    let step = rng.random_range(0..=steps);
    (lo + 2 * i128::from(step)) as i64
}

/// Generate a random integer from a `[randint]` keyword string.
pub fn generate(parameter_string: &str) -> Result<i64> {
    generate_with(&mut rand::rng(), parameter_string)
}

/// Generate a random integer from a keyword string using the given RNG.
pub fn generate_with<R: Rng>(rng: &mut R, parameter_string: &str) -> Result<i64> {
    let parsed = GRAMMAR.parse(parameter_string)?;

    let (min, max) = match parsed.first(IntegerModifier::Range) {
        Some(range) => parse_range(range)?,
        None => (i64::MIN, i64::MAX),
    };

    let parity = if parsed.has(IntegerModifier::Even) {
        Some(Parity::Even)
    } else if parsed.has(IntegerModifier::Odd) {
        Some(Parity::Odd)
    } else {
        None
    };

    tracing::debug!(min, max, ?parity, "resolved random integer spec");
    match parity {
        Some(parity) => generate_with_parity(rng, min, max, parity),
        None => generate_in_range(rng, min, max),
    }
}

/// Parse a `{range=min:max}` payload.
fn parse_range(modifier: &Modifier<IntegerModifier>) -> Result<(i64, i64)> {
    let (min, max) = modifier.payload().split_once(':').ok_or_else(|| {
        KeywordError::format(format!(
            "range must be written as min:max in '{}'",
            modifier.fragment
        ))
    })?;
    Ok((
        parse_number(min, &modifier.fragment)?,
        parse_number(max, &modifier.fragment)?,
    ))
}

/// Builder for random integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RandomIntegerBuilder {
    min: i64,
    max: i64,
    parity: Option<Parity>,
}

impl Default for RandomIntegerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RandomIntegerBuilder {
    /// Create a builder covering the whole `i64` range.
    pub fn new() -> Self {
        Self {
            min: i64::MIN,
            max: i64::MAX,
            parity: None,
        }
    }

    /// Restrict values to `[min, max]`. Fails if `min > max`.
    pub fn range(&mut self, min: i64, max: i64) -> Result<&mut Self> {
        if min > max {
            return Err(KeywordError::argument(format!(
                "minimum must not exceed maximum, got range {min}:{max}"
            )));
        }
        self.min = min;
        self.max = max;
        Ok(self)
    }

    /// Only produce even values.
    pub fn even(&mut self) -> Result<&mut Self> {
        self.set_parity(Parity::Even)
    }

    /// Only produce odd values.
    pub fn odd(&mut self) -> Result<&mut Self> {
        self.set_parity(Parity::Odd)
    }

    fn set_parity(&mut self, parity: Parity) -> Result<&mut Self> {
        match self.parity {
            Some(existing) if existing != parity => Err(KeywordError::argument(format!(
                "cannot request {parity} values, already restricted to {existing}"
            ))),
            _ => {
                self.parity = Some(parity);
                Ok(self)
            }
        }
    }

    /// Build a random integer from the current settings.
    pub fn build(&self) -> Result<i64> {
        self.build_with(&mut rand::rng())
    }

    /// Build a random integer using the given RNG.
    pub fn build_with<R: Rng>(&self, rng: &mut R) -> Result<i64> {
        match self.parity {
            Some(parity) => generate_with_parity(rng, self.min, self.max, parity),
            None if self.min == self.max => Ok(self.min),
            None => generate_in_range(rng, self.min, self.max),
        }
    }
}
