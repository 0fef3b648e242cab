//! Keyword strings for data-driven test fixtures.
//!
//! A keyword string is a small bracketed expression that stands in for a
//! random or relative value in test data. Three families are supported:
//!
//! - `[randstring{length=8}{uppercase}{include=[_-]}]` produces a random string
//! - `[randint{range=-5:6}{even}]` produces a random 64-bit integer
//! - `[datetime{+1w}{-2h}{zoneid=Europe/Paris}]` produces a zoned datetime
//!
//! # Architecture
//!
//! ```text
//! "[randint{range=1:10}{odd}]"
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ KeywordGenerator │   family_of() → KeywordFamily
//! │                  │
//! │  - rng (StdRng)  │
//! │  - datetime      │
//! └────────┬─────────┘
//!          │
//!          ▼
//!   Grammar::parse()  envelope, cardinality, exclusivity, residual
//!          │
//!          ▼
//!   generators::{string, integer, datetime}
//!          │
//!          ▼
//!   GeneratedValue { Text | Integer | DateTime }
//! ```
//!
//! # Example
//!
//! ```rust
//! use keyword_generator::{GeneratedValue, KeywordGenerator};
//!
//! let mut generator = KeywordGenerator::with_seed(42);
//! let value = generator.generate("[randint{range=1:10}{odd}]").unwrap();
//! match value {
//!     GeneratedValue::Integer(i) => assert!(i % 2 != 0 && (1..=10).contains(&i)),
//!     other => panic!("unexpected value: {other}"),
//! }
//! ```
//!
//! # Errors
//!
//! Malformed keyword strings fail with [`KeywordError::InvalidFormat`].
//! Well-formed strings whose values cannot be honored, such as an empty
//! range or an unknown zone, fail with [`KeywordError::InvalidArgument`].

pub mod error;
pub mod generator;
pub mod generators;
pub mod keyword;
pub mod value;

// Re-exports for convenience
pub use error::{KeywordError, Result};
pub use generator::{KeywordGenerator, ValueIterator};
pub use generators::datetime::{DateTimeBuilder, DateTimeGenerator, TemporalOffset, ZonePolicy};
pub use generators::integer::{Parity, RandomIntegerBuilder};
pub use generators::string::RandomStringBuilder;
pub use keyword::KeywordFamily;
pub use value::GeneratedValue;
