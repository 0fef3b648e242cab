//! Value generators, one per keyword family.
//!
//! Each module exposes an `is_*_keyword` check, a `generate` function taking
//! the raw keyword string, and a builder for callers that want to configure
//! generation in code instead of through modifiers.

pub mod datetime;
pub mod integer;
pub mod string;
