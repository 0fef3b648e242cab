//! Relative datetime generator.
//!
//! A `[datetime]` keyword string describes a point in time relative to a
//! start instant (now, unless `{start=...}` is given):
//!
//! - `{+2y}`, `{-5M}`, `{+1w}`, `{-3d}`, `{+4h}`, `{-10m}` add or subtract years,
//!   months, weeks, days, hours or minutes. Unit letters are case sensitive
//!   (`M` is months, `m` is minutes). Offsets repeat and accumulate.
//! - `{start=2016-04-12T13:06:04-04:00[America/New_York]}` sets the start instant.
//! - `{zoneid=Europe/Paris}` sets the zone of the result.
//!
//! The result is computed in a fixed order: resolve the start, move it into
//! the target zone, apply the calendar offset (years, months, weeks, days) on
//! the local wall clock, then add the clock offset (hours, minutes) as
//! elapsed time. A day is therefore a calendar day: `{+1d}` keeps the
//! wall-clock time across a daylight saving change, while `{+24h}` does not.

use crate::error::{KeywordError, Result};
use crate::keyword::{parse_number, Cardinality, Grammar, KeywordFamily};
use chrono::{
    DateTime, Days, FixedOffset, LocalResult, Months, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Utc,
};
use chrono_tz::Tz;
use std::fmt;
use std::sync::LazyLock;

/// Which zone a result is expressed in when no `{zoneid}` is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ZonePolicy {
    /// Keep the zone of the `{start}` timestamp, or the system zone without one
    #[default]
    StartInstant,
    /// Always use the system zone
    SystemDefault,
}

/// Calendar and clock units accepted in offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalUnit {
    Years,
    Months,
    Weeks,
    Days,
    Hours,
    Minutes,
}

impl TemporalUnit {
    /// Map a unit letter (`y`, `M`, `w`, `d`, `h`, `m`) to its unit.
    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'y' => Some(TemporalUnit::Years),
            'M' => Some(TemporalUnit::Months),
            'w' => Some(TemporalUnit::Weeks),
            'd' => Some(TemporalUnit::Days),
            'h' => Some(TemporalUnit::Hours),
            'm' => Some(TemporalUnit::Minutes),
            _ => None,
        }
    }
}

/// Accumulated calendar and clock offsets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TemporalOffset {
    pub years: i64,
    pub months: i64,
    pub weeks: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
}

impl TemporalOffset {
    /// Add `amount` of `unit`. Out-of-range totals are reported by [`apply`](Self::apply).
    pub fn add(&mut self, unit: TemporalUnit, amount: i64) {
        let field = match unit {
            TemporalUnit::Years => &mut self.years,
            TemporalUnit::Months => &mut self.months,
            TemporalUnit::Weeks => &mut self.weeks,
            TemporalUnit::Days => &mut self.days,
            TemporalUnit::Hours => &mut self.hours,
            TemporalUnit::Minutes => &mut self.minutes,
        };
        *field = field.saturating_add(amount);
    }

    /// Years and months folded into months.
    pub fn total_months(&self) -> Option<i64> {
        self.years.checked_mul(12)?.checked_add(self.months)
    }

    /// Weeks and days folded into days.
    pub fn total_days(&self) -> Option<i64> {
        self.weeks.checked_mul(7)?.checked_add(self.days)
    }

    /// Hours and minutes as elapsed time.
    pub fn clock_delta(&self) -> Option<TimeDelta> {
        TimeDelta::try_hours(self.hours)?.checked_add(&TimeDelta::try_minutes(self.minutes)?)
    }

    /// Apply the calendar offset, then the clock offset, to `start`.
    pub fn apply(&self, start: DateTime<Tz>) -> Result<DateTime<Tz>> {
        let out_of_range = || {
            KeywordError::argument(format!("offset {self} moves {start} out of the supported range"))
        };

        let months = self.total_months().ok_or_else(out_of_range)?;
        let days = self.total_days().ok_or_else(out_of_range)?;
        let calendar = if months == 0 && days == 0 {
            start
        } else {
            let local = shift_months(start.naive_local(), months)
                .and_then(|local| shift_days(local, days))
                .ok_or_else(out_of_range)?;
            resolve_local(&start.timezone(), local, start.offset().fix()).ok_or_else(out_of_range)?
        };

        let delta = self.clock_delta().ok_or_else(out_of_range)?;
        calendar.checked_add_signed(delta).ok_or_else(out_of_range)
    }
}

impl fmt::Display for TemporalOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{:+}y}}{{{:+}M}}{{{:+}w}}{{{:+}d}}{{{:+}h}}{{{:+}m}}",
            self.years, self.months, self.weeks, self.days, self.hours, self.minutes
        )
    }
}

fn shift_months(local: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let amount = Months::new(u32::try_from(months.unsigned_abs()).ok()?);
    if months >= 0 {
        local.checked_add_months(amount)
    } else {
        local.checked_sub_months(amount)
    }
}

fn shift_days(local: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    let amount = Days::new(days.unsigned_abs());
    if days >= 0 {
        local.checked_add_days(amount)
    } else {
        local.checked_sub_days(amount)
    }
}

/// Place a wall-clock time in a zone.
///
/// An ambiguous time keeps the offset it had before the calendar step when
/// possible, otherwise takes the earlier one. A time skipped by a transition
/// is read with the offset in effect before the gap, which moves it forward
/// by the length of the gap.
fn resolve_local(tz: &Tz, local: NaiveDateTime, previous: FixedOffset) -> Option<DateTime<Tz>> {
    match tz.from_local_datetime(&local) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(earlier, later) => {
            if later.offset().fix() == previous {
                Some(later)
            } else {
                Some(earlier)
            }
        }
        LocalResult::None => {
            let probe = local.checked_sub_signed(TimeDelta::days(1))?;
            let before = tz.offset_from_utc_datetime(&probe).fix();
            let utc = local.checked_sub_signed(TimeDelta::seconds(i64::from(
                before.local_minus_utc(),
            )))?;
            Some(tz.from_utc_datetime(&utc))
        }
    }
}

/// The zone named by the `TZ` environment variable, or UTC.
pub fn system_zone() -> Tz {
    std::env::var("TZ")
        .ok()
        .and_then(|tz| tz.trim_start_matches(':').parse().ok())
        .unwrap_or(Tz::UTC)
}

/// Parse a zone id.
///
/// IANA names (`UTC`, `America/New_York`) are accepted as-is. A bare offset
/// (`Z`, `+00:00`, `-07:00`) maps to UTC or the matching `Etc/GMT` zone.
pub fn parse_zone(id: &str) -> Result<Tz> {
    let id = id.trim();
    if let Ok(tz) = id.parse::<Tz>() {
        return Ok(tz);
    }
    match parse_offset(id) {
        Some(offset) => zone_for_offset(offset),
        None => Err(KeywordError::argument(format!(
            "unknown zone id '{id}'; use an IANA name like 'UTC' or 'America/New_York'"
        ))),
    }
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    if text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0);
    }
    let sign = match text.chars().next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };
    let (hours, minutes) = match text[1..].split_once(':') {
        Some((h, m)) => (offset_field(h)?, offset_field(m)?),
        None => (offset_field(&text[1..])?, 0),
    };
    if hours > 18 || minutes >= 60 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// One or two ASCII digits of an offset's hour or minute field.
fn offset_field(text: &str) -> Option<i32> {
    if text.is_empty() || text.len() > 2 || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Find the zone id for a fixed offset.
fn zone_for_offset(offset: FixedOffset) -> Result<Tz> {
    let seconds = offset.local_minus_utc();
    if seconds == 0 {
        return Ok(Tz::UTC);
    }
    let unsupported = || {
        KeywordError::argument(format!(
            "offset {offset} has no zone id; add one, e.g. '2020-01-01T00:00:00{offset}[Asia/Kolkata]'"
        ))
    };
    if seconds % 3600 != 0 {
        return Err(unsupported());
    }
    // Etc/GMT zones are named with the inverted sign: UTC-07:00 is Etc/GMT+7.
    format!("Etc/GMT{:+}", -(seconds / 3600))
        .parse::<Tz>()
        .map_err(|_| unsupported())
}

/// Parse a start timestamp.
///
/// Accepts RFC 3339 with an optional bracketed zone id, as in
/// `2016-04-12T13:06:04.157-04:00[Africa/Djibouti]`. Seconds may be omitted.
/// Without a zone id the zone is derived from the offset.
pub fn parse_start(value: &str) -> Result<DateTime<Tz>> {
    let value = value.trim();
    let (timestamp, zone) = match value.strip_suffix(']').and_then(|v| v.split_once('[')) {
        Some((timestamp, zone)) => (timestamp.trim(), Some(zone)),
        None => (value, None),
    };

    let parsed = DateTime::parse_from_rfc3339(timestamp)
        .or_else(|_| {
            let normalized = match timestamp.strip_suffix(['Z', 'z']) {
                Some(rest) => format!("{rest}+00:00"),
                None => timestamp.to_string(),
            };
            DateTime::parse_from_str(&normalized, "%Y-%m-%dT%H:%M%:z")
        })
        .map_err(|source| KeywordError::InvalidStart {
            value: value.to_string(),
            source,
        })?;

    let tz = match zone {
        Some(zone) => parse_zone(zone)?,
        None => zone_for_offset(*parsed.offset())?,
    };
    Ok(parsed.with_timezone(&tz))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DateTimeModifier {
    Start,
    ZoneId,
    Offset,
}

// `{start}` runs first: its timestamp may contain brackets and digits.
static GRAMMAR: LazyLock<Grammar<DateTimeModifier>> = LazyLock::new(|| {
    Grammar::new(KeywordFamily::DateTime)
        .rule(
            DateTimeModifier::Start,
            "start",
            r"(?i)\{\s*start\s*=([^}]*)\}",
            Cardinality::AtMostOne,
        )
        .rule(
            DateTimeModifier::ZoneId,
            "zoneid",
            r"(?i)\{\s*zoneid\s*=([^}]*)\}",
            Cardinality::AtMostOne,
        )
        .rule(
            DateTimeModifier::Offset,
            "offset",
            r"\{\s*([-+]?[0-9]+[yMwdhm])\s*\}",
            Cardinality::Repeatable,
        )
});

/// Check whether the text is a `[datetime]` keyword string.
pub fn is_datetime_keyword(text: &str) -> bool {
    crate::keyword::is_keyword(text, KeywordFamily::DateTime)
}

/// Resolved contents of a `[datetime]` keyword string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemporalSpec {
    pub offset: TemporalOffset,
    pub start: Option<DateTime<Tz>>,
    pub zone: Option<Tz>,
}

impl TemporalSpec {
    /// Parse and validate a `[datetime]` keyword string.
    pub fn parse(parameter_string: &str) -> Result<Self> {
        let parsed = GRAMMAR.parse(parameter_string)?;
        let mut spec = TemporalSpec::default();

        for modifier in parsed.all(DateTimeModifier::Offset) {
            let token = modifier.payload();
            let mut chars = token.chars();
            let unit = chars
                .next_back()
                .and_then(TemporalUnit::from_letter)
                .ok_or_else(|| {
                    KeywordError::format(format!("unknown offset unit in '{}'", modifier.fragment))
                })?;
            let amount: i64 = parse_number(chars.as_str(), &modifier.fragment)?;
            spec.offset.add(unit, amount);
        }

        if let Some(start) = parsed.first(DateTimeModifier::Start) {
            spec.start = Some(parse_start(start.payload())?);
        }
        if let Some(zone) = parsed.first(DateTimeModifier::ZoneId) {
            spec.zone = Some(parse_zone(zone.payload())?);
        }

        tracing::debug!(
            offset = %spec.offset,
            start = ?spec.start,
            zone = ?spec.zone,
            "resolved datetime spec"
        );
        Ok(spec)
    }
}

/// Generator for `[datetime]` keyword strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeGenerator {
    policy: ZonePolicy,
    system_zone: Tz,
}

impl Default for DateTimeGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl DateTimeGenerator {
    /// Create a generator with [`ZonePolicy::StartInstant`] and the zone from [`system_zone`].
    pub fn new() -> Self {
        Self {
            policy: ZonePolicy::StartInstant,
            system_zone: system_zone(),
        }
    }

    pub fn with_zone_policy(mut self, policy: ZonePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_system_zone(mut self, zone: Tz) -> Self {
        self.system_zone = zone;
        self
    }

    pub fn zone_policy(&self) -> ZonePolicy {
        self.policy
    }

    pub fn system_zone(&self) -> Tz {
        self.system_zone
    }

    /// Generate a datetime from a keyword string, relative to now.
    pub fn generate(&self, parameter_string: &str) -> Result<DateTime<Tz>> {
        self.generate_at(parameter_string, Utc::now())
    }

    /// Generate a datetime from a keyword string, using `now` as the current instant.
    pub fn generate_at(&self, parameter_string: &str, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let spec = TemporalSpec::parse(parameter_string)?;
        self.resolve(&spec, now)
    }

    /// Run the start, zone, calendar, clock pipeline for a resolved spec.
    pub fn resolve(&self, spec: &TemporalSpec, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let start = spec
            .start
            .unwrap_or_else(|| now.with_timezone(&self.system_zone));
        let zone = match (spec.zone, self.policy) {
            (Some(zone), _) => zone,
            (None, ZonePolicy::StartInstant) => start.timezone(),
            (None, ZonePolicy::SystemDefault) => self.system_zone,
        };
        spec.offset.apply(start.with_timezone(&zone))
    }
}

/// Generate a datetime from a `[datetime]` keyword string with the default generator.
pub fn generate(parameter_string: &str) -> Result<DateTime<Tz>> {
    DateTimeGenerator::new().generate(parameter_string)
}

/// Fluent builder for datetimes relative to now or a fixed start.
///
/// Adjustments accumulate: `years(2).years(2)` equals `years(4)`. Without an
/// explicit zone the result is in the system zone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DateTimeBuilder {
    spec: TemporalSpec,
    system_zone: Option<Tz>,
}

impl DateTimeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn years(mut self, years: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Years, years);
        self
    }

    pub fn months(mut self, months: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Months, months);
        self
    }

    pub fn weeks(mut self, weeks: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Weeks, weeks);
        self
    }

    pub fn days(mut self, days: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Days, days);
        self
    }

    pub fn hours(mut self, hours: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Hours, hours);
        self
    }

    pub fn minutes(mut self, minutes: i64) -> Self {
        self.spec.offset.add(TemporalUnit::Minutes, minutes);
        self
    }

    /// Start from a fixed instant instead of now.
    pub fn start(mut self, start: DateTime<Tz>) -> Self {
        self.spec.start = Some(start);
        self
    }

    /// Express the result in this zone.
    pub fn zone(mut self, zone: Tz) -> Self {
        self.spec.zone = Some(zone);
        self
    }

    /// Override the zone used when none is given, instead of [`system_zone`].
    pub fn system_zone(mut self, zone: Tz) -> Self {
        self.system_zone = Some(zone);
        self
    }

    /// The accumulated offset.
    pub fn offset(&self) -> TemporalOffset {
        self.spec.offset
    }

    /// Build relative to now.
    pub fn build(&self) -> Result<DateTime<Tz>> {
        self.build_at(Utc::now())
    }

    /// Build using `now` as the current instant.
    pub fn build_at(&self, now: DateTime<Utc>) -> Result<DateTime<Tz>> {
        let generator = DateTimeGenerator::new().with_zone_policy(ZonePolicy::SystemDefault);
        let generator = match self.system_zone {
            Some(zone) => generator.with_system_zone(zone),
            None => generator,
        };
        generator.resolve(&self.spec, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-06-15T12:30:45Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    fn utc_generator() -> DateTimeGenerator {
        DateTimeGenerator::new().with_system_zone(Tz::UTC)
    }

    fn at(keyword: &str) -> DateTime<Tz> {
        utc_generator().generate_at(keyword, now()).unwrap()
    }

    fn local(dt: &DateTime<Tz>) -> String {
        dt.format("%Y-%m-%dT%H:%M:%S%:z").to_string()
    }

    #[test]
    fn test_bare_keyword_returns_now() {
        let value = at("[datetime]");
        assert_eq!(value, now().with_timezone(&Tz::UTC));
    }

    #[test]
    fn test_bare_keyword_uses_system_zone() {
        let generator = DateTimeGenerator::new().with_system_zone(chrono_tz::America::New_York);
        let value = generator.generate_at("[datetime]", now()).unwrap();

        assert_eq!(value.timezone(), chrono_tz::America::New_York);
        assert_eq!(value.hour(), 8);
        assert_eq!(value.minute(), 30);
    }

    #[test]
    fn test_generate_uses_current_time() {
        let before = Utc::now();
        let value = generate("[datetime{zoneid=UTC}]").unwrap();
        let after = Utc::now();

        assert!(value.with_timezone(&Utc) >= before);
        assert!(value.with_timezone(&Utc) <= after);
    }

    #[test]
    fn test_each_unit() {
        assert_eq!(local(&at("[datetime{+1y}]")), "2025-06-15T12:30:45+00:00");
        assert_eq!(local(&at("[datetime{-2M}]")), "2024-04-15T12:30:45+00:00");
        assert_eq!(local(&at("[datetime{+1w}]")), "2024-06-22T12:30:45+00:00");
        assert_eq!(local(&at("[datetime{-3d}]")), "2024-06-12T12:30:45+00:00");
        assert_eq!(local(&at("[datetime{+5h}]")), "2024-06-15T17:30:45+00:00");
        assert_eq!(local(&at("[datetime{-31m}]")), "2024-06-15T11:59:45+00:00");
        assert_eq!(local(&at("[datetime{15M}]")), "2025-09-15T12:30:45+00:00");
    }

    #[test]
    fn test_offsets_accumulate() {
        assert_eq!(at("[datetime{+5m}{-3m}]"), at("[datetime{+2m}]"));
        assert_eq!(at("[datetime{+2y}{+2y}]"), at("[datetime{+4y}]"));
        assert_eq!(at("[datetime{+1w}{-7d}]"), at("[datetime]"));
    }

    #[test]
    fn test_month_splits_are_equivalent() {
        let start = "{start=2020-01-31T10:00:00Z}";
        let split = at(&format!("[datetime{start}{{+5M}}{{+7M}}]"));
        let months = at(&format!("[datetime{start}{{+12M}}]"));
        let year = at(&format!("[datetime{start}{{+1y}}]"));

        assert_eq!(split, months);
        assert_eq!(months, year);
        assert_eq!((year.year(), year.month(), year.day()), (2021, 1, 31));
    }

    #[test]
    fn test_month_end_clamps() {
        let value = at("[datetime{start=2020-02-29T00:00:00Z}{+1y}]");
        assert_eq!((value.year(), value.month(), value.day()), (2021, 2, 28));

        let value = at("[datetime{start=2024-01-31T00:00:00Z}{+1M}]");
        assert_eq!((value.month(), value.day()), (2, 29));
    }

    #[test]
    fn test_all_modifiers() {
        let value = at(
            "  [  datetime { zoneid = Africa/Djibouti } {  +2y } { -4M } {  +3w }  { -12d } { +5h } { -7m } \
             {start=2016-04-12T13:06:04.157-04:00[Africa/Djibouti]}]",
        );

        assert_eq!(value.timezone(), chrono_tz::Africa::Djibouti);
        assert_eq!(local(&value), "2017-12-22T00:59:04+03:00");
        assert_eq!(value.nanosecond(), 157_000_000);
    }

    #[test]
    fn test_day_offset_keeps_wall_clock_across_spring_forward() {
        let start = "{start=2024-03-09T18:00:00-05:00[America/New_York]}";
        let by_day = at(&format!("[datetime{start}{{+1d}}]"));
        let by_hours = at(&format!("[datetime{start}{{+24h}}]"));

        assert_eq!(local(&by_day), "2024-03-10T18:00:00-04:00");
        assert_eq!(local(&by_hours), "2024-03-10T19:00:00-04:00");

        let origin = parse_start("2024-03-09T18:00:00-05:00[America/New_York]").unwrap();
        assert_eq!(by_day.signed_duration_since(origin), TimeDelta::hours(23));
    }

    #[test]
    fn test_calendar_applies_before_clock() {
        // 01:00 + 1 day lands on the transition day; +1h then crosses the gap.
        let value = at("[datetime{+1h}{start=2024-03-09T01:00:00-05:00[America/New_York]}{+1d}]");
        assert_eq!(local(&value), "2024-03-10T03:00:00-04:00");
    }

    #[test]
    fn test_skipped_local_time_moves_forward() {
        let value = at("[datetime{start=2024-03-09T02:30:00-05:00[America/New_York]}{+1d}]");
        assert_eq!(local(&value), "2024-03-10T03:30:00-04:00");
    }

    #[test]
    fn test_ambiguous_local_time_keeps_offset() {
        let value = at("[datetime{start=2024-11-02T01:30:00-04:00[America/New_York]}{+1d}]");
        assert_eq!(local(&value), "2024-11-03T01:30:00-04:00");

        let value = at("[datetime{start=2024-11-04T01:30:00-05:00[America/New_York]}{-1d}]");
        assert_eq!(local(&value), "2024-11-03T01:30:00-05:00");
    }

    #[test]
    fn test_zone_policy_start_instant() {
        let keyword = "[datetime{start=2024-01-10T09:00:00-05:00[America/New_York]}]";
        let value = utc_generator().generate_at(keyword, now()).unwrap();

        assert_eq!(value.timezone(), chrono_tz::America::New_York);
        assert_eq!(value.hour(), 9);
    }

    #[test]
    fn test_zone_policy_system_default() {
        let keyword = "[datetime{start=2024-01-10T09:00:00-05:00[America/New_York]}]";
        let value = utc_generator()
            .with_zone_policy(ZonePolicy::SystemDefault)
            .generate_at(keyword, now())
            .unwrap();

        assert_eq!(value.timezone(), Tz::UTC);
        assert_eq!(value.hour(), 14);
    }

    #[test]
    fn test_zone_modifier_converts_instant() {
        let value = at("[datetime{start=2024-01-10T09:00:00Z}{zoneid=Asia/Tokyo}]");

        assert_eq!(value.timezone(), chrono_tz::Asia::Tokyo);
        assert_eq!(local(&value), "2024-01-10T18:00:00+09:00");
    }

    #[test]
    fn test_start_with_whitespace() {
        let value = at("[datetime{  start  =  2024-01-10T09:00:00Z   }  ]");
        assert_eq!(local(&value), "2024-01-10T09:00:00+00:00");
    }

    #[test]
    fn test_start_formats() {
        let value = parse_start("2016-04-12T13:06Z[UTC]").unwrap();
        assert_eq!(local(&value), "2016-04-12T13:06:00+00:00");

        let value = parse_start("2020-06-01T12:00:00-07:00").unwrap();
        assert_eq!(value.timezone(), chrono_tz::Etc::GMTPlus7);
        assert_eq!(value.hour(), 12);

        let value = parse_start("2020-06-01T12:00:00+00:00").unwrap();
        assert_eq!(value.timezone(), Tz::UTC);
    }

    #[test]
    fn test_start_with_fractional_offset_needs_zone() {
        let err = parse_start("2020-06-01T12:00:00+05:30").unwrap_err();
        assert!(err.is_invalid_argument());

        let value = parse_start("2020-06-01T12:00:00+05:30[Asia/Kolkata]").unwrap();
        assert_eq!(value.hour(), 12);
    }

    #[test]
    fn test_parse_zone() {
        assert_eq!(parse_zone(" America/New_York ").unwrap(), chrono_tz::America::New_York);
        assert_eq!(parse_zone("UTC").unwrap(), Tz::UTC);
        assert_eq!(parse_zone("Z").unwrap(), Tz::UTC);
        assert_eq!(parse_zone("-07:00").unwrap(), chrono_tz::Etc::GMTPlus7);
        assert_eq!(parse_zone("+03").unwrap(), chrono_tz::Etc::GMTMinus3);
        assert!(parse_zone("Mars/Olympus_Mons").unwrap_err().is_invalid_argument());
    }

    #[test]
    fn test_malformed_offset_zone_rejected() {
        for id in ["+-5", "-+5", "+5:-0", "+05:+30", "+", "+:30", "+999999", "-999999", "+19"] {
            let err = parse_zone(id).unwrap_err();
            assert!(err.is_invalid_argument(), "{id}: {err}");
        }
    }

    #[test]
    fn test_out_of_range_offset_in_keyword_rejected() {
        let err = utc_generator()
            .generate_at("[datetime{zoneid=+999999}]", now())
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("+999999"));

        let err = parse_start("2020-01-01T00:00:00Z[-999999]").unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_invalid_start_rejected() {
        let err = utc_generator().generate_at("[datetime{start=xxx}]", now()).unwrap_err();
        assert!(matches!(err, KeywordError::InvalidStart { .. }));
        assert!(err.is_invalid_argument());
        assert!(err.to_string().contains("xxx"));
    }

    #[test]
    fn test_unknown_zone_rejected() {
        let err = utc_generator()
            .generate_at("[datetime{zoneid=Nowhere/Special}]", now())
            .unwrap_err();
        assert!(matches!(err, KeywordError::InvalidArgument(_)));
        assert!(err.to_string().contains("Nowhere/Special"));
    }

    #[test]
    fn test_repeated_single_modifiers_rejected() {
        let generator = utc_generator();

        let err = generator
            .generate_at(
                "[datetime{start=2020-01-01T00:00:00Z}{start=2021-01-01T00:00:00Z}]",
                now(),
            )
            .unwrap_err();
        assert!(err.is_invalid_format());

        let err = generator
            .generate_at("[datetime{zoneid=UTC}{zoneid=America/New_York}]", now())
            .unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_unrecognized_content_rejected() {
        let generator = utc_generator();

        for keyword in [
            "[datetime{+1y}x{zoneid=UTC}]",
            "[datetime{+1Y}]",
            "[datetime{+1 d}]",
            "[datetime{+1s}]",
            "[datetime{}]",
            "[datetime{+d}]",
        ] {
            let err = generator.generate_at(keyword, now()).unwrap_err();
            assert!(err.is_invalid_format(), "{keyword} should be rejected");
        }
    }

    #[test]
    fn test_wrong_envelope_rejected() {
        let err = utc_generator().generate_at("[randint{+1d}]", now()).unwrap_err();
        assert!(err.is_invalid_format());
        assert!(utc_generator()
            .generate_at("foo[datetime{+5h}]bar", now())
            .unwrap_err()
            .is_invalid_format());
    }

    #[test]
    fn test_out_of_range_offset() {
        let err = utc_generator()
            .generate_at("[datetime{+9999999y}]", now())
            .unwrap_err();
        assert!(err.is_invalid_argument());

        let err = utc_generator()
            .generate_at("[datetime{+99999999999999999999d}]", now())
            .unwrap_err();
        assert!(err.is_invalid_format());
    }

    #[test]
    fn test_is_datetime_keyword() {
        assert!(is_datetime_keyword("[datetime{+1y}{-21d}]"));
        assert!(is_datetime_keyword("  [ DateTime ]  "));
        assert!(is_datetime_keyword("[ datetime {+1y} {-21d} ]"));
        assert!(!is_datetime_keyword("foo[datetime{+5h}]bar"));
    }

    #[test]
    fn test_spec_parse() {
        let spec = TemporalSpec::parse("[datetime{+2y}{-1M}{+3w}{+4d}{-5h}{+6m}{+1y}]").unwrap();

        assert_eq!(
            spec.offset,
            TemporalOffset {
                years: 3,
                months: -1,
                weeks: 3,
                days: 4,
                hours: -5,
                minutes: 6,
            }
        );
        assert_eq!(spec.offset.total_months(), Some(35));
        assert_eq!(spec.offset.total_days(), Some(25));
        assert!(spec.start.is_none());
        assert!(spec.zone.is_none());
    }

    #[test]
    fn test_builder_accumulates() {
        let start = parse_start("2024-01-10T09:00:00Z[UTC]").unwrap();
        let built = DateTimeBuilder::new()
            .years(2)
            .years(2)
            .months(1)
            .weeks(1)
            .days(-2)
            .hours(3)
            .minutes(-15)
            .start(start)
            .system_zone(Tz::UTC)
            .build_at(now())
            .unwrap();

        assert_eq!(local(&built), "2028-02-15T11:45:00+00:00");
    }

    #[test]
    fn test_builder_zone_defaults_to_system_zone() {
        let start = parse_start("2024-01-10T09:00:00-05:00[America/New_York]").unwrap();
        let built = DateTimeBuilder::new()
            .start(start)
            .system_zone(Tz::UTC)
            .build_at(now())
            .unwrap();

        assert_eq!(built.timezone(), Tz::UTC);
        assert_eq!(built.hour(), 14);

        let built = DateTimeBuilder::new()
            .start(start)
            .zone(chrono_tz::Europe::Paris)
            .build_at(now())
            .unwrap();
        assert_eq!(local(&built), "2024-01-10T15:00:00+01:00");
    }

    #[test]
    fn test_builder_relative_to_now() {
        let built = DateTimeBuilder::new()
            .days(1)
            .system_zone(Tz::UTC)
            .build_at(now())
            .unwrap();
        assert_eq!(local(&built), "2024-06-16T12:30:45+00:00");
    }
}
