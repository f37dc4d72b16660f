//! Free-text time input parsing
//!
//! Turns strings like "Focus 25m", "design logo 20min", "30" or "@5pm" into
//! a duration plus optional label, or an absolute clock-time target. Pure
//! functions, no state.

use std::sync::LazyLock;

use chrono::{DateTime, Days, LocalResult, TimeZone};
use regex::Regex;

/// One or more number+unit tokens anchored to the end of the input.
/// Everything before the run is the label.
static TRAILING_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)((?:\d+(?:\.\d+)?\s*(?:hours?|mins?|seconds?|h|m|s)\s*)+)$")
        .expect("valid trailing duration pattern")
});

/// "words..., whitespace, bare number" fallback; the number is minutes.
static LABELED_BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*)\s+(\d+(?:\.\d+)?)\s*$").expect("valid bare number pattern")
});

static HOURS_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*h").expect("valid hours pattern"));

/// Minutes must not swallow the `m` of a seconds-like token such as "ms".
static MINUTES_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*m(?:[^s]|$)").expect("valid minutes pattern"));

static SECONDS_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*s").expect("valid seconds pattern"));

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)").expect("valid number pattern"));

static CLOCK_MERIDIEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})(am|pm)$").expect("valid meridiem pattern"));

static CLOCK_HOUR_MINUTE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2}):(\d{2})$").expect("valid hour:minute pattern"));

static CLOCK_HOUR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,2})$").expect("valid bare hour pattern"));

/// Successful parse of a raw time input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedInput {
    /// `@`-prefixed clock time: seconds until its next future occurrence.
    Absolute { seconds_until: u64 },
    /// Trailing duration with an optional leading label.
    Relative { seconds: u64, label: String },
}

impl ParsedInput {
    /// Countdown length in whole seconds, always positive.
    pub fn seconds(&self) -> u64 {
        match self {
            ParsedInput::Absolute { seconds_until } => *seconds_until,
            ParsedInput::Relative { seconds, .. } => *seconds,
        }
    }

    /// Label for the countdown; absolute targets are untagged.
    pub fn label(&self) -> &str {
        match self {
            ParsedInput::Absolute { .. } => "",
            ParsedInput::Relative { label, .. } => label,
        }
    }
}

/// Parse a raw time input against the current local clock.
pub fn parse_time_input(input: &str) -> Option<ParsedInput> {
    parse_time_input_at(input, chrono::Local::now())
}

/// Parse a raw time input against an explicit `now`.
///
/// Returns `None` for anything that does not match a recognized pattern or
/// whose computed duration is not positive after truncation to whole seconds.
pub fn parse_time_input_at<Tz>(input: &str, now: DateTime<Tz>) -> Option<ParsedInput>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(clock) = input.strip_prefix('@') {
        let seconds_until = seconds_until_clock(&clock.to_lowercase(), now)?;
        return Some(ParsedInput::Absolute { seconds_until });
    }

    let (label, fragment) = split_label_and_fragment(input);
    let seconds = duration_from_fragment(&fragment)?;
    Some(ParsedInput::Relative { seconds, label })
}

/// Split the input into (label, duration fragment), trying the anchored
/// number+unit run first, then the bare-number fallback, then treating the
/// whole input as the fragment.
fn split_label_and_fragment(input: &str) -> (String, String) {
    if let Some(caps) = TRAILING_DURATION.captures(input) {
        if let Some(fragment) = caps.get(1) {
            let label = input[..fragment.start()].trim().to_string();
            return (label, fragment.as_str().trim().to_lowercase());
        }
    }

    if let Some(caps) = LABELED_BARE_NUMBER.captures(input) {
        if let (Some(words), Some(number)) = (caps.get(1), caps.get(2)) {
            return (words.as_str().trim().to_string(), number.as_str().to_lowercase());
        }
    }

    (String::new(), input.to_lowercase())
}

/// Sum the hour/minute/second components of a lowercased fragment.
///
/// A fragment with no unit letter still counts if it holds a bare number,
/// which is read as minutes. Totals truncate to whole seconds; a total of
/// zero is a parse failure, never a zero-length timer.
fn duration_from_fragment(fragment: &str) -> Option<u64> {
    let mut total = 0.0_f64;

    if let Some(hours) = capture_number(&HOURS_PART, fragment) {
        total += hours * 3600.0;
    }
    if let Some(minutes) = capture_number(&MINUTES_PART, fragment) {
        total += minutes * 60.0;
    }
    if let Some(seconds) = capture_number(&SECONDS_PART, fragment) {
        total += seconds;
    }

    if total == 0.0 {
        if let Some(minutes) = capture_number(&BARE_NUMBER, fragment) {
            total = minutes * 60.0;
        }
    }

    let seconds = total as u64;
    (seconds > 0).then_some(seconds)
}

fn capture_number(pattern: &Regex, fragment: &str) -> Option<f64> {
    pattern.captures(fragment)?.get(1)?.as_str().parse().ok()
}

/// Seconds until the next future occurrence of a clock time.
///
/// Accepts `H` (24-hour), `Ham`/`Hpm` and `H:MM`. A target at or before
/// `now` rolls to the next day. A target less than a full second away
/// truncates to zero and is rejected.
fn seconds_until_clock<Tz>(clock: &str, now: DateTime<Tz>) -> Option<u64>
where
    Tz: TimeZone,
    Tz::Offset: Copy,
{
    let (hour, minute) = if let Some(caps) = CLOCK_MERIDIEM.captures(clock) {
        let raw: u32 = caps.get(1)?.as_str().parse().ok()?;
        if !(1..=12).contains(&raw) {
            return None;
        }
        let hour = match (caps.get(2)?.as_str(), raw) {
            ("am", 12) => 0,
            ("am", h) => h,
            ("pm", 12) => 12,
            ("pm", h) => h + 12,
            _ => return None,
        };
        (hour, 0)
    } else if let Some(caps) = CLOCK_HOUR_MINUTE.captures(clock) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        let minute: u32 = caps.get(2)?.as_str().parse().ok()?;
        if hour > 23 || minute > 59 {
            return None;
        }
        (hour, minute)
    } else if let Some(caps) = CLOCK_HOUR.captures(clock) {
        let hour: u32 = caps.get(1)?.as_str().parse().ok()?;
        if hour > 23 {
            return None;
        }
        (hour, 0)
    } else {
        return None;
    };

    let timezone = now.timezone();
    for day_offset in 0..3_u64 {
        let date = now.date_naive().checked_add_days(Days::new(day_offset))?;
        let naive = date.and_hms_opt(hour, minute, 0)?;
        let target = match timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => dt,
            LocalResult::Ambiguous(first, _second) => first,
            // Nonexistent local time (DST gap): try the next day.
            LocalResult::None => continue,
        };
        if target <= now {
            continue;
        }
        let seconds = (target - now.clone()).num_seconds();
        return (seconds > 0).then_some(seconds as u64);
    }

    None
}
