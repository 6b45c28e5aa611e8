use crate::error::CoreError;
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

/// The configured width of a time bucket.
///
/// Fixed intervals are aligned to the Unix epoch, so every interval that
/// divides a day (`6h`, `15m`) starts at midnight. Weeks start on Monday and
/// calendar months are counted from January 1970.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeInterval {
    Fixed { seconds: i64 },
    Weeks(u32),
    Months(u32),
}

impl Default for TimeInterval {
    fn default() -> Self {
        TimeInterval::Fixed {
            seconds: SECONDS_PER_DAY,
        }
    }
}

impl TimeInterval {
    /// Truncates a timestamp to the start of its bucket.
    pub fn truncate(&self, ts: NaiveDateTime) -> Result<Bucket, CoreError> {
        let start = match *self {
            TimeInterval::Fixed { seconds } => {
                let secs = ts.and_utc().timestamp();
                let floored = secs.div_euclid(seconds) * seconds;
                DateTime::from_timestamp(floored, 0)
                    .map(|dt| dt.naive_utc())
                    .ok_or_else(|| CoreError::OutOfRange(ts.to_string()))?
            }
            TimeInterval::Weeks(n) => {
                let days = (ts.date() - week_epoch()).num_days();
                let span = 7 * i64::from(n);
                let floored = days.div_euclid(span) * span;
                week_epoch()
                    .checked_add_signed(Duration::days(floored))
                    .ok_or_else(|| CoreError::OutOfRange(ts.to_string()))?
                    .and_time(NaiveTime::MIN)
            }
            TimeInterval::Months(n) => {
                let months = months_since_epoch(ts.date());
                let span = i64::from(n);
                first_of_month(months.div_euclid(span) * span)
                    .ok_or_else(|| CoreError::OutOfRange(ts.to_string()))?
            }
        };
        Ok(Bucket(start))
    }

    /// The start of the bucket following `bucket`.
    pub fn next(&self, bucket: Bucket) -> Result<Bucket, CoreError> {
        let start = bucket.0;
        let next = match *self {
            TimeInterval::Fixed { seconds } => start.checked_add_signed(Duration::seconds(seconds)),
            TimeInterval::Weeks(n) => start.checked_add_signed(Duration::days(7 * i64::from(n))),
            TimeInterval::Months(n) => {
                first_of_month(months_since_epoch(start.date()) + i64::from(n))
            }
        };
        next.map(Bucket)
            .ok_or_else(|| CoreError::OutOfRange(start.to_string()))
    }
}

fn week_epoch() -> NaiveDate {
    // Monday preceding the Unix epoch.
    NaiveDate::from_ymd_opt(1969, 12, 29).unwrap_or(NaiveDate::MIN)
}

fn months_since_epoch(date: NaiveDate) -> i64 {
    (i64::from(date.year()) - 1970) * 12 + i64::from(date.month0())
}

fn first_of_month(months: i64) -> Option<NaiveDateTime> {
    let year = i32::try_from(1970 + months.div_euclid(12)).ok()?;
    let month = u32::try_from(months.rem_euclid(12) + 1).ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).map(|d| d.and_time(NaiveTime::MIN))
}

impl FromStr for TimeInterval {
    type Err = CoreError;

    /// Parses `<n><unit>` sequences such as `1d`, `6h`, `1h30m`, `2w`, `1mo`,
    /// `1q` or `1y`. Calendar units (`w`, `mo`, `q`, `y`) must appear alone.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| CoreError::InvalidInterval(s.to_string(), reason.to_string());
        let input = s.trim();
        if input.is_empty() {
            return Err(invalid("interval is empty"));
        }

        let mut parts: Vec<(i64, String)> = Vec::new();
        let mut chars = input.chars().peekable();
        while chars.peek().is_some() {
            let mut digits = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(c);
                chars.next();
            }
            let mut unit = String::new();
            while let Some(c) = chars.peek().copied().filter(char::is_ascii_alphabetic) {
                unit.push(c.to_ascii_lowercase());
                chars.next();
            }
            if digits.is_empty() || unit.is_empty() {
                return Err(invalid("expected <number><unit>, e.g. 1d or 6h"));
            }
            let count: i64 = digits.parse().map_err(|_| invalid("number is too large"))?;
            if count == 0 {
                return Err(invalid("interval must be positive"));
            }
            parts.push((count, unit));
        }

        let calendar = |count: i64, unit: &str| -> Result<Option<TimeInterval>, CoreError> {
            let n = u32::try_from(count).map_err(|_| invalid("number is too large"))?;
            Ok(match unit {
                "w" => Some(TimeInterval::Weeks(n)),
                "mo" => Some(TimeInterval::Months(n)),
                "q" => Some(TimeInterval::Months(n.saturating_mul(3))),
                "y" => Some(TimeInterval::Months(n.saturating_mul(12))),
                _ => None,
            })
        };

        if let [(count, unit)] = parts.as_slice() {
            if let Some(interval) = calendar(*count, unit)? {
                return Ok(interval);
            }
        }

        let mut seconds: i64 = 0;
        for (count, unit) in &parts {
            let scale = match unit.as_str() {
                "s" => 1,
                "m" => SECONDS_PER_MINUTE,
                "h" => SECONDS_PER_HOUR,
                "d" => SECONDS_PER_DAY,
                "w" | "mo" | "q" | "y" => {
                    return Err(invalid("calendar units cannot be combined with other units"));
                }
                _ => return Err(invalid("unknown unit, expected one of s, m, h, d, w, mo, q, y")),
            };
            seconds = count
                .checked_mul(scale)
                .and_then(|v| seconds.checked_add(v))
                .ok_or_else(|| invalid("interval is too large"))?;
        }
        Ok(TimeInterval::Fixed { seconds })
    }
}

impl fmt::Display for TimeInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeInterval::Fixed { seconds } => {
                let mut rest = seconds;
                for (scale, unit) in [
                    (SECONDS_PER_DAY, "d"),
                    (SECONDS_PER_HOUR, "h"),
                    (SECONDS_PER_MINUTE, "m"),
                    (1, "s"),
                ] {
                    if rest >= scale {
                        write!(f, "{}{unit}", rest / scale)?;
                        rest %= scale;
                    }
                }
                Ok(())
            }
            TimeInterval::Weeks(n) => write!(f, "{n}w"),
            TimeInterval::Months(n) if n % 12 == 0 => write!(f, "{}y", n / 12),
            TimeInterval::Months(n) => write!(f, "{n}mo"),
        }
    }
}

impl Serialize for TimeInterval {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeInterval {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// The start of one time bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Bucket(pub NaiveDateTime);

impl Bucket {
    pub fn start(&self) -> NaiveDateTime {
        self.0
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%d %H:%M:%S"))
    }
}
