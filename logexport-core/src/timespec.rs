use chrono::{DateTime, Days, NaiveTime, TimeZone};

use crate::error::{LogexportError, Result};

/// Parses an `HH[:MM[:SS]]` wall-clock literal.
///
/// Missing trailing components default to zero; a trailing `:` with nothing
/// after it counts as missing.
pub fn parse_wall_clock(input: &str) -> Result<NaiveTime> {
    let malformed = || LogexportError::MalformedTime(input.to_string());

    let mut parts = input.trim().split(':').collect::<Vec<_>>();
    while parts.last().is_some_and(|part| part.is_empty()) {
        parts.pop();
    }
    if parts.is_empty() || parts.len() > 3 {
        return Err(malformed());
    }

    let mut values = [0_u32; 3];
    for ((slot, part), bound) in values.iter_mut().zip(&parts).zip([24, 60, 60]) {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(malformed());
        }
        let value = part.parse::<u32>().map_err(|_| malformed())?;
        if value >= bound {
            return Err(malformed());
        }
        *slot = value;
    }

    let [h, m, s] = values;
    NaiveTime::from_hms_opt(h, m, s).ok_or_else(malformed)
}

/// Resolves a wall-clock time to the most recent past instant showing it.
pub fn resolve_wall_clock<Tz: TimeZone>(time: NaiveTime, now: &DateTime<Tz>) -> Option<i64> {
    let tz = now.timezone();
    let today = now.date_naive();

    // A time skipped by a DST jump today last occurred yesterday.
    if let Some(candidate) = tz.from_local_datetime(&today.and_time(time)).earliest()
        && candidate <= *now
    {
        return Some(candidate.timestamp());
    }

    let yesterday = today.checked_sub_days(Days::new(1))?;
    tz.from_local_datetime(&yesterday.and_time(time))
        .earliest()
        .map(|dt| dt.timestamp())
}

/// Parses and resolves a time literal relative to `now`.
pub fn timestamp_of_str<Tz: TimeZone>(input: &str, now: &DateTime<Tz>) -> Result<i64> {
    let time = parse_wall_clock(input)?;
    resolve_wall_clock(time, now).ok_or_else(|| LogexportError::MalformedTime(input.to_string()))
}
