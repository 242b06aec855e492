use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

const NANOS_PER_MILLI: i128 = 1_000_000;

#[must_use]
pub fn unix_timestamp_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| {
            u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
        })
}

#[must_use]
pub fn generated_at_utc_now() -> String {
    format_unix_ms(unix_timestamp_millis())
}

#[must_use]
pub fn format_unix_ms(timestamp_unix_ms: u64) -> String {
    let nanos = i128::from(timestamp_unix_ms)
        .checked_mul(NANOS_PER_MILLI)
        .unwrap_or(i128::MAX);
    let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
        .to_offset(UtcOffset::UTC);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
        dt.year(),
        u8::from(dt.month()),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second(),
        dt.millisecond()
    )
}

/// Accepts `YYYY-MM-DD`, or a full RFC 3339 timestamp whose date part is used.
pub fn parse_calendar_date(raw: &str) -> Result<Date> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        bail!("date input is empty");
    }

    if let Ok(date) = Date::parse(candidate, format_description!("[year]-[month]-[day]")) {
        return Ok(date);
    }
    if let Ok(parsed) = OffsetDateTime::parse(candidate, &Rfc3339) {
        return Ok(parsed.date());
    }

    bail!("unsupported date format: {candidate}");
}

/// Accepts RFC 3339 or the offset-less `YYYY-MM-DDTHH:MM[:SS]` a datetime
/// picker produces.
pub fn parse_datetime(raw: &str) -> Result<PrimitiveDateTime> {
    let candidate = raw.trim();
    if candidate.is_empty() {
        bail!("datetime input is empty");
    }

    if let Ok(parsed) = OffsetDateTime::parse(candidate, &Rfc3339) {
        let utc = parsed.to_offset(UtcOffset::UTC);
        return Ok(PrimitiveDateTime::new(utc.date(), utc.time()));
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(
        candidate,
        format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]"),
    ) {
        return Ok(parsed);
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(
        candidate,
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    ) {
        return Ok(parsed);
    }

    bail!("unsupported datetime format: {candidate}");
}
