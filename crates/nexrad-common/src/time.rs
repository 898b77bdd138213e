//! Time handling utilities for composite archive timestamps.
//!
//! All timestamps are naive UTC instants. The archive publishes one composite
//! every five minutes, so the finest meaningful resolution is one minute.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};

use crate::error::{NexradError, NexradResult};

/// Generate an evenly spaced, ascending sequence of timestamps.
///
/// Yields `floor((stop - start) / step)` elements, element `i` being
/// `start + i * step`. `stop` itself is never part of the output.
pub fn time_grid(
    start: NaiveDateTime,
    stop: NaiveDateTime,
    step: Duration,
) -> NexradResult<Vec<NaiveDateTime>> {
    if step <= Duration::zero() {
        return Err(NexradError::InvalidArgument(format!(
            "time step must be positive, got {}",
            step
        )));
    }
    if start > stop {
        return Err(NexradError::InvalidArgument(format!(
            "start {} is after stop {}",
            start, stop
        )));
    }

    // Nanoseconds are chrono's finest unit, so the division is exact.
    let too_long = || {
        NexradError::InvalidArgument(format!(
            "time range {} to {} is too long to count in nanoseconds",
            start, stop
        ))
    };
    let span_ns = (stop - start).num_nanoseconds().ok_or_else(too_long)?;
    let step_ns = step.num_nanoseconds().ok_or_else(too_long)?;
    let count = span_ns / step_ns;

    Ok((0..count)
        .map(|i| start + Duration::nanoseconds(i * step_ns))
        .collect())
}

/// Parse a user supplied timestamp.
///
/// Supports:
/// - RFC 3339 with offset: "2018-01-01T00:00:00Z" (converted to UTC)
/// - ISO 8601 without zone: "2018-01-01T00:00" or "2018-01-01T00:00:00"
/// - Space separated: "2018-01-01 00:00"
/// - Date only: "2018-01-01" (midnight)
pub fn parse_timestamp(s: &str) -> NexradResult<NaiveDateTime> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc).naive_utc());
    }

    for fmt in [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(ndt);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(ndt) = date.and_hms_opt(0, 0, 0) {
            return Ok(ndt);
        }
    }

    Err(NexradError::parse(s, "expected an ISO 8601 date or date-time"))
}
