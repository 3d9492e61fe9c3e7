//! Creation/update timestamps and their storage format.

use chrono::{Local, NaiveDateTime, SubsecRound, Timelike};

use crate::error::{ModelError, ModelResult};

/// Wall-clock date and time with microsecond precision.
pub type Timestamp = NaiveDateTime;

/// Storage format for timestamps: `YYYY-MM-DDTHH:MM:SS.ffffff`.
///
/// Rendering always emits six fractional digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f";

/// Parse side of [`TIMESTAMP_FORMAT`]; the fraction is checked separately.
const PARSE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

const MAX_FRACTION_DIGITS: usize = 6;

/// Current local time, truncated to microseconds.
pub fn now() -> Timestamp {
    Local::now().naive_local().trunc_subsecs(6)
}

/// Parse a stored timestamp string.
///
/// The fraction is mandatory and holds 1 to 6 digits. Leap seconds are
/// rejected. `key` names the attribute being parsed and only feeds the error.
pub fn parse(key: &str, value: &str) -> ModelResult<Timestamp> {
    let fraction = value.rsplit_once('.').map(|(_, f)| f).unwrap_or_default();
    if fraction.is_empty()
        || fraction.len() > MAX_FRACTION_DIGITS
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(ModelError::invalid_timestamp(
            key,
            format!("{value:?}: expected 1 to {MAX_FRACTION_DIGITS} fractional digits"),
        ));
    }

    let ts = NaiveDateTime::parse_from_str(value, PARSE_FORMAT)
        .map_err(|e| ModelError::invalid_timestamp(key, format!("{value:?}: {e}")))?;

    // chrono folds `:60` into the previous second with nanos >= 1e9
    if ts.nanosecond() >= 1_000_000_000 {
        return Err(ModelError::invalid_timestamp(key, format!("{value:?}: leap second")));
    }

    Ok(ts)
}

/// Render a timestamp in the storage format.
pub fn format(ts: &Timestamp) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_year() -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_micro_opt(0, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn parses_storage_format() {
        assert_eq!(parse("created_at", "2024-01-01T00:00:00.000000").unwrap(), new_year());

        let ts = parse("created_at", "2017-06-14T22:31:03.285259").unwrap();
        assert_eq!(ts.nanosecond(), 285_259_000);
    }

    #[test]
    fn accepts_short_fractions() {
        let half = parse("created_at", "2024-01-01T00:00:00.5").unwrap();
        assert_eq!(half, new_year() + chrono::Duration::microseconds(500_000));

        let five = parse("created_at", "2024-01-01T00:00:00.12345").unwrap();
        assert_eq!(five.nanosecond(), 123_450_000);
        assert_eq!(format(&five), "2024-01-01T00:00:00.123450");
    }

    #[test]
    fn rejects_leap_second() {
        let err = parse("created_at", "2016-12-31T23:59:60.000000").unwrap_err();
        assert!(matches!(err, ModelError::InvalidTimestamp { .. }));
    }

    #[test]
    fn rejects_other_shapes() {
        for bad in [
            "not-a-date",
            "2024-01-01",
            "2024-01-01T00:00:00",
            "2024-01-01T00:00:00.",
            "2024-01-01T00:00:00.1234567",
            "2024-01-01T00:00:00.12a",
            "2024-01-01 00:00:00.000000",
            "2024-13-01T00:00:00.000000",
        ] {
            let err = parse("created_at", bad).unwrap_err();
            assert!(matches!(err, ModelError::InvalidTimestamp { ref key, .. } if key == "created_at"));
        }
    }

    #[test]
    fn format_always_emits_microseconds() {
        assert_eq!(format(&new_year()), "2024-01-01T00:00:00.000000");
    }

    #[test]
    fn now_has_microsecond_precision_and_round_trips() {
        let ts = now();
        assert_eq!(ts.nanosecond() % 1_000, 0);
        assert_eq!(parse("updated_at", &format(&ts)).unwrap(), ts);
    }
}
