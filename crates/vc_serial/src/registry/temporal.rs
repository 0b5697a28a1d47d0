//! Date and time values as canonical strings.
//!
//! | type                    | form                                 |
//! |-------------------------|--------------------------------------|
//! | `DateTime<Utc>`         | RFC 3339, `Z` suffix                 |
//! | `DateTime<FixedOffset>` | RFC 3339, numeric offset             |
//! | `SystemTime`            | RFC 3339 in UTC                      |
//! | `NaiveDate`             | `%Y-%m-%d`                           |
//! | `NaiveTime`             | `%H:%M:%S` plus fraction if non-zero |
//! | `NaiveDateTime`         | `%Y-%m-%dT%H:%M:%S` plus fraction    |
//!
//! Fractional seconds are written with as many digits as they need, so
//! every value survives a round trip exactly.

use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

use crate::error::SerialError;
use crate::registry::ConverterRegistry;
use crate::registry::builtin::expect_str;
use crate::value::Primitive;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S%.f";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn register_temporal(registry: &mut ConverterRegistry) {
    registry.register_type::<DateTime<Utc>>(
        |value| Ok(Primitive::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true))),
        |primitive| parse_rfc3339(primitive).map(|value| value.with_timezone(&Utc)),
    );

    registry.register_type::<DateTime<FixedOffset>>(
        |value| Ok(Primitive::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, false))),
        parse_rfc3339,
    );

    registry.register_type::<SystemTime>(
        |value| {
            let value = system_time_to_utc(*value)?;
            Ok(Primitive::String(value.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
        },
        |primitive| parse_rfc3339(primitive).map(SystemTime::from),
    );

    registry.register_type::<NaiveDate>(
        |value| Ok(Primitive::String(value.format(DATE_FORMAT).to_string())),
        |primitive| {
            NaiveDate::parse_from_str(expect_str(primitive)?, DATE_FORMAT)
                .map_err(|e| SerialError::conversion(format!("{primitive} is not a date: {e}")))
        },
    );

    registry.register_type::<NaiveTime>(
        |value| Ok(Primitive::String(value.format(TIME_FORMAT).to_string())),
        |primitive| {
            NaiveTime::parse_from_str(expect_str(primitive)?, TIME_FORMAT)
                .map_err(|e| SerialError::conversion(format!("{primitive} is not a time: {e}")))
        },
    );

    registry.register_type::<NaiveDateTime>(
        |value| Ok(Primitive::String(value.format(DATE_TIME_FORMAT).to_string())),
        |primitive| {
            NaiveDateTime::parse_from_str(expect_str(primitive)?, DATE_TIME_FORMAT).map_err(|e| {
                SerialError::conversion(format!("{primitive} is not a date and time: {e}"))
            })
        },
    );
}

/// `SystemTime` covers a wider range than `DateTime<Utc>` on most platforms.
fn system_time_to_utc(time: SystemTime) -> Result<DateTime<Utc>, SerialError> {
    let (secs, nanos) = match time.duration_since(UNIX_EPOCH) {
        Ok(after) => (i64::try_from(after.as_secs()).ok(), after.subsec_nanos()),
        Err(before) => {
            let before = before.duration();
            let secs = i64::try_from(before.as_secs()).ok().map(|secs| -secs);
            match before.subsec_nanos() {
                0 => (secs, 0),
                nanos => (secs.and_then(|secs| secs.checked_sub(1)), 1_000_000_000 - nanos),
            }
        }
    };
    secs.and_then(|secs| DateTime::<Utc>::from_timestamp(secs, nanos))
        .ok_or_else(|| SerialError::conversion("time is out of the representable range"))
}

fn parse_rfc3339(primitive: &Primitive) -> Result<DateTime<FixedOffset>, SerialError> {
    DateTime::parse_from_rfc3339(expect_str(primitive)?).map_err(|e| {
        SerialError::conversion(format!("{primitive} is not an RFC 3339 timestamp: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, SystemTime, UNIX_EPOCH};

    use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};

    use crate::error::ErrorKind;
    use crate::info::Typed;
    use crate::registry::ConverterRegistry;
    use crate::value::Primitive;
    use crate::walk::Walker;

    fn check<T: Typed + PartialEq + core::fmt::Debug>(value: T, text: &str) {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let primitive = walker.to_primitive_of(&value).unwrap();
        assert_eq!(primitive, Primitive::from(text));
        assert_eq!(walker.from_primitive_as::<T>(&primitive).unwrap(), value);
    }

    #[test]
    fn canonical_forms() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        check(date, "2024-02-29");

        let time = NaiveTime::from_hms_milli_opt(8, 30, 0, 250).unwrap();
        check(time, "08:30:00.250");
        check(NaiveTime::from_hms_opt(23, 59, 59).unwrap(), "23:59:59");

        check(NaiveDateTime::new(date, time), "2024-02-29T08:30:00.250");

        let utc = Utc.with_ymd_and_hms(2001, 9, 9, 1, 46, 40).unwrap();
        check(utc, "2001-09-09T01:46:40Z");

        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local: DateTime<FixedOffset> = offset.with_ymd_and_hms(2001, 9, 9, 3, 46, 40).unwrap();
        check(local, "2001-09-09T03:46:40+02:00");
    }

    #[test]
    fn system_time_keeps_nanoseconds() {
        let time = UNIX_EPOCH + Duration::new(1_000_000_000, 123_456_789);
        check::<SystemTime>(time, "2001-09-09T01:46:40.123456789Z");
    }

    #[test]
    fn system_time_before_epoch() {
        let time = UNIX_EPOCH - Duration::new(1, 500_000_000);
        check::<SystemTime>(time, "1969-12-31T23:59:58.500Z");
    }

    #[test]
    fn system_time_out_of_range_fails() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let Some(far) = UNIX_EPOCH.checked_add(Duration::from_secs(1 << 50)) else {
            return;
        };
        let error = walker.to_primitive_of(&far).unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { .. }));
    }

    #[test]
    fn malformed_dates_fail() {
        let registry = ConverterRegistry::new();
        let walker = Walker::new(&registry);
        let error = walker
            .from_primitive_as::<NaiveDate>(&Primitive::from("2024-13-01"))
            .unwrap_err();
        assert!(matches!(error.kind(), ErrorKind::Conversion { .. }));
    }
}
