//! Date bounds of `val(...)` clauses

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Utc};
use cohort_query_ast::DateBound;

/// Parse the value token of a `val(...)` clause.
///
/// Accepted forms, all read as UTC unless an offset is given:
/// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD` (start of the period)
/// - RFC 3339 date-times (`2020-01-01T10:30:00Z`, `2020-01-01T10:30:00+02:00`)
/// - date-times without offset (`2020-01-01T10:30:00`, fractional seconds allowed)
/// - epoch milliseconds, five or more digits with an optional sign
///
/// Returns `None` for anything else, including instants whose UTC year falls
/// outside `0000`..=`9999`; those cannot be printed back as query text.
pub fn parse_date_bound(token: &str) -> Option<DateBound> {
    parse_instant(token).filter(|dt| (0..=9999).contains(&dt.year()))
}

fn parse_instant(token: &str) -> Option<DateBound> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(token) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(token, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.and_utc());
    }
    if let Some(date) = calendar_date(token) {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }
    epoch_millis(token)
}

fn calendar_date(token: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = token.split('-').collect();
    let numbers = parts
        .iter()
        .map(|p| {
            (!p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
                .then(|| p.parse::<u32>().ok())
                .flatten()
        })
        .collect::<Option<Vec<u32>>>()?;

    if parts[0].len() != 4 || parts[1..].iter().any(|p| p.len() != 2) {
        return None;
    }

    let year = i32::try_from(numbers[0]).ok()?;
    match numbers[..] {
        [_] => NaiveDate::from_ymd_opt(year, 1, 1),
        [_, month] => NaiveDate::from_ymd_opt(year, month, 1),
        [_, month, day] => NaiveDate::from_ymd_opt(year, month, day),
        _ => None,
    }
}

fn epoch_millis(token: &str) -> Option<DateBound> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    if digits.len() < 5 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let millis: i64 = token.parse().ok()?;
    DateTime::from_timestamp_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateBound {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_calendar_forms() {
        assert_eq!(parse_date_bound("2020"), Some(utc(2020, 1, 1, 0, 0, 0)));
        assert_eq!(parse_date_bound("2020-03"), Some(utc(2020, 3, 1, 0, 0, 0)));
        assert_eq!(parse_date_bound("2020-03-15"), Some(utc(2020, 3, 15, 0, 0, 0)));
    }

    #[test]
    fn test_datetime_forms() {
        assert_eq!(
            parse_date_bound("2020-03-15T10:30:00Z"),
            Some(utc(2020, 3, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_date_bound("2020-03-15T10:30:00+02:00"),
            Some(utc(2020, 3, 15, 8, 30, 0))
        );
        assert_eq!(
            parse_date_bound("2020-03-15T10:30:00"),
            Some(utc(2020, 3, 15, 10, 30, 0))
        );
        assert_eq!(
            parse_date_bound("2020-01-01T00:00:00.000Z"),
            Some(utc(2020, 1, 1, 0, 0, 0))
        );
    }

    #[test]
    fn test_epoch_millis() {
        assert_eq!(parse_date_bound("1577836800000"), Some(utc(2020, 1, 1, 0, 0, 0)));
        assert_eq!(parse_date_bound("-86400000"), Some(utc(1969, 12, 31, 0, 0, 0)));
    }

    #[test]
    fn test_invalid() {
        for token in [
            "", "yesterday", "2020-13-01", "2020-02-30", "20-01-01", "2020-1-5", "123", "-2020",
            "2020/01/01", "2020-01-01-01", "99999999999999999999",
        ] {
            assert_eq!(parse_date_bound(token), None, "token {:?}", token);
        }
    }

    #[test]
    fn test_years_outside_four_digits() {
        for token in [
            "-99999999999999",
            "999999999999999",
            "-62167219200001",
            "253402300800000",
            "0000-01-01T00:00:00+01:00",
            "9999-12-31T23:00:00-02:00",
            "+12345-01-01T00:00:00",
        ] {
            assert_eq!(parse_date_bound(token), None, "token {:?}", token);
        }
    }

    #[test]
    fn test_four_digit_year_edges() {
        assert_eq!(parse_date_bound("-62167219200000"), Some(utc(0, 1, 1, 0, 0, 0)));
        assert_eq!(
            parse_date_bound("253402300799999").map(|dt| dt.year()),
            Some(9999)
        );
        assert_eq!(parse_date_bound("0000"), Some(utc(0, 1, 1, 0, 0, 0)));
    }
}
