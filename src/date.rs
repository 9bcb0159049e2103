use crate::error::DateError;
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};

/// Formats carrying an explicit numeric offset, tried in order.
const OFFSET_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S %z",
    "%a, %d %b %Y %H:%M %z",
    "%d %b %Y %H:%M:%S %z",
    "%d %b %Y %H:%M %z",
    "%Y-%m-%d %H:%M:%S %z",
    "%Y-%m-%dT%H:%M:%S%z",
];

/// Formats without any zone; these are read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%a, %d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

/// Zone abbreviations seen in feeds, with the fixed offset they stand for.
const LEGACY_ZONES: &[(&str, &str)] = &[
    ("UT", "+0000"),
    ("UTC", "+0000"),
    ("GMT", "+0000"),
    ("Z", "+0000"),
    ("WET", "+0000"),
    ("WEST", "+0100"),
    ("BST", "+0100"),
    ("CET", "+0100"),
    ("CEST", "+0200"),
    ("EET", "+0200"),
    ("EEST", "+0300"),
    ("MSK", "+0300"),
    ("IST", "+0530"),
    ("JST", "+0900"),
    ("AEST", "+1000"),
    ("AEDT", "+1100"),
    ("NZST", "+1200"),
    ("NZDT", "+1300"),
    ("EST", "-0500"),
    ("EDT", "-0400"),
    ("CST", "-0600"),
    ("CDT", "-0500"),
    ("MST", "-0700"),
    ("MDT", "-0600"),
    ("PST", "-0800"),
    ("PDT", "-0700"),
    ("AKST", "-0900"),
    ("AKDT", "-0800"),
    ("HST", "-1000"),
];

/// Parse a feed-provided publication date.
///
/// RFC 2822 and RFC 3339 are tried first, then a handful of looser layouts.
/// When the trailing token is a known zone abbreviation it is replaced by its
/// numeric offset and parsing is retried.
pub fn parse_date(raw: &str) -> Result<DateTime<FixedOffset>, DateError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DateError::Empty);
    }
    if let Some(dt) = try_parse(raw) {
        return Ok(dt);
    }
    if let Some(replaced) = substitute_zone(raw) {
        if let Some(dt) = try_parse(&replaced) {
            return Ok(dt);
        }
    }
    Err(DateError::Unparseable(raw.to_string()))
}

/// Offset for a zone abbreviation, case-insensitive.
pub fn zone_offset(abbreviation: &str) -> Option<&'static str> {
    LEGACY_ZONES
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(abbreviation))
        .map(|(_, offset)| *offset)
}

fn substitute_zone(raw: &str) -> Option<String> {
    let (head, zone) = raw.rsplit_once(' ')?;
    let offset = zone_offset(zone)?;
    Some(format!("{} {}", head, offset))
}

fn try_parse(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(DateTime::<FixedOffset>::from(Utc.from_utc_datetime(&naive)));
        }
    }
    // feeds regularly carry a weekday that does not match the date
    if let Some((weekday, rest)) = s.split_once(", ") {
        if weekday.len() == 3 && weekday.chars().all(|c| c.is_ascii_alphabetic()) {
            return try_parse(rest);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        parse_date(s).expect("parse failed").with_timezone(&Utc)
    }

    fn expect(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn rfc2822_with_offset() {
        assert_eq!(
            utc("Tue, 10 Jun 2025 04:00:00 +0000"),
            expect("2025-06-10T04:00:00Z")
        );
        assert_eq!(
            utc("Tue, 10 Jun 2025 06:00:00 +0200"),
            expect("2025-06-10T04:00:00Z")
        );
    }

    #[test]
    fn pacific_abbreviations() {
        assert_eq!(
            utc("Tue, 10 Jun 2025 04:00:00 PDT"),
            expect("2025-06-10T11:00:00Z")
        );
        assert_eq!(
            utc("Wed, 15 Jan 2025 04:00:00 PST"),
            expect("2025-01-15T12:00:00Z")
        );
    }

    #[test]
    fn abbreviation_outside_rfc2822_is_substituted() {
        assert_eq!(
            utc("Wed, 02 Oct 2024 08:00:00 CEST"),
            expect("2024-10-02T06:00:00Z")
        );
        assert_eq!(
            utc("2024-10-02 08:00:00 BST"),
            expect("2024-10-02T07:00:00Z")
        );
    }

    #[test]
    fn iso_and_naive_forms() {
        assert_eq!(utc("2024-10-02T08:00:00Z"), expect("2024-10-02T08:00:00Z"));
        assert_eq!(
            utc("2024-10-02T08:00:00+01:00"),
            expect("2024-10-02T07:00:00Z")
        );
        assert_eq!(utc("2024-10-02 08:00:00"), expect("2024-10-02T08:00:00Z"));
    }

    #[test]
    fn wrong_weekday_still_parses() {
        // 10 Jun 2025 is a Tuesday
        assert_eq!(
            utc("Fri, 10 Jun 2025 04:00:00 +0000"),
            expect("2025-06-10T04:00:00Z")
        );
    }

    #[test]
    fn garbage_is_an_error() {
        assert_eq!(parse_date("   "), Err(DateError::Empty));
        assert!(matches!(
            parse_date("sometime last week"),
            Err(DateError::Unparseable(_))
        ));
        assert!(parse_date("Tue, 10 Jun 2025 04:00:00 XYZ").is_err());
    }

    #[test]
    fn zone_lookup_ignores_case() {
        assert_eq!(zone_offset("pdt"), Some("-0700"));
        assert_eq!(zone_offset("Nowhere"), None);
    }
}
