use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// RFC 3339, zone-less date-time (UTC) or a bare date (midnight UTC)
pub fn parse_timestamp(input: &str) -> Option<DateTime<Utc>> {
    let s = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

/// A bare date, or the UTC date of a timestamp
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_timestamp(s).map(|dt| dt.date_naive()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_rfc3339_with_offset() {
        let dt = parse_timestamp("2025-03-10T09:30:00-03:00").unwrap();
        assert_eq!(dt.hour(), 12);
    }

    #[test]
    fn parses_datetime_local_input() {
        let dt = parse_timestamp("2025-03-10T09:30").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-10T09:30:00+00:00");
    }

    #[test]
    fn parses_bare_date_as_midnight() {
        let dt = parse_timestamp("2025-03-10").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_timestamp("amanhã").is_none());
        assert!(parse_date("10/03/2025").is_none());
    }

    #[test]
    fn date_from_timestamp() {
        let d = parse_date("2021-08-15T22:00:00Z").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2021, 8, 15).unwrap());
    }
}
