use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Parse the timestamp shapes Carto emits in CSV exports into UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS+hh` (Postgres text output),
/// offset-less date-times and bare dates. Values without an offset are UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // "%#z" takes both "+00" and "+00:00"
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_carto_shapes() {
        let want = utc(2025, 3, 4, 15, 6, 7);
        assert_eq!(parse_timestamp("2025-03-04T15:06:07Z"), Some(want));
        assert_eq!(parse_timestamp("2025-03-04 15:06:07+00"), Some(want));
        assert_eq!(parse_timestamp("2025-03-04 10:06:07-05:00"), Some(want));
        assert_eq!(parse_timestamp("2025-03-04 15:06:07"), Some(want));
        assert_eq!(parse_timestamp("2025-03-04T15:06:07"), Some(want));
        assert_eq!(parse_timestamp(" 2025-03-04 "), Some(utc(2025, 3, 4, 0, 0, 0)));
    }

    #[test]
    fn test_rejects_garbage() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("   "), None);
        assert_eq!(parse_timestamp("not a date"), None);
        assert_eq!(parse_timestamp("2025-13-40"), None);
    }
}
