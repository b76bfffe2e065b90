use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};

const FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses the API's UTC-naive timestamps; offsets, when present, are folded into UTC.
pub fn parse_utc_naive(raw: &str) -> Option<NaiveDateTime> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }
    for fmt in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(cleaned, fmt) {
            return Some(dt);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cleaned) {
        return Some(dt.naive_utc());
    }
    NaiveDate::parse_from_str(cleaned, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

pub fn to_display(raw: &str, offset_hours: i32) -> Option<NaiveDateTime> {
    parse_utc_naive(raw).map(|dt| dt + Duration::hours(offset_hours as i64))
}

pub fn format_date(raw: &str, offset_hours: i32) -> String {
    match to_display(raw, offset_hours) {
        Some(dt) => dt.format("%a %d %b %Y").to_string(),
        None => fallback(raw),
    }
}

pub fn format_time(raw: &str, offset_hours: i32) -> String {
    match to_display(raw, offset_hours) {
        Some(dt) => dt.format("%H:%M").to_string(),
        None => fallback(raw),
    }
}

pub fn format_kickoff(raw: &str, offset_hours: i32) -> String {
    match to_display(raw, offset_hours) {
        Some(dt) => dt.format("%a %d %b %H:%M").to_string(),
        None => fallback(raw),
    }
}

/// Short `16/08` day label used on fixture cards.
pub fn format_day_month(raw: &str, offset_hours: i32) -> String {
    match to_display(raw, offset_hours) {
        Some(dt) => dt.format("%d/%m").to_string(),
        None => fallback(raw),
    }
}

fn fallback(raw: &str) -> String {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return "TBD".to_string();
    }
    cleaned.replace('T', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_api_formats() {
        assert!(parse_utc_naive("2025-08-16 19:00:00").is_some());
        assert!(parse_utc_naive("2025-08-16T19:00:00").is_some());
        assert!(parse_utc_naive("2025-08-16T19:00:00Z").is_some());
        assert!(parse_utc_naive("2025-08-16 19:00").is_some());
        assert!(parse_utc_naive("2025-08-16").is_some());
        assert!(parse_utc_naive("soon").is_none());
    }

    #[test]
    fn offsets_shift_date_and_time() {
        assert_eq!(format_date("2025-08-16 19:00:00", 0), "Sat 16 Aug 2025");
        assert_eq!(format_time("2025-08-16 19:00:00", 0), "19:00");
        assert_eq!(format_time("2025-08-16 19:00:00", 8), "03:00");
        assert_eq!(format_date("2025-08-16 19:00:00", 8), "Sun 17 Aug 2025");
        assert_eq!(format_kickoff("2025-08-16T19:00:00Z", 1), "Sat 16 Aug 20:00");
        assert_eq!(format_day_month("2025-08-16 19:00:00", 0), "16/08");
    }

    #[test]
    fn unparseable_input_is_passed_through() {
        assert_eq!(format_kickoff("", 0), "TBD");
        assert_eq!(format_date("  postponed ", 0), "postponed");
    }
}
