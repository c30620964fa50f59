use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone};

/// Parse a date or date-time string under one strptime-style format.
///
/// Formats without time directives parse as a bare date at midnight.
pub(crate) fn parse_naive(value: &str, format: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
        return Some(dt);
    }
    NaiveDate::parse_from_str(value, format)
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Resolve a naive timestamp against the caller-supplied offset.
pub(crate) fn attach_offset(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_and_bare_date() {
        let dt = parse_naive("19.08.2025 12:30", "%d.%m.%Y %H:%M").unwrap();
        assert_eq!(dt.to_string(), "2025-08-19 12:30:00");

        let d = parse_naive("19.08.2025", "%d.%m.%Y").unwrap();
        assert_eq!(d.to_string(), "2025-08-19 00:00:00");

        assert!(parse_naive("19.08.2025", "%d.%m.%Y %H:%M").is_none());
        assert!(parse_naive("not a date", "%d.%m.%Y").is_none());
    }
}
