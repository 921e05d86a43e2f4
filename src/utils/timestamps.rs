use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Parse client-supplied timestamps. Accepts RFC 3339, a zone-less
/// datetime (taken as UTC), or a bare date (midnight UTC) — the three
/// shapes date pickers and `toISOString()` clients actually send.
pub fn parse_timestamp(value: &str) -> Option<OffsetDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = OffsetDateTime::parse(value, &Rfc3339) {
        return Some(ts);
    }

    let with_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
    if let Ok(dt) = PrimitiveDateTime::parse(value, &with_seconds) {
        return Some(dt.assume_utc());
    }

    let without_seconds = format_description!("[year]-[month]-[day]T[hour]:[minute]");
    if let Ok(dt) = PrimitiveDateTime::parse(value, &without_seconds) {
        return Some(dt.assume_utc());
    }

    let date_only = format_description!("[year]-[month]-[day]");
    if let Ok(date) = Date::parse(value, &date_only) {
        return Some(date.with_time(Time::MIDNIGHT).assume_utc());
    }

    None
}
