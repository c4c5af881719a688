use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

/// Hourly appointment slots in store-local time.
pub const BUSINESS_HOURS: [&str; 8] = [
    "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
];

/// Default per-slot capacity when no per-date override exists.
pub const DEFAULT_MAX_BOOKINGS_PER_SLOT: u32 = 2;

pub fn is_business_hour(time: &str) -> bool {
    BUSINESS_HOURS.contains(&time)
}

pub fn parse_date(date: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", date))
}

fn store_offset(utc_offset_hours: i32) -> Result<FixedOffset, String> {
    FixedOffset::east_opt(utc_offset_hours * 3600)
        .ok_or_else(|| format!("Invalid UTC offset {}", utc_offset_hours))
}

/// Normalizes a store-local (date, business hour) pair into the canonical
/// unix-seconds instant persisted on bookings and slot counters.
pub fn slot_start_epoch(date: &str, time: &str, utc_offset_hours: i32) -> Result<i64, String> {
    let day = parse_date(date)?;
    let tod = NaiveTime::parse_from_str(time, "%H:%M")
        .map_err(|_| format!("Invalid time '{}', expected HH:MM", time))?;
    let offset = store_offset(utc_offset_hours)?;
    let local = offset
        .from_local_datetime(&day.and_time(tod))
        .single()
        .ok_or_else(|| "Ambiguous local datetime".to_string())?;
    Ok(local.timestamp())
}

fn slot_local(slot_start: i64, utc_offset_hours: i32) -> Result<DateTime<FixedOffset>, String> {
    let offset = store_offset(utc_offset_hours)?;
    let utc = DateTime::<Utc>::from_timestamp(slot_start, 0)
        .ok_or_else(|| format!("Timestamp {} out of range", slot_start))?;
    Ok(utc.with_timezone(&offset))
}

/// Derived, non-authoritative display form for receipts and emails,
/// e.g. "Sunday, August 23, 2026, 9:00 AM".
pub fn slot_display(slot_start: i64, utc_offset_hours: i32) -> Result<String, String> {
    let local = slot_local(slot_start, utc_offset_hours)?;
    Ok(local.format("%A, %B %-d, %Y, %-I:%M %p").to_string())
}

/// Derived ("YYYY-MM-DD", "HH:MM") keys in store-local time.
pub fn slot_date_time(slot_start: i64, utc_offset_hours: i32) -> Result<(String, String), String> {
    let local = slot_local(slot_start, utc_offset_hours)?;
    Ok((
        local.format("%Y-%m-%d").to_string(),
        local.format("%H:%M").to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_round_trips_through_derived_keys() {
        let start = slot_start_epoch("2026-08-23", "09:00", -5).unwrap();
        let (date, time) = slot_date_time(start, -5).unwrap();
        assert_eq!(date, "2026-08-23");
        assert_eq!(time, "09:00");
    }

    #[test]
    fn test_offset_shifts_epoch() {
        let utc = slot_start_epoch("2026-08-23", "09:00", 0).unwrap();
        let central = slot_start_epoch("2026-08-23", "09:00", -5).unwrap();
        assert_eq!(central - utc, 5 * 3600);
    }

    #[test]
    fn test_display_formatting() {
        // 2026-08-23 is a Sunday
        let start = slot_start_epoch("2026-08-23", "09:00", 0).unwrap();
        let display = slot_display(start, 0).unwrap();
        assert_eq!(display, "Sunday, August 23, 2026, 9:00 AM");
    }

    #[test]
    fn test_afternoon_display() {
        let start = slot_start_epoch("2026-08-24", "14:00", 0).unwrap();
        let display = slot_display(start, 0).unwrap();
        assert_eq!(display, "Monday, August 24, 2026, 2:00 PM");
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(slot_start_epoch("08/23/2026", "09:00", 0).is_err());
        assert!(slot_start_epoch("2026-08-23", "9am", 0).is_err());
        assert!(parse_date("2026-13-40").is_err());
    }

    #[test]
    fn test_business_hours() {
        assert!(is_business_hour("09:00"));
        assert!(is_business_hour("16:00"));
        assert!(!is_business_hour("08:00"));
        assert!(!is_business_hour("17:00"));
        assert!(!is_business_hour("09:30"));
    }
}
