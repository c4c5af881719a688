use chrono::{Datelike, NaiveDate};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Per-date availability override set by the admin. Absence of a record
/// means the date is fully open at the default capacity. A record with
/// weekly recurrence also applies to every later date on the same weekday.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityOverride {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// "YYYY-MM-DD", unique per record
    pub date: String,
    pub all_day_blocked: bool,
    pub blocked_times: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recurrence: Option<Recurrence>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_bookings_per_slot: Option<u32>,
}

impl AvailabilityOverride {
    pub fn blank(date: &str) -> Self {
        Self {
            id: None,
            date: date.to_string(),
            all_day_blocked: false,
            blocked_times: Vec::new(),
            recurrence: None,
            max_bookings_per_slot: None,
        }
    }

    pub fn blocks_time(&self, time: &str) -> bool {
        self.all_day_blocked || self.blocked_times.iter().any(|t| t == time)
    }

    /// Whether this record governs the given calendar date: either an
    /// exact match, or a weekly record anchored on the same weekday at or
    /// before the date.
    pub fn applies_on(&self, day: NaiveDate) -> bool {
        match NaiveDate::parse_from_str(&self.date, "%Y-%m-%d") {
            Ok(own) => {
                own == day
                    || (self.recurrence == Some(Recurrence::Weekly)
                        && own <= day
                        && own.weekday() == day.weekday())
            }
            Err(_) => false,
        }
    }

    /// True when the record constrains nothing and can be deleted, which
    /// is what makes the admin toggles round-trip to a clean state.
    pub fn is_blank(&self) -> bool {
        !self.all_day_blocked
            && self.blocked_times.is_empty()
            && self.recurrence.is_none()
            && self.max_bookings_per_slot.is_none()
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Recurrence {
    Weekly,
}

/// Per-slot reservation counter. One document per occupied slot, guarded
/// by a unique index on `slot_start`; reservation is a conditional `$inc`.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SlotReservation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub slot_start: i64,
    pub count: i32,
}

/// True when any of the records covering a date blocks the given time.
pub fn any_blocks(records: &[AvailabilityOverride], time: &str) -> bool {
    records.iter().any(|r| r.blocks_time(time))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleDateRequest {
    pub date: String,
    /// Set alongside a block to repeat it every week from this date on.
    #[serde(default)]
    pub recurrence: Option<Recurrence>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleSlotRequest {
    pub date: String,
    pub time: String,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocks_time() {
        let mut a = AvailabilityOverride::blank("2026-09-01");
        assert!(!a.blocks_time("09:00"));
        a.blocked_times.push("09:00".to_string());
        assert!(a.blocks_time("09:00"));
        assert!(!a.blocks_time("10:00"));
        a.all_day_blocked = true;
        assert!(a.blocks_time("10:00"));
    }

    #[test]
    fn test_applies_on_exact_date() {
        let a = AvailabilityOverride::blank("2026-08-24");
        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert!(a.applies_on(monday));
        assert!(!a.applies_on(tuesday));
        // Without recurrence, the same weekday a week later is untouched
        assert!(!a.applies_on(NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()));
    }

    #[test]
    fn test_weekly_recurrence_matches_weekday() {
        let mut a = AvailabilityOverride::blank("2026-08-24");
        a.all_day_blocked = true;
        a.recurrence = Some(Recurrence::Weekly);
        // Mondays after the anchor are covered
        assert!(a.applies_on(NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()));
        assert!(a.applies_on(NaiveDate::from_ymd_opt(2026, 9, 7).unwrap()));
        // Other weekdays and dates before the anchor are not
        assert!(!a.applies_on(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()));
        assert!(!a.applies_on(NaiveDate::from_ymd_opt(2026, 8, 17).unwrap()));
    }

    #[test]
    fn test_any_blocks_merges_records() {
        let mut exact = AvailabilityOverride::blank("2026-08-31");
        exact.blocked_times.push("10:00".to_string());
        let mut weekly = AvailabilityOverride::blank("2026-08-24");
        weekly.blocked_times.push("09:00".to_string());
        weekly.recurrence = Some(Recurrence::Weekly);

        let records = vec![exact, weekly];
        assert!(any_blocks(&records, "09:00"));
        assert!(any_blocks(&records, "10:00"));
        assert!(!any_blocks(&records, "11:00"));
    }

    #[test]
    fn test_is_blank() {
        let mut a = AvailabilityOverride::blank("2026-09-01");
        assert!(a.is_blank());
        a.all_day_blocked = true;
        assert!(!a.is_blank());
        a.all_day_blocked = false;
        a.max_bookings_per_slot = Some(3);
        assert!(!a.is_blank());
    }
}
