use chrono::{Duration, Months, NaiveDate};

use crate::models::servicerequestmodel::Frequency;

/// Next calendar date strictly after `anchor` for the given cadence.
/// Month-based frequencies preserve the day-of-month, clamping at the end of
/// a shorter month (Jan 31 -> Feb 28/29). OneTime never recurs.
pub fn next_occurrence(anchor: NaiveDate, frequency: Frequency) -> Option<NaiveDate> {
    match frequency {
        Frequency::OneTime => None,
        Frequency::Daily => anchor.checked_add_signed(Duration::days(1)),
        Frequency::Weekly => anchor.checked_add_signed(Duration::days(7)),
        Frequency::BiWeekly => anchor.checked_add_signed(Duration::days(14)),
        Frequency::Monthly => anchor.checked_add_months(Months::new(1)),
        Frequency::Quarterly => anchor.checked_add_months(Months::new(3)),
    }
}

/// Coarse day count used for horizon iteration only. OneTime uses a one-year
/// sentinel so a horizon loop steps past any realistic planning window.
pub fn interval_days(frequency: Frequency) -> i64 {
    match frequency {
        Frequency::Daily => 1,
        Frequency::Weekly => 7,
        Frequency::BiWeekly => 14,
        Frequency::Monthly => 30,
        Frequency::Quarterly => 90,
        Frequency::OneTime => 365,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_fixed_interval_frequencies() {
        let anchor = date(2025, 3, 1);
        assert_eq!(
            next_occurrence(anchor, Frequency::Daily),
            Some(date(2025, 3, 2))
        );
        assert_eq!(
            next_occurrence(anchor, Frequency::Weekly),
            Some(date(2025, 3, 8))
        );
        assert_eq!(
            next_occurrence(anchor, Frequency::BiWeekly),
            Some(date(2025, 3, 15))
        );
    }

    #[test]
    fn test_one_time_never_recurs() {
        assert_eq!(next_occurrence(date(2025, 3, 1), Frequency::OneTime), None);
    }

    #[test]
    fn test_monthly_clamps_at_short_month_end() {
        // Non-leap February
        assert_eq!(
            next_occurrence(date(2025, 1, 31), Frequency::Monthly),
            Some(date(2025, 2, 28))
        );
        // Leap February
        assert_eq!(
            next_occurrence(date(2024, 1, 31), Frequency::Monthly),
            Some(date(2024, 2, 29))
        );
        // 31st into a 30-day month
        assert_eq!(
            next_occurrence(date(2025, 3, 31), Frequency::Monthly),
            Some(date(2025, 4, 30))
        );
        // Mid-month days are preserved as-is
        assert_eq!(
            next_occurrence(date(2025, 1, 15), Frequency::Monthly),
            Some(date(2025, 2, 15))
        );
    }

    #[test]
    fn test_quarterly_preserves_day_of_month() {
        assert_eq!(
            next_occurrence(date(2025, 1, 31), Frequency::Quarterly),
            Some(date(2025, 4, 30))
        );
        assert_eq!(
            next_occurrence(date(2025, 2, 15), Frequency::Quarterly),
            Some(date(2025, 5, 15))
        );
    }

    #[test]
    fn test_applying_twice_moves_strictly_forward() {
        let anchor = date(2025, 1, 31);
        for frequency in [
            Frequency::Daily,
            Frequency::Weekly,
            Frequency::BiWeekly,
            Frequency::Monthly,
            Frequency::Quarterly,
        ] {
            let once = next_occurrence(anchor, frequency).unwrap();
            let twice = next_occurrence(once, frequency).unwrap();
            assert!(once > anchor, "{:?} did not advance", frequency);
            assert!(twice > once, "{:?} did not advance twice", frequency);
        }
    }

    #[test]
    fn test_interval_days() {
        assert_eq!(interval_days(Frequency::Daily), 1);
        assert_eq!(interval_days(Frequency::Weekly), 7);
        assert_eq!(interval_days(Frequency::BiWeekly), 14);
        assert_eq!(interval_days(Frequency::Monthly), 30);
        assert_eq!(interval_days(Frequency::Quarterly), 90);
        assert_eq!(interval_days(Frequency::OneTime), 365);
    }
}
