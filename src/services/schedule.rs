use chrono::{NaiveDate, NaiveTime};

/// The time footprint of an activity: it recurs daily between `start_time`
/// and `end_time` for every day in `start_date..=end_date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActivityWindow {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

/// Two activities conflict when their date ranges intersect AND their daily
/// time-of-day ranges intersect. Dates are inclusive ranges; times are
/// half-open intervals, so back-to-back slots (10:00-11:00 vs 11:00-12:00)
/// do not conflict.
pub fn overlaps(a: &ActivityWindow, b: &ActivityWindow) -> bool {
    let dates_overlap = a.start_date <= b.end_date && a.end_date >= b.start_date;
    if !dates_overlap {
        return false;
    }
    a.start_time < b.end_time && a.end_time > b.start_time
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(sd: &str, ed: &str, st: &str, et: &str) -> ActivityWindow {
        ActivityWindow {
            start_date: sd.parse().unwrap(),
            end_date: ed.parse().unwrap(),
            start_time: st.parse().unwrap(),
            end_time: et.parse().unwrap(),
        }
    }

    #[test]
    fn symmetric() {
        let a = window("2024-06-10", "2024-06-14", "09:00:00", "11:00:00");
        let b = window("2024-06-12", "2024-06-20", "10:00:00", "12:00:00");
        assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn self_overlap_when_window_nonempty() {
        let a = window("2024-06-10", "2024-06-10", "09:00:00", "10:00:00");
        assert!(overlaps(&a, &a));
    }

    #[test]
    fn disjoint_dates_never_conflict() {
        let a = window("2024-06-01", "2024-06-05", "09:00:00", "17:00:00");
        let b = window("2024-06-06", "2024-06-10", "09:00:00", "17:00:00");
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn same_dates_disjoint_times_do_not_conflict() {
        let a = window("2024-06-10", "2024-06-10", "09:00:00", "10:00:00");
        let b = window("2024-06-10", "2024-06-10", "14:00:00", "15:00:00");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn back_to_back_times_do_not_conflict() {
        let a = window("2024-06-10", "2024-06-10", "09:00:00", "11:00:00");
        let b = window("2024-06-10", "2024-06-10", "11:00:00", "13:00:00");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn contained_time_range_conflicts() {
        let a = window("2024-06-10", "2024-06-12", "09:00:00", "17:00:00");
        let b = window("2024-06-11", "2024-06-11", "10:00:00", "11:00:00");
        assert!(overlaps(&a, &b));
    }

    #[test]
    fn spec_scenario_partial_time_overlap() {
        // X approved 09:00-11:00; Y same day 10:00-12:00 must conflict.
        let x = window("2024-06-10", "2024-06-10", "09:00:00", "11:00:00");
        let y = window("2024-06-10", "2024-06-10", "10:00:00", "12:00:00");
        assert!(overlaps(&x, &y));
    }
}
