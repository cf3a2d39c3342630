use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

/// Hours before departure after which a booking can no longer be canceled.
pub const CANCELLATION_CUTOFF_HOURS: i64 = 12;

/// Whether a booking for `travel_date` may still be canceled at `now`.
///
/// Travel dates carry no time of day, so midnight of the travel date is the
/// reference instant for the cutoff arithmetic. Exactly 12 hours remaining
/// still counts as open.
pub fn cancellation_open(travel_date: NaiveDate, now: DateTime<Utc>) -> bool {
    let departure = travel_date.and_time(NaiveTime::MIN).and_utc();
    departure.signed_duration_since(now) >= Duration::hours(CANCELLATION_CUTOFF_HOURS)
}

/// Picks the `count` lowest free seat numbers on a route with `total_seats`
/// seats, given the seats already booked for that route and date.
///
/// Returns `None` when fewer than `count` seats are free.
pub fn next_free_seats(total_seats: i32, booked: &[i32], count: usize) -> Option<Vec<i32>> {
    let free: Vec<i32> = (1..=total_seats).filter(|s| !booked.contains(s)).collect();
    if free.len() < count {
        return None;
    }
    Some(free[..count].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn instant(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn test_first_seat_on_empty_bus() {
        assert_eq!(next_free_seats(5, &[], 1), Some(vec![1]));
    }

    #[test]
    fn test_seats_fill_in_ascending_order() {
        assert_eq!(next_free_seats(5, &[1], 1), Some(vec![2]));
        assert_eq!(next_free_seats(5, &[1, 2], 2), Some(vec![3, 4]));
    }

    #[test]
    fn test_gaps_from_cancellations_are_reused() {
        assert_eq!(next_free_seats(5, &[1, 3, 4], 2), Some(vec![2, 5]));
    }

    #[test]
    fn test_no_seats_left() {
        assert_eq!(next_free_seats(5, &[1, 2, 3, 4, 5], 1), None);
        assert_eq!(next_free_seats(5, &[1, 2, 3], 3), None);
    }

    #[test]
    fn test_cancellation_open_well_before_cutoff() {
        assert!(cancellation_open(
            date("2026-08-20"),
            instant("2026-08-10T09:00:00Z")
        ));
    }

    #[test]
    fn test_cancellation_boundary_is_midnight_minus_twelve_hours() {
        // Exactly 12 hours before midnight of the travel date: still open
        assert!(cancellation_open(
            date("2026-08-20"),
            instant("2026-08-19T12:00:00Z")
        ));
        // One second past the cutoff: closed
        assert!(!cancellation_open(
            date("2026-08-20"),
            instant("2026-08-19T12:00:01Z")
        ));
    }

    #[test]
    fn test_cancellation_closed_on_travel_day() {
        assert!(!cancellation_open(
            date("2026-08-20"),
            instant("2026-08-20T06:00:00Z")
        ));
    }

    #[test]
    fn test_cancellation_closed_after_travel_date() {
        assert!(!cancellation_open(
            date("2026-08-20"),
            instant("2026-08-21T00:00:00Z")
        ));
    }
}
