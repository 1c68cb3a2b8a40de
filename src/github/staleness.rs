use chrono::{DateTime, Duration, Utc};

/// True once an item has sat on the board strictly longer than the
/// threshold. Exactly-at-threshold is not stale.
pub fn is_stale(added_at: DateTime<Utc>, threshold: Duration, now: DateTime<Utc>) -> bool {
    now - added_at > threshold
}

/// Whole days an item has been on the board, floored. An item that never
/// entered a board has no answer, rather than zero or a negative.
pub fn days_on_board(added_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    added_at.map(|t| (now - t).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn added() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn not_stale_at_exact_threshold() {
        let now = added() + Duration::weeks(3);
        assert!(!is_stale(added(), Duration::weeks(3), now));
    }

    #[test]
    fn stale_one_second_past_threshold() {
        let now = added() + Duration::weeks(3) + Duration::seconds(1);
        assert!(is_stale(added(), Duration::weeks(3), now));
    }

    #[test]
    fn days_on_board_floors_partial_days() {
        let now = added() + Duration::hours(47);
        assert_eq!(days_on_board(Some(added()), now), Some(1));
    }

    #[test]
    fn days_on_board_unknown_without_timestamp() {
        assert_eq!(days_on_board(None, Utc::now()), None);
    }
}
