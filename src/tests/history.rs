// Unit Tests for Bounded Error History
//
// UNIT UNDER TEST: HistoryStore
//
// BUSINESS RESPONSIBILITY:
//   - Retains at most the configured number of records, evicting oldest-first
//   - Answers aggregate statistics queries over the retained records
//   - Detects persistent per-category failure within a sliding time window
//
// TEST COVERAGE:
//   - FIFO bound: 150 appends at capacity 100 keep the newest 100
//   - Statistics counts per category and severity, recent-window filtering
//   - Persistent-issue threshold is strictly greater-than
//   - Window filtering excludes records older than the window

use crate::error::ErrorCategory;
use crate::history::HistoryStore;
use crate::tests::helpers::record_at;
use chrono::Utc;
use std::time::Duration;

const FIVE_MINUTES: Duration = Duration::from_secs(300);

fn store(capacity: usize) -> HistoryStore {
    HistoryStore::new(capacity, 5, Duration::from_secs(3600))
}

#[cfg(test)]
mod bounding_tests {
    use super::*;

    #[test]
    fn test_appending_150_records_retains_the_newest_100() {
        let mut history = store(100);

        for i in 0..150 {
            history.append(record_at(
                ErrorCategory::Network,
                Utc::now(),
                &format!("error-{i}"),
            ));
        }

        assert_eq!(history.len(), 100, "Capacity bound must hold exactly");
        let codes: Vec<_> = history.all().map(|r| r.code.clone()).collect();
        assert_eq!(
            codes.first().map(String::as_str),
            Some("error-50"),
            "Oldest surviving record should be the 51st appended"
        );
        assert_eq!(codes.last().map(String::as_str), Some("error-149"));
    }

    #[test]
    fn test_records_are_returned_oldest_to_newest() {
        let mut history = store(10);
        history.append(record_at(ErrorCategory::Network, Utc::now(), "first"));
        history.append(record_at(ErrorCategory::Server, Utc::now(), "second"));

        let codes: Vec<_> = history.all().map(|r| r.code.as_str().to_owned()).collect();
        assert_eq!(codes, vec!["first", "second"]);
    }

    #[test]
    fn test_clear_drops_all_records() {
        let mut history = store(10);
        history.append(record_at(ErrorCategory::Network, Utc::now(), "x"));
        assert!(!history.is_empty());

        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.statistics().total_errors, 0);
    }
}

#[cfg(test)]
mod statistics_tests {
    use super::*;
    use crate::error::ErrorSeverity;

    #[test]
    fn test_statistics_count_by_category_and_severity() {
        let mut history = store(50);
        history.append(record_at(ErrorCategory::Network, Utc::now(), "a"));
        history.append(record_at(ErrorCategory::Network, Utc::now(), "b"));
        history.append(record_at(ErrorCategory::Protocol, Utc::now(), "c"));

        let stats = history.statistics();

        assert_eq!(stats.total_errors, 3);
        assert_eq!(stats.by_category.get(&ErrorCategory::Network), Some(&2));
        assert_eq!(stats.by_category.get(&ErrorCategory::Protocol), Some(&1));
        assert_eq!(stats.by_severity.get(&ErrorSeverity::Medium), Some(&3));
    }

    #[test]
    fn test_oversized_recent_window_includes_every_record() {
        let huge = Duration::from_secs(1_000_000_000_000_000);
        let mut history = HistoryStore::new(50, 5, huge);
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        history.append(record_at(ErrorCategory::Network, two_hours_ago, "old"));
        history.append(record_at(ErrorCategory::Network, Utc::now(), "fresh"));

        let stats = history.statistics();

        assert_eq!(stats.recent_errors.len(), 2);
    }

    #[test]
    fn test_recent_errors_exclude_records_older_than_the_window() {
        let mut history = store(50);
        let two_hours_ago = Utc::now() - chrono::Duration::hours(2);
        history.append(record_at(ErrorCategory::Network, two_hours_ago, "old"));
        history.append(record_at(ErrorCategory::Network, Utc::now(), "fresh"));

        let stats = history.statistics();

        assert_eq!(stats.total_errors, 2);
        assert_eq!(stats.recent_errors.len(), 1);
        assert_eq!(stats.recent_errors[0].code, "fresh");
    }
}

#[cfg(test)]
mod persistent_issue_tests {
    use super::*;

    #[test]
    fn test_six_records_in_window_is_persistent() {
        let mut history = store(50);
        for i in 0..6 {
            history.append(record_at(
                ErrorCategory::Network,
                Utc::now(),
                &format!("n-{i}"),
            ));
        }

        assert!(history.is_persistent_issue(ErrorCategory::Network, FIVE_MINUTES));
    }

    #[test]
    fn test_five_records_in_window_is_not_persistent() {
        // The threshold is strictly greater-than five.
        let mut history = store(50);
        for i in 0..5 {
            history.append(record_at(
                ErrorCategory::Network,
                Utc::now(),
                &format!("n-{i}"),
            ));
        }

        assert!(!history.is_persistent_issue(ErrorCategory::Network, FIVE_MINUTES));
    }

    #[test]
    fn test_records_outside_the_window_do_not_count() {
        let mut history = store(50);
        let ten_minutes_ago = Utc::now() - chrono::Duration::minutes(10);
        for i in 0..6 {
            history.append(record_at(
                ErrorCategory::Network,
                ten_minutes_ago,
                &format!("stale-{i}"),
            ));
        }

        assert!(
            !history.is_persistent_issue(ErrorCategory::Network, FIVE_MINUTES),
            "Records older than the window must not trip the threshold"
        );
    }

    #[test]
    fn test_oversized_window_covers_the_whole_history() {
        // Windows reaching past the representable time range must count
        // every retained record instead of panicking; the query surface is
        // side-effect-free and non-throwing for any caller-supplied window.
        let mut history = store(50);
        for i in 0..6 {
            history.append(record_at(
                ErrorCategory::Network,
                Utc::now(),
                &format!("n-{i}"),
            ));
        }

        let huge = Duration::from_secs(1_000_000_000_000_000);
        assert!(history.is_persistent_issue(ErrorCategory::Network, huge));
        assert!(!history.is_persistent_issue(ErrorCategory::Server, huge));
    }

    #[test]
    fn test_other_categories_do_not_count_toward_the_threshold() {
        let mut history = store(50);
        for i in 0..6 {
            history.append(record_at(
                ErrorCategory::Server,
                Utc::now(),
                &format!("s-{i}"),
            ));
        }

        assert!(!history.is_persistent_issue(ErrorCategory::Network, FIVE_MINUTES));
        assert!(history.is_persistent_issue(ErrorCategory::Server, FIVE_MINUTES));
    }
}
