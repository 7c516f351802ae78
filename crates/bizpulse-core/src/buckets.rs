//! Dense calendar bucketing for visit charts.
//!
//! Both series are zero-filled before any event is scanned, so sparse (or
//! empty) inputs still yield a full-length series the charts can render.

use chrono::{DateTime, Duration, NaiveDate, Timelike, Utc};
use serde::Serialize;

/// Weekday-label bucketing is only collision-free while the window never
/// exceeds one week: an 8-day window would merge two different Mondays
/// under the same label. The window is therefore a hard constant, not a
/// parameter.
pub const WEEKDAY_WINDOW_DAYS: i64 = 7;

/// Hour-of-day buckets for the "today" chart.
pub const HOURS_PER_DAY: usize = 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketPoint {
    pub label: String,
    pub count: i64,
}

/// First day (inclusive) of the trailing weekday window ending at `window_end`.
pub fn weekday_window_start(window_end: NaiveDate) -> NaiveDate {
    window_end - Duration::days(WEEKDAY_WINDOW_DAYS - 1)
}

/// Visits per weekday over the trailing 7 calendar days ending at
/// `window_end` (inclusive), in window order. Timestamps outside the window
/// are ignored; every day in the window appears even at zero.
pub fn weekday_series(window_end: NaiveDate, timestamps: &[DateTime<Utc>]) -> Vec<BucketPoint> {
    let start = weekday_window_start(window_end);
    let mut series: Vec<BucketPoint> = (0..WEEKDAY_WINDOW_DAYS)
        .map(|offset| BucketPoint {
            label: (start + Duration::days(offset)).format("%a").to_string(),
            count: 0,
        })
        .collect();

    for ts in timestamps {
        let date = ts.date_naive();
        if date < start || date > window_end {
            continue;
        }
        let idx = (date - start).num_days() as usize;
        series[idx].count += 1;
    }

    series
}

/// Visits per hour of `day`, 24 zero-padded buckets "00".."23".
pub fn hourly_series(day: NaiveDate, timestamps: &[DateTime<Utc>]) -> Vec<BucketPoint> {
    let mut series: Vec<BucketPoint> = (0..HOURS_PER_DAY)
        .map(|hour| BucketPoint {
            label: format!("{hour:02}"),
            count: 0,
        })
        .collect();

    for ts in timestamps {
        if ts.date_naive() != day {
            continue;
        }
        series[ts.hour() as usize].count += 1;
    }

    series
}

/// The all-zero weekday series, used as the degraded value when the store
/// read behind the chart fails.
pub fn zero_weekday_series(window_end: NaiveDate) -> Vec<BucketPoint> {
    weekday_series(window_end, &[])
}

/// The all-zero hourly series, degraded counterpart of [`hourly_series`].
pub fn zero_hourly_series(day: NaiveDate) -> Vec<BucketPoint> {
    hourly_series(day, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, 30, 0).single().unwrap()
    }

    fn date(y: i32, mo: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap()
    }

    #[test]
    fn weekday_series_is_dense_with_unique_ordered_labels() {
        // 2024-03-10 is a Sunday; window runs Mon 03-04 .. Sun 03-10.
        let series = weekday_series(date(2024, 3, 10), &[]);
        assert_eq!(series.len(), WEEKDAY_WINDOW_DAYS as usize);
        let labels: Vec<&str> = series.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]
        );
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn weekday_series_counts_only_mon_and_thu() {
        // Events on Mon 03-04 (x2) and Thu 03-07 (x1) only.
        let events = vec![
            ts(2024, 3, 4, 9),
            ts(2024, 3, 4, 18),
            ts(2024, 3, 7, 12),
        ];
        let series = weekday_series(date(2024, 3, 10), &events);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0], BucketPoint { label: "Mon".into(), count: 2 });
        assert_eq!(series[3], BucketPoint { label: "Thu".into(), count: 1 });
        let zeroes = series.iter().filter(|p| p.count == 0).count();
        assert_eq!(zeroes, 5);
    }

    #[test]
    fn weekday_series_ignores_out_of_window_timestamps() {
        let events = vec![ts(2024, 3, 3, 10), ts(2024, 3, 11, 10)];
        let series = weekday_series(date(2024, 3, 10), &events);
        assert!(series.iter().all(|p| p.count == 0));
    }

    #[test]
    fn hourly_series_is_dense_and_zero_padded() {
        let series = hourly_series(date(2024, 3, 10), &[]);
        assert_eq!(series.len(), HOURS_PER_DAY);
        assert_eq!(series[0].label, "00");
        assert_eq!(series[9].label, "09");
        assert_eq!(series[23].label, "23");
    }

    #[test]
    fn hourly_series_buckets_by_hour_and_skips_other_days() {
        let events = vec![
            ts(2024, 3, 10, 9),
            ts(2024, 3, 10, 9),
            ts(2024, 3, 10, 23),
            ts(2024, 3, 9, 9), // previous day, ignored
        ];
        let series = hourly_series(date(2024, 3, 10), &events);
        assert_eq!(series[9].count, 2);
        assert_eq!(series[23].count, 1);
        assert_eq!(series.iter().map(|p| p.count).sum::<i64>(), 3);
    }

    #[test]
    fn zero_series_match_empty_input() {
        let day = date(2024, 3, 10);
        assert_eq!(zero_weekday_series(day), weekday_series(day, &[]));
        assert_eq!(zero_hourly_series(day), hourly_series(day, &[]));
    }
}
