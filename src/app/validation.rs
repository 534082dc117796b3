use anyhow::{Result, bail};
use chrono::NaiveDate;

/// Number of days in the inclusive range `[start, end]`.
pub(crate) fn day_count(start: NaiveDate, end: NaiveDate) -> Result<u32> {
    if end < start {
        bail!("--end-date {end} is before --start-date {start}");
    }
    let days = (end - start).num_days() + 1;
    u32::try_from(days).map_err(|_| anyhow::anyhow!("Date range of {days} days is too large"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_single_day_range() {
        assert_eq!(day_count(date(2024, 3, 5), date(2024, 3, 5)).unwrap(), 1);
    }

    #[test]
    fn test_range_across_month_end() {
        assert_eq!(day_count(date(2024, 2, 27), date(2024, 3, 2)).unwrap(), 5);
    }

    #[test]
    fn test_end_before_start_rejected() {
        let err = day_count(date(2024, 3, 5), date(2024, 3, 4)).unwrap_err();
        assert!(err.to_string().contains("before"));
    }
}
