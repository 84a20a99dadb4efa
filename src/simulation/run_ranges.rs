//! Date ranges of successive VIC runs.
//!
//! The first run spans the spin-up period up to the end of the first glacier
//! water year. Each later run covers one year, aligned with the glacier start
//! date, until the overall end date.

use chrono::{Datelike, Days, Months, NaiveDate};
use tracing::warn;

/// Inclusive start and end date of one VIC run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl RunRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }
}

/// Iterator over the run ranges of a coupled simulation.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use hydro_conductor::simulation::RunRanges;
///
/// let d = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).unwrap();
/// let mut ranges = RunRanges::new(d(1950, 1, 1), d(1995, 12, 31), d(1955, 10, 1));
///
/// let first = ranges.next().unwrap();
/// assert_eq!((first.start, first.end), (d(1950, 1, 1), d(1956, 9, 30)));
/// let second = ranges.next().unwrap();
/// assert_eq!((second.start, second.end), (d(1956, 10, 1), d(1957, 9, 30)));
/// ```
#[derive(Clone, Debug)]
pub struct RunRanges {
    end: NaiveDate,
    first: Option<RunRange>,
    prev_end: Option<NaiveDate>,
}

impl RunRanges {
    /// Ranges from `start` to `end` with glacier years starting on `glacier_start`.
    ///
    /// A `glacier_start` other than October 1 (the water year) is accepted
    /// with a warning.
    pub fn new(start: NaiveDate, end: NaiveDate, glacier_start: NaiveDate) -> Self {
        if (glacier_start.month(), glacier_start.day()) != (10, 1) {
            warn!(
                %glacier_start,
                "glacier start is not aligned to the water year (October 1)"
            );
        }
        let first = glacier_start
            .checked_sub_days(Days::new(1))
            .and_then(year_later)
            .map(|first_end| RunRange::new(start, first_end));
        Self {
            end,
            first,
            prev_end: None,
        }
    }
}

fn year_later(date: NaiveDate) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(12))
}

impl Iterator for RunRanges {
    type Item = RunRange;

    fn next(&mut self) -> Option<RunRange> {
        if let Some(first) = self.first.take() {
            self.prev_end = Some(first.end);
            return Some(first);
        }

        let prev_end = self.prev_end?;
        if prev_end >= self.end {
            self.prev_end = None;
            return None;
        }
        let start = prev_end.checked_add_days(Days::new(1))?;
        let end = year_later(start)?
            .checked_sub_days(Days::new(1))?
            .min(self.end);
        self.prev_end = Some(end);
        Some(RunRange::new(start, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_water_year_sequence() {
        let ranges: Vec<_> = RunRanges::new(d(1950, 1, 1), d(1995, 12, 31), d(1955, 10, 1)).collect();
        assert_eq!(ranges[0], RunRange::new(d(1950, 1, 1), d(1956, 9, 30)));
        assert_eq!(ranges[1], RunRange::new(d(1956, 10, 1), d(1957, 9, 30)));
        assert_eq!(ranges[39], RunRange::new(d(1994, 10, 1), d(1995, 9, 30)));
        assert_eq!(*ranges.last().unwrap(), RunRange::new(d(1995, 10, 1), d(1995, 12, 31)));
        assert_eq!(ranges.len(), 41);

        for pair in ranges.windows(2) {
            assert_eq!(pair[0].end.succ_opt().unwrap(), pair[1].start);
        }
    }

    #[test]
    fn test_end_on_water_year_boundary() {
        let ranges: Vec<_> = RunRanges::new(d(2000, 1, 1), d(2003, 9, 30), d(2000, 10, 1)).collect();
        assert_eq!(ranges.len(), 3);
        assert_eq!(ranges[0].end, d(2001, 9, 30));
        assert_eq!(ranges[2], RunRange::new(d(2002, 10, 1), d(2003, 9, 30)));
    }

    #[test]
    fn test_single_range_when_end_before_first_year() {
        let ranges: Vec<_> = RunRanges::new(d(2000, 1, 1), d(2000, 6, 30), d(2000, 10, 1)).collect();
        assert_eq!(ranges, vec![RunRange::new(d(2000, 1, 1), d(2001, 9, 30))]);
    }
}
