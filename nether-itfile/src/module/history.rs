//! Edit history records
//!
//! Dates and times use the packed DOS layout:
//! - date: `yyyyyyy mmmm ddddd` (year offset from 1980, month, day)
//! - time: `hhhhh mmmmmm sssss` (hour, minute, seconds / 2)

use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};

/// Length of one DOS timer tick, 100/1820 s (~18.2 Hz)
pub const DOS_TICK: Duration = Duration::from_nanos(100_000_000_000 / 1820);

/// Packed DOS date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditDate(pub u16);

impl EditDate {
    /// (year, month 1-12, day 1-31) as stored; not range checked
    pub fn components(&self) -> (i32, u32, u32) {
        let year = ((self.0 >> 9) & 0x7F) as i32 + 1980;
        let month = ((self.0 >> 5) & 0x0F) as u32;
        let day = (self.0 & 0x1F) as u32;
        (year, month, day)
    }

    /// Calendar date, `None` if the packed fields are out of range
    pub fn to_naive_date(&self) -> Option<NaiveDate> {
        let (year, month, day) = self.components();
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// Packed DOS time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditTime(pub u16);

impl EditTime {
    /// (hour, minute, second); seconds have two-second resolution
    pub fn components(&self) -> (u32, u32, u32) {
        let hour = ((self.0 >> 11) & 0x1F) as u32;
        let minute = ((self.0 >> 5) & 0x3F) as u32;
        let second = ((self.0 << 1) & 0x3F) as u32;
        (hour, minute, second)
    }

    /// Wall-clock time, `None` if the packed fields are out of range
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let (hour, minute, second) = self.components();
        NaiveTime::from_hms_opt(hour, minute, second)
    }
}

/// Time spent editing, in DOS timer ticks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Runtime(pub u32);

impl Runtime {
    pub fn duration(&self) -> Duration {
        DOS_TICK * self.0
    }
}

/// One edit session (8 bytes on disk)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EditHistory {
    pub date: EditDate,
    pub time: EditTime,
    pub runtime: Runtime,
}

impl EditHistory {
    pub const SIZE: usize = 8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_components() {
        // 2004-07-15: year offset 24
        let packed = (24 << 9) | (7 << 5) | 15;
        let date = EditDate(packed);
        assert_eq!(date.components(), (2004, 7, 15));
        assert_eq!(
            date.to_naive_date(),
            NaiveDate::from_ymd_opt(2004, 7, 15)
        );
    }

    #[test]
    fn test_invalid_date() {
        // Month 0 is not a calendar month
        assert_eq!(EditDate(0).to_naive_date(), None);
    }

    #[test]
    fn test_time_components() {
        // 13:45:30 -> seconds stored halved
        let packed = (13 << 11) | (45 << 5) | 15;
        let time = EditTime(packed);
        assert_eq!(time.components(), (13, 45, 30));
        assert_eq!(time.to_naive_time(), NaiveTime::from_hms_opt(13, 45, 30));
    }

    #[test]
    fn test_runtime_duration() {
        assert_eq!(Runtime(0).duration(), Duration::ZERO);
        // 1820 ticks = 100 seconds
        let d = Runtime(1820).duration();
        assert!((d.as_secs_f64() - 100.0).abs() < 1e-3);
    }
}
