//! Splitting a provider fetch into row-limited windows.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

const MINUTES_PER_DAY: u32 = 60 * 24;

/// One provider call: calendar dates of `[start, end]` and its row limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub limit: u32,
}

impl FetchWindow {
    pub fn from_date(&self) -> NaiveDate {
        self.start.date()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.end.date()
    }
}

/// Whole days of minute bars that fit in one call, never less than one.
pub fn window_days(batch_limit: u32) -> u32 {
    (batch_limit / MINUTES_PER_DAY).max(1)
}

/// Consecutive windows covering `[start, end]` in chronological order.
///
/// Each window spans at most [`window_days`] days and asks for up to
/// `batch_limit` rows. The provider answers for whole calendar dates, so the
/// limit covers every bar of those dates, not only the minutes inside the window.
pub fn plan_windows(start: NaiveDateTime, end: NaiveDateTime, batch_limit: u32) -> Vec<FetchWindow> {
    let step = TimeDelta::days(i64::from(window_days(batch_limit)));
    let mut windows = Vec::new();
    let mut window_start = start;

    while window_start < end {
        let window_end = (window_start + step).min(end);
        windows.push(FetchWindow {
            start: window_start,
            end: window_end,
            limit: batch_limit.max(1),
        });
        window_start = window_end;
    }

    windows
}
