//! Coverage arithmetic for partially stored candlestick series.
//!
//! Stored data is summarised by its outer bounds only. Missing data is
//! detected at the two ends of those bounds; a hole strictly inside them is
//! never fetched. [`interior_holes`] exists so callers can report such holes.

use chrono::{DurationRound, NaiveDate, NaiveDateTime, TimeDelta};
use shared::datetime::{end_of_day, start_of_day};

/// A user requested range, aligned to whole days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedRange {
    pub from: NaiveDateTime,
    pub to: NaiveDateTime,
}

impl RequestedRange {
    /// `from` at midnight through `to` at 23:59:59. `None` when `from` is after `to`.
    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Option<Self> {
        let from = start_of_day(from);
        let to = end_of_day(to);
        (from <= to).then_some(Self { from, to })
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from.date()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to.date()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GapKind {
    /// Nothing stored: `[from, to]`
    Full,
    /// Before the first stored bar: `[from, stored_min)`
    Leading,
    /// After the last stored bar: `(stored_max, to]`
    Trailing,
}

/// A sub-range that has to come from the external provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gap {
    pub kind: GapKind,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Gap {
    /// Whether `ts` falls in the gap, honouring the open end next to stored data.
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        match self.kind {
            GapKind::Full => self.start <= ts && ts <= self.end,
            GapKind::Leading => self.start <= ts && ts < self.end,
            GapKind::Trailing => self.start < ts && ts <= self.end,
        }
    }
}

/// Missing sub-ranges of `requested` given the `(min, max)` of stored bars.
pub fn detect_gaps(
    requested: RequestedRange,
    stored: Option<(NaiveDateTime, NaiveDateTime)>,
) -> Vec<Gap> {
    let Some((stored_min, stored_max)) = stored else {
        return vec![Gap {
            kind: GapKind::Full,
            start: requested.from,
            end: requested.to,
        }];
    };

    let mut gaps = Vec::with_capacity(2);

    if requested.from < stored_min {
        gaps.push(Gap {
            kind: GapKind::Leading,
            start: requested.from,
            end: stored_min,
        });
    }

    // The trailing gap must be able to hold at least one more minute bar
    if next_minute(stored_max) <= requested.to {
        gaps.push(Gap {
            kind: GapKind::Trailing,
            start: stored_max,
            end: requested.to,
        });
    }

    gaps
}

/// First whole minute strictly after `ts`.
fn next_minute(ts: NaiveDateTime) -> NaiveDateTime {
    let minute = TimeDelta::minutes(1);
    ts.duration_trunc(minute).unwrap_or(ts) + minute
}

/// Two consecutive stored bars further apart than the warning threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteriorHole {
    pub after: NaiveDateTime,
    pub before: NaiveDateTime,
}

impl InteriorHole {
    pub fn minutes(&self) -> i64 {
        (self.before - self.after).num_minutes()
    }
}

/// Holes longer than `threshold` between consecutive ascending `timestamps`.
pub fn interior_holes<'a, I>(timestamps: I, threshold: TimeDelta) -> Vec<InteriorHole>
where
    I: IntoIterator<Item = &'a NaiveDateTime>,
{
    let mut holes = Vec::new();
    let mut previous: Option<NaiveDateTime> = None;

    for &ts in timestamps {
        if let Some(after) = previous {
            if ts - after > threshold {
                holes.push(InteriorHole { after, before: ts });
            }
        }
        previous = Some(ts);
    }

    holes
}
