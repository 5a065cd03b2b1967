use chrono::{Days, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

/// Which side of "today" a bar segment lies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentPhase {
    Past,
    Active,
}

impl SegmentPhase {
    pub fn label(&self) -> &'static str {
        match self {
            SegmentPhase::Past => "Past",
            SegmentPhase::Active => "Active",
        }
    }
}

/// One drawable piece of a task bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub phase: SegmentPhase,
    /// `false` on the first half of a split bar so the label is drawn once.
    pub show_label: bool,
    /// Where the bar is drawn to. Only for presentation; never use it in
    /// date arithmetic.
    pub display_end: NaiveDateTime,
}

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// `date` moved by `days`, saturating at the ends of the calendar.
pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let delta = Days::new(days.unsigned_abs());
    if days >= 0 {
        date.checked_add_days(delta).unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(delta).unwrap_or(NaiveDate::MIN)
    }
}

/// Split `[start, finish]` at `today` for two-tone rendering.
///
/// A bar that is not split ends `gap_hours` early so chained bars on the same
/// row keep a visible gap. `gap_hours` is expected to be below 24.
pub fn segment_interval(
    start: NaiveDate,
    finish: NaiveDate,
    today: NaiveDate,
    gap_hours: u32,
) -> Vec<Segment> {
    if start < today && today < finish {
        return vec![
            Segment {
                start,
                end: today,
                phase: SegmentPhase::Past,
                show_label: false,
                display_end: midnight(today),
            },
            Segment {
                start: today,
                end: finish,
                phase: SegmentPhase::Active,
                show_label: true,
                display_end: midnight(finish),
            },
        ];
    }

    let phase = if finish <= today {
        SegmentPhase::Past
    } else {
        SegmentPhase::Active
    };
    vec![Segment {
        start,
        end: finish,
        phase,
        show_label: true,
        display_end: midnight(finish)
            .checked_sub_signed(Duration::hours(i64::from(gap_hours)))
            .unwrap_or(NaiveDateTime::MIN),
    }]
}

/// The date range a chart needs to show every task, with some padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimelineRange {
    const LEAD_DAYS: i64 = 7;
    const TAIL_DAYS: i64 = 30;

    /// Cover every interval plus `today`, padded a week before and a month
    /// after.
    pub fn covering(
        intervals: impl IntoIterator<Item = (NaiveDate, NaiveDate)>,
        today: NaiveDate,
    ) -> Self {
        let (start, end) = intervals
            .into_iter()
            .fold((today, today), |(lo, hi), (s, f)| (lo.min(s), hi.max(f)));
        Self {
            start: shift_days(start, -Self::LEAD_DAYS),
            end: shift_days(end, Self::TAIL_DAYS),
        }
    }

    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}
