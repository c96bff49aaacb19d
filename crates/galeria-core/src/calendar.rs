//! Calendar Index: looks tasks up by calendar day.
//!
//! Linear scans over the slice handed in; nothing is cached between calls.

use std::collections::BTreeMap;

use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};

use crate::error::{GaleriaError, Result};
use crate::task::Task;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarIndex {
    offset: FixedOffset,
}

impl Default for CalendarIndex {
    fn default() -> Self {
        Self::utc()
    }
}

impl CalendarIndex {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self {
            offset: Utc.fix(),
        }
    }

    /// Builds an index for a `[calendar] utc_offset_minutes` setting.
    pub fn from_offset_minutes(minutes: i32) -> Result<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .ok_or_else(|| GaleriaError::config(format!("invalid UTC offset: {} minutes", minutes)))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The calendar day a task falls on, in this index's offset.
    pub fn day_of(&self, task: &Task) -> NaiveDate {
        task.date.with_timezone(&self.offset).date_naive()
    }

    /// Tasks whose date is `year`/`month_index`/`day`. `month_index` is
    /// zero-based (January is 0).
    pub fn by_date<'a>(
        &self,
        tasks: &'a [Task],
        year: i32,
        month_index: u32,
        day: u32,
    ) -> Vec<&'a Task> {
        tasks
            .iter()
            .filter(|task| {
                let date = self.day_of(task);
                date.year() == year && date.month0() == month_index && date.day() == day
            })
            .collect()
    }

    /// Tasks of one month grouped by day of month.
    pub fn by_month<'a>(
        &self,
        tasks: &'a [Task],
        year: i32,
        month_index: u32,
    ) -> BTreeMap<u32, Vec<&'a Task>> {
        let mut days: BTreeMap<u32, Vec<&'a Task>> = BTreeMap::new();
        for task in tasks {
            let date = self.day_of(task);
            if date.year() == year && date.month0() == month_index {
                days.entry(date.day()).or_default().push(task);
            }
        }
        days
    }
}
