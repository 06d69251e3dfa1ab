use std::path::Path;

use csv::StringRecord;
use serde::Serialize;
use tracing::warn;

use super::table::{ScheduleError, ScheduleTable};

/// Rows above this offset hold the sheet's title and column headers.
pub const FIRST_DATA_ROW: i64 = 6;

/// One day of the plan, as shown on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailySchedule {
    pub day_name: String,
    pub reading: String,     // methodical reading
    pub listening: String,   // methodical listening
    pub prep_weekly: String, // weekly preparation
    pub prep_prev: String,   // preparation for the next portion
    pub new_save: String,    // new memorization
    pub near_rev: String,    // recent review
    pub far_rev: String,     // distant review
}

impl DailySchedule {
    /// Highest cell offset read from a row.
    const LAST_COLUMN: usize = 13;

    pub fn from_row(row: &StringRecord) -> Result<Self, ScheduleError> {
        if row.len() <= Self::LAST_COLUMN {
            return Err(ScheduleError::Malformed(format!(
                "expected at least {} cells, found {}",
                Self::LAST_COLUMN + 1,
                row.len()
            )));
        }
        let cell = |c: usize| row[c].to_owned();

        Ok(Self {
            day_name: cell(0),
            reading: cell(1),
            listening: cell(3),
            prep_weekly: cell(5),
            prep_prev: cell(7),
            new_save: cell(9),
            near_rev: cell(11),
            far_rev: cell(13),
        })
    }
}

/// Looks up the plan for `day_index` (0 = registration day).
///
/// Negative indices never reach the header rows.
pub fn schedule_for_day(
    table: &ScheduleTable,
    day_index: i64,
) -> Result<DailySchedule, ScheduleError> {
    if day_index < 0 {
        return Err(ScheduleError::OutOfRange {
            row: FIRST_DATA_ROW.saturating_add(day_index),
            rows: table.len(),
        });
    }
    DailySchedule::from_row(table.row(FIRST_DATA_ROW.saturating_add(day_index))?)
}

/// Reads the table at `path` and returns the day's plan, or `None` if any
/// step failed. The cause is logged, not surfaced.
pub async fn load_daily_schedule(path: &Path, day_index: i64) -> Option<DailySchedule> {
    let result = ScheduleTable::load(path)
        .await
        .and_then(|table| schedule_for_day(&table, day_index));

    match result {
        Ok(schedule) => Some(schedule),
        Err(e) => {
            warn!(error = %e, day_index, "no schedule available");
            None
        }
    }
}
