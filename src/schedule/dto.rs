use serde::Serialize;

use super::mapper::DailySchedule;

/// Context for `dashboard.html`.
#[derive(Debug, Serialize)]
pub struct DashboardView<'a> {
    pub username: &'a str,
    pub day_num: i64, // 1-based
    pub schedule: Option<DailySchedule>,
}
