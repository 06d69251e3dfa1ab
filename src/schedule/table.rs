use std::io;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, warn};

/// Why a schedule row could not be produced.
#[derive(Debug, thiserror::Error)]
pub enum ScheduleError {
    #[error("schedule table not found at {0}")]
    Absent(PathBuf),
    #[error("schedule table is malformed: {0}")]
    Malformed(String),
    #[error("row {row} is outside the schedule table ({rows} rows)")]
    OutOfRange { row: i64, rows: usize },
}

/// The schedule file as plain rows of text cells.
///
/// The first row is data, not a header. Offsets are 0-based physical rows.
#[derive(Debug, Clone)]
pub struct ScheduleTable {
    rows: Vec<StringRecord>,
}

impl ScheduleTable {
    /// Reads the whole table from disk. Called once per dashboard request.
    pub async fn load(path: &Path) -> Result<Self, ScheduleError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ScheduleError::Absent(path.to_path_buf()),
            _ => ScheduleError::Malformed(format!("read {}: {e}", path.display())),
        })?;
        let table = Self::from_reader(bytes.as_slice())?;
        if table.is_empty() {
            warn!(path = %path.display(), "schedule table has no rows");
        }
        debug!(path = %path.display(), rows = table.len(), "schedule table loaded");
        Ok(table)
    }

    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, ScheduleError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let rows = reader
            .records()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ScheduleError::Malformed(e.to_string()))?;

        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, offset: i64) -> Result<&StringRecord, ScheduleError> {
        usize::try_from(offset)
            .ok()
            .and_then(|i| self.rows.get(i))
            .ok_or(ScheduleError::OutOfRange {
                row: offset,
                rows: self.rows.len(),
            })
    }
}
