use super::xlsx::COLUMNS;
use super::ExportRow;
use crate::utils::error::{DashboardError, Result};

/// Plain-text variant of the roster sheet, without the picture column.
pub fn build_csv(rows: &[ExportRow]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(COLUMNS.iter().skip(1).map(|c| c.header))?;

    for row in rows {
        writer.write_record([
            row.dormitory.clone(),
            row.room.to_string(),
            row.full_name.clone(),
            row.course.to_string(),
            row.group.clone(),
            row.faculty.clone(),
            row.direction.clone(),
            row.joined_date.format("%Y-%m-%d").to_string(),
        ])?;
    }

    writer
        .into_inner()
        .map_err(|e| DashboardError::ProcessingError {
            message: format!("failed to flush CSV: {}", e),
        })
}
