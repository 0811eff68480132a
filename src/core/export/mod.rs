//! Spreadsheet export of a roster snapshot.
//!
//! The exporter only ever sees the dormitories it was handed at invocation
//! time; edits made to the live roster while an export runs are not
//! reflected in the file.

pub mod csv_sheet;
pub mod images;
pub mod xlsx;

use crate::domain::model::Dormitory;
use crate::domain::ports::{ImageSource, Storage};
use crate::utils::error::Result;
use chrono::NaiveDate;
use images::{resolve_image, EmbeddedImage};
use std::sync::Arc;

pub const EXPORT_FILE_PREFIX: &str = "Yotoqxona_Baza";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

/// One spreadsheet line: a student together with where they live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRow {
    pub dormitory: String,
    pub room: u32,
    pub full_name: String,
    pub course: u8,
    pub group: String,
    pub faculty: String,
    pub direction: String,
    pub joined_date: NaiveDate,
    pub image_url: Option<String>,
}

pub fn rows_for(dormitories: &[Arc<Dormitory>]) -> Vec<ExportRow> {
    dormitories
        .iter()
        .flat_map(|dorm| {
            dorm.students()
                .map(|(room, s)| ExportRow {
                    dormitory: dorm.name.clone(),
                    room: room.number,
                    full_name: s.full_name.clone(),
                    course: s.course,
                    group: s.group.clone(),
                    faculty: s.faculty.clone(),
                    direction: s.direction.clone(),
                    joined_date: s.joined_date,
                    image_url: s.image_url.clone(),
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

pub fn export_file_name(date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", EXPORT_FILE_PREFIX, date.format("%Y-%m-%d"), extension)
}

pub struct Exporter<S: Storage, I: ImageSource> {
    storage: S,
    images: I,
}

impl<S: Storage, I: ImageSource> Exporter<S, I> {
    pub fn new(storage: S, images: I) -> Self {
        Self { storage, images }
    }

    /// Writes `Yotoqxona_Baza_<date>.xlsx` and returns its file name. On
    /// failure nothing is written.
    pub async fn export_xlsx(
        &self,
        dormitories: Vec<Arc<Dormitory>>,
        date: NaiveDate,
    ) -> Result<String> {
        let rows = rows_for(&dormitories);
        tracing::info!(
            "Exporting {} students from {} dormitories",
            rows.len(),
            dormitories.len()
        );

        let mut resolved: Vec<(ExportRow, Option<EmbeddedImage>)> = Vec::with_capacity(rows.len());
        for row in rows {
            let image = match &row.image_url {
                Some(reference) => resolve_image(&self.images, reference).await,
                None => None,
            };
            resolved.push((row, image));
        }
        let embedded = resolved.iter().filter(|(_, img)| img.is_some()).count();
        tracing::debug!("Embedded {} of {} images", embedded, resolved.len());

        let file_name = export_file_name(date, "xlsx");
        let written = async {
            let workbook = xlsx::build_workbook(&resolved)?;
            tracing::debug!("Writing workbook ({} bytes) to storage", workbook.len());
            self.storage.write_file(&file_name, &workbook).await
        }
        .await;

        match written {
            Ok(()) => {
                tracing::info!("Workbook saved as {}", file_name);
                Ok(file_name)
            }
            Err(e) => {
                tracing::error!("Excel generation failed: {}", e);
                Err(e)
            }
        }
    }

    pub async fn export(
        &self,
        format: ExportFormat,
        dormitories: Vec<Arc<Dormitory>>,
        date: NaiveDate,
    ) -> Result<String> {
        match format {
            ExportFormat::Xlsx => self.export_xlsx(dormitories, date).await,
            ExportFormat::Csv => self.export_csv(dormitories, date).await,
        }
    }

    pub async fn export_csv(
        &self,
        dormitories: Vec<Arc<Dormitory>>,
        date: NaiveDate,
    ) -> Result<String> {
        let rows = rows_for(&dormitories);
        let file_name = export_file_name(date, "csv");
        let data = csv_sheet::build_csv(&rows)?;
        self.storage.write_file(&file_name, &data).await?;
        tracing::info!("CSV with {} rows saved as {}", rows.len(), file_name);
        Ok(file_name)
    }
}
