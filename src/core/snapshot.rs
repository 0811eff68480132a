use crate::domain::model::Roster;
use crate::domain::ports::Storage;
use crate::utils::error::{DashboardError, Result};

/// Persists the roster as pretty JSON through a [`Storage`] backend.
pub struct SnapshotRepository<S: Storage> {
    storage: S,
    file_name: String,
}

impl<S: Storage> SnapshotRepository<S> {
    pub fn new(storage: S, file_name: impl Into<String>) -> Self {
        Self {
            storage,
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Returns `None` when no snapshot has been written yet.
    pub async fn load(&self) -> Result<Option<Roster>> {
        let data = match self.storage.read_file(&self.file_name).await {
            Ok(data) => data,
            Err(DashboardError::IoError(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No roster snapshot at {}", self.file_name);
                return Ok(None);
            }
            Err(e) => return Err(e),
        };

        let roster: Roster = serde_json::from_slice(&data)?;
        tracing::info!(
            "Loaded roster snapshot {} ({} students)",
            self.file_name,
            roster.student_count()
        );
        Ok(Some(roster))
    }

    pub async fn save(&self, roster: &Roster) -> Result<()> {
        let data = serde_json::to_vec_pretty(roster)?;
        self.storage.write_file(&self.file_name, &data).await?;
        tracing::info!(
            "Saved roster snapshot {} ({} students)",
            self.file_name,
            roster.student_count()
        );
        Ok(())
    }
}
