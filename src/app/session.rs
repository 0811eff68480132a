use crate::adapters::gemini::GeminiClient;
use crate::adapters::http_images::HttpImageSource;
use crate::adapters::storage::LocalStorage;
use crate::config::DashboardConfig;
use crate::core::aggregator::{self, OccupancyStats, SearchHit};
use crate::core::assistant::Assistant;
use crate::core::export::{ExportFormat, Exporter};
use crate::core::roster::{NewStudent, RosterStore};
use crate::core::seeder::seed_roster;
use crate::core::snapshot::SnapshotRepository;
use crate::domain::model::{DormId, Dormitory, Scope, Student};
use crate::utils::error::{DashboardError, Result};
use chrono::{Local, NaiveDate};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};

/// One run of the dashboard: the live roster plus the adapters built from
/// configuration.
pub struct Session {
    config: DashboardConfig,
    store: RosterStore,
    snapshots: Option<SnapshotRepository<LocalStorage>>,
    restored: bool,
    rng: StdRng,
}

impl Session {
    /// Loads the roster from `roster_path` when that file exists, otherwise
    /// generates mock data from the configured layouts.
    pub async fn open(
        config: DashboardConfig,
        roster_path: Option<&Path>,
        seed: Option<u64>,
    ) -> Result<Self> {
        let mut rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let snapshots = roster_path.map(snapshot_repository).transpose()?;
        let loaded = match &snapshots {
            Some(repo) => repo.load().await?,
            None => None,
        };

        let restored = loaded.is_some();
        let store = match loaded {
            Some(roster) => RosterStore::from_roster(roster)?,
            None => {
                tracing::info!(
                    "Generating mock roster for {} dormitories",
                    config.dormitories.len()
                );
                RosterStore::new(seed_roster(&mut rng, &config.dormitories))
            }
        };

        Ok(Self {
            config,
            store,
            snapshots,
            restored,
            rng,
        })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    /// Whether the roster came from the snapshot file rather than the seeder.
    pub fn is_restored(&self) -> bool {
        self.restored
    }

    /// Replaces the roster with freshly generated mock data.
    pub fn reseed(&mut self) {
        let roster = seed_roster(&mut self.rng, &self.config.dormitories);
        self.store = RosterStore::new(roster);
        self.restored = false;
    }

    /// Writes the roster to the snapshot file. Returns `false` when the
    /// session was opened without one.
    pub async fn persist(&self) -> Result<bool> {
        match &self.snapshots {
            Some(repo) => {
                repo.save(self.store.roster()).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn scope(&self, dorm: Option<u32>) -> Result<Scope> {
        match dorm {
            None => Ok(Scope::All),
            Some(id) => self
                .dormitory(id)
                .map(|d| Scope::Dormitory(d.id)),
        }
    }

    pub fn dormitory(&self, id: u32) -> Result<&Dormitory> {
        self.store
            .roster()
            .dormitory(DormId(id))
            .ok_or(DashboardError::UnknownDormitory { dorm_id: id })
    }

    pub fn dormitory_count(&self) -> usize {
        self.store.roster().dormitories.len()
    }

    pub fn stats(&self, scope: Scope) -> OccupancyStats {
        OccupancyStats::compute(self.store.roster(), scope)
    }

    pub fn search(&self, query: &str) -> Vec<SearchHit> {
        aggregator::search(self.store.roster(), query)
    }

    pub fn add_student(&mut self, dorm: u32, room: u32, form: NewStudent) -> Result<Student> {
        let today = Local::now().date_naive();
        self.store
            .add_new_student(&mut self.rng, DormId(dorm), room, form, today)
    }

    pub fn remove_student(&mut self, dorm: u32, room: u32, student_id: &str) -> Result<Option<Student>> {
        self.store.remove_student(DormId(dorm), room, student_id)
    }

    /// Exports the dormitories in `scope` as they are right now and returns
    /// the path of the written file.
    pub async fn export(&self, scope: Scope, format: ExportFormat, date: NaiveDate) -> Result<PathBuf> {
        let storage = LocalStorage::new(&self.config.export.output_path);
        let base = storage.base_path().to_path_buf();
        let images = HttpImageSource::new(self.config.export.image_timeout_seconds)?;
        let exporter = Exporter::new(storage, images);

        let dormitories = self.store.roster().scoped(scope);
        let file_name = exporter.export(format, dormitories, date).await?;
        Ok(base.join(file_name))
    }

    pub fn assistant(&self) -> Result<Assistant<GeminiClient>> {
        let client = GeminiClient::new(&self.config.assistant)?;
        Ok(Assistant::new(client).with_institution(self.config.institution.clone()))
    }
}

fn snapshot_repository(path: &Path) -> Result<SnapshotRepository<LocalStorage>> {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| DashboardError::ValidationError {
            message: format!("Roster path '{}' has no file name", path.display()),
        })?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    Ok(SnapshotRepository::new(LocalStorage::new(parent), file_name))
}
