//! JSON snapshots of the known set

use crate::storage::traits::{FullSetStore, StorageError, StorageResult};
use crate::vacancy::{FullSet, VacancyRecord};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

const FULL_SET_FILE: &str = "all_vacancies.json";

/// Keeps the full set as a JSON array in a directory
///
/// The directory holds `all_vacancies.json` plus one
/// `new_vacancies_<YYYYMMDD_HHMMSS>.json` per cycle that found new vacancies.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    dir: PathBuf,
}

impl JsonSnapshotStore {
    /// Opens the snapshot directory, creating it if needed
    pub fn new(dir: impl Into<PathBuf>) -> StorageResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Path of the full-set snapshot
    pub fn full_set_path(&self) -> PathBuf {
        self.dir.join(FULL_SET_FILE)
    }

    /// Path of the new-vacancies snapshot for a cycle observed at `at`
    pub fn new_batch_path(&self, at: DateTime<Utc>) -> PathBuf {
        self.dir
            .join(format!("new_vacancies_{}.json", at.format("%Y%m%d_%H%M%S")))
    }
}

/// Writes the records next to `path` and moves them into place
fn write_json_atomically(path: &Path, records: &[&VacancyRecord]) -> StorageResult<()> {
    let tmp_path = path.with_extension("json.tmp");

    {
        let file = fs::File::create(&tmp_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        writer.flush()?;
    }

    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl FullSetStore for JsonSnapshotStore {
    fn load(&self) -> StorageResult<FullSet> {
        let path = self.full_set_path();
        if !path.exists() {
            return Ok(FullSet::new());
        }

        let content = fs::read_to_string(&path)?;
        let records: Vec<VacancyRecord> = serde_json::from_str(&content).map_err(|e| {
            StorageError::Serialization(format!("{}: {}", path.display(), e))
        })?;

        Ok(records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect())
    }

    fn save(&self, full_set: &FullSet) -> StorageResult<()> {
        let mut records: Vec<&VacancyRecord> = full_set.values().collect();
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

        write_json_atomically(&self.full_set_path(), &records)
    }

    fn save_new_batch(
        &self,
        records: &[VacancyRecord],
        observed_at: DateTime<Utc>,
    ) -> StorageResult<PathBuf> {
        let path = self.new_batch_path(observed_at);
        let records: Vec<&VacancyRecord> = records.iter().collect();
        write_json_atomically(&path, &records)?;
        Ok(path)
    }
}
