//! Measurement history repository backed by a CSV file
//!
//! One row per processed reading, header written when the file is created.
//! File access is serialised: appends never interleave rows and readers
//! never see a half-written row.

use anyhow::{Context, Result};
use smart_scale_shared::MeasurementRow;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// CSV-backed measurement history
#[derive(Clone)]
pub struct MeasurementRepository {
    path: Arc<PathBuf>,
    file_lock: Arc<Mutex<()>>,
}

impl MeasurementRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            file_lock: Arc::new(Mutex::new(())),
        }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory holding the history file
    pub fn ensure_directory(&self) -> Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display())),
            _ => Ok(()),
        }
    }

    /// Append one row
    pub async fn append(&self, row: MeasurementRow) -> Result<()> {
        let _guard = self.file_lock.lock().await;
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.append_blocking(&row))
            .await
            .context("history writer task failed")?
    }

    async fn read_rows(&self) -> Result<Vec<MeasurementRow>> {
        let _guard = self.file_lock.lock().await;
        let repo = self.clone();
        tokio::task::spawn_blocking(move || repo.read_all())
            .await
            .context("history reader task failed")?
    }

    /// All rows recorded for `name`, oldest first
    pub async fn history(&self, name: &str) -> Result<Vec<MeasurementRow>> {
        let rows = self.read_rows().await?;
        Ok(rows.into_iter().filter(|row| row.name == name).collect())
    }

    /// Distinct user names, in order of first appearance
    pub async fn names(&self) -> Result<Vec<String>> {
        let rows = self.read_rows().await?;

        let mut names: Vec<String> = Vec::new();
        for row in rows {
            if !names.contains(&row.name) {
                names.push(row.name);
            }
        }
        Ok(names)
    }

    fn append_blocking(&self, row: &MeasurementRow) -> Result<()> {
        self.ensure_directory()?;

        let has_header = fs::metadata(self.path.as_path())
            .map(|meta| meta.len() > 0)
            .unwrap_or(false);

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.path.as_path())
            .with_context(|| format!("opening {}", self.path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(!has_header)
            .from_writer(file);
        writer.serialize(row).context("serialising measurement row")?;
        writer.flush().context("flushing measurement history")?;
        Ok(())
    }

    fn read_all(&self) -> Result<Vec<MeasurementRow>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::Reader::from_path(self.path.as_path())
            .with_context(|| format!("opening {}", self.path.display()))?;

        reader
            .deserialize::<MeasurementRow>()
            .map(|row| row.context("malformed measurement row"))
            .collect()
    }
}
