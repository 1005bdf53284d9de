//! CSV writer for stage timings.
//!
//! Format: session_id,finished_at,stage,calls,total_micros

use crate::mcts::timings::StageTimings;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use uuid::Uuid;

const HEADER: [&str; 5] = ["session_id", "finished_at", "stage", "calls", "total_micros"];

/// Appends session timings to `timings_YYYYMMDD.csv`, one file per day
pub struct TimingCsvWriter {
    base_dir: PathBuf,
    current_file: Option<csv::Writer<File>>,
    current_date: String,
}

impl TimingCsvWriter {
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            base_dir,
            current_file: None,
            current_date: String::new(),
        })
    }

    fn date_string(now: &DateTime<Utc>) -> String {
        now.format("%Y%m%d").to_string()
    }

    /// Path of the file rows written at `now` go to
    pub fn file_path_for(&self, now: &DateTime<Utc>) -> PathBuf {
        self.base_dir
            .join(format!("timings_{}.csv", Self::date_string(now)))
    }

    fn ensure_file_open(&mut self, now: &DateTime<Utc>) -> Result<()> {
        let today = Self::date_string(now);

        if self.current_date != today || self.current_file.is_none() {
            if let Some(mut writer) = self.current_file.take() {
                writer.flush()?;
            }

            let file_path = self.file_path_for(now);
            let file_exists = file_path.exists();
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&file_path)?;

            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(file);
            if !file_exists {
                writer.write_record(HEADER)?;
            }

            self.current_file = Some(writer);
            self.current_date = today;
        }

        Ok(())
    }

    /// Writes one row per recorded stage of a finished session.
    ///
    /// Returns the number of rows written.
    pub fn write_session(&mut self, session_id: Uuid, timings: &StageTimings) -> Result<usize> {
        let now = Utc::now();
        let finished_at = now.to_rfc3339();
        self.ensure_file_open(&now)?;
        let Some(writer) = self.current_file.as_mut() else {
            return Ok(0);
        };

        let mut rows = 0;
        for (stage, timing) in timings.iter() {
            writer.write_record([
                session_id.to_string(),
                finished_at.clone(),
                stage.to_string(),
                timing.calls.to_string(),
                format!("{:.1}", timing.total_micros),
            ])?;
            rows += 1;
        }
        writer.flush()?;
        Ok(rows)
    }

    pub fn close(&mut self) -> Result<()> {
        if let Some(mut writer) = self.current_file.take() {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for TimingCsvWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// One row read back from a timings file
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedTimingRow {
    pub session_id: String,
    pub finished_at: String,
    pub stage: String,
    pub calls: u64,
    pub total_micros: f64,
}

/// Loads every row of a timings file; malformed numbers read as zero
pub fn load_timings_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<LoadedTimingRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        rows.push(LoadedTimingRow {
            session_id: record.get(0).unwrap_or("").to_string(),
            finished_at: record.get(1).unwrap_or("").to_string(),
            stage: record.get(2).unwrap_or("").to_string(),
            calls: record.get(3).unwrap_or("0").parse().unwrap_or(0),
            total_micros: record.get(4).unwrap_or("0").parse().unwrap_or(0.0),
        });
    }

    Ok(rows)
}
