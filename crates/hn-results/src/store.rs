//! Run storage API.
//!
//! Layout: `<root>/<run_id>/manifest.json` plus one `<variable>.csv` per
//! recorded variable. Tables are `;`-separated with a `time_s` column first.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::recorder::Recorder;
use crate::types::{RunManifest, Table, Variable};
use crate::{ResultsError, ResultsResult};

const DELIMITER: u8 = b';';

#[derive(Debug, Clone)]
pub struct RunStore {
    root_dir: PathBuf,
}

impl RunStore {
    pub fn new(root_dir: PathBuf) -> ResultsResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir)?;
        }
        Ok(Self { root_dir })
    }

    pub fn root(&self) -> &Path {
        &self.root_dir
    }

    fn run_dir(&self, run_id: &str) -> PathBuf {
        self.root_dir.join(run_id)
    }

    fn table_path(&self, run_id: &str, variable: Variable) -> PathBuf {
        self.run_dir(run_id).join(format!("{}.csv", variable.key()))
    }

    pub fn has_run(&self, run_id: &str) -> bool {
        self.run_dir(run_id).join("manifest.json").exists()
    }

    pub fn save_run(&self, manifest: &RunManifest, recorder: &Recorder) -> ResultsResult<()> {
        let run_dir = self.run_dir(&manifest.run_id);
        fs::create_dir_all(&run_dir)?;

        let manifest_json = serde_json::to_string_pretty(manifest)?;
        fs::write(run_dir.join("manifest.json"), manifest_json)?;

        for variable in &manifest.variables {
            let table = recorder.table(*variable);
            write_table(&self.table_path(&manifest.run_id, *variable), table)?;
            debug!(
                run_id = %manifest.run_id,
                table = variable.key(),
                rows = table.rows(),
                "wrote table"
            );
        }
        info!(
            run_id = %manifest.run_id,
            dir = %run_dir.display(),
            steps = manifest.steps,
            "saved run"
        );
        Ok(())
    }

    pub fn load_manifest(&self, run_id: &str) -> ResultsResult<RunManifest> {
        let manifest_path = self.run_dir(run_id).join("manifest.json");
        if !manifest_path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        let content = fs::read_to_string(manifest_path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn load_table(&self, run_id: &str, variable: Variable) -> ResultsResult<Table> {
        let path = self.table_path(run_id, variable);
        if !path.exists() {
            return Err(ResultsError::RunNotFound {
                run_id: run_id.to_string(),
            });
        }
        read_table(&path, variable.key())
    }

    /// All stored runs, oldest first.
    pub fn list_runs(&self) -> ResultsResult<Vec<RunManifest>> {
        let mut runs = Vec::new();
        if !self.root_dir.exists() {
            return Ok(runs);
        }
        for entry in fs::read_dir(&self.root_dir)? {
            let entry = entry?;
            if entry.path().is_dir() {
                let run_id = entry.file_name().to_string_lossy().to_string();
                if let Ok(manifest) = self.load_manifest(&run_id) {
                    runs.push(manifest);
                }
            }
        }
        runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(runs)
    }

    pub fn delete_run(&self, run_id: &str) -> ResultsResult<()> {
        let run_dir = self.run_dir(run_id);
        if run_dir.exists() {
            fs::remove_dir_all(run_dir)?;
        }
        Ok(())
    }
}

/// Write a table as `;`-separated CSV with a `time_s` column first.
pub fn write_table(path: &Path, table: &Table) -> ResultsResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)?;
    let mut header = Vec::with_capacity(table.columns.len() + 1);
    header.push("time_s".to_string());
    header.extend(table.columns.iter().cloned());
    writer.write_record(&header)?;

    for (i, t) in table.time.iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(t.to_string());
        record.extend(table.values.iter().map(|col| col[i].to_string()));
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_table(path: &Path, name: &str) -> ResultsResult<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(DELIMITER)
        .from_path(path)?;
    let malformed = |reason: String| ResultsError::Malformed {
        table: name.to_string(),
        reason,
    };

    let headers = reader.headers()?.clone();
    if headers.get(0) != Some("time_s") {
        return Err(malformed("first column must be time_s".to_string()));
    }
    let columns: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut table = Table::new(name, columns);

    let mut row = Vec::with_capacity(table.columns.len());
    for record in reader.records() {
        let record = record?;
        row.clear();
        let mut fields = record.iter().map(|f| {
            f.parse::<f64>()
                .map_err(|e| malformed(format!("bad number '{f}': {e}")))
        });
        let time = fields
            .next()
            .ok_or_else(|| malformed("empty record".to_string()))??;
        for v in fields {
            row.push(v?);
        }
        table.push_row(time, &row)?;
    }
    Ok(table)
}
