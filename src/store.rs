use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use color_eyre::eyre::Context;
use color_eyre::Result;
use log::info;
use rust_decimal::Decimal;

use crate::Transaction;

/// Per-period CSV history rooted at a data directory.
///
/// One file per billing period (`2025-07.csv`), UTF-8, header row
/// `Fecha,Descripción,Monto,Categoría,Periodo`. Files are replaced whole on
/// merge (read-merge-write); there is no appending and no locking, one
/// interactive user per directory is assumed.
pub struct HistoricalStore {
    dir: PathBuf,
}

/// What a merge did to one period file, for user-facing feedback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub period: String,
    /// `true` if the period file did not exist before this merge.
    pub created: bool,
    /// Rows in the period file after the merge.
    pub total: usize,
    /// Incoming rows dropped because their (date, description, amount)
    /// triple was already present.
    pub duplicates_dropped: usize,
}

/// De-duplication identity of a row.
type RowKey = (NaiveDate, String, Decimal);

fn row_key(transaction: &Transaction) -> RowKey {
    (
        transaction.date,
        transaction.description.clone(),
        transaction.amount,
    )
}

impl HistoricalStore {
    /// Opens (and creates if necessary) the store directory.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Could not create data directory {dir:?}"))?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn period_path(&self, period: &str) -> PathBuf {
        self.dir.join(format!("{period}.csv"))
    }

    /// Sorted labels of the periods present on disk.
    pub fn list_periods(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir)
            .with_context(|| format!("Could not read data directory {:?}", self.dir))?;
        let mut periods = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    periods.push(stem.to_owned());
                }
            }
        }
        periods.sort();
        Ok(periods)
    }

    /// Reads one period file back into rows. A missing file is an empty
    /// period, not an error.
    pub fn load_period(&self, period: &str) -> Result<Vec<Transaction>> {
        let path = self.period_path(period);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&path)
            .with_context(|| format!("Could not open period file {path:?}"))?;
        let mut rows = Vec::new();
        for row in reader.deserialize() {
            let transaction: Transaction =
                row.with_context(|| format!("Could not read a row from {path:?}"))?;
            rows.push(transaction);
        }
        Ok(rows)
    }

    /// Concatenates every period file, in period order.
    pub fn load_all(&self) -> Result<Vec<Transaction>> {
        let mut rows = Vec::new();
        for period in self.list_periods()? {
            rows.extend(self.load_period(&period)?);
        }
        Ok(rows)
    }

    /// Merges freshly parsed rows into one period file.
    ///
    /// Existing rows keep their order and always win over incoming
    /// duplicates. The merged file is written to a temporary sibling and
    /// renamed into place, so a failed write never leaves a partial merge.
    pub fn merge(&self, period: &str, batch: &[Transaction]) -> Result<MergeOutcome> {
        let path = self.period_path(period);
        let created = !path.exists();
        let existing = self.load_period(period)?;

        let mut seen: HashSet<RowKey> = existing.iter().map(row_key).collect();
        let mut merged = existing;
        let mut duplicates_dropped = 0;
        for transaction in batch {
            if seen.insert(row_key(transaction)) {
                merged.push(transaction.clone());
            } else {
                duplicates_dropped += 1;
            }
        }

        self.write_period(&path, &merged)?;
        info!(
            "{} {period}: {} rows ({duplicates_dropped} duplicates dropped)",
            if created { "created" } else { "updated" },
            merged.len()
        );
        Ok(MergeOutcome {
            period: period.to_owned(),
            created,
            total: merged.len(),
            duplicates_dropped,
        })
    }

    /// Groups a parsed batch by period and merges each group. Outcomes come
    /// back in period order.
    pub fn merge_batch(&self, batch: &[Transaction]) -> Result<Vec<MergeOutcome>> {
        let mut by_period: BTreeMap<&str, Vec<Transaction>> = BTreeMap::new();
        for transaction in batch {
            by_period
                .entry(transaction.period.as_str())
                .or_default()
                .push(transaction.clone());
        }
        by_period
            .into_iter()
            .map(|(period, group)| self.merge(period, &group))
            .collect()
    }

    /// Removes one period's file entirely. The only deletion primitive:
    /// individual rows are never removed.
    pub fn delete_period(&self, period: &str) -> Result<()> {
        let path = self.period_path(period);
        fs::remove_file(&path).with_context(|| format!("Could not delete period file {path:?}"))
    }

    fn write_period(&self, path: &Path, rows: &[Transaction]) -> Result<()> {
        let tmp = path.with_extension("csv.tmp");
        {
            let mut writer = csv::Writer::from_path(&tmp)
                .with_context(|| format!("Could not write period file {tmp:?}"))?;
            for row in rows {
                writer.serialize(row)?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, path)
            .with_context(|| format!("Could not move merged period file into place at {path:?}"))
    }
}
