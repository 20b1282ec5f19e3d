// src/export/mod.rs
//! Aggregation of per-league tables and persistence of run outputs.
pub mod csv;

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::discover::Catalog;
use crate::error::ScrapeError;
use crate::normalize::LeagueTable;

/// The combined dataset across all scraped leagues. Tables are appended
/// with column-union semantics: columns keep their first-seen order, and
/// rows from tables lacking a column get an empty cell there.
#[derive(Debug, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Append one league's table. League tables legitimately carry
    /// duplicate column names (the injected `Player` next to the table's
    /// own), so incoming columns are matched to targets positionally per
    /// name, never twice to the same target.
    pub fn append(&mut self, table: LeagueTable) {
        let mut claimed = vec![false; self.columns.len()];
        let mut mapping = Vec::with_capacity(table.columns.len());

        for name in &table.columns {
            let target = self
                .columns
                .iter()
                .enumerate()
                .position(|(i, col)| !claimed[i] && col == name);
            let index = match target {
                Some(i) => i,
                None => {
                    self.columns.push(name.clone());
                    claimed.push(false);
                    self.columns.len() - 1
                }
            };
            claimed[index] = true;
            mapping.push(index);
        }

        // Earlier rows may be narrower than the grown column set.
        for row in &mut self.rows {
            row.resize(self.columns.len(), String::new());
        }

        for row in table.rows {
            let mut out = vec![String::new(); self.columns.len()];
            for (value, &index) in row.into_iter().zip(&mapping) {
                out[index] = value;
            }
            self.rows.push(out);
        }
    }

    /// Write the dataset as UTF-8 CSV with a leading byte-order mark, so
    /// spreadsheet tools pick up accented player names correctly.
    pub fn write_csv(&self, path: &Path) -> Result<(), ScrapeError> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        csv::write_bom(&mut writer)?;
        csv::write_row(&mut writer, &self.columns)?;
        for row in &self.rows {
            csv::write_row(&mut writer, row)?;
        }
        Ok(())
    }
}

/// Persist the discovered catalog so a run's inputs are inspectable.
pub fn write_catalog_json(catalog: &Catalog, path: &Path) -> Result<(), ScrapeError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), catalog)?;
    Ok(())
}
