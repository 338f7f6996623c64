//! Accumulates per-key row frames and persists them as one tab-separated file.
//!
//! The sink rewrites the whole accumulated table after every append, staging
//! through a sibling temp file that is persisted over the target, so a crash
//! mid-run leaves either the previous complete dump or the new one on disk.

use log::debug;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to create output directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to create temp file next to '{0}'")]
    TempFile(PathBuf, #[source] std::io::Error),

    #[error("Failed to serialize table for '{0}'")]
    Csv(PathBuf, #[source] PolarsError),

    #[error("Failed to move temp file over '{0}'")]
    Persist(PathBuf, #[source] std::io::Error),

    /// The appended frame's columns do not line up with the rows already
    /// accumulated. Attributed to the key that produced the frame.
    #[error("Appended rows do not match the accumulated columns")]
    RowAppend(#[source] PolarsError),
}

/// Collects row frames in append order and mirrors them to a TSV file.
///
/// Output format: UTF-8, tab separators, one header row, `\n` line endings,
/// no index column. Until the first successful append, no file is written.
pub struct TsvSink {
    path: PathBuf,
    table: Option<DataFrame>,
}

impl TsvSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            table: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of rows accumulated so far.
    pub fn height(&self) -> usize {
        self.table.as_ref().map_or(0, DataFrame::height)
    }

    /// The accumulated table, if any rows have been appended.
    pub fn table(&self) -> Option<&DataFrame> {
        self.table.as_ref()
    }

    /// Appends `frame` below the rows accumulated so far and rewrites the
    /// output file.
    ///
    /// The first appended frame fixes the column set; later frames must match
    /// it exactly or the append fails with [`OutputError::RowAppend`] and the
    /// accumulated table is left unchanged.
    pub fn append(&mut self, frame: DataFrame) -> Result<(), OutputError> {
        match self.table.as_mut() {
            None => self.table = Some(frame),
            Some(table) => {
                table
                    .vstack_mut(&frame)
                    .map_err(OutputError::RowAppend)
                    .map(|_| ())?;
            }
        }
        self.rewrite()
    }

    fn rewrite(&mut self) -> Result<(), OutputError> {
        let Some(table) = self.table.as_mut() else {
            return Ok(());
        };
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir).map_err(|e| OutputError::DirCreation(dir.clone(), e))?;

        // Stage in the same directory so the final rename stays on one filesystem.
        let mut tmp =
            NamedTempFile::new_in(&dir).map_err(|e| OutputError::TempFile(self.path.clone(), e))?;
        CsvWriter::new(tmp.as_file_mut())
            .include_header(true)
            .with_separator(b'\t')
            .finish(table)
            .map_err(|e| OutputError::Csv(self.path.clone(), e))?;
        tmp.persist(&self.path)
            .map_err(|e| OutputError::Persist(self.path.clone(), e.error))?;
        debug!(
            "wrote {} rows to {}",
            table.height(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_frame(rows: &[(&str, &str, &str)]) -> DataFrame {
        let states: Vec<&str> = rows.iter().map(|r| r.0).collect();
        let pops: Vec<&str> = rows.iter().map(|r| r.1).collect();
        let years: Vec<&str> = rows.iter().map(|r| r.2).collect();
        DataFrame::new(vec![
            Column::new("state".into(), states),
            Column::new("population".into(), pops),
            Column::new("year".into(), years),
        ])
        .unwrap()
    }

    #[test]
    fn writes_header_and_tab_separated_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("population.tsv");
        let mut sink = TsvSink::new(&path);
        sink.append(state_frame(&[("Illinois", "12700", "2020")]))
            .unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, "state\tpopulation\tyear\nIllinois\t12700\t2020\n");
    }

    #[test]
    fn no_file_until_first_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let sink = TsvSink::new(&path);
        assert_eq!(sink.height(), 0);
        assert!(!path.exists());
    }

    #[test]
    fn rewrites_whole_file_on_each_append() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let mut sink = TsvSink::new(&path);

        sink.append(state_frame(&[("Illinois", "12700", "2019")]))
            .unwrap();
        sink.append(state_frame(&[("Iowa", "3100", "2019")])).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "state\tpopulation\tyear\nIllinois\t12700\t2019\nIowa\t3100\t2019\n"
        );
        assert_eq!(sink.height(), 2);
    }

    #[test]
    fn identical_appends_produce_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let rows = [("Illinois", "12700", "2020"), ("Iowa", "3100", "2020")];

        let first = dir.path().join("a.tsv");
        let mut sink = TsvSink::new(&first);
        sink.append(state_frame(&rows)).unwrap();

        let second = dir.path().join("b.tsv");
        let mut sink = TsvSink::new(&second);
        sink.append(state_frame(&rows)).unwrap();

        assert_eq!(
            std::fs::read(&first).unwrap(),
            std::fs::read(&second).unwrap()
        );
    }

    #[test]
    fn mismatched_columns_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = TsvSink::new(dir.path().join("out.tsv"));
        sink.append(state_frame(&[("Illinois", "12700", "2020")]))
            .unwrap();

        let other = DataFrame::new(vec![Column::new("unrelated".into(), vec!["x"])]).unwrap();
        let err = sink.append(other).unwrap_err();
        assert!(matches!(err, OutputError::RowAppend(_)));
        // The accumulated table keeps its pre-append shape.
        assert_eq!(sink.height(), 1);
    }

    #[test]
    fn creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("raw").join("out.tsv");
        let mut sink = TsvSink::new(&path);
        sink.append(state_frame(&[("Ohio", "11700", "2020")])).unwrap();
        assert!(path.exists());
    }
}
