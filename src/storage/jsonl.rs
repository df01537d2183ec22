//! JSONL (JSON Lines) export.
//!
//! Each line is a valid JSON object representing one record, so the match
//! log can be streamed line by line by other tools.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::PathBuf;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::{StorageConfig, StorageError};
use crate::models::MatchRecord;

/// JSONL file writer.
pub struct JsonlWriter<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: Serialize> JsonlWriter<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    fn ensure_dir(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Write records, replacing the entire file.
    pub fn write_all(&self, records: &[T]) -> Result<usize, StorageError> {
        self.ensure_dir()?;

        let mut writer = BufWriter::new(File::create(&self.path)?);
        for record in records {
            writeln!(writer, "{}", serde_json::to_string(record)?)?;
        }
        writer.flush()?;

        info!("Wrote {} records to {:?}", records.len(), self.path);
        Ok(records.len())
    }
}

/// JSONL file reader.
pub struct JsonlReader<T> {
    path: PathBuf,
    _marker: PhantomData<T>,
}

impl<T: DeserializeOwned> JsonlReader<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// Read all records. Blank lines are ignored and unparseable lines are
    /// skipped with a warning.
    pub fn read_all(&self) -> Result<Vec<T>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(File::open(&self.path)?);
        let mut records = Vec::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Failed to parse line {} in {:?}: {}", i + 1, self.path, e),
            }
        }

        debug!("Read {} records from {:?}", records.len(), self.path);
        Ok(records)
    }
}

/// Export the full match log, replacing any previous export.
pub fn export_match_history(
    config: &StorageConfig,
    history: &[MatchRecord],
) -> Result<usize, StorageError> {
    JsonlWriter::new(config.match_export_path()).write_all(history)
}

/// Read back an exported match log.
pub fn read_match_export(config: &StorageConfig) -> Result<Vec<MatchRecord>, StorageError> {
    JsonlReader::new(config.match_export_path()).read_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchResult, Session};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(n: u32, result: MatchResult) -> MatchRecord {
        MatchRecord {
            match_number: n,
            team1: n.into(),
            team2: (n + 1).into(),
            result,
        }
    }

    #[test]
    fn test_write_and_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("matches.jsonl");
        let records = vec![record(1, MatchResult::Team1Win), record(2, MatchResult::Draw)];

        let writer: JsonlWriter<MatchRecord> = JsonlWriter::new(path.clone());
        assert_eq!(writer.write_all(&records).unwrap(), 2);

        let reader: JsonlReader<MatchRecord> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), records);
    }

    #[test]
    fn test_write_all_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("matches.jsonl");

        let writer: JsonlWriter<MatchRecord> = JsonlWriter::new(path.clone());
        writer.write_all(&[record(1, MatchResult::Team2Win)]).unwrap();

        let reader: JsonlReader<MatchRecord> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap().len(), 1);
    }

    #[test]
    fn test_read_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let reader: JsonlReader<MatchRecord> =
            JsonlReader::new(temp_dir.path().join("nonexistent.jsonl"));

        assert!(reader.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_read_skips_bad_and_blank_lines() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad_lines.jsonl");
        fs::write(
            &path,
            r#"{"match_number":1,"team1":1,"team2":2,"result":"team1_win"}
not-valid-json

{"match_number":2,"team1":1,"team2":3,"result":"draw"}
"#,
        )
        .unwrap();

        let reader: JsonlReader<MatchRecord> = JsonlReader::new(path);
        let records = reader.read_all().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].result, MatchResult::Draw);
    }

    #[test]
    fn test_write_all_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("overwrite.jsonl");
        let writer: JsonlWriter<MatchRecord> = JsonlWriter::new(path.clone());

        writer
            .write_all(&[record(1, MatchResult::Draw), record(2, MatchResult::Draw)])
            .unwrap();
        writer.write_all(&[record(1, MatchResult::Team1Win)]).unwrap();

        let reader: JsonlReader<MatchRecord> = JsonlReader::new(path);
        assert_eq!(reader.read_all().unwrap(), vec![record(1, MatchResult::Team1Win)]);
    }

    #[test]
    fn test_export_match_history() {
        let temp_dir = TempDir::new().unwrap();
        let config = StorageConfig::new(temp_dir.path().to_path_buf());

        let mut session = Session::initialize(4).unwrap();
        for result in [MatchResult::Team1Win, MatchResult::Draw, MatchResult::Team2Win] {
            session.draw_next_match().unwrap();
            session.record_result(result).unwrap();
        }

        let count = export_match_history(&config, session.match_history()).unwrap();
        assert_eq!(count, 3);
        assert_eq!(read_match_export(&config).unwrap(), session.match_history());
    }
}
