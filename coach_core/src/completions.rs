//! Append-only completion log.
//!
//! Completion records are appended to a JSONL (JSON Lines) file with file
//! locking so a CLI run and another process can share the data dir.

use crate::{CompletionRecord, Result, UserId};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// JSONL completion log with file locking
#[derive(Clone, Debug)]
pub struct CompletionLog {
    path: PathBuf,
}

impl CompletionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// Append one record as a JSON line under an exclusive lock
    ///
    /// A torn last line left by an interrupted write is terminated first,
    /// so the new record starts on its own line.
    pub fn append(&self, record: &CompletionRecord) -> Result<()> {
        self.ensure_parent_dir()?;

        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)?;

        file.lock_exclusive()?;

        let torn = ends_without_newline(&file)?;
        let mut writer = std::io::BufWriter::new(&file);
        if torn {
            tracing::warn!("Completion log {:?} ends mid-line, terminating it", self.path);
            writer.write_all(b"\n")?;
        }
        let line = serde_json::to_string(record)?;
        writer.write_all(line.as_bytes())?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        drop(writer);

        file.sync_data()?;
        file.unlock()?;

        tracing::debug!("Appended completion {} ({})", record.exercise_id, record.id);
        Ok(())
    }

    /// Read every record, skipping lines that fail to parse
    pub fn read_all(&self) -> Result<Vec<CompletionRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        file.lock_shared()?;

        let reader = BufReader::new(&file);
        let mut records = Vec::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<CompletionRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("Failed to parse completion at line {}: {}", line_num + 1, e);
                }
            }
        }

        file.unlock()?;
        tracing::debug!("Read {} completions from {:?}", records.len(), self.path);
        Ok(records)
    }

    /// Records for one user, oldest first
    pub fn read_for_user(&self, user: &UserId) -> Result<Vec<CompletionRecord>> {
        let mut records: Vec<_> = self
            .read_all()?
            .into_iter()
            .filter(|r| &r.user_id == user)
            .collect();
        records.sort_by(|a, b| a.completed_at.cmp(&b.completed_at));
        Ok(records)
    }
}

fn ends_without_newline(mut file: &File) -> Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseKind;
    use chrono::{NaiveDate, Utc};
    use uuid::Uuid;

    fn create_test_record(user: &str, exercise_id: &str) -> CompletionRecord {
        CompletionRecord {
            id: Uuid::new_v4(),
            user_id: UserId::new(user),
            exercise_id: exercise_id.into(),
            exercise_kind: ExerciseKind::Breathing,
            date: NaiveDate::from_ymd_opt(2024, 6, 4).unwrap(),
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_append_and_read_single_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = CompletionLog::new(temp_dir.path().join("completed_exercises.jsonl"));

        let record = create_test_record("alice", "breathing-2024-06-04");
        log.append(&record).unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records, vec![record]);
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = CompletionLog::new(temp_dir.path().join("nope.jsonl"));
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_lines_are_skipped() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("completed_exercises.jsonl");
        let log = CompletionLog::new(&path);

        log.append(&create_test_record("alice", "a")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            writeln!(file, "{{ not json").unwrap();
        }
        log.append(&create_test_record("alice", "b")).unwrap();

        let ids: Vec<_> = log
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.exercise_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_append_after_torn_line_keeps_new_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("completed_exercises.jsonl");
        let log = CompletionLog::new(&path);

        log.append(&create_test_record("alice", "a")).unwrap();
        {
            let mut file = OpenOptions::new().append(true).open(&path).unwrap();
            write!(file, r#"{{"id":"00000000-0000-0000-0000-000000000000","user_id":"al"#).unwrap();
        }
        log.append(&create_test_record("alice", "b")).unwrap();

        let ids: Vec<_> = log
            .read_all()
            .unwrap()
            .into_iter()
            .map(|r| r.exercise_id)
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_read_for_user_filters() {
        let temp_dir = tempfile::tempdir().unwrap();
        let log = CompletionLog::new(temp_dir.path().join("nested/dir/log.jsonl"));

        log.append(&create_test_record("alice", "a")).unwrap();
        log.append(&create_test_record("bob", "b")).unwrap();
        log.append(&create_test_record("alice", "c")).unwrap();

        let alice = log.read_for_user(&UserId::new("alice")).unwrap();
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|r| r.user_id.as_str() == "alice"));
    }
}
