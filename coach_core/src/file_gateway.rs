//! Local file-backed persistence gateway.
//!
//! Layout under the data dir:
//! - `completed_exercises.jsonl` - completion log
//! - `user_stats.json` - stats table

use crate::completions::CompletionLog;
use crate::gateway::PersistenceGateway;
use crate::stats_file::StatsTable;
use crate::{CompletionRecord, Error, Result, StatsUpdate, UserId, UserStats};
use chrono::NaiveDate;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const COMPLETIONS_FILE: &str = "completed_exercises.jsonl";
pub const STATS_FILE: &str = "user_stats.json";

#[derive(Clone, Debug)]
pub struct FileGateway {
    completions: CompletionLog,
    stats_path: PathBuf,
}

impl FileGateway {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            completions: CompletionLog::new(data_dir.join(COMPLETIONS_FILE)),
            stats_path: data_dir.join(STATS_FILE),
        }
    }

    pub fn completions(&self) -> &CompletionLog {
        &self.completions
    }
}

impl PersistenceGateway for FileGateway {
    fn fetch_completed_exercise_ids(&self, user: &UserId, date: NaiveDate) -> HashSet<String> {
        match self.completions.read_all() {
            Ok(records) => records
                .into_iter()
                .filter(|r| &r.user_id == user && r.date == date)
                .map(|r| r.exercise_id)
                .collect(),
            Err(e) => {
                tracing::warn!("Could not read completions, treating day as empty: {}", e);
                HashSet::new()
            }
        }
    }

    fn record_completion(&mut self, record: &CompletionRecord) -> Result<()> {
        self.completions
            .append(record)
            .map_err(|e| Error::Gateway(format!("failed to record completion: {}", e)))
    }

    fn fetch_user_stats(&self, user: &UserId) -> Result<Option<UserStats>> {
        Ok(StatsTable::load(&self.stats_path)?.get(user).cloned())
    }

    fn update_user_stats(&mut self, user: &UserId, update: &StatsUpdate) -> Result<()> {
        StatsTable::update(&self.stats_path, |table| table.entry(user).apply(update))
            .map(|_| ())
            .map_err(|e| Error::Gateway(format!("failed to update stats: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseKind;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_roundtrip_through_data_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut gateway = FileGateway::new(temp_dir.path());
        let user = UserId::new("alice");
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();

        gateway
            .record_completion(&CompletionRecord {
                id: Uuid::new_v4(),
                user_id: user.clone(),
                exercise_id: "start-stop-2024-06-03".into(),
                exercise_kind: ExerciseKind::StartStop,
                date,
                completed_at: Utc::now(),
            })
            .unwrap();

        let ids = gateway.fetch_completed_exercise_ids(&user, date);
        assert!(ids.contains("start-stop-2024-06-03"));
        assert!(temp_dir.path().join(COMPLETIONS_FILE).exists());

        assert_eq!(gateway.fetch_user_stats(&user).unwrap(), None);
        let stats = gateway.ensure_user_stats(&user).unwrap();
        assert_eq!(stats.current_streak, 0);
        assert!(temp_dir.path().join(STATS_FILE).exists());
    }

    #[test]
    fn test_unreadable_log_means_nothing_completed() {
        let temp_dir = tempfile::tempdir().unwrap();
        // A directory where the log file should be makes reads fail
        std::fs::create_dir(temp_dir.path().join(COMPLETIONS_FILE)).unwrap();

        let gateway = FileGateway::new(temp_dir.path());
        let ids = gateway.fetch_completed_exercise_ids(
            &UserId::new("alice"),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
        );
        assert!(ids.is_empty());
    }
}
