//! Persistence gateway and identity provider seams.
//!
//! The coach never stores anything itself; completion records and stats go
//! through a [`PersistenceGateway`]. Who is signed in comes from an
//! [`IdentityProvider`].

use crate::{CompletionRecord, Error, Result, StatsUpdate, UserId, UserStats};
use chrono::NaiveDate;
use std::collections::{HashMap, HashSet};

/// Supplies the signed-in user, if any
pub trait IdentityProvider {
    fn current_user_id(&self) -> Option<UserId>;
}

/// Storage for completion records and per-user stats
pub trait PersistenceGateway {
    /// Exercise ids completed by `user` on `date`.
    ///
    /// Never fails: storage problems read as "nothing completed".
    fn fetch_completed_exercise_ids(&self, user: &UserId, date: NaiveDate) -> HashSet<String>;

    /// Store one completion record
    fn record_completion(&mut self, record: &CompletionRecord) -> Result<()>;

    /// Stats row for `user`, `None` if none exists yet
    fn fetch_user_stats(&self, user: &UserId) -> Result<Option<UserStats>>;

    /// Apply a partial update, creating the row if missing
    fn update_user_stats(&mut self, user: &UserId, update: &StatsUpdate) -> Result<()>;

    /// Return stats for `user`, initializing a zeroed row on first use
    fn ensure_user_stats(&mut self, user: &UserId) -> Result<UserStats> {
        if let Some(stats) = self.fetch_user_stats(user)? {
            return Ok(stats);
        }

        let stats = UserStats::default();
        self.update_user_stats(
            user,
            &StatsUpdate {
                current_streak: Some(0),
                total_completed: 0,
                last_completed_date: None,
                updated_at: chrono::Utc::now(),
            },
        )?;
        tracing::info!("Initialized stats for {}", user);
        Ok(stats)
    }
}

/// In-process gateway
///
/// Holds everything in memory. `set_available(false)` makes every write
/// fail with [`Error::Gateway`]; `fail_stats_updates(true)` fails only
/// stats writes, leaving completion records working.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: Vec<CompletionRecord>,
    stats: HashMap<UserId, UserStats>,
    unavailable: bool,
    stats_read_only: bool,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle simulated outages
    pub fn set_available(&mut self, available: bool) {
        self.unavailable = !available;
    }

    /// Make `update_user_stats` fail while records still go through
    pub fn fail_stats_updates(&mut self, fail: bool) {
        self.stats_read_only = fail;
    }

    pub fn records(&self) -> &[CompletionRecord] {
        &self.records
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable {
            Err(Error::Gateway("memory gateway marked unavailable".into()))
        } else {
            Ok(())
        }
    }
}

impl PersistenceGateway for MemoryGateway {
    fn fetch_completed_exercise_ids(&self, user: &UserId, date: NaiveDate) -> HashSet<String> {
        if self.unavailable {
            return HashSet::new();
        }
        self.records
            .iter()
            .filter(|r| &r.user_id == user && r.date == date)
            .map(|r| r.exercise_id.clone())
            .collect()
    }

    fn record_completion(&mut self, record: &CompletionRecord) -> Result<()> {
        self.check_available()?;
        self.records.push(record.clone());
        Ok(())
    }

    fn fetch_user_stats(&self, user: &UserId) -> Result<Option<UserStats>> {
        self.check_available()?;
        Ok(self.stats.get(user).cloned())
    }

    fn update_user_stats(&mut self, user: &UserId, update: &StatsUpdate) -> Result<()> {
        self.check_available()?;
        if self.stats_read_only {
            return Err(Error::Gateway("stats updates disabled".into()));
        }
        self.stats.entry(user.clone()).or_default().apply(update);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ExerciseKind;
    use chrono::Utc;
    use uuid::Uuid;

    fn record(user: &str, exercise_id: &str, date: NaiveDate) -> CompletionRecord {
        CompletionRecord {
            id: Uuid::new_v4(),
            user_id: UserId::new(user),
            exercise_id: exercise_id.into(),
            exercise_kind: ExerciseKind::KegelMorning,
            date,
            completed_at: Utc::now(),
        }
    }

    #[test]
    fn test_completed_ids_filter_by_user_and_date() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        let mut gateway = MemoryGateway::new();
        gateway.record_completion(&record("alice", "kegel-morning-2024-06-03", monday)).unwrap();
        gateway.record_completion(&record("bob", "kegel-night-2024-06-03", monday)).unwrap();
        gateway.record_completion(&record("alice", "kegel-morning-2024-06-04", tuesday)).unwrap();

        let ids = gateway.fetch_completed_exercise_ids(&UserId::new("alice"), monday);
        assert_eq!(ids.len(), 1);
        assert!(ids.contains("kegel-morning-2024-06-03"));
    }

    #[test]
    fn test_ensure_user_stats_initializes_once() {
        let user = UserId::new("alice");
        let mut gateway = MemoryGateway::new();
        assert_eq!(gateway.fetch_user_stats(&user).unwrap(), None);

        let stats = gateway.ensure_user_stats(&user).unwrap();
        assert_eq!(stats.total_completed, 0);
        assert!(gateway.fetch_user_stats(&user).unwrap().is_some());

        gateway
            .update_user_stats(
                &user,
                &StatsUpdate {
                    current_streak: None,
                    total_completed: 5,
                    last_completed_date: None,
                    updated_at: Utc::now(),
                },
            )
            .unwrap();
        assert_eq!(gateway.ensure_user_stats(&user).unwrap().total_completed, 5);
    }

    #[test]
    fn test_unavailable_gateway_fails_writes_but_not_fetch_ids() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut gateway = MemoryGateway::new();
        gateway.set_available(false);

        let err = gateway.record_completion(&record("alice", "x", date)).unwrap_err();
        assert!(matches!(err, Error::Gateway(_)));
        assert!(gateway
            .fetch_completed_exercise_ids(&UserId::new("alice"), date)
            .is_empty());
    }

    #[test]
    fn test_failing_stats_updates_keep_records_writable() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let user = UserId::new("alice");
        let mut gateway = MemoryGateway::new();
        gateway.fail_stats_updates(true);

        gateway.record_completion(&record("alice", "x", date)).unwrap();
        assert_eq!(gateway.records().len(), 1);
        assert!(matches!(
            gateway.ensure_user_stats(&user),
            Err(Error::Gateway(_))
        ));

        gateway.fail_stats_updates(false);
        assert!(gateway.ensure_user_stats(&user).is_ok());
    }
}
