//! The coach: one user's day of exercises and the active timer.
//!
//! `Coach` is the explicit context that replaces shared global state. It
//! owns the gateway, knows who is signed in and which day is selected,
//! and holds at most one [`TimerSession`].

use crate::gateway::PersistenceGateway;
use crate::schedule::{self, DayRelation};
use crate::timer::{TimerEvent, TimerSession};
use crate::{
    CompletionRecord, DifficultyLevel, Error, ExerciseDefinition, ExerciseKind, Result,
    StatsUpdate, UserId, UserStats,
};
use chrono::{Duration, NaiveDate, Utc};

/// What a successful completion changed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionOutcome {
    pub exercise_id: String,
    /// Every exercise of the day is now done
    pub day_completed: bool,
    pub stats: UserStats,
    /// False if the record was stored but the stats write failed
    pub stats_synced: bool,
}

pub struct Coach<G: PersistenceGateway> {
    gateway: G,
    user: Option<UserId>,
    date: NaiveDate,
    difficulty: DifficultyLevel,
    schedule: Vec<ExerciseDefinition>,
    stats: UserStats,
    active: Option<TimerSession>,
}

impl<G: PersistenceGateway> Coach<G> {
    /// Create an inert coach; call [`Coach::set_user`] to load a day
    pub fn new(gateway: G, date: NaiveDate, difficulty: DifficultyLevel) -> Self {
        Self {
            gateway,
            user: None,
            date,
            difficulty,
            schedule: Vec::new(),
            stats: UserStats::default(),
            active: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn user(&self) -> Option<&UserId> {
        self.user.as_ref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn difficulty(&self) -> DifficultyLevel {
        self.difficulty
    }

    /// The day's exercises; empty while signed out
    pub fn schedule(&self) -> &[ExerciseDefinition] {
        &self.schedule
    }

    pub fn stats(&self) -> &UserStats {
        &self.stats
    }

    pub fn active(&self) -> Option<&TimerSession> {
        self.active.as_ref()
    }

    pub fn exercise(&self, id: &str) -> Option<&ExerciseDefinition> {
        self.schedule.iter().find(|e| e.id == id)
    }

    pub fn exercise_of_kind(&self, kind: ExerciseKind) -> Option<&ExerciseDefinition> {
        self.schedule.iter().find(|e| e.kind == kind)
    }

    /// `(completed, total)` for the selected day
    pub fn day_progress(&self) -> (usize, usize) {
        let done = self.schedule.iter().filter(|e| e.completed).count();
        (done, self.schedule.len())
    }

    pub fn tip_of_the_day(&self) -> &'static str {
        schedule::tip_of_the_day(self.date)
    }

    pub fn day_relation(&self, today: NaiveDate) -> DayRelation {
        DayRelation::of(self.date, today)
    }

    // ── Session gate ─────────────────────────────────────────────────

    /// React to a sign-in, sign-out or user switch.
    ///
    /// Any active session is discarded. `None` leaves the coach inert.
    pub fn set_user(&mut self, user: Option<UserId>) -> Result<()> {
        if self.user == user && self.user.is_some() {
            return Ok(());
        }

        self.active = None;
        self.schedule.clear();
        self.stats = UserStats::default();
        self.user = None;

        match user {
            Some(user) => {
                tracing::info!("Loading day for {}", user);
                // Signed out until stats load
                self.stats = self.gateway.ensure_user_stats(&user)?;
                self.user = Some(user);
                self.refresh();
            }
            None => tracing::info!("No user signed in, coach is inert"),
        }
        Ok(())
    }

    // ── Day selection ────────────────────────────────────────────────

    /// Regenerate the schedule from the gateway's completions
    pub fn refresh(&mut self) {
        self.schedule = match &self.user {
            Some(user) => {
                let completed = self.gateway.fetch_completed_exercise_ids(user, self.date);
                schedule::generate_schedule(self.date, self.difficulty, &completed)
            }
            None => Vec::new(),
        };
    }

    pub fn set_date(&mut self, date: NaiveDate) {
        self.date = date;
        self.refresh();
    }

    pub fn previous_day(&mut self) {
        self.set_date(self.date - Duration::days(1));
    }

    pub fn next_day(&mut self) {
        self.set_date(self.date + Duration::days(1));
    }

    pub fn set_difficulty(&mut self, difficulty: DifficultyLevel) {
        self.difficulty = difficulty;
        self.refresh();
    }

    // ── Timer ────────────────────────────────────────────────────────

    /// Start an exercise from the loaded day, replacing any active session
    pub fn start_exercise(&mut self, id: &str) -> Result<&TimerSession> {
        if self.user.is_none() {
            return Err(Error::Unauthenticated);
        }
        let exercise = self
            .exercise(id)
            .cloned()
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))?;
        if exercise.completed {
            return Err(Error::AlreadyCompleted(id.to_string()));
        }

        if let Some(previous) = self.active.take() {
            tracing::info!("Discarding session for {}", previous.exercise().id);
        }

        Ok(&*self.active.insert(TimerSession::start(exercise)))
    }

    pub fn pause(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.pause();
        }
    }

    pub fn resume(&mut self) {
        if let Some(session) = self.active.as_mut() {
            session.resume();
        }
    }

    pub fn tick(&mut self, elapsed_seconds: u32) -> Vec<TimerEvent> {
        self.active
            .as_mut()
            .map(|s| s.tick(elapsed_seconds))
            .unwrap_or_default()
    }

    /// Drop the active session. Nothing is persisted.
    pub fn cancel(&mut self) {
        if let Some(session) = self.active.take() {
            tracing::info!("Cancelled {}", session.exercise().id);
        }
    }

    // ── Completion ───────────────────────────────────────────────────

    /// Record an exercise of the selected day as done and update stats.
    ///
    /// If the record cannot be stored, nothing local changes (schedule,
    /// stats and the active session are kept) and the error is returned
    /// so the caller can retry.
    pub fn complete_exercise(&mut self, id: &str) -> Result<CompletionOutcome> {
        let user = self.user.clone().ok_or(Error::Unauthenticated)?;
        let exercise = self
            .exercise(id)
            .cloned()
            .ok_or_else(|| Error::UnknownExercise(id.to_string()))?;
        if exercise.completed {
            return Err(Error::AlreadyCompleted(id.to_string()));
        }

        let now = Utc::now();
        let record = CompletionRecord::new(user.clone(), &exercise, now);
        if let Err(e) = self.gateway.record_completion(&record) {
            tracing::warn!("Could not record {}: {}", id, e);
            return Err(match e {
                Error::Gateway(_) => e,
                other => Error::Gateway(other.to_string()),
            });
        }

        let day_completed = self
            .schedule
            .iter()
            .all(|e| e.id == exercise.id || e.completed);
        for entry in self.schedule.iter_mut().filter(|e| e.id == exercise.id) {
            entry.completed = true;
        }

        let mut stats = self.stats.clone();
        let update = if day_completed {
            StatsUpdate {
                current_streak: Some(stats.current_streak + 1),
                total_completed: stats.total_completed + 1,
                last_completed_date: Some(exercise.date),
                updated_at: now,
            }
        } else {
            StatsUpdate {
                current_streak: None,
                total_completed: stats.total_completed + 1,
                last_completed_date: None,
                updated_at: now,
            }
        };
        stats.apply(&update);

        let stats_synced = match self.gateway.update_user_stats(&user, &update) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Recorded {} but could not update stats: {}", id, e);
                false
            }
        };
        self.stats = stats.clone();

        if self
            .active
            .as_ref()
            .is_some_and(|s| s.exercise().id == exercise.id)
        {
            self.active = None;
        }

        tracing::info!(
            "Completed {} (streak {}, total {})",
            exercise.id,
            stats.current_streak,
            stats.total_completed
        );

        Ok(CompletionOutcome {
            exercise_id: exercise.id,
            day_completed,
            stats,
            stats_synced,
        })
    }

    /// Complete whatever exercise the active session is running
    pub fn complete_active(&mut self) -> Result<CompletionOutcome> {
        let id = self
            .active
            .as_ref()
            .map(|s| s.exercise().id.clone())
            .ok_or(Error::NoActiveSession)?;
        self.complete_exercise(&id)
    }
}
