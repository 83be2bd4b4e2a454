//! Core domain types for The Coach.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercise kinds, periods and difficulty levels
//! - Exercise definitions for a calendar day
//! - Completion records and aggregate user stats

use crate::{Error, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Exercise Types
// ============================================================================

/// Kind of scheduled exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum ExerciseKind {
    KegelMorning,
    KegelNight,
    StartStop,
    Breathing,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 4] = [
        ExerciseKind::KegelMorning,
        ExerciseKind::KegelNight,
        ExerciseKind::StartStop,
        ExerciseKind::Breathing,
    ];

    /// Stable slug, used as the exercise id prefix
    pub fn slug(&self) -> &'static str {
        match self {
            ExerciseKind::KegelMorning => "kegel-morning",
            ExerciseKind::KegelNight => "kegel-night",
            ExerciseKind::StartStop => "start-stop",
            ExerciseKind::Breathing => "breathing",
        }
    }

    pub fn is_kegel(&self) -> bool {
        matches!(self, ExerciseKind::KegelMorning | ExerciseKind::KegelNight)
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        ExerciseKind::ALL
            .into_iter()
            .find(|k| k.slug() == normalized)
            .ok_or_else(|| Error::Parse(format!("unknown exercise kind '{}'", s)))
    }
}

/// Display grouping for an exercise
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Morning,
    Night,
}

/// Kegel difficulty setting
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl DifficultyLevel {
    pub const ALL: [DifficultyLevel; 3] = [
        DifficultyLevel::Beginner,
        DifficultyLevel::Intermediate,
        DifficultyLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "beginner",
            DifficultyLevel::Intermediate => "intermediate",
            DifficultyLevel::Advanced => "advanced",
        }
    }

    /// Human-readable level name
    pub fn label(&self) -> &'static str {
        match self {
            DifficultyLevel::Beginner => "Beginner",
            DifficultyLevel::Intermediate => "Intermediate",
            DifficultyLevel::Advanced => "Advanced",
        }
    }

    /// Contract/relax timings for this level.
    ///
    /// Static table shared by both Kegel exercises of a day.
    pub const fn kegel_config(&self) -> KegelConfig {
        match self {
            DifficultyLevel::Beginner => KegelConfig {
                contract_seconds: 3,
                relax_seconds: 3,
                sets: 10,
            },
            DifficultyLevel::Intermediate => KegelConfig {
                contract_seconds: 5,
                relax_seconds: 5,
                sets: 15,
            },
            DifficultyLevel::Advanced => KegelConfig {
                contract_seconds: 8,
                relax_seconds: 8,
                sets: 20,
            },
        }
    }
}

impl fmt::Display for DifficultyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DifficultyLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        DifficultyLevel::ALL
            .into_iter()
            .find(|l| l.as_str() == normalized)
            .ok_or_else(|| Error::Parse(format!("unknown difficulty level '{}'", s)))
    }
}

/// Contract/relax parameters for Kegel sets
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct KegelConfig {
    pub contract_seconds: u32,
    pub relax_seconds: u32,
    pub sets: u32,
}

impl KegelConfig {
    /// Total seconds for all sets
    pub const fn total_seconds(&self) -> u32 {
        self.sets * (self.contract_seconds + self.relax_seconds)
    }
}

// ============================================================================
// Exercise Definition
// ============================================================================

/// One exercise occurrence on a calendar day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExerciseDefinition {
    /// `<kind-slug>-<YYYY-MM-DD>`, stable across regenerations
    pub id: String,
    pub kind: ExerciseKind,
    pub period: Period,
    pub date: NaiveDate,
    pub name: String,
    pub description: String,
    pub duration_seconds: u32,
    pub instructions: Vec<String>,
    pub completed: bool,
    /// Level the Kegel timings were derived from; `None` for other kinds
    pub difficulty: Option<DifficultyLevel>,
}

impl ExerciseDefinition {
    /// Kegel timings for this exercise, if it is a Kegel kind
    pub fn kegel_config(&self) -> Option<KegelConfig> {
        if self.kind.is_kegel() {
            Some(self.difficulty.unwrap_or_default().kegel_config())
        } else {
            None
        }
    }
}

// ============================================================================
// Persistence Types
// ============================================================================

/// Opaque user identifier supplied by the identity provider
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored completion of one exercise on one date
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub exercise_id: String,
    pub exercise_kind: ExerciseKind,
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

impl CompletionRecord {
    pub fn new(user_id: UserId, exercise: &ExerciseDefinition, completed_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            exercise_id: exercise.id.clone(),
            exercise_kind: exercise.kind,
            date: exercise.date,
            completed_at,
        }
    }
}

/// Aggregate counters kept per user
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserStats {
    pub current_streak: u32,
    pub total_completed: u32,
    pub last_completed_date: Option<NaiveDate>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial stats write; `None` fields keep their stored value
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatsUpdate {
    pub current_streak: Option<u32>,
    pub total_completed: u32,
    pub last_completed_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    /// Apply a partial update in place
    pub fn apply(&mut self, update: &StatsUpdate) {
        if let Some(streak) = update.current_streak {
            self.current_streak = streak;
        }
        self.total_completed = update.total_completed;
        if let Some(date) = update.last_completed_date {
            self.last_completed_date = Some(date);
        }
        self.updated_at = Some(update.updated_at);
    }
}
