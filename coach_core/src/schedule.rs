//! Daily exercise schedule generation.
//!
//! Every day carries the two Kegel sessions plus one extra exercise chosen by
//! weekday:
//! - Monday, Wednesday, Friday → start-stop
//! - any other day → breathing
//!
//! Generation is pure. Completion flags come from ids the caller fetched
//! from the persistence gateway.

use crate::catalog;
use crate::{DifficultyLevel, ExerciseDefinition, ExerciseKind};
use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::HashSet;

/// Whether the given day is a start-stop day
pub fn has_start_stop(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Mon | Weekday::Wed | Weekday::Fri)
}

/// Deterministic id for an exercise on a calendar day
pub fn exercise_id(kind: ExerciseKind, date: NaiveDate) -> String {
    format!("{}-{}", kind.slug(), date.format("%Y-%m-%d"))
}

/// Kinds scheduled on a date, in display order
pub fn kinds_for_date(date: NaiveDate) -> [ExerciseKind; 3] {
    let extra = if has_start_stop(date) {
        ExerciseKind::StartStop
    } else {
        ExerciseKind::Breathing
    };
    [ExerciseKind::KegelMorning, ExerciseKind::KegelNight, extra]
}

/// Build the exercise list for a day
///
/// Always returns three entries: morning Kegel, night Kegel, then either
/// start-stop or breathing. An entry is marked completed iff its id is in
/// `completed_ids`.
pub fn generate_schedule(
    date: NaiveDate,
    difficulty: DifficultyLevel,
    completed_ids: &HashSet<String>,
) -> Vec<ExerciseDefinition> {
    let schedule: Vec<_> = kinds_for_date(date)
        .into_iter()
        .map(|kind| {
            let id = exercise_id(kind, date);
            let template = catalog::template(kind);
            ExerciseDefinition {
                completed: completed_ids.contains(&id),
                id,
                kind,
                period: template.period,
                date,
                name: template.name.to_string(),
                description: catalog::description_for(kind, difficulty),
                duration_seconds: catalog::duration_for(kind, difficulty),
                instructions: catalog::instructions_for(kind, difficulty),
                difficulty: kind.is_kegel().then_some(difficulty),
            }
        })
        .collect();

    tracing::debug!(
        "Generated schedule for {} ({}): {} of {} completed",
        date,
        difficulty,
        schedule.iter().filter(|e| e.completed).count(),
        schedule.len()
    );

    schedule
}

/// Tip shown under the day's schedule
pub fn tip_of_the_day(date: NaiveDate) -> &'static str {
    if has_start_stop(date) {
        "Today is a start-stop day. This exercise is key to building control during \
         intercourse. Practice calmly and pay attention to your body's signals."
    } else {
        "Today, practice the breathing exercise. Controlled breathing is essential to keep \
         control during moments of high arousal. Combine it with the Kegel exercises for \
         better results."
    }
}

/// Where a date sits relative to a reference day
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayRelation {
    Past,
    Today,
    Future,
}

impl DayRelation {
    pub fn of(date: NaiveDate, today: NaiveDate) -> Self {
        match date.cmp(&today) {
            std::cmp::Ordering::Less => DayRelation::Past,
            std::cmp::Ordering::Equal => DayRelation::Today,
            std::cmp::Ordering::Greater => DayRelation::Future,
        }
    }

    /// Heading for the progress card
    pub fn heading(&self) -> &'static str {
        match self {
            DayRelation::Past => "Past Exercises",
            DayRelation::Today => "Today's Progress",
            DayRelation::Future => "Upcoming Exercises",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_every_day_has_three_exercises() {
        let start = day(2024, 6, 3);
        for offset in 0..14 {
            let date = start + Duration::days(offset);
            let schedule = generate_schedule(date, DifficultyLevel::Beginner, &HashSet::new());

            assert_eq!(schedule.len(), 3);
            assert_eq!(schedule[0].kind, ExerciseKind::KegelMorning);
            assert_eq!(schedule[1].kind, ExerciseKind::KegelNight);

            let expected = if matches!(date.weekday(), Weekday::Mon | Weekday::Wed | Weekday::Fri)
            {
                ExerciseKind::StartStop
            } else {
                ExerciseKind::Breathing
            };
            assert_eq!(schedule[2].kind, expected, "wrong extra exercise on {}", date);
        }
    }

    #[test]
    fn test_monday_is_start_stop() {
        // 2024-06-03 is a Monday
        let schedule = generate_schedule(day(2024, 6, 3), DifficultyLevel::Beginner, &HashSet::new());
        assert_eq!(schedule[2].id, "start-stop-2024-06-03");
        assert_eq!(schedule[2].duration_seconds, 600);
        assert_eq!(schedule[2].difficulty, None);

        let tuesday = generate_schedule(day(2024, 6, 4), DifficultyLevel::Beginner, &HashSet::new());
        assert_eq!(tuesday[2].id, "breathing-2024-06-04");
        assert_eq!(tuesday[2].duration_seconds, 300);
    }

    #[test]
    fn test_generation_is_idempotent() {
        let date = day(2024, 6, 5);
        let a = generate_schedule(date, DifficultyLevel::Advanced, &HashSet::new());
        let b = generate_schedule(date, DifficultyLevel::Advanced, &HashSet::new());

        let ids_a: Vec<_> = a.iter().map(|e| e.id.as_str()).collect();
        let ids_b: Vec<_> = b.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids_a, ids_b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_ids_embed_iso_date() {
        let schedule = generate_schedule(day(2024, 1, 9), DifficultyLevel::Beginner, &HashSet::new());
        assert_eq!(schedule[0].id, "kegel-morning-2024-01-09");
        assert_eq!(schedule[1].id, "kegel-night-2024-01-09");
    }

    #[test]
    fn test_kegel_duration_tracks_difficulty() {
        let date = day(2024, 6, 3);
        for (level, expected) in [
            (DifficultyLevel::Beginner, 60),
            (DifficultyLevel::Intermediate, 150),
            (DifficultyLevel::Advanced, 320),
        ] {
            let schedule = generate_schedule(date, level, &HashSet::new());
            assert_eq!(schedule[0].duration_seconds, expected);
            assert_eq!(schedule[1].duration_seconds, expected);
            assert_eq!(schedule[0].difficulty, Some(level));
        }
    }

    #[test]
    fn test_completed_flags_merge_by_id() {
        let date = day(2024, 6, 3);
        let completed: HashSet<String> = [
            "kegel-night-2024-06-03".to_string(),
            // Different date, must not match
            "kegel-morning-2024-06-02".to_string(),
        ]
        .into_iter()
        .collect();

        let schedule = generate_schedule(date, DifficultyLevel::Beginner, &completed);
        assert!(!schedule[0].completed);
        assert!(schedule[1].completed);
        assert!(!schedule[2].completed);
    }

    #[test]
    fn test_day_relation() {
        let today = day(2024, 6, 3);
        assert_eq!(DayRelation::of(day(2024, 6, 2), today), DayRelation::Past);
        assert_eq!(DayRelation::of(today, today), DayRelation::Today);
        assert_eq!(DayRelation::of(day(2024, 6, 4), today), DayRelation::Future);
    }
}
