//! Exercise timer state machine.
//!
//! The timer has no clock of its own. The caller drives it with
//! `tick(elapsed_seconds)` once per second while it is running.
//!
//! ## Phases
//!
//! ```text
//! Kegel:      Contract -> Relax -> Contract ... (set += 1 after each Relax)
//!             -> Finished once set > total_sets
//! Breathing:  Breathe(4s) -> Hold(4s) -> Exhale(6s) -> Breathe ...
//! Start-stop: one countdown, stays at 0
//! ```
//!
//! Breathing and start-stop never finish on their own; the user decides
//! when they are done.

use crate::{ExerciseDefinition, ExerciseKind, KegelConfig};
use serde::{Deserialize, Serialize};

pub const BREATHE_SECONDS: u32 = 4;
pub const HOLD_SECONDS: u32 = 4;
pub const EXHALE_SECONDS: u32 = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Contract,
    Relax,
    Breathe,
    Hold,
    Exhale,
    /// Start-stop single countdown
    Countdown,
}

impl Phase {
    /// Label shown above the countdown
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Contract => "CONTRACT",
            Phase::Relax => "RELAX",
            Phase::Breathe => "BREATHE IN",
            Phase::Hold => "HOLD",
            Phase::Exhale => "BREATHE OUT",
            Phase::Countdown => "FOLLOW THE INSTRUCTIONS",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Running,
    Paused,
    /// Kegel sets exhausted; accepts no further ticks
    Finished,
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimerEvent {
    PhaseChanged { from: Phase, to: Phase },
    SetStarted { set: u32, total: u32 },
    Finished,
}

/// One active exercise countdown
#[derive(Debug, Clone)]
pub struct TimerSession {
    exercise: ExerciseDefinition,
    kegel: Option<KegelConfig>,
    phase: Phase,
    state: TimerState,
    remaining_seconds: u32,
    current_set: u32,
    total_sets: u32,
}

impl TimerSession {
    /// Start a session for an exercise. The session is running immediately.
    pub fn start(exercise: ExerciseDefinition) -> Self {
        let kegel = exercise.kegel_config();
        let (phase, remaining_seconds, total_sets) = match (exercise.kind, kegel) {
            (_, Some(config)) => (Phase::Contract, config.contract_seconds, config.sets),
            (ExerciseKind::Breathing, None) => (Phase::Breathe, BREATHE_SECONDS, 0),
            (_, None) => (Phase::Countdown, exercise.duration_seconds, 0),
        };

        tracing::info!(
            "Started {} ({:?}, {}s)",
            exercise.id,
            phase,
            remaining_seconds
        );

        Self {
            exercise,
            kegel,
            phase,
            state: TimerState::Running,
            remaining_seconds,
            current_set: 1,
            total_sets,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn exercise(&self) -> &ExerciseDefinition {
        &self.exercise
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == TimerState::Finished
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    /// Number of sets; zero for kinds without sets
    pub fn total_sets(&self) -> u32 {
        self.total_sets
    }

    pub fn phase_label(&self) -> &'static str {
        self.phase.label()
    }

    /// `Set n/m` for Kegel sessions
    pub fn set_label(&self) -> Option<String> {
        self.kegel
            .map(|_| format!("Set {}/{}", self.current_set.min(self.total_sets), self.total_sets))
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Stop ticking without touching any counter
    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
            tracing::debug!("Paused {} at {}s", self.exercise.id, self.remaining_seconds);
        }
    }

    /// Continue exactly where `pause` left off. No-op once finished.
    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
            tracing::debug!("Resumed {} at {}s", self.exercise.id, self.remaining_seconds);
        }
    }

    /// Advance the countdown by `elapsed_seconds`.
    ///
    /// Returns the transitions that happened. Does nothing unless running.
    pub fn tick(&mut self, elapsed_seconds: u32) -> Vec<TimerEvent> {
        let mut events = Vec::new();
        for _ in 0..elapsed_seconds {
            if self.state != TimerState::Running {
                break;
            }
            self.step(&mut events);
        }
        events
    }

    fn step(&mut self, events: &mut Vec<TimerEvent>) {
        if self.remaining_seconds > 1 {
            self.remaining_seconds -= 1;
            return;
        }

        match (self.kegel, self.exercise.kind) {
            (Some(config), _) => self.advance_kegel(config, events),
            (None, ExerciseKind::Breathing) => self.advance_breathing(events),
            (None, _) => self.remaining_seconds = 0,
        }
    }

    fn advance_kegel(&mut self, config: KegelConfig, events: &mut Vec<TimerEvent>) {
        match self.phase {
            Phase::Contract => {
                self.set_phase(Phase::Relax, config.relax_seconds, events);
            }
            _ => {
                self.current_set += 1;
                if self.current_set > self.total_sets {
                    self.remaining_seconds = 0;
                    self.state = TimerState::Finished;
                    tracing::info!("Finished all {} sets of {}", self.total_sets, self.exercise.id);
                    events.push(TimerEvent::Finished);
                } else {
                    events.push(TimerEvent::SetStarted {
                        set: self.current_set,
                        total: self.total_sets,
                    });
                    self.set_phase(Phase::Contract, config.contract_seconds, events);
                }
            }
        }
    }

    fn advance_breathing(&mut self, events: &mut Vec<TimerEvent>) {
        let (next, seconds) = match self.phase {
            Phase::Breathe => (Phase::Hold, HOLD_SECONDS),
            Phase::Hold => (Phase::Exhale, EXHALE_SECONDS),
            _ => (Phase::Breathe, BREATHE_SECONDS),
        };
        self.set_phase(next, seconds, events);
    }

    fn set_phase(&mut self, to: Phase, seconds: u32, events: &mut Vec<TimerEvent>) {
        tracing::debug!("{}: {:?} -> {:?}", self.exercise.id, self.phase, to);
        events.push(TimerEvent::PhaseChanged {
            from: self.phase,
            to,
        });
        self.phase = to;
        self.remaining_seconds = seconds;
    }
}

/// Format seconds as `m:ss`
pub fn format_time(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
