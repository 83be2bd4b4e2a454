//! Built-in exercise catalog.
//!
//! Display text and fixed durations for each exercise kind. Kegel entries
//! are parameterised by the difficulty table in [`DifficultyLevel::kegel_config`].

use crate::types::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Fixed duration of the start-stop exercise
pub const START_STOP_SECONDS: u32 = 600;

/// Advisory duration of the breathing exercise
pub const BREATHING_SECONDS: u32 = 300;

/// Static text for one exercise kind
#[derive(Clone, Debug)]
pub struct ExerciseTemplate {
    pub kind: ExerciseKind,
    pub name: &'static str,
    pub period: Period,
    pub description: &'static str,
    /// Instructions appended after any level-specific lines
    pub instructions: &'static [&'static str],
}

/// Cached templates - built once and reused for every generated day
static TEMPLATES: Lazy<HashMap<ExerciseKind, ExerciseTemplate>> = Lazy::new(build_templates);

/// Get the template for an exercise kind
pub fn template(kind: ExerciseKind) -> &'static ExerciseTemplate {
    // Every kind is inserted by build_templates
    &TEMPLATES[&kind]
}

fn build_templates() -> HashMap<ExerciseKind, ExerciseTemplate> {
    let mut templates = HashMap::new();

    templates.insert(
        ExerciseKind::KegelMorning,
        ExerciseTemplate {
            kind: ExerciseKind::KegelMorning,
            name: "Morning Kegel",
            period: Period::Morning,
            description: "Kegel exercise to start the day with energy",
            instructions: &["Keep breathing normally"],
        },
    );

    templates.insert(
        ExerciseKind::KegelNight,
        ExerciseTemplate {
            kind: ExerciseKind::KegelNight,
            name: "Night Kegel",
            period: Period::Night,
            description: "Kegel exercise before sleep",
            instructions: &["Focus on the quality of each contraction"],
        },
    );

    templates.insert(
        ExerciseKind::StartStop,
        ExerciseTemplate {
            kind: ExerciseKind::StartStop,
            name: "Start-Stop Technique",
            period: Period::Morning,
            description: "Exercise for ejaculation control",
            instructions: &[
                "Stimulate yourself until you feel close to climax",
                "Stop stimulation completely",
                "Wait 30-60 seconds until the sensation fades",
                "Repeat the process 3-5 times",
                "This trains control and recognition of your body's signals",
            ],
        },
    );

    templates.insert(
        ExerciseKind::Breathing,
        ExerciseTemplate {
            kind: ExerciseKind::Breathing,
            name: "Breathing Control",
            period: Period::Morning,
            description: "Breathing exercise for control and relaxation",
            instructions: &[
                "Breathe in deeply through the nose for 4 seconds",
                "Hold the breath for 4 seconds",
                "Breathe out slowly through the mouth for 6 seconds",
                "Repeat for 5 minutes",
                "Controlled breathing helps keep control during intercourse",
            ],
        },
    );

    templates
}

/// Full instruction list for an exercise kind at a level
pub fn instructions_for(kind: ExerciseKind, difficulty: DifficultyLevel) -> Vec<String> {
    let template = template(kind);
    let mut lines = Vec::with_capacity(template.instructions.len() + 3);

    if kind.is_kegel() {
        let config = difficulty.kegel_config();
        lines.push(format!(
            "Contract the pelvic floor muscles for {} seconds",
            config.contract_seconds
        ));
        lines.push(format!("Relax for {} seconds", config.relax_seconds));
        lines.push(format!("Repeat {} times", config.sets));
    }

    lines.extend(template.instructions.iter().map(|s| s.to_string()));
    lines
}

/// Description line, with the level name for Kegel kinds
pub fn description_for(kind: ExerciseKind, difficulty: DifficultyLevel) -> String {
    let template = template(kind);
    if kind.is_kegel() {
        format!("{} - {} level", template.description, difficulty.label())
    } else {
        template.description.to_string()
    }
}

/// Duration in seconds for an exercise kind at a level
pub fn duration_for(kind: ExerciseKind, difficulty: DifficultyLevel) -> u32 {
    match kind {
        ExerciseKind::KegelMorning | ExerciseKind::KegelNight => {
            difficulty.kegel_config().total_seconds()
        }
        ExerciseKind::StartStop => START_STOP_SECONDS,
        ExerciseKind::Breathing => BREATHING_SECONDS,
    }
}
