use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use coach_core::*;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Daily pelvic-floor and breathing exercise coach", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Override config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Remember which user this terminal acts for
    Login {
        user_id: String,
    },

    /// Forget the signed-in user
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Show the day's exercises (default)
    Today {
        /// Day to show (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,

        /// Kegel level (beginner, intermediate, advanced)
        #[arg(long)]
        difficulty: Option<DifficultyLevel>,
    },

    /// Run an exercise timer
    Run {
        /// kegel-morning, kegel-night, start-stop or breathing
        kind: ExerciseKind,

        #[arg(long)]
        date: Option<NaiveDate>,

        #[arg(long)]
        difficulty: Option<DifficultyLevel>,

        /// Tick without waiting a real second
        #[arg(long)]
        simulate: bool,

        /// Mark the exercise done when the timer stops
        #[arg(long, conflicts_with = "auto_cancel")]
        auto_complete: bool,

        /// Discard the session when the timer stops
        #[arg(long, conflicts_with = "auto_complete")]
        auto_cancel: bool,
    },

    /// Mark an exercise done without running the timer
    Complete {
        kind: ExerciseKind,

        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Show streak and lifetime totals
    Stats,

    /// Export completion history to CSV
    Export {
        output: PathBuf,
    },

    /// Set the default Kegel level
    Level {
        difficulty: DifficultyLevel,
    },
}

/// Resolved paths and settings shared by all commands
struct AppContext {
    config: Config,
    config_path: PathBuf,
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    coach_core::logging::init();

    let cli = Cli::parse();

    let config_path = cli.config.unwrap_or_else(Config::default_config_path);
    let config = Config::load_or_default(&config_path)?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    tracing::debug!("Using config {:?}, data dir {:?}", config_path, data_dir);
    let app = AppContext {
        config,
        config_path,
        data_dir,
    };

    match cli.command {
        Some(Commands::Login { user_id }) => cmd_login(&app, user_id),
        Some(Commands::Logout) => cmd_logout(&app),
        Some(Commands::Whoami) => cmd_whoami(&app),
        Some(Commands::Today { date, difficulty }) => cmd_today(&app, date, difficulty),
        Some(Commands::Run {
            kind,
            date,
            difficulty,
            simulate,
            auto_complete,
            auto_cancel,
        }) => {
            let finish = if auto_complete {
                Some(UserAction::Done)
            } else if auto_cancel {
                Some(UserAction::Cancel)
            } else {
                None
            };
            cmd_run(&app, kind, date, difficulty, simulate, finish)
        }
        Some(Commands::Complete { kind, date }) => cmd_complete(&app, kind, date),
        Some(Commands::Stats) => cmd_stats(&app),
        Some(Commands::Export { output }) => cmd_export(&app, &output),
        Some(Commands::Level { difficulty }) => cmd_level(app, difficulty),
        None => cmd_today(&app, None, None),
    }
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Build a coach for the signed-in user, or an inert one
fn open_coach(
    app: &AppContext,
    date: Option<NaiveDate>,
    difficulty: Option<DifficultyLevel>,
) -> Result<Coach<FileGateway>> {
    let identity = SessionFile::new(&app.data_dir);
    let mut coach = Coach::new(
        FileGateway::new(&app.data_dir),
        date.unwrap_or_else(today),
        difficulty.unwrap_or(app.config.exercises.difficulty),
    );
    coach.set_user(identity.current_user_id())?;
    Ok(coach)
}

fn require_user(coach: &Coach<FileGateway>) -> Result<UserId> {
    match coach.user() {
        Some(user) => Ok(user.clone()),
        None => {
            eprintln!("Not signed in. Run `coach login <user-id>` first.");
            Err(Error::Unauthenticated)
        }
    }
}

fn cmd_login(app: &AppContext, user_id: String) -> Result<()> {
    let signed_in = SessionFile::new(&app.data_dir).sign_in(UserId::new(user_id))?;

    // Touch the stats row so a first-time user starts at zero
    let mut gateway = FileGateway::new(&app.data_dir);
    gateway.ensure_user_stats(&signed_in.user_id)?;

    println!("✓ Signed in as {}", signed_in.user_id);
    Ok(())
}

fn cmd_logout(app: &AppContext) -> Result<()> {
    if SessionFile::new(&app.data_dir).sign_out()? {
        println!("✓ Signed out");
    } else {
        println!("Not signed in.");
    }
    Ok(())
}

fn cmd_whoami(app: &AppContext) -> Result<()> {
    match SessionFile::new(&app.data_dir).load() {
        Some(session) => println!(
            "{} (since {})",
            session.user_id,
            session.signed_in_at.format("%Y-%m-%d %H:%M UTC")
        ),
        None => println!("Not signed in."),
    }
    Ok(())
}

fn cmd_today(
    app: &AppContext,
    date: Option<NaiveDate>,
    difficulty: Option<DifficultyLevel>,
) -> Result<()> {
    let coach = open_coach(app, date, difficulty)?;
    if coach.user().is_none() {
        println!("Not signed in. Run `coach login <user-id>` first.");
        return Ok(());
    }

    let (done, total) = coach.day_progress();
    let config = coach.difficulty().kegel_config();
    let stats = coach.stats();

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", coach.date().format("%A, %B %-d %Y"));
    println!("╰─────────────────────────────────────────╯");
    println!();
    println!(
        "  {}: {}/{} completed",
        coach.day_relation(today()).heading(),
        done,
        total
    );
    println!(
        "  Kegel level: {} ({}s × {})",
        coach.difficulty().label(),
        config.contract_seconds,
        config.sets
    );
    println!(
        "  Streak: {}   Total completed: {}",
        stats.current_streak, stats.total_completed
    );
    println!();

    for exercise in coach.schedule() {
        display_exercise(exercise);
    }

    println!("  ℹ Tip of the day: {}", coach.tip_of_the_day());
    println!();
    Ok(())
}

fn display_exercise(exercise: &ExerciseDefinition) {
    let mark = if exercise.completed { "✓" } else { " " };
    let period = match exercise.period {
        Period::Morning => "Morning",
        Period::Night => "Night",
    };
    println!(
        "  [{}] {} ({}) · {} · {}",
        mark,
        exercise.name,
        period,
        format_time(exercise.duration_seconds),
        exercise.kind
    );
    println!("      {}", exercise.description);
    for line in &exercise.instructions {
        println!("      • {}", line);
    }
    println!();
}

fn scheduled_id(coach: &Coach<FileGateway>, kind: ExerciseKind) -> Result<String> {
    coach
        .exercise_of_kind(kind)
        .map(|e| e.id.clone())
        .ok_or_else(|| {
            Error::UnknownExercise(format!("{} is not scheduled on {}", kind, coach.date()))
        })
}

fn cmd_run(
    app: &AppContext,
    kind: ExerciseKind,
    date: Option<NaiveDate>,
    difficulty: Option<DifficultyLevel>,
    simulate: bool,
    finish: Option<UserAction>,
) -> Result<()> {
    let mut coach = open_coach(app, date, difficulty)?;
    require_user(&coach)?;
    let id = scheduled_id(&coach, kind)?;

    let session = coach.start_exercise(&id)?;
    let advisory_seconds = session.exercise().duration_seconds;
    let auto_finishes = session.total_sets() > 0;

    println!("\n  {} - {}", session.exercise().name, session.exercise().description);
    print_status(session);

    // Breathing and start-stop run until the user stops them; this driver
    // pauses them once the advisory duration has passed.
    let mut elapsed = 0;
    while let Some(session) = coach.active() {
        if !session.is_running() {
            break;
        }
        if !auto_finishes && elapsed >= advisory_seconds {
            coach.pause();
            println!("  ⏸ {} elapsed", format_time(elapsed));
            break;
        }

        if !simulate {
            std::thread::sleep(Duration::from_secs(1));
        }
        let events = coach.tick(1);
        elapsed += 1;

        if let Some(session) = coach.active() {
            for event in &events {
                match event {
                    TimerEvent::PhaseChanged { .. } => print_status(session),
                    TimerEvent::Finished => println!("  ✓ All sets done"),
                    TimerEvent::SetStarted { .. } => {}
                }
            }
        }
    }

    let action = match finish {
        Some(action) => action,
        None => prompt_user_action()?,
    };

    match action {
        UserAction::Cancel => {
            coach.cancel();
            println!("\nSession cancelled, nothing recorded.");
            Ok(())
        }
        UserAction::Done => loop {
            match coach.complete_active() {
                Ok(outcome) => {
                    print_outcome(&outcome);
                    return Ok(());
                }
                Err(Error::Gateway(msg)) if finish.is_none() => {
                    tracing::warn!("Completion not saved: {}", msg);
                    if !prompt_retry(&msg)? {
                        return Err(Error::Gateway(msg));
                    }
                }
                Err(e) => return Err(e),
            }
        },
    }
}

fn print_status(session: &TimerSession) {
    match session.set_label() {
        Some(set) => println!(
            "  [{}] {:<12} {}",
            format_time(session.remaining_seconds()),
            session.phase_label(),
            set
        ),
        None => println!(
            "  [{}] {}",
            format_time(session.remaining_seconds()),
            session.phase_label()
        ),
    }
}

fn print_outcome(outcome: &CompletionOutcome) {
    println!("\n✓ Exercise completed! ({})", outcome.exercise_id);
    if outcome.day_completed {
        println!("  🔥 All exercises done for the day!");
    }
    println!(
        "  Streak: {}   Total completed: {}",
        outcome.stats.current_streak, outcome.stats.total_completed
    );
    if !outcome.stats_synced {
        tracing::warn!("Stats for {} were not saved", outcome.exercise_id);
        println!("  ⚠ The exercise is recorded, but stats could not be saved.");
        println!("    Streak and total above were not stored and will not be counted later.");
    }
}

fn cmd_complete(app: &AppContext, kind: ExerciseKind, date: Option<NaiveDate>) -> Result<()> {
    let mut coach = open_coach(app, date, None)?;
    require_user(&coach)?;
    let id = scheduled_id(&coach, kind)?;

    let outcome = coach.complete_exercise(&id)?;
    print_outcome(&outcome);
    Ok(())
}

fn cmd_stats(app: &AppContext) -> Result<()> {
    let coach = open_coach(app, None, None)?;
    require_user(&coach)?;
    let stats = coach.stats();

    println!("  Current streak:   {}", stats.current_streak);
    println!("  Total completed:  {}", stats.total_completed);
    match stats.last_completed_date {
        Some(date) => println!("  Last full day:    {}", date),
        None => println!("  Last full day:    -"),
    }
    Ok(())
}

fn cmd_export(app: &AppContext, output: &Path) -> Result<()> {
    let coach = open_coach(app, None, None)?;
    let user = require_user(&coach)?;

    let records = coach.gateway().completions().read_for_user(&user)?;
    let count = coach_core::export::write_completions_csv(&records, output)?;

    println!("✓ Exported {} completions", count);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_level(app: AppContext, difficulty: DifficultyLevel) -> Result<()> {
    let mut config = app.config;
    config.exercises.difficulty = difficulty;
    config.save_to(&app.config_path)?;

    let kegel = difficulty.kegel_config();
    println!(
        "✓ Kegel level set to {} ({}s contract / {}s relax × {})",
        difficulty.label(),
        kegel.contract_seconds,
        kegel.relax_seconds,
        kegel.sets
    );
    Ok(())
}

#[derive(Clone, Copy)]
enum UserAction {
    Done,
    Cancel,
}

fn prompt_user_action() -> Result<UserAction> {
    println!("─────────────────────────────────────────");
    println!("Press Enter to mark the exercise complete");
    println!("  'c' + Enter to cancel");
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    let action = match input.trim().to_lowercase().as_str() {
        "c" => UserAction::Cancel,
        _ => UserAction::Done,
    };

    Ok(action)
}

fn prompt_retry(message: &str) -> Result<bool> {
    println!("⚠ Could not save: {}", message);
    print!("Retry? [Y/n] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(!input.trim().eq_ignore_ascii_case("n"))
}
