use clap::{Parser, Subcommand};
use interval_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;

#[derive(Parser)]
#[command(name = "intervals")]
#[command(about = "Workout interval timer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Use this config file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the directory searched for routine files
    #[arg(long, global = true)]
    routines_dir: Option<PathBuf>,

    /// Show debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in routines
    List,

    /// Print the expanded block sequence of a routine
    Show {
        /// Built-in id, routine file path, or file name in the routines dir
        routine: String,
    },

    /// Play a routine with a live countdown
    Play {
        /// Built-in id, routine file path, or file name in the routines dir
        routine: String,

        /// Start with audio cues muted
        #[arg(long)]
        mute: bool,

        /// Start with haptic cues disabled
        #[arg(long)]
        no_haptics: bool,

        /// Tick interval in milliseconds
        #[arg(long)]
        tick_ms: Option<u64>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    // Initialize logging
    if cli.verbose {
        interval_core::logging::init_with_level("debug");
    } else {
        interval_core::logging::init_with_level("warn");
    }

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let routines_dir = cli
        .routines_dir
        .unwrap_or_else(|| config.data.routines_dir.clone());

    match cli.command {
        Commands::List => cmd_list(),
        Commands::Show { routine } => cmd_show(&routine, routines_dir),
        Commands::Play {
            routine,
            mute,
            no_haptics,
            tick_ms,
        } => cmd_play(&routine, routines_dir, mute, no_haptics, tick_ms, config),
    }
}

fn cmd_list() -> Result<()> {
    let catalog = get_default_catalog();
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::RoutineValidation("Invalid catalog".into()));
    }

    for (id, routine) in &catalog.routines {
        let total = total_duration_sec(&expand(routine));
        println!("{:<10} {:<22} {}", id, routine.name, format_clock(total));
    }

    Ok(())
}

fn cmd_show(name: &str, routines_dir: PathBuf) -> Result<()> {
    let routine = resolve_routine(name, &routines_dir)?;
    let blocks = expand(&routine);

    println!("\n  {}", routine.name);
    if let Some(ref note) = routine.note {
        println!("  {}", note);
    }
    println!(
        "  {} blocks, {} total",
        blocks.len(),
        format_clock(total_duration_sec(&blocks))
    );
    println!();

    for block in &blocks {
        let round = if block.total_iterations > 1 {
            format!("{}/{}", block.iteration, block.total_iterations)
        } else {
            String::new()
        };
        println!(
            "  {:>3}  {:<20} {:<9} {}  {}",
            block.sequence_index,
            block.name(),
            kind_label(block.kind()),
            format_clock(f64::from(block.duration_sec())),
            round
        );
    }
    println!();

    Ok(())
}

fn cmd_play(
    name: &str,
    routines_dir: PathBuf,
    mute: bool,
    no_haptics: bool,
    tick_ms: Option<u64>,
    mut config: Config,
) -> Result<()> {
    let routine = resolve_routine(name, &routines_dir)?;

    if let Some(ms) = tick_ms {
        config.timer.tick_interval_ms = ms;
        config.validate()?;
    }
    if mute {
        config.cues.audio_enabled = false;
    }
    if no_haptics {
        config.cues.haptics_enabled = false;
    }

    let outlet = QueuedOutlet::spawn(TerminalAudio::default(), NoHaptics)?;
    let mut engine = TimerEngine::with_options(Some(routine), outlet, EngineOptions::from(&config));

    engine.start();
    if !engine.is_ticking() {
        println!("Routine has no blocks - nothing to play.");
        return Ok(());
    }

    let total = engine.snapshot().total_duration_sec;
    println!(
        "\n  {} ({} blocks, {})\n",
        engine.routine().map_or("", |r| r.name.as_str()),
        engine.snapshot().total_blocks,
        format_clock(total)
    );

    let mut last_shown: Option<(usize, i64)> = None;
    print_status(engine.snapshot(), &mut last_shown)?;

    while engine.is_ticking() {
        thread::sleep(engine.tick_interval());
        engine.tick();
        print_status(engine.snapshot(), &mut last_shown)?;
    }

    // Let the worker finish printing queued cues before the summary
    engine.outlet_mut().shutdown();

    let snapshot = engine.snapshot();
    println!(
        "\n✓ Routine complete! {} of work and rest.",
        format_clock(snapshot.total_elapsed_sec)
    );

    Ok(())
}

/// Print one line per displayed second of the current block
fn print_status(snapshot: &IntervalSnapshot, last_shown: &mut Option<(usize, i64)>) -> Result<()> {
    if snapshot.status != TimerStatus::Running {
        return Ok(());
    }
    let Some(block) = &snapshot.current_block else {
        return Ok(());
    };

    let key = (
        snapshot.current_index,
        snapshot.current_remaining_sec.ceil() as i64,
    );
    if *last_shown == Some(key) {
        return Ok(());
    }
    *last_shown = Some(key);

    let round = if block.total_iterations > 1 {
        format!(" (round {}/{})", block.iteration, block.total_iterations)
    } else {
        String::new()
    };

    let mut stdout = io::stdout().lock();
    writeln!(
        stdout,
        "  [{}/{}] {:<9} {}{}  {} left   total {} / {}",
        snapshot.current_index + 1,
        snapshot.total_blocks,
        kind_label(block.kind()),
        block.name(),
        round,
        format_clock(snapshot.current_remaining_sec),
        format_clock(snapshot.total_elapsed_sec),
        format_clock(snapshot.total_duration_sec)
    )?;
    stdout.flush()?;
    Ok(())
}

fn kind_label(kind: BlockKind) -> &'static str {
    match kind {
        BlockKind::Exercise => "exercise",
        BlockKind::Rest => "rest",
    }
}

/// Whole seconds as mm:ss, rounding partial seconds up like a countdown
fn format_clock(secs: f64) -> String {
    let whole = secs.max(0.0).ceil() as u64;
    format!("{:02}:{:02}", whole / 60, whole % 60)
}

/// Prints cue markers to the terminal in place of real sounds
#[derive(Default)]
struct TerminalAudio {
    muted: bool,
}

impl AudioCues for TerminalAudio {
    fn enable(&mut self, enabled: bool) {
        self.muted = !enabled;
    }

    fn play(&mut self, cue: CueKey) -> std::result::Result<(), CueError> {
        if self.muted {
            return Ok(());
        }

        let marker = match cue {
            CueKey::CountdownShort => "  ♪ beep",
            CueKey::CountdownLong => "  ♪ beeeep",
            CueKey::Transition => "  ♫ ding",
        };

        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", marker)
            .and_then(|_| stdout.flush())
            .map_err(|e| CueError::Unavailable(e.to_string()))
    }

    fn unload_all(&mut self) {
        tracing::debug!("Terminal audio unloaded");
    }
}
