use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use revolver::csv_loader::{load_captures_from_csv, load_events_from_csv};
use revolver::event_classifier::ClassifierThresholds;
use revolver::gesture_state::{GestureSnapshot, GestureStateMachine};
use revolver::session::GestureSession;

#[derive(Parser, Debug)]
#[command(name = "replay_csv", about = "Reproduce una grabación de landmarks o de eventos")]
struct Args {
    /// CSV cycle,hand,label,x,y,z (o event,angle con --events)
    csv: PathBuf,

    /// El CSV es un registro de eventos event,angle
    #[arg(long)]
    events: bool,

    /// Fichero JSON con umbrales de clasificación (grados)
    #[arg(short, long)]
    thresholds: Option<PathBuf>,

    #[arg(short, long)]
    verbose: bool,
}

fn print_snapshot(snapshot: &GestureSnapshot) {
    println!(
        "\n🔫 Estado final: balas={} plegado={} martillo={} gatillo={} reposo={}",
        snapshot.bullet,
        snapshot.is_folded,
        snapshot.push_loaded,
        snapshot.push_trigger,
        snapshot.is_idle
    );
}

fn replay_events(args: &Args) -> Result<GestureSnapshot> {
    let events = load_events_from_csv(&args.csv)?;
    let mut machine = GestureStateMachine::new();

    for (idx, event) in events.iter().enumerate() {
        machine.apply_event(event);
        println!("  {:>4}. {:<28} balas={}", idx, event.to_string(), machine.state().bullet());
    }

    Ok(machine.snapshot())
}

fn replay_landmarks(args: &Args) -> Result<GestureSnapshot> {
    let thresholds = match &args.thresholds {
        Some(path) => ClassifierThresholds::from_json_file(path)
            .with_context(|| format!("No se pudieron cargar los umbrales de {:?}", path))?,
        None => ClassifierThresholds::default(),
    };

    let captures = load_captures_from_csv(&args.csv)?;
    let mut session = GestureSession::new(thresholds);

    for (cycle, capture) in captures.iter().enumerate() {
        let report = session.process_capture(capture);
        let events: Vec<String> = report.events.iter().map(|e| e.to_string()).collect();
        println!(
            "  ciclo {:>4} | manos={} descartadas={} | {}",
            cycle,
            capture.hands.len(),
            report.rejected.len(),
            events.join(" ")
        );
        for (hand, err) in &report.rejected {
            println!("             ⚠️  mano {}: {}", hand, err);
        }
    }

    Ok(session.snapshot())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    println!("🎞️  Reproduciendo {:?}", args.csv);

    let snapshot = if args.events {
        replay_events(&args)?
    } else {
        replay_landmarks(&args)?
    };

    print_snapshot(&snapshot);
    Ok(())
}
