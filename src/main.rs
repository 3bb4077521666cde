/*
Revólver por gestos en tiempo real

Recibe por stdin los landmarks de mano que produce un detector externo
(un objeto JSON por ciclo de captura), los convierte en eventos de dedos y
mantiene el estado del revólver: cargar, apuntar, disparar, recargar.

Por cada ciclo escribe en stdout una línea JSON con el estado para el
renderizador. Los logs van a stderr.

Ejemplo:
    python detector.py | ./target/release/revolver --thresholds umbrales.json
*/

use std::io::{self, Write};
use std::path::PathBuf;
use std::thread;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use crossbeam_channel::bounded;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use revolver::event_classifier::ClassifierThresholds;
use revolver::landmark_stream::run_stream_receiver;
use revolver::session::GestureSession;
use revolver::types::Capture;

/// Capacidad del canal entre el lector de stdin y el bucle principal
const CAPTURE_QUEUE: usize = 100;

#[derive(Parser, Debug)]
#[command(name = "revolver", version, about = "Revólver controlado por gestos de mano")]
struct Cli {
    /// Fichero JSON con umbrales de clasificación (grados)
    #[arg(short, long)]
    thresholds: Option<PathBuf>,

    /// No escribir el estado por stdout en cada ciclo
    #[arg(short, long)]
    quiet_snapshots: bool,

    /// Logs de depuración
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();
}

fn load_thresholds(path: Option<&PathBuf>) -> Result<ClassifierThresholds> {
    match path {
        Some(path) => ClassifierThresholds::from_json_file(path)
            .with_context(|| format!("No se pudieron cargar los umbrales de {:?}", path)),
        None => Ok(ClassifierThresholds::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let thresholds = load_thresholds(cli.thresholds.as_ref())?;
    info!(?thresholds, "umbrales de clasificación");

    let (tx, rx) = bounded::<Capture>(CAPTURE_QUEUE);

    // Lector de stdin en segundo plano
    let reader = thread::spawn(move || {
        let stdin = io::stdin();
        let result = run_stream_receiver(stdin.lock(), &tx);
        if let Err(e) = &result {
            error!("Error en el flujo de landmarks: {:#}", e);
        }
        result
    });

    let mut session = GestureSession::new(thresholds);
    let stdout = io::stdout();
    let mut out = stdout.lock();

    info!("🎬 Esperando landmarks por stdin...");

    while let Ok(capture) = rx.recv() {
        let report = session.process_capture(&capture);

        if !cli.quiet_snapshots {
            serde_json::to_writer(&mut out, &report.snapshot)?;
            writeln!(out)?;
            out.flush()?;
        }
    }

    let stats = reader
        .join()
        .map_err(|_| anyhow!("El hilo lector terminó con pánico"))??;

    let snapshot = session.snapshot();
    info!(
        cycles = session.cycles(),
        lines = stats.lines,
        malformed = stats.malformed,
        bullet = snapshot.bullet,
        "flujo terminado"
    );

    Ok(())
}
