use std::io::BufRead;

use anyhow::{Context, Result};
use crossbeam_channel::Sender;
use tracing::{debug, warn};

use crate::types::Capture;

/// Estadísticas de recepción del flujo de landmarks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub lines: u64,
    pub captures: u64,
    pub malformed: u64,
}

/// Interpreta una línea JSON como un ciclo de captura.
/// Las líneas vacías no son ciclos.
pub fn parse_capture_line(line: &str) -> Result<Option<Capture>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Lee ciclos de captura (un objeto JSON por línea) y los envía por el canal.
///
/// Las líneas mal formadas se registran y se saltan. Termina al agotarse la
/// entrada o cuando el receptor se cierra.
pub fn run_stream_receiver<R: BufRead>(reader: R, tx: &Sender<Capture>) -> Result<StreamStats> {
    let mut stats = StreamStats::default();

    for line in reader.lines() {
        let line = line.context("Error leyendo el flujo de landmarks")?;
        stats.lines += 1;

        match parse_capture_line(&line) {
            Ok(Some(capture)) => {
                stats.captures += 1;
                if tx.send(capture).is_err() {
                    debug!("receptor cerrado, fin del flujo");
                    break;
                }
            }
            Ok(None) => {}
            Err(e) => {
                stats.malformed += 1;
                warn!(line = stats.lines, "línea descartada: {}", e);
            }
        }
    }

    Ok(stats)
}
