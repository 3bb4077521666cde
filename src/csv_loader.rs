use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord};

use crate::finger_event::{FingerEvent, HandEvent};
use crate::types::{Capture, RawHand, RawLandmark};

fn parse_field<T>(record: &StringRecord, col: usize, name: &str, row: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    record[col]
        .trim()
        .parse()
        .with_context(|| format!("{} inválido en fila {}", name, row))
}

/// Carga ciclos de captura desde un CSV con el formato
/// cycle,hand,label,x,y,z (una fila por landmark).
///
/// Las manos de cada ciclo se ordenan por `hand`. Los ciclos ausentes entre
/// el primero y el último se rellenan como ciclos sin manos.
pub fn load_captures_from_csv(path: impl AsRef<Path>) -> Result<Vec<Capture>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut cycles: BTreeMap<usize, BTreeMap<usize, RawHand>> = BTreeMap::new();

    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", row, path))?;
        if record.len() < 6 {
            bail!("La fila {} no tiene 6 columnas", row);
        }

        let cycle: usize = parse_field(&record, 0, "cycle", row)?;
        let hand: usize = parse_field(&record, 1, "hand", row)?;
        let label = record[2].trim();
        let x: f32 = parse_field(&record, 3, "x", row)?;
        let y: f32 = parse_field(&record, 4, "y", row)?;
        let z: f32 = parse_field(&record, 5, "z", row)?;

        // La validación de etiquetas ocurre al construir el LandmarkFrame
        cycles
            .entry(cycle)
            .or_default()
            .entry(hand)
            .or_default()
            .landmarks
            .push(RawLandmark {
                label: (!label.is_empty()).then(|| label.to_string()),
                x,
                y,
                z,
            });
    }

    let (first, last) = match (cycles.keys().next(), cycles.keys().next_back()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => bail!("El CSV {:?} no contiene datos", path),
    };

    let captures = (first..=last)
        .map(|cycle| Capture {
            hands: cycles
                .remove(&cycle)
                .map(|hands| hands.into_values().collect())
                .unwrap_or_default(),
        })
        .collect();

    Ok(captures)
}

/// Carga un registro de eventos desde un CSV event,angle.
/// El ángulo puede ir vacío. Una etiqueta desconocida es un error.
pub fn load_events_from_csv(path: impl AsRef<Path>) -> Result<Vec<HandEvent>> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("No se pudo abrir el CSV {:?}", path))?;

    let mut events = Vec::new();
    for (row_idx, result) in reader.records().enumerate() {
        let row = row_idx + 1;
        let record = result.with_context(|| format!("Fila {} inválida en {:?}", row, path))?;
        if record.is_empty() {
            continue;
        }

        let event: FingerEvent = record[0]
            .parse()
            .with_context(|| format!("Evento inválido en fila {}", row))?;
        let angle = match record.get(1).map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_field::<f32>(&record, 1, "angle", row)?),
            _ => None,
        };

        events.push(HandEvent { event, angle });
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finger_event::EventError;
    use crate::types::fixtures::gun_pose;
    use crate::types::LandmarkFrame;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_hand(out: &mut String, cycle: usize, hand: usize, frame: &LandmarkFrame) {
        for (label, p) in frame.iter() {
            out.push_str(&format!("{},{},{},{},{},{}\n", cycle, hand, label, p.x, p.y, p.z));
        }
    }

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn groups_rows_by_cycle_and_hand() {
        let pulled = gun_pose(40.0, 0.0, 60.0);
        let released = gun_pose(40.0, 0.0, 0.0);

        let mut content = String::from("cycle,hand,label,x,y,z\n");
        write_hand(&mut content, 0, 1, &released);
        write_hand(&mut content, 0, 0, &pulled);
        write_hand(&mut content, 2, 0, &released);
        let file = csv_file(&content);

        let captures = load_captures_from_csv(file.path()).unwrap();
        assert_eq!(captures.len(), 3);
        assert_eq!(captures[0].hands.len(), 2);
        assert!(captures[1].hands.is_empty());
        assert_eq!(captures[2].hands.len(), 1);

        // La mano 0 va primero aunque aparezca después en el fichero
        let first = LandmarkFrame::from_raw(&captures[0].hands[0]).unwrap();
        assert_eq!(first, pulled);
    }

    #[test]
    fn short_rows_are_rejected() {
        let file = csv_file("cycle,hand,label,x,y,z\n0,0,WRIST,0.5\n");
        assert!(load_captures_from_csv(file.path()).is_err());
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let file = csv_file("cycle,hand,label,x,y,z\n0,0,WRIST,abc,0.5,0.0\n");
        let err = load_captures_from_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("x inválido"));
    }

    #[test]
    fn empty_csv_is_an_error() {
        let file = csv_file("cycle,hand,label,x,y,z\n");
        assert!(load_captures_from_csv(file.path()).is_err());
    }

    #[test]
    fn loads_event_log() {
        let file = csv_file("event,angle\nindex_fold,61.5\nINDEX_STRAIT,\nfold\n");
        let events = load_events_from_csv(file.path()).unwrap();
        assert_eq!(
            events,
            vec![
                HandEvent::with_angle(FingerEvent::IndexFold, 61.5),
                HandEvent::bare(FingerEvent::IndexStraight),
                HandEvent::bare(FingerEvent::Fold),
            ]
        );
    }

    #[test]
    fn unknown_event_in_log_surfaces() {
        let file = csv_file("event,angle\nfold,\nholster,12.0\n");
        let err = load_events_from_csv(file.path()).unwrap_err();
        assert_eq!(
            err.downcast_ref::<EventError>(),
            Some(&EventError::UnknownEvent("holster".to_string()))
        );
    }
}
