use crate::event_classifier::{ClassifierThresholds, EventClassifier};
use crate::finger_event::HandEvent;
use crate::gesture_state::{ActionNotice, GestureSnapshot, GestureStateMachine};
use crate::types::{Capture, FrameError, LandmarkFrame, RawHand};
use tracing::warn;

/// Resultado de procesar un ciclo de captura
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Eventos aplicados, en orden de mano y de emisión
    pub events: Vec<HandEvent>,
    /// Manos descartadas: (índice de la mano, motivo)
    pub rejected: Vec<(usize, FrameError)>,
    /// Estado tras aplicar todos los eventos del ciclo
    pub snapshot: GestureSnapshot,
}

/// Clasificador y máquina de estados unidos: landmarks → eventos → estado
pub struct GestureSession {
    classifier: EventClassifier,
    machine: GestureStateMachine,
    cycles: u64,
}

impl GestureSession {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self::with_machine(thresholds, GestureStateMachine::new())
    }

    pub fn with_machine(thresholds: ClassifierThresholds, machine: GestureStateMachine) -> Self {
        Self {
            classifier: EventClassifier::new(thresholds),
            machine,
            cycles: 0,
        }
    }

    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(ActionNotice) + Send + 'static,
    {
        self.machine.set_callback(callback);
    }

    /// Procesa las manos en orden. Una mano inválida se descarta sin
    /// afectar a las demás; sus eventos nunca llegan a la máquina.
    pub fn process_cycle(&mut self, hands: &[RawHand]) -> CycleReport {
        self.cycles += 1;
        let mut events = Vec::new();
        let mut rejected = Vec::new();

        for (hand_idx, hand) in hands.iter().enumerate() {
            let frame = match LandmarkFrame::from_raw(hand) {
                Ok(frame) => frame,
                Err(e) => {
                    warn!(
                        cycle = self.cycles,
                        hand = hand_idx,
                        handedness = hand.handedness.as_deref().unwrap_or("?"),
                        "mano descartada: {}",
                        e
                    );
                    rejected.push((hand_idx, e));
                    continue;
                }
            };

            for event in self.classifier.classify(&frame) {
                self.machine.apply_event(&event);
                events.push(event);
            }
        }

        CycleReport {
            events,
            rejected,
            snapshot: self.machine.snapshot(),
        }
    }

    pub fn process_capture(&mut self, capture: &Capture) -> CycleReport {
        self.process_cycle(&capture.hands)
    }

    pub fn snapshot(&self) -> GestureSnapshot {
        self.machine.snapshot()
    }

    pub fn machine(&self) -> &GestureStateMachine {
        &self.machine
    }

    pub fn machine_mut(&mut self) -> &mut GestureStateMachine {
        &mut self.machine
    }

    pub fn classifier(&self) -> &EventClassifier {
        &self.classifier
    }

    /// Ciclos procesados desde el inicio de la sesión
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

impl Default for GestureSession {
    fn default() -> Self {
        Self::new(ClassifierThresholds::default())
    }
}
