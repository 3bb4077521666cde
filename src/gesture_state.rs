use crate::finger_event::{EventError, FingerEvent, HandEvent};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

/// Capacidad del tambor del revólver
pub const CYLINDER_CAPACITY: u8 = 6;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Munición fuera de rango: {0} (máximo {max})", max = CYLINDER_CAPACITY)]
    BulletOutOfRange(u8),
}

/// Estado del revólver.
/// `bullet` solo cambia a través de transiciones con guarda, nunca se recorta.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GestureState {
    is_folded: bool,
    push_loaded: bool,
    push_trigger: bool,
    bullet: u8,
}

impl GestureState {
    /// Tambor lleno, martillo y gatillo en reposo
    pub fn new() -> Self {
        Self {
            is_folded: false,
            push_loaded: false,
            push_trigger: false,
            bullet: CYLINDER_CAPACITY,
        }
    }

    pub fn with_bullet(bullet: u8) -> Result<Self, StateError> {
        if bullet > CYLINDER_CAPACITY {
            return Err(StateError::BulletOutOfRange(bullet));
        }
        Ok(Self {
            bullet,
            ..Self::new()
        })
    }

    pub fn is_folded(&self) -> bool {
        self.is_folded
    }

    pub fn push_loaded(&self) -> bool {
        self.push_loaded
    }

    pub fn push_trigger(&self) -> bool {
        self.push_trigger
    }

    pub fn bullet(&self) -> u8 {
        self.bullet
    }

    pub fn is_idle(&self) -> bool {
        !self.push_loaded && !self.push_trigger
    }

    pub fn snapshot(&self) -> GestureSnapshot {
        GestureSnapshot {
            is_folded: self.is_folded,
            push_loaded: self.push_loaded,
            bullet: self.bullet,
            push_trigger: self.push_trigger,
            is_idle: self.is_idle(),
        }
    }
}

impl Default for GestureState {
    fn default() -> Self {
        Self::new()
    }
}

/// Copia de solo lectura para el renderizador
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GestureSnapshot {
    pub is_folded: bool,
    pub push_loaded: bool,
    pub bullet: u8,
    pub push_trigger: bool,
    pub is_idle: bool,
}

/// Acciones completadas que se notifican al exterior
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionNotice {
    Reloaded,
    Shot,
}

impl ActionNotice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reloaded => "reloaded",
            Self::Shot => "shot",
        }
    }
}

/// Máquina de estados del revólver.
///
/// Aplica un evento cada vez sobre un único `GestureState`. Todas las manos
/// de un ciclo comparten esta instancia; quien necesite estado por mano debe
/// crear una máquina por cada mano rastreada.
pub struct GestureStateMachine {
    state: GestureState,

    /// Callback que se ejecuta al completar una recarga o un disparo
    callback: Option<Box<dyn FnMut(ActionNotice) + Send>>,
}

impl GestureStateMachine {
    pub fn new() -> Self {
        Self::with_state(GestureState::new())
    }

    pub fn with_state(state: GestureState) -> Self {
        Self {
            state,
            callback: None,
        }
    }

    /// Establece el callback de notificaciones.
    /// Se llama exactamente una vez por cada recarga o disparo.
    pub fn set_callback<F>(&mut self, callback: F)
    where
        F: FnMut(ActionNotice) + Send + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Aplica un evento. El ángulo es informativo y no altera la transición.
    /// Un evento cuya guarda falla se descarta sin error.
    pub fn apply(&mut self, event: FingerEvent, angle: Option<f32>) {
        let s = &mut self.state;

        let notice = match event {
            FingerEvent::Fold => {
                s.is_folded = true;
                None
            }
            FingerEvent::Unfold => {
                s.is_folded = false;
                None
            }
            FingerEvent::ThumbFold => {
                s.push_loaded = true;
                None
            }
            FingerEvent::ThumbStraight => {
                if s.bullet < CYLINDER_CAPACITY && s.push_loaded {
                    s.bullet = CYLINDER_CAPACITY;
                    s.push_loaded = false;
                    Some(ActionNotice::Reloaded)
                } else {
                    None
                }
            }
            FingerEvent::IndexFold => {
                if s.bullet > 0 && !s.push_trigger {
                    s.push_trigger = true;
                }
                None
            }
            FingerEvent::IndexStraight => {
                // push_trigger solo se activa con munición, así que bullet > 0
                if s.push_trigger {
                    s.push_trigger = false;
                    s.bullet -= 1;
                    Some(ActionNotice::Shot)
                } else {
                    None
                }
            }
            FingerEvent::ThumbIndexClose | FingerEvent::ThumbIndexOpen => None,
        };

        debug!(
            event = %event,
            angle = ?angle,
            bullet = s.bullet,
            push_loaded = s.push_loaded,
            push_trigger = s.push_trigger,
            "evento aplicado"
        );

        if let Some(notice) = notice {
            self.notify(notice);
        }
    }

    pub fn apply_event(&mut self, event: &HandEvent) {
        self.apply(event.event, event.angle);
    }

    /// Aplica un evento dado por su etiqueta textual.
    /// Una etiqueta desconocida se propaga como `UnknownEvent`.
    pub fn apply_tagged(&mut self, tag: &str, angle: Option<f32>) -> Result<(), EventError> {
        let event: FingerEvent = tag.parse()?;
        self.apply(event, angle);
        Ok(())
    }

    fn notify(&mut self, notice: ActionNotice) {
        info!(bullet = self.state.bullet, "{}!", notice.as_str());
        if let Some(ref mut callback) = self.callback {
            callback(notice);
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn snapshot(&self) -> GestureSnapshot {
        self.state.snapshot()
    }
}

impl Default for GestureStateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn recording_machine(state: GestureState) -> (GestureStateMachine, Arc<Mutex<Vec<ActionNotice>>>) {
        let notices = Arc::new(Mutex::new(Vec::new()));
        let notices_clone = Arc::clone(&notices);
        let mut machine = GestureStateMachine::with_state(state);
        machine.set_callback(move |notice| {
            notices_clone.lock().unwrap().push(notice);
        });
        (machine, notices)
    }

    #[test]
    fn starts_full_and_idle() {
        let snapshot = GestureStateMachine::new().snapshot();
        assert_eq!(
            snapshot,
            GestureSnapshot {
                is_folded: false,
                push_loaded: false,
                bullet: 6,
                push_trigger: false,
                is_idle: true,
            }
        );
    }

    #[test]
    fn fire_consumes_one_bullet() {
        let (mut machine, notices) = recording_machine(GestureState::new());

        machine.apply(FingerEvent::IndexFold, Some(60.0));
        assert!(machine.state().push_trigger());
        assert_eq!(machine.state().bullet(), 6);
        assert!(!machine.state().is_idle());

        machine.apply(FingerEvent::IndexStraight, Some(2.0));
        assert!(!machine.state().push_trigger());
        assert_eq!(machine.state().bullet(), 5);
        assert_eq!(*notices.lock().unwrap(), vec![ActionNotice::Shot]);
    }

    #[test]
    fn reload_refills_cylinder() {
        let (mut machine, notices) = recording_machine(GestureState::with_bullet(3).unwrap());

        machine.apply(FingerEvent::ThumbFold, Some(40.0));
        assert!(machine.state().push_loaded());

        machine.apply(FingerEvent::ThumbStraight, Some(5.0));
        assert_eq!(machine.state().bullet(), 6);
        assert!(!machine.state().push_loaded());
        assert_eq!(*notices.lock().unwrap(), vec![ActionNotice::Reloaded]);
    }

    #[test]
    fn empty_cylinder_does_not_fire() {
        let start = GestureState::with_bullet(0).unwrap();
        let (mut machine, notices) = recording_machine(start);

        machine.apply(FingerEvent::IndexFold, Some(60.0));
        assert!(!machine.state().push_trigger());
        assert_eq!(machine.state().bullet(), 0);

        machine.apply(FingerEvent::IndexStraight, Some(0.0));
        assert_eq!(*machine.state(), start);
        assert!(notices.lock().unwrap().is_empty());
    }

    #[test]
    fn reload_on_full_cylinder_is_noop() {
        let (mut machine, notices) = recording_machine(GestureState::new());
        machine.apply(FingerEvent::ThumbFold, None);
        machine.apply(FingerEvent::ThumbStraight, None);
        assert!(machine.state().push_loaded());
        assert_eq!(machine.state().bullet(), 6);
        assert!(notices.lock().unwrap().is_empty());
    }

    #[test]
    fn thumb_straight_without_hammer_is_noop() {
        let start = GestureState::with_bullet(2).unwrap();
        let mut machine = GestureStateMachine::with_state(start);
        machine.apply(FingerEvent::ThumbStraight, Some(1.0));
        assert_eq!(*machine.state(), start);
    }

    #[test]
    fn second_index_fold_keeps_single_pull() {
        let (mut machine, notices) = recording_machine(GestureState::new());
        machine.apply(FingerEvent::IndexFold, None);
        machine.apply(FingerEvent::IndexFold, None);
        machine.apply(FingerEvent::IndexStraight, None);
        machine.apply(FingerEvent::IndexStraight, None);
        assert_eq!(machine.state().bullet(), 5);
        assert_eq!(notices.lock().unwrap().len(), 1);
    }

    #[test]
    fn fold_and_unfold_are_idempotent() {
        let mut machine = GestureStateMachine::new();
        machine.apply(FingerEvent::Fold, None);
        let once = *machine.state();
        machine.apply(FingerEvent::Fold, None);
        assert_eq!(*machine.state(), once);
        assert!(once.is_folded());

        machine.apply(FingerEvent::Unfold, None);
        let once = *machine.state();
        machine.apply(FingerEvent::Unfold, None);
        assert_eq!(*machine.state(), once);
        assert!(!once.is_folded());
    }

    #[test]
    fn aperture_events_never_change_state() {
        let mut machine = GestureStateMachine::new();
        let before = *machine.state();
        machine.apply(FingerEvent::ThumbIndexClose, Some(3.0));
        machine.apply(FingerEvent::ThumbIndexOpen, Some(80.0));
        assert_eq!(*machine.state(), before);
    }

    #[test]
    fn angle_payload_does_not_affect_transitions() {
        let mut with_angle = GestureStateMachine::new();
        let mut without_angle = GestureStateMachine::new();
        for event in [FingerEvent::IndexFold, FingerEvent::IndexStraight, FingerEvent::ThumbFold] {
            with_angle.apply(event, Some(123.0));
            without_angle.apply(event, None);
        }
        assert_eq!(with_angle.snapshot(), without_angle.snapshot());
    }

    #[test]
    fn tagged_events_parse_or_fail() {
        let mut machine = GestureStateMachine::new();
        machine.apply_tagged("index_fold", Some(50.0)).unwrap();
        machine.apply_tagged("INDEX_STRAIT", None).unwrap();
        assert_eq!(machine.state().bullet(), 5);

        let before = *machine.state();
        assert_eq!(
            machine.apply_tagged("safety_on", None),
            Err(EventError::UnknownEvent("safety_on".to_string()))
        );
        assert_eq!(*machine.state(), before);
    }

    #[test]
    fn out_of_range_state_is_rejected() {
        assert_eq!(GestureState::with_bullet(7), Err(StateError::BulletOutOfRange(7)));
        assert!(GestureState::with_bullet(6).is_ok());
    }

    #[test]
    fn snapshot_serializes_for_renderer() {
        let json = serde_json::to_value(GestureStateMachine::new().snapshot()).unwrap();
        assert_eq!(json["bullet"], 6);
        assert_eq!(json["is_idle"], true);
        assert_eq!(json["push_trigger"], false);
    }

    proptest! {
        #[test]
        fn bullet_stays_in_range(
            start in 0u8..=CYLINDER_CAPACITY,
            seq in prop::collection::vec(0usize..FingerEvent::ALL.len(), 0..200),
        ) {
            let (mut machine, notices) = recording_machine(GestureState::with_bullet(start).unwrap());
            let mut expected_shots = 0usize;
            for idx in seq {
                let before = *machine.state();
                let event = FingerEvent::ALL[idx];
                machine.apply(event, None);
                let after = *machine.state();
                prop_assert!(after.bullet() <= CYLINDER_CAPACITY);
                if after.bullet() < before.bullet() {
                    prop_assert_eq!(event, FingerEvent::IndexStraight);
                    prop_assert_eq!(before.bullet() - after.bullet(), 1);
                    expected_shots += 1;
                }
            }
            let shots = notices
                .lock()
                .unwrap()
                .iter()
                .filter(|n| **n == ActionNotice::Shot)
                .count();
            prop_assert_eq!(shots, expected_shots);
        }
    }
}
