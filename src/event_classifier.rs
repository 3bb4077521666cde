use crate::feature_extractor::{extract, HandFeatures};
use crate::finger_event::{FingerEvent, HandEvent};
use crate::types::{FrameError, LandmarkFrame, RawHand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Umbrales de calibración en grados. Entre cada par hay una zona muerta
/// que no emite nada.
pub const THUMB_FOLD_ABOVE_DEG: f32 = 30.0;
pub const THUMB_STRAIGHT_BELOW_DEG: f32 = 10.0;
pub const INDEX_FOLD_ABOVE_DEG: f32 = 45.0;
pub const INDEX_STRAIGHT_BELOW_DEG: f32 = 15.0;
pub const THUMB_INDEX_CLOSE_BELOW_DEG: f32 = 15.0;
pub const THUMB_INDEX_OPEN_ABOVE_DEG: f32 = 25.0;

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Umbral inválido para {name}: límite bajo {low} por encima del alto {high}")]
    InvalidThreshold {
        name: &'static str,
        low: f32,
        high: f32,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierThresholds {
    pub thumb_fold_above: f32,
    pub thumb_straight_below: f32,
    pub index_fold_above: f32,
    pub index_straight_below: f32,
    pub thumb_index_close_below: f32,
    pub thumb_index_open_above: f32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            thumb_fold_above: THUMB_FOLD_ABOVE_DEG,
            thumb_straight_below: THUMB_STRAIGHT_BELOW_DEG,
            index_fold_above: INDEX_FOLD_ABOVE_DEG,
            index_straight_below: INDEX_STRAIGHT_BELOW_DEG,
            thumb_index_close_below: THUMB_INDEX_CLOSE_BELOW_DEG,
            thumb_index_open_above: THUMB_INDEX_OPEN_ABOVE_DEG,
        }
    }
}

impl ClassifierThresholds {
    /// Carga umbrales desde JSON; los campos ausentes toman el valor por defecto
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let content = fs::read_to_string(path)?;
        let thresholds: Self = serde_json::from_str(&content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// Cada zona muerta debe tener el límite bajo por debajo del alto
    pub fn validate(&self) -> Result<(), ClassifierError> {
        let pairs = [
            ("thumb", self.thumb_straight_below, self.thumb_fold_above),
            ("index", self.index_straight_below, self.index_fold_above),
            (
                "thumb_index",
                self.thumb_index_close_below,
                self.thumb_index_open_above,
            ),
        ];

        for (name, low, high) in pairs {
            // Comparación negada para rechazar también NaN
            if !(low <= high) {
                return Err(ClassifierError::InvalidThreshold { name, low, high });
            }
        }
        Ok(())
    }
}

/// Convierte las características de una mano en eventos ordenados
#[derive(Debug, Clone, Default)]
pub struct EventClassifier {
    thresholds: ClassifierThresholds,
}

impl EventClassifier {
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassifierThresholds {
        &self.thresholds
    }

    pub fn classify(&self, frame: &LandmarkFrame) -> Vec<HandEvent> {
        self.classify_features(&extract(frame))
    }

    pub fn classify_raw(&self, hand: &RawHand) -> Result<Vec<HandEvent>, FrameError> {
        let frame = LandmarkFrame::from_raw(hand)?;
        Ok(self.classify(&frame))
    }

    /// Orden fijo: FOLD, pulgar, índice, apertura pulgar-índice.
    /// Fuera de la pose de pistola no se emite nada.
    pub fn classify_features(&self, features: &HandFeatures) -> Vec<HandEvent> {
        let t = &self.thresholds;
        let mut events = Vec::with_capacity(4);

        if !features.is_gun_pose() {
            return events;
        }

        events.push(HandEvent::bare(FingerEvent::Fold));

        let thumb = features.thumb_angle;
        if thumb > t.thumb_fold_above {
            events.push(HandEvent::with_angle(FingerEvent::ThumbFold, thumb));
        } else if thumb < t.thumb_straight_below {
            events.push(HandEvent::with_angle(FingerEvent::ThumbStraight, thumb));
        }

        let index = features.index_angle;
        if index > t.index_fold_above {
            events.push(HandEvent::with_angle(FingerEvent::IndexFold, index));
        } else if index < t.index_straight_below {
            events.push(HandEvent::with_angle(FingerEvent::IndexStraight, index));
        }

        let spread = features.thumb_index_angle;
        if spread < t.thumb_index_close_below {
            events.push(HandEvent::with_angle(FingerEvent::ThumbIndexClose, spread));
        } else if spread > t.thumb_index_open_above {
            events.push(HandEvent::with_angle(FingerEvent::ThumbIndexOpen, spread));
        }

        for event in &events {
            debug!(%event, "evento emitido");
        }
        events
    }
}
