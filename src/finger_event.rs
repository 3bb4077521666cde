use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EventError {
    #[error("Evento desconocido: {0}")]
    UnknownEvent(String),
}

/// Eventos semánticos de los dedos
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FingerEvent {
    Fold,
    Unfold,
    IndexStraight,
    IndexFold,
    ThumbStraight,
    ThumbFold,
    ThumbIndexClose,
    ThumbIndexOpen,
}

impl FingerEvent {
    pub const ALL: [FingerEvent; 8] = [
        Self::Fold,
        Self::Unfold,
        Self::IndexStraight,
        Self::IndexFold,
        Self::ThumbStraight,
        Self::ThumbFold,
        Self::ThumbIndexClose,
        Self::ThumbIndexOpen,
    ];

    /// Etiqueta usada en los registros de eventos
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fold => "fold",
            Self::Unfold => "unfold",
            Self::IndexStraight => "index_strait",
            Self::IndexFold => "index_fold",
            Self::ThumbStraight => "thumb_strait",
            Self::ThumbFold => "thumb_fold",
            Self::ThumbIndexClose => "thumb_index_close",
            Self::ThumbIndexOpen => "thumb_index_open",
        }
    }

    /// FOLD/UNFOLD nunca llevan ángulo
    pub fn carries_angle(self) -> bool {
        !matches!(self, Self::Fold | Self::Unfold)
    }
}

impl fmt::Display for FingerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FingerEvent {
    type Err = EventError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let tag = tag.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|event| event.as_str().eq_ignore_ascii_case(tag))
            .ok_or_else(|| EventError::UnknownEvent(tag.to_string()))
    }
}

/// Evento emitido para una mano, con el ángulo que lo disparó
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandEvent {
    pub event: FingerEvent,
    pub angle: Option<f32>,
}

impl HandEvent {
    pub fn bare(event: FingerEvent) -> Self {
        Self { event, angle: None }
    }

    pub fn with_angle(event: FingerEvent, angle: f32) -> Self {
        Self {
            event,
            angle: Some(angle),
        }
    }
}

impl fmt::Display for HandEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.angle {
            Some(angle) => write!(f, "{}({:.1}°)", self.event, angle),
            None => write!(f, "{}", self.event),
        }
    }
}
