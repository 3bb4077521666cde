use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Index;
use thiserror::Error;

/// Número de landmarks por mano (modelo de manos de MediaPipe)
pub const NUM_LANDMARKS: usize = 21;

/// Etiquetas anatómicas de los 21 landmarks.
/// El orden coincide con el índice que entrega el detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum LandmarkLabel {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexFingerMcp,
    IndexFingerPip,
    IndexFingerDip,
    IndexFingerTip,
    MiddleFingerMcp,
    MiddleFingerPip,
    MiddleFingerDip,
    MiddleFingerTip,
    RingFingerMcp,
    RingFingerPip,
    RingFingerDip,
    RingFingerTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

impl LandmarkLabel {
    pub const ALL: [LandmarkLabel; NUM_LANDMARKS] = [
        Self::Wrist,
        Self::ThumbCmc,
        Self::ThumbMcp,
        Self::ThumbIp,
        Self::ThumbTip,
        Self::IndexFingerMcp,
        Self::IndexFingerPip,
        Self::IndexFingerDip,
        Self::IndexFingerTip,
        Self::MiddleFingerMcp,
        Self::MiddleFingerPip,
        Self::MiddleFingerDip,
        Self::MiddleFingerTip,
        Self::RingFingerMcp,
        Self::RingFingerPip,
        Self::RingFingerDip,
        Self::RingFingerTip,
        Self::PinkyMcp,
        Self::PinkyPip,
        Self::PinkyDip,
        Self::PinkyTip,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(idx: usize) -> Option<Self> {
        Self::ALL.get(idx).copied()
    }

    /// Nombre tal como lo escribe el detector (p. ej. `INDEX_FINGER_TIP`)
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wrist => "WRIST",
            Self::ThumbCmc => "THUMB_CMC",
            Self::ThumbMcp => "THUMB_MCP",
            Self::ThumbIp => "THUMB_IP",
            Self::ThumbTip => "THUMB_TIP",
            Self::IndexFingerMcp => "INDEX_FINGER_MCP",
            Self::IndexFingerPip => "INDEX_FINGER_PIP",
            Self::IndexFingerDip => "INDEX_FINGER_DIP",
            Self::IndexFingerTip => "INDEX_FINGER_TIP",
            Self::MiddleFingerMcp => "MIDDLE_FINGER_MCP",
            Self::MiddleFingerPip => "MIDDLE_FINGER_PIP",
            Self::MiddleFingerDip => "MIDDLE_FINGER_DIP",
            Self::MiddleFingerTip => "MIDDLE_FINGER_TIP",
            Self::RingFingerMcp => "RING_FINGER_MCP",
            Self::RingFingerPip => "RING_FINGER_PIP",
            Self::RingFingerDip => "RING_FINGER_DIP",
            Self::RingFingerTip => "RING_FINGER_TIP",
            Self::PinkyMcp => "PINKY_MCP",
            Self::PinkyPip => "PINKY_PIP",
            Self::PinkyDip => "PINKY_DIP",
            Self::PinkyTip => "PINKY_TIP",
        }
    }

    /// Busca la etiqueta por nombre, sin distinguir mayúsculas
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for LandmarkLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dedos de la mano. Solo se usan la base (MCP/CMC) y la punta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub fn mcp(self) -> LandmarkLabel {
        match self {
            Self::Thumb => LandmarkLabel::ThumbMcp,
            Self::Index => LandmarkLabel::IndexFingerMcp,
            Self::Middle => LandmarkLabel::MiddleFingerMcp,
            Self::Ring => LandmarkLabel::RingFingerMcp,
            Self::Pinky => LandmarkLabel::PinkyMcp,
        }
    }

    pub fn tip(self) -> LandmarkLabel {
        match self {
            Self::Thumb => LandmarkLabel::ThumbTip,
            Self::Index => LandmarkLabel::IndexFingerTip,
            Self::Middle => LandmarkLabel::MiddleFingerTip,
            Self::Ring => LandmarkLabel::RingFingerTip,
            Self::Pinky => LandmarkLabel::PinkyTip,
        }
    }
}

/// Coordenada normalizada de imagen: origen arriba a la izquierda,
/// `y` crece hacia abajo, `z` es profundidad relativa.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LandmarkPoint {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl LandmarkPoint {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Landmark tal como llega del detector, sin validar.
/// Sin `label` se usa la posición dentro de la lista.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLandmark {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

/// Una mano detectada en un ciclo de captura
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawHand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub handedness: Option<String>,
    pub landmarks: Vec<RawLandmark>,
}

/// Resultado de un ciclo de captura: cero o más manos, en orden del detector
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Capture {
    #[serde(default)]
    pub hands: Vec<RawHand>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrameError {
    #[error("Falta el landmark {0}")]
    MissingLandmark(LandmarkLabel),

    #[error("Landmark {0} duplicado")]
    DuplicateLandmark(LandmarkLabel),

    #[error("Etiqueta de landmark desconocida: {0}")]
    UnknownLabel(String),

    #[error("Coordenada no finita en {0}")]
    NonFiniteCoordinate(LandmarkLabel),
}

/// Los 21 puntos de una mano, validados. Nunca está incompleto.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkFrame {
    points: [LandmarkPoint; NUM_LANDMARKS],
}

impl LandmarkFrame {
    /// Construye el frame desde pares (etiqueta, punto) en cualquier orden
    pub fn from_points<I>(points: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = (LandmarkLabel, LandmarkPoint)>,
    {
        let mut slots: [Option<LandmarkPoint>; NUM_LANDMARKS] = [None; NUM_LANDMARKS];

        for (label, point) in points {
            if !point.is_finite() {
                return Err(FrameError::NonFiniteCoordinate(label));
            }
            let slot = &mut slots[label.index()];
            if slot.is_some() {
                return Err(FrameError::DuplicateLandmark(label));
            }
            *slot = Some(point);
        }

        let mut frame = [LandmarkPoint::default(); NUM_LANDMARKS];
        for label in LandmarkLabel::ALL {
            frame[label.index()] = slots[label.index()].ok_or(FrameError::MissingLandmark(label))?;
        }

        Ok(Self { points: frame })
    }

    pub fn from_raw(hand: &RawHand) -> Result<Self, FrameError> {
        let labeled = hand
            .landmarks
            .iter()
            .enumerate()
            .map(|(idx, raw)| {
                let label = match &raw.label {
                    Some(name) => LandmarkLabel::from_name(name)
                        .ok_or_else(|| FrameError::UnknownLabel(name.clone()))?,
                    None => LandmarkLabel::from_index(idx)
                        .ok_or_else(|| FrameError::UnknownLabel(format!("#{}", idx)))?,
                };
                Ok((label, LandmarkPoint::new(raw.x, raw.y, raw.z)))
            })
            .collect::<Result<Vec<_>, FrameError>>()?;

        Self::from_points(labeled)
    }

    pub fn point(&self, label: LandmarkLabel) -> LandmarkPoint {
        self.points[label.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = (LandmarkLabel, LandmarkPoint)> + '_ {
        LandmarkLabel::ALL
            .iter()
            .map(move |&label| (label, self.points[label.index()]))
    }
}

impl Index<LandmarkLabel> for LandmarkFrame {
    type Output = LandmarkPoint;

    fn index(&self, label: LandmarkLabel) -> &LandmarkPoint {
        &self.points[label.index()]
    }
}

impl From<&LandmarkFrame> for RawHand {
    fn from(frame: &LandmarkFrame) -> Self {
        Self {
            handedness: None,
            landmarks: frame
                .iter()
                .map(|(label, p)| RawLandmark {
                    label: Some(label.as_str().to_string()),
                    x: p.x,
                    y: p.y,
                    z: p.z,
                })
                .collect(),
        }
    }
}
