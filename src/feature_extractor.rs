use crate::types::{Finger, FrameError, LandmarkFrame, LandmarkLabel, LandmarkPoint, RawHand};

/// Vector 3D en coordenadas normalizadas
pub type Vec3 = [f64; 3];

/// Dedos que deben estar doblados para la pose de pistola
const CURLED_FINGERS: [Finger; 3] = [Finger::Middle, Finger::Ring, Finger::Pinky];

/// Dedos que deben estar extendidos para la pose de pistola
const EXTENDED_FINGERS: [Finger; 2] = [Finger::Thumb, Finger::Index];

/// Características geométricas de una mano
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandFeatures {
    /// Medio, anular y meñique doblados
    pub folded: bool,
    /// Pulgar e índice extendidos
    pub straight: bool,
    /// Flexión del nudillo del pulgar, en grados
    pub thumb_angle: f32,
    /// Flexión del nudillo del índice, en grados
    pub index_angle: f32,
    /// Apertura entre pulgar e índice, en grados
    pub thumb_index_angle: f32,
}

impl HandFeatures {
    pub fn is_gun_pose(&self) -> bool {
        self.folded && self.straight
    }
}

/// Extrae todas las características de un frame ya validado
pub fn extract(frame: &LandmarkFrame) -> HandFeatures {
    HandFeatures {
        folded: CURLED_FINGERS.iter().all(|&finger| is_folded(frame, finger)),
        straight: EXTENDED_FINGERS.iter().all(|&finger| is_straight(frame, finger)),
        thumb_angle: thumb_angle(frame),
        index_angle: index_angle(frame),
        thumb_index_angle: thumb_index_angle(frame),
    }
}

/// Valida la mano y extrae sus características.
/// Falla con `MissingLandmark` si falta cualquiera de los 21 puntos.
pub fn extract_from_raw(hand: &RawHand) -> Result<HandFeatures, FrameError> {
    let frame = LandmarkFrame::from_raw(hand)?;
    Ok(extract(&frame))
}

/// Punta más baja en pantalla que el nudillo (y crece hacia abajo)
pub fn is_folded(frame: &LandmarkFrame, finger: Finger) -> bool {
    frame[finger.tip()].y > frame[finger.mcp()].y
}

/// Punta más alta en pantalla que el nudillo
pub fn is_straight(frame: &LandmarkFrame, finger: Finger) -> bool {
    frame[finger.tip()].y < frame[finger.mcp()].y
}

pub fn vector_between(a: &LandmarkPoint, b: &LandmarkPoint) -> Vec3 {
    [
        b.x as f64 - a.x as f64,
        b.y as f64 - a.y as f64,
        b.z as f64 - a.z as f64,
    ]
}

fn norm(v: &Vec3) -> f64 {
    (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt()
}

/// Ángulo entre dos vectores en grados, en [0, 180].
/// Un vector de longitud cero da 0°.
pub fn angle_between(v1: &Vec3, v2: &Vec3) -> f32 {
    let norm1 = norm(v1);
    let norm2 = norm(v2);
    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }

    let dot = v1[0] * v2[0] + v1[1] * v2[1] + v1[2] * v2[2];
    let cos_theta = dot / (norm1 * norm2);
    if cos_theta.is_nan() {
        return 0.0;
    }

    // El redondeo puede dejar el coseno ligeramente fuera de [-1, 1]
    cos_theta.clamp(-1.0, 1.0).acos().to_degrees() as f32
}

fn joint_angle(frame: &LandmarkFrame, a: LandmarkLabel, b: LandmarkLabel, c: LandmarkLabel) -> f32 {
    let v1 = vector_between(&frame[a], &frame[b]);
    let v2 = vector_between(&frame[b], &frame[c]);
    angle_between(&v1, &v2)
}

/// CMC→MCP contra MCP→TIP
pub fn thumb_angle(frame: &LandmarkFrame) -> f32 {
    joint_angle(
        frame,
        LandmarkLabel::ThumbCmc,
        LandmarkLabel::ThumbMcp,
        LandmarkLabel::ThumbTip,
    )
}

/// MCP→PIP contra PIP→TIP
pub fn index_angle(frame: &LandmarkFrame) -> f32 {
    joint_angle(
        frame,
        LandmarkLabel::IndexFingerMcp,
        LandmarkLabel::IndexFingerPip,
        LandmarkLabel::IndexFingerTip,
    )
}

/// Dirección del pulgar (MCP→TIP) contra la del índice (MCP→TIP)
pub fn thumb_index_angle(frame: &LandmarkFrame) -> f32 {
    let thumb = vector_between(&frame[LandmarkLabel::ThumbMcp], &frame[LandmarkLabel::ThumbTip]);
    let index = vector_between(
        &frame[LandmarkLabel::IndexFingerMcp],
        &frame[LandmarkLabel::IndexFingerTip],
    );
    angle_between(&thumb, &index)
}
