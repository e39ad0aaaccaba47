use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Angle {
    Roll,
    Yaw,
}

impl std::fmt::Display for Angle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Angle::Roll => "roll",
            Angle::Yaw => "yaw",
        })
    }
}

/// Construction failures and precondition violations.
///
/// A code payload that cannot be rendered as text is not an error; it
/// surfaces as an absent string value instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetadataError {
    #[error("metadata object type must not be empty")]
    EmptyType,
    #[error("{angle} angle read without a measurement; check has_{angle}_angle first")]
    AngleUnavailable { angle: Angle },
    #[error("{angle} angle must be finite, got {value}")]
    NonFiniteAngle { angle: Angle, value: f64 },
    #[error("machine-readable code needs at least 3 corners, got {count}")]
    TooFewCorners { count: usize },
    #[error("geometry contains a non-finite coordinate")]
    NonFiniteCoordinate,
    #[error("geometry lies outside the declared coordinate space")]
    OutOfRange,
    #[error("expected {expected} object, found type {found}")]
    TypeMismatch { expected: &'static str, found: String },
    #[error("face record has no face id")]
    MissingFaceId,
}
