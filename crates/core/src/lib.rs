//! Immutable metadata objects for features detected in captured frames:
//! faces and machine-readable codes.

pub mod metadata;
pub mod shared;
pub mod tracking;
