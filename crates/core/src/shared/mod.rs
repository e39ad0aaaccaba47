pub mod geometry;
pub mod media_time;
