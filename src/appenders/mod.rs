//! Event destinations

pub mod broadcast;
pub mod rotating_file;

pub use broadcast::{broadcast, BroadcastWriter};
pub use rotating_file::{Backup, RotatingFileWriter, RotationPolicy, DEFAULT_MAX_SIZE_MB};
