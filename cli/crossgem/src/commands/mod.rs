//! CLI command implementations.

pub mod check;
pub mod doctor;
pub mod platforms;
pub mod verify;
