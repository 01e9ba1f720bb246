//! CLI command implementations

pub mod encode;
pub mod registry;
pub mod verify;
