//! Step definitions for completion notification scenarios.

pub mod given;
pub mod then;
pub mod when;
pub mod world;
