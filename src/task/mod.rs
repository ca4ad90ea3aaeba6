//! Task records and the task-update seam.
//!
//! Tasks carry a sealed summary and an optional completion timestamp. The
//! service layer seals summaries on write, opens them on read, and compares
//! each update against the stored record to detect completion. A completion
//! edge fans out one notification per manager off the request path. The
//! module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
