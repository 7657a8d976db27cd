//! Session orchestration modules.
//!
//! Covers game process spawning and termination, the per-session
//! time-limit watchdog, and the supervisor that ties them together.

pub mod spawner;
pub mod supervisor;
pub mod watchdog;
