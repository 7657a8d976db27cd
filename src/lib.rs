#![forbid(unsafe_code)]

//! Exhibition kiosk launcher: game catalog, session supervision and the
//! time-limit watchdog that reclaims the station.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod frontend;
pub mod models;
pub mod navigation;
pub mod orchestrator;
pub mod sync;

pub use config::KioskConfig;
pub use errors::{AppError, Result};
