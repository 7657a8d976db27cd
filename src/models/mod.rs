//! Domain model module declarations.

pub mod game;
pub mod session;
