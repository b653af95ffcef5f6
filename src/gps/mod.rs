// src/gps/mod.rs
//! GPS sentence decoding

pub mod coord;
pub mod data;
pub mod nmea;

pub use data::{PositionFix, ProcessorState, TimeDate};
