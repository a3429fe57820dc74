//! Core simulation primitives (time)

pub mod time;
