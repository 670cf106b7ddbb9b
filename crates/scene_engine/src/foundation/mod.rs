//! Foundation utilities: math aliases, logging setup and frame timing

pub mod logging;
pub mod math;
pub mod time;
