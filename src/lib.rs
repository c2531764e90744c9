//! Accumulates daily coding time from a WakaTime-compatible API into a local
//! store and renders the all-time breakdown into a README section.

pub mod cli;
pub mod logging;
pub mod services;
pub mod types;
