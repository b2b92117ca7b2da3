//! ELD trip planner core
//!
//! Plans a three-waypoint truck trip under Hours-of-Service rules and turns
//! the resulting timeline into daily ELD duty logs.

pub mod cli;
pub mod config;
pub mod defaults;
pub mod error;
pub mod services;
pub mod types;
