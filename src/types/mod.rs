//! Type definitions

pub mod duty_log;
pub mod geo;
pub mod route;
pub mod trip;

pub use duty_log::*;
pub use geo::*;
pub use route::*;
pub use trip::*;
