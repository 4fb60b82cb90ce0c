//! Skyframe: astronomical coordinate and orientation engine for star-map applications
//!
//! Given an observer's location, an instant and raw orientation sensor readings,
//! this crate determines where a device is pointing in sky coordinates and where
//! the Sun, Moon and planets are on the sky.
//!
//! The low-level pieces (vectors, rotations, sky and geographic coordinates,
//! Julian Day and sidereal time) are pure functions and `Copy` value types. The
//! [`observer::AstronomerModel`] is the long-lived, stateful entry point that
//! fuses sensor input with the sidereal frame.

use thiserror::Error;

pub mod almanac;
pub mod celestial;
pub mod constants;
pub mod coordinates;
pub mod framelib;
pub mod observer;
pub mod planetlib;
pub mod positions;
pub mod time;

// Re-export commonly used types
pub use coordinates::{Cartesian3, LatLong, RaDec};
pub use observer::{AstronomerModel, ModelConfig, Pointing, SharedAstronomerModel};
pub use planetlib::Body;

/// Main error type for the skyframe library
#[derive(Debug, Error)]
pub enum SkyframeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("{solver} did not converge after {iterations} iterations (last step {residual:e})")]
    NonConvergence {
        solver: &'static str,
        iterations: usize,
        residual: f64,
    },

    #[error("Time out of range: {0}")]
    TimeOutOfRange(String),

    #[error("No orbital elements for {0}")]
    NoOrbitalElements(planetlib::Body),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for skyframe operations
pub type Result<T> = std::result::Result<T, SkyframeError>;

// Re-export CelestialObject trait from celestial module
pub use celestial::CelestialObject;
