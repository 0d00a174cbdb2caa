//! Particle simulation of chemically enhanced oil recovery in a rock pore.
//!
//! Each [`scene::Scene`] animates one recovery mechanism inside a channel
//! bounded by two procedurally generated rock walls. [`animation`] drives
//! scenes frame by frame through a pluggable scheduler, [`render`] paints
//! them through a backend-neutral surface, and [`dashboard`] coordinates
//! the explanation request that configures all three panels at once.

pub mod animation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod explanation;
pub mod math;
pub mod mechanisms;
pub mod particle;
pub mod render;
pub mod scene;
pub mod terrain;

pub use config::{Color, Mechanism, SimulationConfig};
pub use error::{ColorError, ExplanationError};
pub use scene::Scene;
