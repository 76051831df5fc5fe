//! evolves a population of polygon canvases toward a seed image.
//!
//! a run is an [`Engine`] over a shared [`Environment`] (settings, seed image,
//! renderer). each epoch produces offspring by mutation or crossover plus
//! mutation, keeps the fittest `canvas_count`, and reports progress as
//! [`AlgorithmEvent`]s. canvases persist through the fixed-width layout in
//! [`codec`].

pub mod codec;
pub mod dna;
pub mod engine;
pub mod engine_thread;
pub mod environment;
pub mod error;
pub mod factory;
pub mod fitness;
pub mod geom;
pub mod mutation_config;
pub mod render;
pub mod seed;
pub mod settings;
pub mod suspend;

#[cfg(test)]
mod test_support;

pub use codec::AsCanvas;
pub use dna::{Canvas, Coordinate, Polygon, Shape};
pub use engine::{AlgorithmEvent, CancelToken, Engine, RunSnapshot, RunStatus, StopCondition};
pub use environment::Environment;
pub use error::{EvolveError, Result};
pub use factory::PolygonFactory;
pub use fitness::FitnessStrategy;
pub use mutation_config::MutateConfig;
pub use render::{CpuRenderer, Renderer};
pub use seed::SeedImage;
pub use settings::Settings;
