use std::fmt;
use std::sync::Arc;

use crate::dna::Canvas;
use crate::error::{EvolveError, Result};
use crate::render::{CpuRenderer, Renderer};
use crate::seed::SeedImage;
use crate::settings::Settings;

/// shared context of one run. every canvas holds an `Arc` to it, so all
/// members of a population are scored against the same seed and settings.
pub struct Environment {
    settings: Settings,
    seed: SeedImage,
    renderer: Box<dyn Renderer>,
}

impl Environment {
    pub fn new(settings: Settings, seed: SeedImage, renderer: impl Renderer + 'static) -> Result<Arc<Self>> {
        settings.validate()?;
        if (seed.width(), seed.height()) != (settings.canvas_width, settings.canvas_height) {
            return Err(EvolveError::InvalidSettings(format!(
                "seed image is {}x{} but canvas is {}x{}",
                seed.width(),
                seed.height(),
                settings.canvas_width,
                settings.canvas_height
            )));
        }
        Ok(Arc::new(Self { settings, seed, renderer: Box::new(renderer) }))
    }

    /// environment rendering through tiny-skia
    pub fn with_cpu_renderer(settings: Settings, seed: SeedImage) -> Result<Arc<Self>> {
        Self::new(settings, seed, CpuRenderer::default())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> &SeedImage {
        &self.seed
    }

    pub fn render(&self, canvas: &Canvas) -> Result<Vec<u8>> {
        self.renderer.render(canvas, self.settings.canvas_width, self.settings.canvas_height)
    }

    /// render and score. callers go through [`Canvas::fitness`], which caches.
    pub(crate) fn evaluate(&self, canvas: &Canvas) -> Result<f64> {
        profiling::scope!("Environment::evaluate");
        let rendered = self.render(canvas)?;
        self.settings.fitness.score(self.seed.bytes(), &rendered)
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("settings", &self.settings)
            .field("seed", &(self.seed.width(), self.seed.height()))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{solid_polygon, ShortRenderer};

    #[test]
    fn seed_size_must_match_canvas() {
        let settings = Settings { canvas_width: 4, canvas_height: 4, ..Settings::default() };
        let seed = SeedImage::from_rgba(2, 2, vec![0; 16]).unwrap();
        assert!(matches!(
            Environment::with_cpu_renderer(settings, seed),
            Err(EvolveError::InvalidSettings(_))
        ));
    }

    #[test]
    fn invalid_settings_rejected() {
        let settings = Settings { canvas_width: 2, canvas_height: 2, polygon_count: 0, ..Settings::default() };
        let seed = SeedImage::from_rgba(2, 2, vec![0; 16]).unwrap();
        assert!(Environment::with_cpu_renderer(settings, seed).is_err());
    }

    #[test]
    fn short_render_is_a_precondition_violation() {
        let settings = Settings {
            canvas_width: 2,
            canvas_height: 2,
            polygon_count: 1,
            ..Settings::default()
        };
        let seed = SeedImage::from_rgba(2, 2, vec![0; 16]).unwrap();
        let env = Environment::new(settings, seed, ShortRenderer).unwrap();
        let canvas = Canvas::from_polygons(env, vec![solid_polygon(3)]).unwrap();
        assert!(matches!(
            canvas.fitness(),
            Err(EvolveError::BufferMismatch { seed: 16, rendered: 12 })
        ));
        assert!(canvas.cached_fitness().is_none());
    }
}
