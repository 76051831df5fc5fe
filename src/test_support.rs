// shared fixtures for unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::dna::{Canvas, Coordinate, Polygon};
use crate::environment::Environment;
use crate::error::Result;
use crate::render::Renderer;
use crate::seed::SeedImage;
use crate::settings::Settings;

/// paints every pixel with the first polygon's RGBA and counts calls.
/// makes fitness a pure function of the first polygon's color.
pub struct CountingRenderer {
    pub renders: Arc<AtomicUsize>,
}

impl Renderer for CountingRenderer {
    fn render(&self, canvas: &Canvas, width: u32, height: u32) -> Result<Vec<u8>> {
        self.renders.fetch_add(1, Ordering::SeqCst);
        let rgba = canvas.polygons().next().map(Polygon::rgba).unwrap_or([0; 4]);
        Ok(rgba.repeat((width * height) as usize))
    }
}

/// always one pixel short
pub struct ShortRenderer;

impl Renderer for ShortRenderer {
    fn render(&self, _canvas: &Canvas, width: u32, height: u32) -> Result<Vec<u8>> {
        Ok(vec![0; (width * height * 4 - 4) as usize])
    }
}

/// settings for a tiny opaque-black seed
pub fn small_settings(width: u32, height: u32, polygon_count: usize, edges: usize) -> Settings {
    Settings {
        canvas_width: width,
        canvas_height: height,
        canvas_count: 4,
        polygon_count,
        polygon_edge_count: edges,
        ..Settings::default()
    }
}

pub fn black_seed(width: u32, height: u32) -> SeedImage {
    SeedImage::from_rgba(width, height, [0, 0, 0, 255].repeat((width * height) as usize)).unwrap()
}

pub fn counting_env_with(settings: Settings) -> (Arc<Environment>, Arc<AtomicUsize>) {
    let renders = Arc::new(AtomicUsize::new(0));
    let seed = black_seed(settings.canvas_width, settings.canvas_height);
    let env = Environment::new(settings, seed, CountingRenderer { renders: renders.clone() }).unwrap();
    (env, renders)
}

pub fn counting_env(width: u32, height: u32, polygon_count: usize, edges: usize) -> (Arc<Environment>, Arc<AtomicUsize>) {
    counting_env_with(small_settings(width, height, polygon_count, edges))
}

/// opaque black polygon with `edges` coordinates at the origin
pub fn solid_polygon(edges: usize) -> Polygon {
    Polygon::new([0, 0, 0, 255], vec![Coordinate::default(); edges])
}

/// canvas whose fitness (under [`CountingRenderer`]) falls as `red` grows
pub fn red_canvas(env: &Arc<Environment>, red: u8) -> Canvas {
    let s = env.settings();
    let mut polygons = vec![solid_polygon(s.polygon_edge_count); s.polygon_count];
    polygons[0].red = red;
    Canvas::from_polygons(env.clone(), polygons).unwrap()
}
