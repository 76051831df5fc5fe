use std::path::Path;
use tiny_skia as sk;

use crate::dna::{Canvas, Polygon};
use crate::error::{EvolveError, Result};

/// rasterizes a canvas into a `width * height * 4` RGBA byte buffer.
/// output must be deterministic and laid out like the seed image bytes.
/// `Send + Sync` so an engine can move to its worker thread.
pub trait Renderer: Send + Sync {
    fn render(&self, canvas: &Canvas, width: u32, height: u32) -> Result<Vec<u8>>;
}

/// tiny-skia rasterizer producing premultiplied RGBA (tiny-skia's native format),
/// source-over compositing in draw-list order
#[derive(Clone, Debug)]
pub struct CpuRenderer {
    /// straight RGBA the pixmap is cleared to before drawing
    pub background: [u8; 4],
    pub anti_alias: bool,
}

impl Default for CpuRenderer {
    fn default() -> Self {
        // transparent, like a freshly allocated bitmap
        Self { background: [0, 0, 0, 0], anti_alias: true }
    }
}

impl Renderer for CpuRenderer {
    fn render(&self, canvas: &Canvas, width: u32, height: u32) -> Result<Vec<u8>> {
        profiling::scope!("CpuRenderer::render");
        let mut pix = sk::Pixmap::new(width, height)
            .ok_or_else(|| EvolveError::Render(format!("cannot allocate a {width}x{height} pixmap")))?;
        let [r, g, b, a] = self.background;
        pix.fill(sk::Color::from_rgba8(r, g, b, a));

        for polygon in canvas.polygons() {
            draw_polygon(&mut pix, polygon, self.anti_alias);
        }
        Ok(pix.take())
    }
}

fn draw_polygon(pix: &mut sk::Pixmap, poly: &Polygon, anti_alias: bool) {
    profiling::scope!("draw_polygon");
    // fewer than three corners encloses no area
    if poly.coordinates.len() < 3 {
        return;
    }

    // quick reject: bbox fully outside the pixmap
    let (w, h) = (pix.width() as i32, pix.height() as i32);
    let (min_x, max_x) = poly.coordinates.iter().fold((i32::MAX, i32::MIN), |(lo, hi), c| (lo.min(c.x), hi.max(c.x)));
    let (min_y, max_y) = poly.coordinates.iter().fold((i32::MAX, i32::MIN), |(lo, hi), c| (lo.min(c.y), hi.max(c.y)));
    if max_x < 0 || max_y < 0 || min_x >= w || min_y >= h {
        return;
    }

    let mut pb = sk::PathBuilder::new();
    pb.move_to(poly.coordinates[0].x as f32, poly.coordinates[0].y as f32);
    for c in &poly.coordinates[1..] {
        pb.line_to(c.x as f32, c.y as f32);
    }
    pb.close();
    // zero-area paths (all points collinear) have nothing to fill
    let Some(path) = pb.finish() else {
        return;
    };

    let mut paint = sk::Paint::default();
    paint.anti_alias = anti_alias;
    paint.shader = sk::Shader::SolidColor(sk::Color::from_rgba8(poly.red, poly.green, poly.blue, poly.alpha));

    // alternate fill, matching how classic polygon fills treat self-overlap
    pix.fill_path(&path, &paint, sk::FillRule::EvenOdd, sk::Transform::identity(), None);
}

/// premultiply straight RGBA
#[inline]
pub fn premultiply(p: &[u8]) -> Vec<u8> {
    profiling::scope!("premultiply");
    let mut out = Vec::with_capacity(p.len());
    for px in p.chunks_exact(4) {
        let a = px[3] as u16;
        // (x * a + 127) / 255 is a fast rounded divide-by-255
        out.push(((px[0] as u16 * a + 127) / 255) as u8);
        out.push(((px[1] as u16 * a + 127) / 255) as u8);
        out.push(((px[2] as u16 * a + 127) / 255) as u8);
        out.push(a as u8);
    }
    out
}

/// inverse of [`premultiply`] (lossy for low alpha)
pub fn demultiply(p: &[u8]) -> Vec<u8> {
    profiling::scope!("demultiply");
    let mut out = Vec::with_capacity(p.len());
    for px in p.chunks_exact(4) {
        let a = px[3] as u16;
        if a == 0 {
            out.extend_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for &c in &px[..3] {
            out.push(((c as u16 * 255 + a / 2) / a).min(255) as u8);
        }
        out.push(a as u8);
    }
    out
}

/// render `canvas` with its environment's renderer and write it as PNG
pub fn save_png(canvas: &Canvas, path: impl AsRef<Path>) -> Result<()> {
    profiling::scope!("save_png");
    let env = canvas.environment();
    let settings = env.settings();
    let rgba = demultiply(&env.render(canvas)?);
    image::save_buffer(
        path,
        &rgba,
        settings.canvas_width,
        settings.canvas_height,
        image::ColorType::Rgba8,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::Coordinate;
    use crate::environment::Environment;
    use crate::seed::SeedImage;
    use crate::settings::Settings;

    fn env(w: u32, h: u32, edges: usize) -> std::sync::Arc<Environment> {
        let settings = Settings {
            canvas_width: w,
            canvas_height: h,
            polygon_count: 1,
            polygon_edge_count: edges,
            ..Settings::default()
        };
        let seed = SeedImage::from_rgba(w, h, vec![0; (w * h * 4) as usize]).unwrap();
        Environment::new(settings, seed, CpuRenderer::default()).unwrap()
    }

    fn px(buf: &[u8], w: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * w + x) * 4) as usize;
        [buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]
    }

    #[test]
    fn opaque_square_covers_interior() {
        let env = env(8, 8, 4);
        let square = Polygon::new(
            [255, 0, 0, 255],
            vec![Coordinate::new(0, 0), Coordinate::new(4, 0), Coordinate::new(4, 4), Coordinate::new(0, 4)],
        );
        let canvas = Canvas::from_polygons(env, vec![square]).unwrap();
        let buf = CpuRenderer { anti_alias: false, ..CpuRenderer::default() }.render(&canvas, 8, 8).unwrap();

        assert_eq!(buf.len(), 8 * 8 * 4);
        assert_eq!(px(&buf, 8, 1, 1), [255, 0, 0, 255]);
        assert_eq!(px(&buf, 8, 6, 6), [0, 0, 0, 0]);
    }

    #[test]
    fn render_is_deterministic() {
        let env = env(16, 16, 4);
        let poly = Polygon::new(
            [10, 200, 30, 128],
            vec![Coordinate::new(1, 2), Coordinate::new(14, 3), Coordinate::new(12, 15), Coordinate::new(3, 9)],
        );
        let canvas = Canvas::from_polygons(env, vec![poly]).unwrap();
        let r = CpuRenderer::default();
        assert_eq!(r.render(&canvas, 16, 16).unwrap(), r.render(&canvas, 16, 16).unwrap());
    }

    #[test]
    fn degenerate_polygon_draws_nothing() {
        let env = env(4, 4, 2);
        let line = Polygon::new([255, 255, 255, 255], vec![Coordinate::new(0, 0), Coordinate::new(3, 3)]);
        let canvas = Canvas::from_polygons(env, vec![line]).unwrap();
        let buf = CpuRenderer::default().render(&canvas, 4, 4).unwrap();
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn premultiply_roundtrip_opaque() {
        let straight = [200, 100, 50, 255, 0, 0, 0, 0];
        let pm = premultiply(&straight);
        assert_eq!(pm, straight);
        assert_eq!(demultiply(&pm), straight);
        assert_eq!(premultiply(&[255, 255, 255, 128]), [128, 128, 128, 128]);
    }

    #[test]
    fn save_png_writes_file() {
        let env = env(4, 4, 4);
        let canvas = Canvas::from_polygons(
            env,
            vec![Polygon::new([9, 9, 9, 255], vec![Coordinate::new(0, 0), Coordinate::new(4, 0), Coordinate::new(4, 4), Coordinate::new(0, 4)])],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fittest.png");
        save_png(&canvas, &path).unwrap();
        let img = image::open(&path).unwrap();
        assert_eq!((img.width(), img.height()), (4, 4));
    }
}
