use rand::Rng;
use std::sync::Arc;

use crate::dna::{Canvas, Coordinate, Polygon, Shape};
use crate::environment::Environment;
use crate::geom;
use crate::settings::ConvexityPolicy;

/// random polygons and canvases sized by the environment's settings.
/// the only side effect is consuming the caller's random source.
#[derive(Clone, Debug)]
pub struct PolygonFactory {
    env: Arc<Environment>,
}

impl PolygonFactory {
    pub fn new(env: Arc<Environment>) -> Self {
        Self { env }
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    /// uniform coordinate in `[0, width) x [0, height)`
    pub fn random_tuple<R: Rng>(&self, rng: &mut R) -> Coordinate {
        self.random_tuple_from(rng, 0, 0)
    }

    /// uniform coordinate in `[low_x, width) x [low_y, height)`; a lower
    /// bound at or past the edge pins that axis to the bound
    pub fn random_tuple_from<R: Rng>(&self, rng: &mut R, low_x: i32, low_y: i32) -> Coordinate {
        let s = self.env.settings();
        Coordinate::new(
            draw_axis(rng, low_x, s.canvas_width as i32),
            draw_axis(rng, low_y, s.canvas_height as i32),
        )
    }

    pub fn random_tuples<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Coordinate> {
        (0..count).map(|_| self.random_tuple(rng)).collect()
    }

    /// uniform RGBA and `polygon_edge_count` uniform coordinates.
    /// with [`ConvexityPolicy::RetryConvex`] the coordinates are redrawn until
    /// convex; once the budget is spent the last draw is kept.
    pub fn random_polygon<R: Rng>(&self, rng: &mut R) -> Polygon {
        profiling::scope!("random_polygon");
        let s = self.env.settings();
        let rgba = [rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>(), rng.random::<u8>()];

        let coordinates = match s.convexity {
            ConvexityPolicy::Any => self.random_tuples(rng, s.polygon_edge_count),
            ConvexityPolicy::RetryConvex { max_attempts } => {
                let mut coordinates = self.random_tuples(rng, s.polygon_edge_count);
                let mut attempts = 1;
                while !geom::is_convex(&coordinates) {
                    if attempts >= max_attempts {
                        tracing::warn!(
                            "no convex {}-gon after {} attempts, keeping a non-convex one",
                            s.polygon_edge_count,
                            attempts
                        );
                        break;
                    }
                    coordinates = self.random_tuples(rng, s.polygon_edge_count);
                    attempts += 1;
                }
                coordinates
            }
        };

        Polygon::new(rgba, coordinates)
    }

    pub fn random_polygons<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<Polygon> {
        (0..count).map(|_| self.random_polygon(rng)).collect()
    }

    /// one individual with `polygon_count` random polygons
    pub fn random_canvas<R: Rng>(&self, rng: &mut R) -> Canvas {
        let shapes: Vec<Shape> = self
            .random_polygons(rng, self.env.settings().polygon_count)
            .into_iter()
            .map(Shape::from)
            .collect();
        Canvas::assemble(Arc::clone(&self.env), shapes)
    }

    pub fn random_canvases<R: Rng>(&self, rng: &mut R, amount: usize) -> Vec<Canvas> {
        profiling::scope!("random_canvases");
        (0..amount).map(|_| self.random_canvas(rng)).collect()
    }
}

#[inline]
fn draw_axis<R: Rng>(rng: &mut R, low: i32, high: i32) -> i32 {
    if low >= high {
        low
    } else {
        rng.random_range(low..high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Settings;
    use crate::test_support::counting_env_with;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn factory(settings: Settings) -> PolygonFactory {
        PolygonFactory::new(counting_env_with(settings).0)
    }

    #[test]
    fn canvases_have_configured_shape() {
        let f = factory(Settings {
            canvas_width: 20,
            canvas_height: 10,
            polygon_count: 7,
            polygon_edge_count: 5,
            ..Settings::default()
        });
        let mut rng = Pcg32::seed_from_u64(1);
        let canvases = f.random_canvases(&mut rng, 6);
        assert_eq!(canvases.len(), 6);
        for canvas in &canvases {
            assert_eq!(canvas.len(), 7);
            for polygon in canvas.polygons() {
                assert_eq!(polygon.coordinates.len(), 5);
                for c in &polygon.coordinates {
                    assert!((0..20).contains(&c.x) && (0..10).contains(&c.y), "{c} out of bounds");
                }
            }
        }
    }

    #[test]
    fn seeded_factory_is_reproducible() {
        let f = factory(Settings { canvas_width: 32, canvas_height: 32, ..Settings::default() });
        let a = f.random_canvas(&mut Pcg32::seed_from_u64(9));
        let b = f.random_canvas(&mut Pcg32::seed_from_u64(9));
        assert_eq!(a, b);
    }

    #[test]
    fn tuple_lower_bound_respected() {
        let f = factory(Settings { canvas_width: 10, canvas_height: 10, ..Settings::default() });
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..100 {
            let c = f.random_tuple_from(&mut rng, 7, 9);
            assert!((7..10).contains(&c.x));
            assert_eq!(c.y, 9);
        }
        assert_eq!(f.random_tuple_from(&mut rng, 50, 0).x, 50);
    }

    #[test]
    fn retry_convex_produces_convex_quads() {
        let f = factory(Settings {
            canvas_width: 100,
            canvas_height: 100,
            polygon_edge_count: 4,
            convexity: ConvexityPolicy::RetryConvex { max_attempts: 10_000 },
            ..Settings::default()
        });
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..50 {
            assert!(geom::is_convex(&f.random_polygon(&mut rng).coordinates));
        }
    }

    #[test]
    fn retry_budget_terminates() {
        // hexagons on a 3x3 grid are rarely convex; the budget must still end the loop
        let f = factory(Settings {
            canvas_width: 3,
            canvas_height: 3,
            polygon_edge_count: 6,
            convexity: ConvexityPolicy::RetryConvex { max_attempts: 2 },
            ..Settings::default()
        });
        let mut rng = Pcg32::seed_from_u64(5);
        for _ in 0..20 {
            assert_eq!(f.random_polygon(&mut rng).coordinates.len(), 6);
        }
    }
}
