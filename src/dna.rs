use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::environment::Environment;
use crate::error::{EvolveError, Result};
use crate::settings::Settings;

/// integer pixel position, clipped to `[0, width] x [0, height]` by the mutation operators
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: i32,
    pub y: i32,
}

impl Coordinate {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// difference vector `self - other`
    #[inline]
    pub fn sub(self, other: Coordinate) -> (i64, i64) {
        (self.x as i64 - other.x as i64, self.y as i64 - other.y as i64)
    }
}

impl From<(i32, i32)> for Coordinate {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// a colored polygon. coordinate order is the drawing contour.
/// cloning copies the coordinate list, so clones never share storage.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Polygon {
    pub coordinates: Vec<Coordinate>,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Polygon {
    pub fn new(rgba: [u8; 4], coordinates: Vec<Coordinate>) -> Self {
        let [red, green, blue, alpha] = rgba;
        Self { coordinates, red, green, blue, alpha }
    }

    #[inline]
    pub fn rgba(&self) -> [u8; 4] {
        [self.red, self.green, self.blue, self.alpha]
    }
}

impl fmt::Display for Polygon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "R: {}, G: {}, B: {}, A: {}, pts: ",
            self.red, self.green, self.blue, self.alpha
        )?;
        for (i, c) in self.coordinates.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// drawable element of a canvas. polygons are the only shape that exists,
/// every consumer destructures this irrefutably.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Shape {
    Polygon(Polygon),
}

impl Shape {
    #[inline]
    pub fn as_polygon(&self) -> &Polygon {
        let Shape::Polygon(polygon) = self;
        polygon
    }

    #[inline]
    pub fn as_polygon_mut(&mut self) -> &mut Polygon {
        let Shape::Polygon(polygon) = self;
        polygon
    }

}

impl From<Polygon> for Shape {
    fn from(polygon: Polygon) -> Self {
        Shape::Polygon(polygon)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.as_polygon().fmt(f)
    }
}

/// one individual: an ordered shape list living in a shared environment.
///
/// fitness is computed on first read and cached for the lifetime of the
/// instance. the shape list is never mutated in place; operators build a new
/// canvas through [`Canvas::with_shapes`], which starts with an empty cache.
/// a plain `clone()` keeps the cache because the content is identical.
///
/// every canvas holds exactly `polygon_count` polygons of
/// `polygon_edge_count` coordinates each.
#[derive(Clone)]
pub struct Canvas {
    env: Arc<Environment>,
    shapes: Vec<Shape>,
    fitness: OnceLock<f64>,
}

impl Canvas {
    /// rejects shape lists whose counts disagree with the environment's settings
    pub fn new(env: Arc<Environment>, shapes: Vec<Shape>) -> Result<Self> {
        check_counts(env.settings(), &shapes)?;
        Ok(Self::assemble(env, shapes))
    }

    pub fn from_polygons(env: Arc<Environment>, polygons: Vec<Polygon>) -> Result<Self> {
        Self::new(env, polygons.into_iter().map(Shape::from).collect())
    }

    /// for the factory, codec and operators, which only build well-sized lists
    pub(crate) fn assemble(env: Arc<Environment>, shapes: Vec<Shape>) -> Self {
        debug_assert!(check_counts(env.settings(), &shapes).is_ok());
        Self { env, shapes, fitness: OnceLock::new() }
    }

    /// offspring in the same environment with a fresh fitness cache
    pub(crate) fn with_shapes(&self, shapes: Vec<Shape>) -> Canvas {
        Canvas::assemble(Arc::clone(&self.env), shapes)
    }

    pub fn environment(&self) -> &Arc<Environment> {
        &self.env
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn polygons(&self) -> impl Iterator<Item = &Polygon> + '_ {
        self.shapes.iter().map(Shape::as_polygon)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// similarity to the seed image in `[0, 1]`, higher is better.
    /// renders at most once per instance.
    pub fn fitness(&self) -> Result<f64> {
        if let Some(fitness) = self.fitness.get() {
            return Ok(*fitness);
        }
        profiling::scope!("Canvas::fitness");
        let fitness = self.env.evaluate(self)?;
        Ok(*self.fitness.get_or_init(|| fitness))
    }

    /// fitness if it has already been computed
    pub fn cached_fitness(&self) -> Option<f64> {
        self.fitness.get().copied()
    }
}

impl PartialEq for Canvas {
    fn eq(&self, other: &Self) -> bool {
        self.shapes == other.shapes
    }
}

impl fmt::Debug for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canvas")
            .field("shapes", &self.shapes)
            .field("fitness", &self.fitness.get())
            .finish()
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, shape) in self.shapes.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            write!(f, "{shape}")?;
        }
        Ok(())
    }
}

fn check_counts(settings: &Settings, shapes: &[Shape]) -> Result<()> {
    if shapes.len() != settings.polygon_count {
        return Err(EvolveError::ShapeCount {
            what: "polygons",
            expected: settings.polygon_count,
            actual: shapes.len(),
        });
    }
    for shape in shapes {
        let actual = shape.as_polygon().coordinates.len();
        if actual != settings.polygon_edge_count {
            return Err(EvolveError::ShapeCount {
                what: "coordinates per polygon",
                expected: settings.polygon_edge_count,
                actual,
            });
        }
    }
    Ok(())
}

/// first canvas with the strictly highest fitness
pub fn fittest(canvases: &[Canvas]) -> Result<Option<&Canvas>> {
    let mut best: Option<(&Canvas, f64)> = None;
    for canvas in canvases {
        let fitness = canvas.fitness()?;
        match best {
            Some((_, best_fitness)) if fitness <= best_fitness => {}
            _ => best = Some((canvas, fitness)),
        }
    }
    Ok(best.map(|(canvas, _)| canvas))
}

/// stable sort, descending by fitness
pub fn sort_by_fitness(canvases: Vec<Canvas>) -> Result<Vec<Canvas>> {
    profiling::scope!("sort_by_fitness");
    let mut scored = canvases
        .into_iter()
        .map(|canvas| canvas.fitness().map(|fitness| (fitness, canvas)))
        .collect::<Result<Vec<_>>>()?;
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));
    Ok(scored.into_iter().map(|(_, canvas)| canvas).collect())
}
