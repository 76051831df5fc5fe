use rand::seq::SliceRandom;
use rand::Rng;

use crate::dna::{Canvas, Polygon, Shape};
use crate::factory::PolygonFactory;
use crate::mutation_config::{MutateConfig, MutationKind, Scope, ZOrder};

/// mutate a clone of every candidate. one weighted branch fires per candidate;
/// the inputs are left untouched.
pub fn mutate<R: Rng>(candidates: &[Canvas], factory: &PolygonFactory, rng: &mut R) -> Vec<Canvas> {
    profiling::scope!("mutate");
    candidates.iter().map(|c| mutate_one(c, factory, rng)).collect()
}

pub fn mutate_one<R: Rng>(canvas: &Canvas, factory: &PolygonFactory, rng: &mut R) -> Canvas {
    let cfg = &factory.environment().settings().mutation;
    let kind = cfg.pick(rng.random::<f64>());
    mutate_with(canvas, kind, factory, rng)
}

/// apply one specific branch to a clone of `canvas`
pub fn mutate_with<R: Rng>(canvas: &Canvas, kind: MutationKind, factory: &PolygonFactory, rng: &mut R) -> Canvas {
    let settings = factory.environment().settings();
    let cfg = &settings.mutation;
    let mut shapes = canvas.shapes().to_vec();
    if shapes.is_empty() {
        return canvas.with_shapes(shapes);
    }

    match kind {
        MutationKind::Color => {
            for_scope(&mut shapes, cfg.color_scope, rng, |p, rng| shift_color(p, cfg, rng));
        }
        MutationKind::Position => {
            let (w, h) = (settings.canvas_width as i32, settings.canvas_height as i32);
            for_scope(&mut shapes, cfg.position_scope, rng, |p, rng| shift_position(p, cfg, w, h, rng));
        }
        MutationKind::Index => match cfg.z_order {
            ZOrder::MoveToFront => {
                let i = rng.random_range(0..shapes.len());
                let shape = shapes.remove(i);
                shapes.insert(0, shape);
            }
            ZOrder::Shuffle => shapes.shuffle(rng),
        },
        MutationKind::Replace => match cfg.replace_scope {
            Scope::Single => {
                let i = rng.random_range(0..shapes.len());
                shapes.remove(i);
                shapes.insert(0, Shape::from(factory.random_polygon(rng)));
            }
            Scope::All => {
                let count = shapes.len();
                shapes = factory.random_polygons(rng, count).into_iter().map(Shape::from).collect();
            }
        },
    }

    canvas.with_shapes(shapes)
}

fn for_scope<R: Rng>(shapes: &mut [Shape], scope: Scope, rng: &mut R, mut f: impl FnMut(&mut Polygon, &mut R)) {
    match scope {
        Scope::Single => {
            let i = rng.random_range(0..shapes.len());
            f(shapes[i].as_polygon_mut(), rng);
        }
        Scope::All => {
            for shape in shapes.iter_mut() {
                f(shape.as_polygon_mut(), rng);
            }
        }
    }
}

fn shift_color<R: Rng>(p: &mut Polygon, cfg: &MutateConfig, rng: &mut R) {
    let d = cfg.color_delta as i32;
    for channel in [&mut p.red, &mut p.green, &mut p.blue, &mut p.alpha] {
        *channel = (*channel as i32 + rng.random_range(-d..=d)).clamp(0, 255) as u8;
    }
}

fn shift_position<R: Rng>(p: &mut Polygon, cfg: &MutateConfig, w: i32, h: i32, rng: &mut R) {
    let d = cfg.position_delta;
    for c in &mut p.coordinates {
        c.x = c.x.saturating_add(rng.random_range(-d..=d)).clamp(0, w);
        c.y = c.y.saturating_add(rng.random_range(-d..=d)).clamp(0, h);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dna::Coordinate;
    use crate::settings::Settings;
    use crate::test_support::{counting_env_with, small_settings};
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn setup(settings: Settings) -> (PolygonFactory, Canvas, Pcg32) {
        let (env, _) = counting_env_with(settings);
        let factory = PolygonFactory::new(env);
        let mut rng = Pcg32::seed_from_u64(17);
        let canvas = factory.random_canvas(&mut rng);
        (factory, canvas, rng)
    }

    fn counts(canvas: &Canvas) -> Vec<usize> {
        canvas.polygons().map(|p| p.coordinates.len()).collect()
    }

    #[test]
    fn every_branch_keeps_counts() {
        for scope in [Scope::Single, Scope::All] {
            for z_order in [ZOrder::MoveToFront, ZOrder::Shuffle] {
                let mut settings = small_settings(30, 20, 8, 4);
                settings.mutation.color_scope = scope;
                settings.mutation.position_scope = scope;
                settings.mutation.replace_scope = scope;
                settings.mutation.z_order = z_order;
                let (factory, canvas, mut rng) = setup(settings);

                let mut current = canvas;
                for _ in 0..200 {
                    let next = mutate_one(&current, &factory, &mut rng);
                    assert_eq!(counts(&next), vec![4; 8]);
                    current = next;
                }
            }
        }
    }

    #[test]
    fn mutate_leaves_candidates_untouched() {
        let (factory, canvas, mut rng) = setup(small_settings(30, 20, 5, 3));
        let before = canvas.clone();
        let out = mutate(std::slice::from_ref(&canvas), &factory, &mut rng);
        assert_eq!(out.len(), 1);
        assert_eq!(canvas, before);
        assert!(out[0].cached_fitness().is_none());
    }

    #[test]
    fn color_is_clamped_to_byte_range() {
        let mut settings = small_settings(10, 10, 1, 3);
        settings.mutation.color_delta = 255;
        let (factory, _, mut rng) = setup(settings);
        let env = factory.environment().clone();
        let saturated = Canvas::from_polygons(env, vec![Polygon::new([255, 0, 255, 0], vec![Coordinate::default(); 3])]).unwrap();

        let mut changed = false;
        for _ in 0..50 {
            let out = mutate_with(&saturated, MutationKind::Color, &factory, &mut rng);
            let p = out.polygons().next().unwrap();
            changed |= p.rgba() != saturated.polygons().next().unwrap().rgba();
            assert_eq!(p.coordinates, vec![Coordinate::default(); 3]);
        }
        assert!(changed);
    }

    #[test]
    fn position_stays_inside_closed_canvas_bounds() {
        let mut settings = small_settings(12, 7, 3, 5);
        settings.mutation.position_delta = 50;
        settings.mutation.position_scope = Scope::All;
        let (factory, canvas, mut rng) = setup(settings);

        let mut current = canvas;
        for _ in 0..100 {
            current = mutate_with(&current, MutationKind::Position, &factory, &mut rng);
            for p in current.polygons() {
                for c in &p.coordinates {
                    assert!((0..=12).contains(&c.x) && (0..=7).contains(&c.y), "{c}");
                }
            }
        }
    }

    #[test]
    fn move_to_front_is_a_rotation_of_one_polygon() {
        let (factory, canvas, mut rng) = setup(small_settings(30, 20, 6, 3));
        let out = mutate_with(&canvas, MutationKind::Index, &factory, &mut rng);

        let front = out.shapes()[0].clone();
        let i = canvas.shapes().iter().position(|s| *s == front).unwrap();
        let mut expected = canvas.shapes().to_vec();
        let moved = expected.remove(i);
        expected.insert(0, moved);
        assert_eq!(out.shapes(), expected.as_slice());
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut settings = small_settings(30, 20, 10, 3);
        settings.mutation.z_order = ZOrder::Shuffle;
        let (factory, canvas, mut rng) = setup(settings);
        let out = mutate_with(&canvas, MutationKind::Index, &factory, &mut rng);

        let key = |c: &Canvas| {
            let mut v: Vec<String> = c.polygons().map(|p| p.to_string()).collect();
            v.sort();
            v
        };
        assert_eq!(key(&out), key(&canvas));
    }

    #[test]
    fn single_replacement_drops_one_and_prepends_new() {
        let (factory, canvas, mut rng) = setup(small_settings(30, 20, 5, 3));
        let out = mutate_with(&canvas, MutationKind::Replace, &factory, &mut rng);

        assert_eq!(out.len(), 5);
        let kept = out.shapes()[1..].iter().filter(|s| canvas.shapes().contains(s)).count();
        assert_eq!(kept, 4);
    }
}
