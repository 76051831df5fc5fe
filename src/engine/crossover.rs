use rand::Rng;

use crate::dna::{Canvas, Shape};

/// single-point crossover at a random index in `[0, polygon_count)`
pub fn crossover<R: Rng>(first: &Canvas, second: &Canvas, rng: &mut R) -> (Canvas, Canvas) {
    let len = first.len().min(second.len());
    let k = if len == 0 { 0 } else { rng.random_range(0..len) };
    crossover_at(first, second, k)
}

/// `first[..k] + second[k..]` and `second[..k] + first[k..]`.
/// offspring own cloned polygons and start without a cached fitness.
pub fn crossover_at(first: &Canvas, second: &Canvas, k: usize) -> (Canvas, Canvas) {
    profiling::scope!("crossover_at");
    let (a, b) = (first.shapes(), second.shapes());
    let k = k.min(a.len()).min(b.len());

    let splice = |head: &[Shape], tail: &[Shape]| -> Vec<Shape> { head[..k].iter().chain(&tail[k..]).cloned().collect() };

    (first.with_shapes(splice(a, b)), second.with_shapes(splice(b, a)))
}

/// every couple yields two offspring, in couple order
pub fn offspring<R: Rng>(couples: &[(&Canvas, &Canvas)], rng: &mut R) -> Vec<Canvas> {
    let mut out = Vec::with_capacity(couples.len() * 2);
    for &(first, second) in couples {
        let (a, b) = crossover(first, second, rng);
        out.push(a);
        out.push(b);
    }
    out
}
