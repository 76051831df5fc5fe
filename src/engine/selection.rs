//! parent selection and survivor selection.
//!
//! the roulette wheel is laid out over the population sorted best-first.
//! `cumulative[i]` is the share of individuals `i..n`, so `cumulative[0] == 1`
//! and the best individual owns the top slice `(cumulative[1], 1]`. a draw is
//! resolved by scanning from the worst end for the first slot reaching it.

use rand::Rng;

use crate::dna::{sort_by_fitness, Canvas};
use crate::error::Result;

/// redraws allowed when both draws of a couple land on the same individual
pub const MAX_PAIR_RETRIES: usize = 64;

/// borrows the population; only an index order and the cumulative table are owned
#[derive(Clone, Debug)]
pub struct RouletteWheel<'a> {
    population: &'a [Canvas],
    order: Vec<usize>,
    cumulative: Vec<f64>,
}

impl<'a> RouletteWheel<'a> {
    pub fn new(population: &'a [Canvas]) -> Result<Self> {
        profiling::scope!("RouletteWheel::new");
        let fitness = population.iter().map(Canvas::fitness).collect::<Result<Vec<f64>>>()?;
        let mut order: Vec<usize> = (0..population.len()).collect();
        order.sort_by(|&a, &b| fitness[b].total_cmp(&fitness[a]));
        let total: f64 = fitness.iter().sum();

        let n = order.len();
        let shares: Vec<f64> = if total > 0.0 && total.is_finite() {
            order.iter().map(|&i| fitness[i] / total).collect()
        } else {
            vec![1.0 / n.max(1) as f64; n]
        };

        let mut cumulative = vec![0.0; n];
        let mut acc = 0.0;
        for i in (0..n).rev() {
            acc += shares[i];
            cumulative[i] = acc;
        }
        // absorb rounding so every draw in [0, 1) resolves
        if let Some(top) = cumulative.first_mut() {
            *top = 1.0;
        }

        Ok(Self { population, order, cumulative })
    }

    /// individual at `rank`, 0 being the fittest
    pub fn ranked(&self, rank: usize) -> &'a Canvas {
        &self.population[self.order[rank]]
    }

    pub fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// rank owning draw `u`
    pub fn spin(&self, u: f64) -> usize {
        self.spin_pair(u, u).0
    }

    /// resolve two draws in one scan from the worst end
    fn spin_pair(&self, u1: f64, u2: f64) -> (usize, usize) {
        let (mut a, mut b) = (None, None);
        for (i, &cum) in self.cumulative.iter().enumerate().rev() {
            if a.is_none() && cum >= u1 {
                a = Some(i);
            }
            if b.is_none() && cum >= u2 {
                b = Some(i);
            }
            if a.is_some() && b.is_some() {
                break;
            }
        }
        (a.unwrap_or(0), b.unwrap_or(0))
    }

    /// two distinct ranks. after [`MAX_PAIR_RETRIES`] self-pairs the
    /// partner becomes the next rank down.
    pub fn pair<R: Rng>(&self, rng: &mut R) -> Option<(usize, usize)> {
        let n = self.len();
        if n < 2 {
            return None;
        }

        let mut last = 0;
        for _ in 0..MAX_PAIR_RETRIES {
            let (a, b) = self.spin_pair(rng.random::<f64>(), rng.random::<f64>());
            if a != b {
                return Some((a, b));
            }
            last = a;
        }
        let partner = if last + 1 < n { last + 1 } else { last - 1 };
        Some((last, partner))
    }

    pub fn couples<R: Rng>(&self, rng: &mut R, count: usize) -> Vec<(&'a Canvas, &'a Canvas)> {
        (0..count)
            .map_while(|_| self.pair(rng))
            .map(|(a, b)| (self.ranked(a), self.ranked(b)))
            .collect()
    }
}

/// `count` roulette-selected couples; empty when fewer than two individuals exist
pub fn pair_couples<'a, R: Rng>(population: &'a [Canvas], count: usize, rng: &mut R) -> Result<Vec<(&'a Canvas, &'a Canvas)>> {
    profiling::scope!("pair_couples");
    Ok(RouletteWheel::new(population)?.couples(rng, count))
}

/// truncation survival: the `keep` fittest, best first
pub fn truncate(population: Vec<Canvas>, keep: usize) -> Result<Vec<Canvas>> {
    profiling::scope!("truncate");
    let mut sorted = sort_by_fitness(population)?;
    sorted.truncate(keep);
    Ok(sorted)
}
