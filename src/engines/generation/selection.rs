use super::chromosome::Chromosome;
use crate::config::{MatingMode, ReplacementMode, SelectionMode};
use rand::seq::{index, SliceRandom};
use rand::Rng;

/// Ascending fitness, lowest (best) first.
pub fn sort_by_fitness(chromosomes: &mut [Chromosome]) {
    chromosomes.sort_by(|a, b| a.fitness().total_cmp(&b.fitness()));
}

/// Draw the mating pool. Whatever the mode, the pool comes back sorted best first.
pub fn select_sample<R: Rng>(
    population: &[Chromosome],
    mode: SelectionMode,
    size: usize,
    rng: &mut R,
) -> Vec<Chromosome> {
    let size = size.min(population.len());
    let mut sample: Vec<Chromosome> = match mode {
        SelectionMode::Best => {
            let mut sorted = population.to_vec();
            sort_by_fitness(&mut sorted);
            sorted.truncate(size);
            sorted
        }
        SelectionMode::Worst => {
            let mut sorted = population.to_vec();
            sorted.sort_by(|a, b| b.fitness().total_cmp(&a.fitness()));
            sorted.truncate(size);
            sorted
        }
        SelectionMode::Random => population.choose_multiple(rng, size).cloned().collect(),
    };
    sort_by_fitness(&mut sample);
    sample
}

/// Index pairs into a pool of `size` individuals, `size / 2` of them.
pub fn mate<R: Rng>(size: usize, mode: MatingMode, rng: &mut R) -> Vec<(usize, usize)> {
    let pairs = size / 2;
    match mode {
        MatingMode::Best => (0..pairs).map(|i| (2 * i, 2 * i + 1)).collect(),
        MatingMode::Extreme => (0..pairs).map(|i| (i, size - 1 - i)).collect(),
        MatingMode::Random => (0..pairs)
            .map(|_| (rng.gen_range(0..size), rng.gen_range(0..size)))
            .collect(),
    }
}

/// Next generation from the current population and the surviving children.
pub fn replace<R: Rng>(
    population: Vec<Chromosome>,
    children: Vec<Chromosome>,
    mode: ReplacementMode,
    target_size: usize,
    rng: &mut R,
) -> Vec<Chromosome> {
    match mode {
        ReplacementMode::ChildrenOnly => children,
        ReplacementMode::ChildrenAdded => {
            let mut next = population;
            next.extend(children);
            next
        }
        ReplacementMode::MixedRandom => {
            let mut pool = population;
            pool.extend(children);
            let amount = target_size.min(pool.len());
            let mut keep = index::sample(rng, pool.len(), amount).into_vec();
            keep.sort_unstable();
            keep.into_iter().map(|i| pool[i].clone()).collect()
        }
        ReplacementMode::MixedBest => {
            let mut pool = population;
            pool.extend(children);
            sort_by_fitness(&mut pool);
            pool.truncate(target_size);
            pool
        }
    }
}
