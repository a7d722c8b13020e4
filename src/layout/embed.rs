use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::util::stable_hash;

use super::LayoutError;

pub const DEFAULT_NEIGHBORS: usize = 15;
pub const DEFAULT_MIN_DIST: f64 = 0.1;
pub const DEFAULT_SEED: &str = "toden-e-layout-v1";

const SPREAD: f64 = 1.0;
const NEGATIVE_SAMPLE_RATE: usize = 5;
const REPULSION_STRENGTH: f64 = 1.0;
const INITIAL_ALPHA: f64 = 1.0;
const GRADIENT_CLIP: f64 = 4.0;
const SMOOTH_K_TOLERANCE: f64 = 1e-5;
const MIN_K_DIST_SCALE: f64 = 1e-3;
const BANDWIDTH_ITERATIONS: usize = 64;

pub trait Embedder: Send + Sync {
    fn embed(
        &self,
        rows: &[Vec<f64>],
        params: &EmbeddingParams,
    ) -> Result<Vec<[f64; 2]>, LayoutError>;
}

#[derive(Clone, Debug, PartialEq)]
pub struct EmbeddingParams {
    pub neighbors: usize,
    pub min_dist: f64,
    /// `None` picks 500 epochs for up to 10k rows and 200 beyond.
    pub epochs: Option<usize>,
    pub seed: String,
}

impl Default for EmbeddingParams {
    fn default() -> Self {
        Self {
            neighbors: DEFAULT_NEIGHBORS,
            min_dist: DEFAULT_MIN_DIST,
            epochs: None,
            seed: DEFAULT_SEED.to_string(),
        }
    }
}

impl EmbeddingParams {
    fn epoch_count(&self, rows: usize) -> usize {
        self.epochs
            .unwrap_or(if rows <= 10_000 { 500 } else { 200 })
            .max(1)
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct UmapEmbedder;

struct WeightedEdge {
    head: usize,
    tail: usize,
    weight: f64,
}

impl Embedder for UmapEmbedder {
    fn embed(
        &self,
        rows: &[Vec<f64>],
        params: &EmbeddingParams,
    ) -> Result<Vec<[f64; 2]>, LayoutError> {
        let n = rows.len();
        match n {
            0 => return Ok(Vec::new()),
            1 => return Ok(vec![[0.0, 0.0]]),
            _ => {}
        }
        if params.neighbors == 0 {
            return Err(LayoutError::Embedding(
                "neighbor count must be positive".to_string(),
            ));
        }

        let k = params.neighbors.min(n - 1);
        let distances = pairwise_distances(rows);
        let knn = nearest_neighbors(&distances, k);
        let edges = fuzzy_graph(&distances, &knn);
        let (a, b) = fit_curve(SPREAD, params.min_dist);

        let mut rng = ChaCha8Rng::seed_from_u64(stable_hash(&params.seed));
        let mut embedding = (0..n)
            .map(|_| [rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)])
            .collect::<Vec<[f64; 2]>>();

        optimize(
            &mut embedding,
            &edges,
            params.epoch_count(n),
            (a, b),
            &mut rng,
        );

        if embedding
            .iter()
            .any(|point| !point[0].is_finite() || !point[1].is_finite())
        {
            return Err(LayoutError::Embedding(
                "optimization diverged".to_string(),
            ));
        }

        Ok(embedding)
    }
}

fn pairwise_distances(rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = rows.len();
    let mut distances = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let distance = rows[i]
                .iter()
                .zip(rows[j].iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt();
            distances[i][j] = distance;
            distances[j][i] = distance;
        }
    }
    distances
}

fn nearest_neighbors(distances: &[Vec<f64>], k: usize) -> Vec<Vec<usize>> {
    distances
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let mut others = (0..row.len()).filter(|&j| j != i).collect::<Vec<_>>();
            others.sort_by(|&x, &y| row[x].total_cmp(&row[y]).then(x.cmp(&y)));
            others.truncate(k);
            others
        })
        .collect()
}

fn smooth_knn(neighbor_distances: &[f64], mean_distance: f64) -> (f64, f64) {
    let rho = neighbor_distances
        .iter()
        .copied()
        .find(|distance| *distance > 0.0)
        .unwrap_or(0.0);
    let target = (neighbor_distances.len() as f64).log2();

    let mut low = 0.0_f64;
    let mut high = f64::INFINITY;
    let mut sigma = 1.0_f64;
    for _ in 0..BANDWIDTH_ITERATIONS {
        let sum = neighbor_distances
            .iter()
            .map(|distance| {
                let excess = distance - rho;
                if excess > 0.0 {
                    (-excess / sigma).exp()
                } else {
                    1.0
                }
            })
            .sum::<f64>();

        if (sum - target).abs() < SMOOTH_K_TOLERANCE {
            break;
        }
        if sum > target {
            high = sigma;
            sigma = (low + high) / 2.0;
        } else {
            low = sigma;
            sigma = if high.is_infinite() {
                sigma * 2.0
            } else {
                (low + high) / 2.0
            };
        }
    }

    let local_mean =
        neighbor_distances.iter().sum::<f64>() / neighbor_distances.len().max(1) as f64;
    let floor = if rho > 0.0 {
        MIN_K_DIST_SCALE * local_mean
    } else {
        MIN_K_DIST_SCALE * mean_distance
    };
    (rho, sigma.max(floor).max(f64::MIN_POSITIVE))
}

/// Symmetric fuzzy graph `A + Aᵀ - A∘Aᵀ`, one entry per unordered pair, sorted by index.
fn fuzzy_graph(distances: &[Vec<f64>], knn: &[Vec<usize>]) -> Vec<WeightedEdge> {
    let n = distances.len();
    let total = distances.iter().flatten().sum::<f64>();
    let mean_distance = total / (n * n) as f64;

    let mut directed = vec![vec![0.0; n]; n];
    for (i, neighbors) in knn.iter().enumerate() {
        let neighbor_distances = neighbors
            .iter()
            .map(|&j| distances[i][j])
            .collect::<Vec<_>>();
        let (rho, sigma) = smooth_knn(&neighbor_distances, mean_distance);
        for (&j, distance) in neighbors.iter().zip(neighbor_distances) {
            let excess = distance - rho;
            directed[i][j] = if excess <= 0.0 {
                1.0
            } else {
                (-excess / sigma).exp()
            };
        }
    }

    let mut edges = Vec::new();
    for i in 0..n {
        for j in (i + 1)..n {
            let forward = directed[i][j];
            let backward = directed[j][i];
            let weight = forward + backward - forward * backward;
            if weight > 0.0 {
                edges.push(WeightedEdge {
                    head: i,
                    tail: j,
                    weight,
                });
            }
        }
    }
    edges
}

fn fit_curve(spread: f64, min_dist: f64) -> (f64, f64) {
    let samples = (0..300)
        .map(|index| {
            let x = 3.0 * spread * index as f64 / 299.0;
            let y = if x < min_dist {
                1.0
            } else {
                (-(x - min_dist) / spread).exp()
            };
            (x, y)
        })
        .collect::<Vec<_>>();
    let error = |a: f64, b: f64| {
        samples
            .iter()
            .map(|(x, y)| {
                let predicted = 1.0 / (1.0 + a * x.powf(2.0 * b));
                (predicted - y).powi(2)
            })
            .sum::<f64>()
    };

    let (mut log_a_range, mut b_range) = ((-3.0_f64, 3.0_f64), (0.1_f64, 2.0_f64));
    let mut best: (f64, f64, f64) = (1.0, 1.0, f64::INFINITY);
    for _ in 0..4 {
        const STEPS: usize = 40;
        for ia in 0..=STEPS {
            let log_a = log_a_range.0 + (log_a_range.1 - log_a_range.0) * ia as f64 / STEPS as f64;
            let a = log_a.exp();
            for ib in 0..=STEPS {
                let b = b_range.0 + (b_range.1 - b_range.0) * ib as f64 / STEPS as f64;
                let candidate = error(a, b);
                if candidate < best.2 {
                    best = (a, b, candidate);
                }
            }
        }
        let log_a_step = (log_a_range.1 - log_a_range.0) / STEPS as f64;
        let b_step = (b_range.1 - b_range.0) / STEPS as f64;
        let best_log_a = best.0.ln();
        log_a_range = (best_log_a - 2.0 * log_a_step, best_log_a + 2.0 * log_a_step);
        b_range = (
            (best.1 - 2.0 * b_step).max(0.01),
            best.1 + 2.0 * b_step,
        );
    }

    (best.0, best.1)
}

fn clip(value: f64) -> f64 {
    value.clamp(-GRADIENT_CLIP, GRADIENT_CLIP)
}

fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2)
}

fn optimize(
    embedding: &mut [[f64; 2]],
    edges: &[WeightedEdge],
    epochs: usize,
    (a, b): (f64, f64),
    rng: &mut ChaCha8Rng,
) {
    let n = embedding.len();
    let max_weight = edges.iter().map(|edge| edge.weight).fold(0.0, f64::max);
    if max_weight <= 0.0 {
        return;
    }

    let active = edges
        .iter()
        .filter(|edge| edge.weight >= max_weight / epochs as f64)
        .collect::<Vec<_>>();
    let epochs_per_sample = active
        .iter()
        .map(|edge| max_weight / edge.weight)
        .collect::<Vec<_>>();
    let epochs_per_negative = epochs_per_sample
        .iter()
        .map(|value| value / NEGATIVE_SAMPLE_RATE as f64)
        .collect::<Vec<_>>();
    let mut next_sample = epochs_per_sample.clone();
    let mut next_negative = epochs_per_negative.clone();

    for epoch in 0..epochs {
        let alpha = INITIAL_ALPHA * (1.0 - epoch as f64 / epochs as f64);
        let now = epoch as f64;

        for (index, edge) in active.iter().enumerate() {
            if next_sample[index] > now {
                continue;
            }

            let head = edge.head;
            let tail = edge.tail;
            let mut current = embedding[head];
            let mut other = embedding[tail];
            let dist_sq = squared_distance(current, other);
            if dist_sq > 0.0 {
                let coefficient = -2.0 * a * b * dist_sq.powf(b - 1.0) / (a * dist_sq.powf(b) + 1.0);
                for axis in 0..2 {
                    let grad = clip(coefficient * (current[axis] - other[axis]));
                    current[axis] += grad * alpha;
                    other[axis] -= grad * alpha;
                }
            }
            embedding[head] = current;
            embedding[tail] = other;
            next_sample[index] += epochs_per_sample[index];

            let negatives =
                ((now - next_negative[index]) / epochs_per_negative[index]).max(0.0) as usize;
            for _ in 0..negatives {
                let sample = rng.gen_range(0..n);
                if sample == head {
                    continue;
                }
                let other = embedding[sample];
                let dist_sq = squared_distance(current, other);
                let coefficient = if dist_sq > 0.0 {
                    2.0 * REPULSION_STRENGTH * b / ((0.001 + dist_sq) * (a * dist_sq.powf(b) + 1.0))
                } else {
                    0.0
                };
                for axis in 0..2 {
                    let grad = if coefficient > 0.0 {
                        clip(coefficient * (current[axis] - other[axis]))
                    } else {
                        GRADIENT_CLIP
                    };
                    current[axis] += grad * alpha;
                }
            }
            embedding[head] = current;
            next_negative[index] += negatives as f64 * epochs_per_negative[index];
        }
    }
}
