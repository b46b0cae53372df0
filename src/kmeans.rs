//! K-means clustering (Lloyd's algorithm, k-means++ seeding).
//!
//! Fits are deterministic for a given seed: the same points, `n_clusters`,
//! `n_init` and `seed` always produce the same labels. Degenerate inputs
//! (fewer points than clusters, coincident points, constant columns) are
//! accepted; some clusters may end up empty.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct KMeans {
    pub n_clusters: usize,
    /// Independent seeded restarts; the lowest-inertia run is kept.
    pub n_init: usize,
    pub max_iter: usize,
    /// Relative to the mean per-feature variance of the input.
    pub tol: f64,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            n_clusters: 4,
            n_init: 10,
            max_iter: 300,
            tol: 1e-4,
            seed: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct KMeansFit<const D: usize> {
    /// One label per input point, each in `0..n_clusters`.
    pub labels: Vec<usize>,
    pub centroids: Vec<[f64; D]>,
    /// Sum of squared distances to the assigned centroid.
    pub inertia: f64,
    pub n_iter: usize,
}

impl KMeans {
    pub fn new(n_clusters: usize) -> Self {
        Self {
            n_clusters,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn fit<const D: usize>(&self, points: &[[f64; D]]) -> KMeansFit<D> {
        let k = self.n_clusters.max(1);
        if points.is_empty() {
            return KMeansFit {
                labels: Vec::new(),
                centroids: Vec::new(),
                inertia: 0.0,
                n_iter: 0,
            };
        }

        let tol = self.tol * mean_variance(points);
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut best: Option<KMeansFit<D>> = None;
        for _ in 0..self.n_init.max(1) {
            let init = kmeans_plusplus(points, k, &mut rng);
            let run = lloyd(points, init, self.max_iter.max(1), tol);
            if best.as_ref().map_or(true, |b| run.inertia < b.inertia) {
                best = Some(run);
            }
        }
        // n_init >= 1 guarantees at least one run
        best.unwrap_or_else(|| lloyd(points, kmeans_plusplus(points, k, &mut rng), 1, tol))
    }
}

fn lloyd<const D: usize>(
    points: &[[f64; D]],
    mut centroids: Vec<[f64; D]>,
    max_iter: usize,
    tol: f64,
) -> KMeansFit<D> {
    let mut n_iter = 0;
    for _ in 0..max_iter {
        n_iter += 1;
        let labels = assign(points, &centroids);
        let updated = update_centroids(points, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(a, b)| squared_dist(a, b))
            .sum();
        centroids = updated;
        if shift <= tol {
            break;
        }
    }

    let labels = assign(points, &centroids);
    let inertia = points
        .iter()
        .zip(&labels)
        .map(|(p, &c)| squared_dist(p, &centroids[c]))
        .sum();
    KMeansFit {
        labels,
        centroids,
        inertia,
        n_iter,
    }
}

/// Seeds `k` centroids, each drawn with probability proportional to the
/// squared distance from the centroids chosen so far.
fn kmeans_plusplus<const D: usize>(points: &[[f64; D]], k: usize, rng: &mut StdRng) -> Vec<[f64; D]> {
    let n = points.len();
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.gen_range(0..n)]);

    let mut min_dists: Vec<f64> = points
        .iter()
        .map(|p| squared_dist(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = min_dists.iter().sum();
        let chosen = if total <= f64::EPSILON {
            // every point already coincides with a centroid
            rng.gen_range(0..n)
        } else {
            let threshold = rng.gen::<f64>() * total;
            let mut cumulative = 0.0;
            let mut pick = None;
            for (i, d) in min_dists.iter().enumerate() {
                if *d <= 0.0 {
                    continue;
                }
                cumulative += d;
                pick = Some(i);
                if cumulative > threshold {
                    break;
                }
            }
            pick.unwrap_or(0)
        };

        let c = points[chosen];
        for (d, p) in min_dists.iter_mut().zip(points) {
            *d = d.min(squared_dist(p, &c));
        }
        centroids.push(c);
    }
    centroids
}

/// Nearest centroid per point; ties go to the lower index.
fn assign<const D: usize>(points: &[[f64; D]], centroids: &[[f64; D]]) -> Vec<usize> {
    points
        .iter()
        .map(|p| {
            let mut best = 0;
            let mut best_dist = f64::INFINITY;
            for (c, centroid) in centroids.iter().enumerate() {
                let d = squared_dist(p, centroid);
                if d < best_dist {
                    best_dist = d;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Mean of assigned points; an empty cluster keeps its previous centroid.
fn update_centroids<const D: usize>(
    points: &[[f64; D]],
    labels: &[usize],
    previous: &[[f64; D]],
) -> Vec<[f64; D]> {
    let mut sums = vec![[0.0f64; D]; previous.len()];
    let mut counts = vec![0usize; previous.len()];
    for (p, &c) in points.iter().zip(labels) {
        counts[c] += 1;
        for (s, v) in sums[c].iter_mut().zip(p) {
            *s += v;
        }
    }
    sums.into_iter()
        .zip(counts)
        .zip(previous)
        .map(|((mut sum, count), prev)| {
            if count == 0 {
                return *prev;
            }
            for s in &mut sum {
                *s /= count as f64;
            }
            sum
        })
        .collect()
}

fn mean_variance<const D: usize>(points: &[[f64; D]]) -> f64 {
    if D == 0 || points.is_empty() {
        return 0.0;
    }
    let n = points.len() as f64;
    let mut total = 0.0;
    for j in 0..D {
        let mean = points.iter().map(|p| p[j]).sum::<f64>() / n;
        total += points.iter().map(|p| (p[j] - mean).powi(2)).sum::<f64>() / n;
    }
    total / D as f64
}

fn squared_dist<const D: usize>(a: &[f64; D], b: &[f64; D]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<[f64; 3]> {
        let centers = [[0.0, 0.0, 0.0], [50.0, 0.0, 0.0], [0.0, 50.0, 0.0], [0.0, 0.0, 50.0]];
        let mut out = Vec::new();
        for c in centers {
            for i in 0..10 {
                let jitter = i as f64 * 0.1;
                out.push([c[0] + jitter, c[1] - jitter, c[2] + jitter / 2.0]);
            }
        }
        out
    }

    #[test]
    fn empty_input_returns_empty() {
        let fit = KMeans::default().fit::<3>(&[]);
        assert!(fit.labels.is_empty());
        assert_eq!(fit.inertia, 0.0);
    }

    #[test]
    fn separates_well_spaced_blobs() {
        let points = blobs();
        let fit = KMeans::default().fit(&points);
        assert_eq!(fit.labels.len(), 40);
        for blob in fit.labels.chunks(10) {
            assert!(blob.iter().all(|l| *l == blob[0]), "blob split: {:?}", blob);
        }
        let mut firsts: Vec<usize> = fit.labels.chunks(10).map(|b| b[0]).collect();
        firsts.sort();
        firsts.dedup();
        assert_eq!(firsts.len(), 4);
    }

    #[test]
    fn same_seed_same_labels() {
        let points = blobs();
        let a = KMeans::default().fit(&points);
        let b = KMeans::default().fit(&points);
        assert_eq!(a, b);
    }

    #[test]
    fn fewer_points_than_clusters() {
        let points = [[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let fit = KMeans::new(4).fit(&points);
        assert_eq!(fit.labels.len(), 2);
        assert!(fit.labels.iter().all(|l| *l < 4));
        assert_ne!(fit.labels[0], fit.labels[1]);
        assert!(fit.inertia.abs() < 1e-12);
    }

    #[test]
    fn coincident_points_collapse_to_one_label() {
        let points = vec![[2.5, 2.5, 2.5]; 12];
        let fit = KMeans::new(4).fit(&points);
        assert_eq!(fit.labels.len(), 12);
        assert!(fit.labels.iter().all(|l| *l == fit.labels[0]));
        assert!(fit.labels[0] < 4);
    }

    #[test]
    fn zero_clusters_treated_as_one() {
        let points = [[1.0], [2.0], [3.0]];
        let fit = KMeans::new(0).fit(&points);
        assert_eq!(fit.labels, vec![0, 0, 0]);
        assert_eq!(fit.centroids, vec![[2.0]]);
    }
}
