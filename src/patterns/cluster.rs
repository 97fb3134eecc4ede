//! Feature standardization and k-means clustering
//!
//! Small, seeded building blocks for the pattern miner: a fit-once
//! standardizer and Lloyd's algorithm with random init. The rng is
//! injected so clustering stays reproducible under a fixed seed.

use rand::seq::index::sample;
use rand::Rng;
use serde::{Deserialize, Serialize};

const MAX_ITERATIONS: usize = 50;

/// Per-feature z-score scaler, fitted on the first batch it sees
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Standardizer {
    means: Vec<f32>,
    stds: Vec<f32>,
}

impl Standardizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        !self.means.is_empty()
    }

    /// Fit on the first call, transform on every call
    pub fn fit_transform(&mut self, data: &[Vec<f32>]) -> Vec<Vec<f32>> {
        if !self.is_fitted() {
            self.fit(data);
        }
        data.iter().map(|row| self.transform_row(row)).collect()
    }

    fn fit(&mut self, data: &[Vec<f32>]) {
        if data.is_empty() {
            return;
        }
        let dims = data[0].len();
        let n = data.len() as f32;

        self.means = (0..dims)
            .map(|d| data.iter().map(|row| row[d]).sum::<f32>() / n)
            .collect();
        self.stds = (0..dims)
            .map(|d| {
                let mean = self.means[d];
                let var = data.iter().map(|row| (row[d] - mean).powi(2)).sum::<f32>() / n;
                var.sqrt()
            })
            .collect();
    }

    fn transform_row(&self, row: &[f32]) -> Vec<f32> {
        row.iter()
            .zip(self.means.iter().zip(self.stds.iter()))
            .map(|(v, (mean, std))| {
                // Zero-variance features pass through centered
                if *std > 1e-6 {
                    (v - mean) / std
                } else {
                    v - mean
                }
            })
            .collect()
    }
}

/// Partition `data` into `k` clusters; returns one label per row
///
/// Centroids initialize from k distinct sampled rows. An emptied
/// cluster is reseeded onto a random row.
pub fn kmeans(data: &[Vec<f32>], k: usize, rng: &mut impl Rng) -> Vec<usize> {
    assert!(k >= 1 && k <= data.len());
    let dims = data[0].len();

    let mut centroids: Vec<Vec<f32>> = sample(rng, data.len(), k)
        .into_iter()
        .map(|i| data[i].clone())
        .collect();
    let mut labels = vec![0usize; data.len()];

    for _ in 0..MAX_ITERATIONS {
        let mut changed = false;
        for (i, row) in data.iter().enumerate() {
            let nearest = nearest_centroid(row, &centroids);
            if labels[i] != nearest {
                labels[i] = nearest;
                changed = true;
            }
        }

        // Recompute centroids
        let mut sums = vec![vec![0.0f32; dims]; k];
        let mut counts = vec![0usize; k];
        for (row, &label) in data.iter().zip(labels.iter()) {
            counts[label] += 1;
            for (d, v) in row.iter().enumerate() {
                sums[label][d] += v;
            }
        }
        for c in 0..k {
            if counts[c] == 0 {
                centroids[c] = data[rng.gen_range(0..data.len())].clone();
                changed = true;
            } else {
                for d in 0..dims {
                    centroids[c][d] = sums[c][d] / counts[c] as f32;
                }
            }
        }

        if !changed {
            break;
        }
    }

    labels
}

fn nearest_centroid(row: &[f32], centroids: &[Vec<f32>]) -> usize {
    let mut best = 0;
    let mut best_dist = f32::INFINITY;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist: f32 = row
            .iter()
            .zip(centroid.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum();
        if dist < best_dist {
            best_dist = dist;
            best = c;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_standardizer_zero_mean_unit_variance() {
        let mut scaler = Standardizer::new();
        let data = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaled = scaler.fit_transform(&data);

        for d in 0..2 {
            let mean: f32 = scaled.iter().map(|r| r[d]).sum::<f32>() / 3.0;
            assert!(mean.abs() < 1e-5);
        }
        // Middle row sits at the mean
        assert!(scaled[1][0].abs() < 1e-5);
    }

    #[test]
    fn test_standardizer_fits_only_once() {
        let mut scaler = Standardizer::new();
        scaler.fit_transform(&[vec![0.0], vec![10.0]]);
        // Second batch uses the first batch's statistics
        let out = scaler.fit_transform(&[vec![5.0]]);
        assert!(out[0][0].abs() < 1e-5);
    }

    #[test]
    fn test_standardizer_zero_variance_feature() {
        let mut scaler = Standardizer::new();
        let out = scaler.fit_transform(&[vec![3.0], vec![3.0], vec![3.0]]);
        for row in out {
            assert!(row[0].abs() < 1e-6);
        }
    }

    #[test]
    fn test_kmeans_separates_obvious_clusters() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut data = Vec::new();
        for i in 0..5 {
            data.push(vec![0.0 + i as f32 * 0.01, 0.0]);
        }
        for i in 0..5 {
            data.push(vec![10.0 + i as f32 * 0.01, 10.0]);
        }

        let labels = kmeans(&data, 2, &mut rng);
        // All of the first group share a label, all of the second share
        // the other
        assert!(labels[..5].iter().all(|l| *l == labels[0]));
        assert!(labels[5..].iter().all(|l| *l == labels[5]));
        assert_ne!(labels[0], labels[5]);
    }

    #[test]
    fn test_kmeans_label_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let data: Vec<Vec<f32>> = (0..20).map(|i| vec![i as f32, (i * 3 % 7) as f32]).collect();
        let labels = kmeans(&data, 4, &mut rng);
        assert_eq!(labels.len(), 20);
        assert!(labels.iter().all(|l| *l < 4));
    }
}
