//! Plain K-Means, the source of the cluster labels and centroids fed to the plots.

use log::debug;
use ndarray::{Array1, Array2, ArrayBase, Axis, Data, Ix1, Ix2};
use rand::prelude::*;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::error::{Error, Result};

/// Enum representing the distance metric to be used.
#[derive(Clone, Debug, Default)]
pub enum DistanceMetric {
    /// Squared Euclidean distance.
    #[default]
    Euclidean,
}

/// Output of a K-Means run.
#[derive(Clone, Debug)]
pub struct KMeansFit {
    /// Cluster centroids, one row per cluster.
    pub centroids: Array2<f32>,
    /// Index of the closest final centroid for each sample.
    pub labels: Array1<usize>,
    /// Sum of squared distances to the assigned centroid, per iteration.
    pub inertia: Vec<f32>,
}

/// Standard K-Means clustering algorithm.
#[derive(Clone, Debug)]
pub struct KMeans {
    pub n_clusters: usize,
    pub n_iters: usize,
    pub metric: DistanceMetric,
    pub seed: Option<u64>,
}

impl KMeans {
    /// Creates a new KMeans instance with the given number of clusters and iterations.
    pub fn new(n_clusters: usize, n_iters: usize) -> Self {
        KMeans {
            n_clusters,
            n_iters,
            metric: DistanceMetric::Euclidean,
            seed: None,
        }
    }

    /// Makes centroid initialization reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fits the model to the data and returns centroids, labels and the inertia history.
    pub fn fit_predict<S>(&self, x: &ArrayBase<S, Ix2>) -> Result<KMeansFit>
    where
        S: Data<Elem = f32> + Sync,
    {
        let n_samples = x.len_of(Axis(0));
        let n_features = x.len_of(Axis(1));
        if self.n_clusters == 0 || self.n_clusters > n_samples {
            return Err(Error::InvalidClusterCount {
                n_clusters: self.n_clusters,
                n_samples,
            });
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        // Initialize centroids from distinct random samples.
        let indices: Vec<usize> = (0..n_samples).choose_multiple(&mut rng, self.n_clusters);
        let mut centroids = x.select(Axis(0), &indices);

        let mut inertia = Vec::with_capacity(self.n_iters);

        for iter in 0..self.n_iters {
            let (labels, distances) = self.assign_labels(x, &centroids);
            let total = distances.sum();
            debug!("kmeans iteration {}: inertia {}", iter, total);
            inertia.push(total);

            // Recompute centroids; empty clusters keep their previous position.
            let mut sums = Array2::<f32>::zeros((self.n_clusters, n_features));
            let mut counts = vec![0usize; self.n_clusters];
            x.axis_iter(Axis(0))
                .zip(labels.iter())
                .for_each(|(row, &label)| {
                    sums.row_mut(label).zip_mut_with(&row, |a, &b| *a += b);
                    counts[label] += 1;
                });
            sums.axis_iter(Axis(0))
                .zip(centroids.axis_iter_mut(Axis(0)))
                .zip(counts.iter())
                .for_each(|((sum, mut c), &count)| {
                    if count > 0 {
                        c.assign(&sum.mapv(|v| v / count as f32));
                    }
                });
        }

        // Labels always refer to the returned centroids.
        let (labels, _) = self.assign_labels(x, &centroids);

        Ok(KMeansFit {
            centroids,
            labels,
            inertia,
        })
    }

    /// Predicts the closest cluster each sample in `x` belongs to.
    pub fn predict<S1, S2>(
        &self,
        x: &ArrayBase<S1, Ix2>,
        centroids: &ArrayBase<S2, Ix2>,
    ) -> Result<Array1<usize>>
    where
        S1: Data<Elem = f32> + Sync,
        S2: Data<Elem = f32> + Sync,
    {
        let data = x.len_of(Axis(1));
        let dims = centroids.len_of(Axis(1));
        if data != dims {
            return Err(Error::DimensionMismatch {
                data,
                centroids: dims,
            });
        }
        if centroids.len_of(Axis(0)) == 0 {
            return Err(Error::InvalidClusterCount {
                n_clusters: 0,
                n_samples: x.len_of(Axis(0)),
            });
        }
        Ok(self.assign_labels(x, centroids).0)
    }

    /// Assigns labels to each sample based on the closest centroid.
    fn assign_labels<S1, S2>(
        &self,
        x: &ArrayBase<S1, Ix2>,
        centroids: &ArrayBase<S2, Ix2>,
    ) -> (Array1<usize>, Array1<f32>)
    where
        S1: Data<Elem = f32> + Sync,
        S2: Data<Elem = f32> + Sync,
    {
        let n_samples = x.len_of(Axis(0));
        let n_centroids = centroids.len_of(Axis(0));
        let (labels, distances): (Vec<usize>, Vec<f32>) = (0..n_samples)
            .into_par_iter()
            .map(|i| {
                let row = x.row(i);
                let mut min_dist = f32::INFINITY;
                let mut min_j = 0;
                for j in 0..n_centroids {
                    let dist = self.compute_distance(&row, &centroids.row(j));
                    if dist < min_dist {
                        min_dist = dist;
                        min_j = j;
                    }
                }
                (min_j, min_dist)
            })
            .unzip();

        (Array1::from(labels), Array1::from(distances))
    }

    /// Computes the distance between two points based on the selected metric.
    fn compute_distance<S1, S2>(&self, x: &ArrayBase<S1, Ix1>, y: &ArrayBase<S2, Ix1>) -> f32
    where
        S1: Data<Elem = f32>,
        S2: Data<Elem = f32>,
    {
        match self.metric {
            DistanceMetric::Euclidean => x
                .iter()
                .zip(y.iter())
                .map(|(a, b)| (a - b) * (a - b))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn two_blobs() -> Array2<f32> {
        array![
            [0.0, 0.0],
            [0.1, 0.0],
            [0.0, 0.1],
            [10.0, 10.0],
            [10.1, 10.0],
            [10.0, 10.1],
        ]
    }

    #[test]
    fn test_kmeans_separates_blobs() {
        let x = two_blobs();
        let fit = KMeans::new(2, 10).with_seed(7).fit_predict(&x).unwrap();
        assert_eq!(fit.labels[0], fit.labels[1]);
        assert_eq!(fit.labels[0], fit.labels[2]);
        assert_eq!(fit.labels[3], fit.labels[4]);
        assert_ne!(fit.labels[0], fit.labels[3]);

        let low = fit.labels[0];
        assert_abs_diff_eq!(fit.centroids[[low, 0]], 0.1 / 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(fit.centroids[[low, 1]], 0.1 / 3.0, epsilon = 1e-5);
    }

    #[test]
    fn test_kmeans_inertia_is_non_increasing() {
        let x = two_blobs();
        let fit = KMeans::new(2, 8).with_seed(3).fit_predict(&x).unwrap();
        assert_eq!(fit.inertia.len(), 8);
        for pair in fit.inertia.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-4);
        }
    }

    #[test]
    fn test_kmeans_seed_is_reproducible() {
        let x = two_blobs();
        let a = KMeans::new(3, 5).with_seed(11).fit_predict(&x).unwrap();
        let b = KMeans::new(3, 5).with_seed(11).fit_predict(&x).unwrap();
        assert_eq!(a.labels, b.labels);
        assert_eq!(a.centroids, b.centroids);
    }

    #[test]
    fn test_kmeans_rejects_bad_cluster_count() {
        let x = two_blobs();
        assert!(matches!(
            KMeans::new(0, 5).fit_predict(&x),
            Err(Error::InvalidClusterCount { .. })
        ));
        assert!(matches!(
            KMeans::new(7, 5).fit_predict(&x),
            Err(Error::InvalidClusterCount {
                n_clusters: 7,
                n_samples: 6
            })
        ));
    }

    #[test]
    fn test_kmeans_labels_match_final_centroids() {
        let x = array![[0.0f32], [1.0], [2.0], [3.0], [10.0], [11.0]];
        for n_iters in [1, 2, 5] {
            let model = KMeans::new(2, n_iters).with_seed(5);
            let fit = model.fit_predict(&x).unwrap();
            assert_eq!(fit.labels, model.predict(&x, &fit.centroids).unwrap());
        }
    }

    #[test]
    fn test_kmeans_zero_iterations_assigns_to_initial_centroids() {
        let x = two_blobs();
        let model = KMeans::new(2, 0).with_seed(1);
        let fit = model.fit_predict(&x).unwrap();
        assert!(fit.inertia.is_empty());
        assert_eq!(fit.centroids.dim(), (2, 2));
        for centroid in fit.centroids.outer_iter() {
            assert!(x.outer_iter().any(|row| row == centroid));
        }
        assert_eq!(fit.labels, model.predict(&x, &fit.centroids).unwrap());
    }

    #[test]
    fn test_predict_dimension_mismatch() {
        let x = two_blobs();
        let centroids = array![[0.0f32, 0.0, 0.0]];
        assert!(matches!(
            KMeans::new(1, 1).predict(&x, &centroids),
            Err(Error::DimensionMismatch {
                data: 2,
                centroids: 3
            })
        ));
    }

    #[test]
    fn test_predict_nearest_centroid() {
        let x = two_blobs();
        let centroids = array![[10.0f32, 10.0], [0.0, 0.0]];
        let labels = KMeans::new(2, 1).predict(&x, &centroids).unwrap();
        assert_eq!(labels, array![1usize, 1, 1, 0, 0, 0]);
    }
}
