//! Helpers for inspecting clustering results on small image datasets.
//!
//! Samples are partitioned by label with [`partition`], clustered with
//! [`KMeans`], and drawn through any [`Renderer`] such as [`SvgRenderer`].

pub mod error;
pub mod kmeans;
pub mod partition;
pub mod plots;
pub mod render;

pub use error::{Error, Result};
pub use kmeans::{DistanceMetric, KMeans, KMeansFit};
pub use partition::{class_counts, partition, partition_rows};
pub use plots::{
    plot_2d_samples, plot_centroids, plot_clusters, plot_images, plot_loss, PlotConfig,
    DEFAULT_SCATTER_TITLE,
};
pub use render::{Figure, RenderConfig, Renderer, SvgRenderer};
