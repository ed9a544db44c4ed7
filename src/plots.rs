//! Notebook-style helpers that feed samples, clusters and losses to a [`Renderer`].

use log::info;
use ndarray::{ArrayBase, ArrayView2, Axis, Data, Ix1, Ix2};

use crate::error::{Error, Result};
use crate::partition::partition;
use crate::render::Renderer;

pub const DEFAULT_SCATTER_TITLE: &str = "2D samples";

/// Parameters shared by the plotting helpers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotConfig {
    /// Size of the class-identifier range `[0, num_classes)`.
    pub num_classes: usize,
    /// Maximum number of images drawn per grid.
    pub num_images: usize,
    /// Pixel value drawn as full ink.
    pub max_intensity: f32,
}

impl Default for PlotConfig {
    fn default() -> Self {
        PlotConfig {
            num_classes: 10,
            num_images: 20,
            max_intensity: 16.0,
        }
    }
}

impl PlotConfig {
    pub fn with_num_classes(mut self, num_classes: usize) -> Self {
        self.num_classes = num_classes;
        self
    }

    pub fn with_num_images(mut self, num_images: usize) -> Self {
        self.num_images = num_images;
        self
    }

    pub fn with_max_intensity(mut self, max_intensity: f32) -> Self {
        self.max_intensity = max_intensity;
        self
    }
}

/// Draws the first `cfg.num_images` rows of `images`.
pub fn plot_images<R, S>(
    renderer: &mut R,
    images: &ArrayBase<S, Ix2>,
    cfg: &PlotConfig,
) -> Result<()>
where
    R: Renderer + ?Sized,
    S: Data<Elem = f32>,
{
    renderer.show_image_grid(images.view(), cfg.num_images, cfg.max_intensity)
}

/// Draws one image grid per cluster, in cluster order.
pub fn plot_clusters<R, S, L>(
    renderer: &mut R,
    samples: &ArrayBase<S, Ix2>,
    labels: &ArrayBase<L, Ix1>,
    cfg: &PlotConfig,
) -> Result<()>
where
    R: Renderer + ?Sized,
    S: Data<Elem = f32>,
    L: Data<Elem = usize>,
{
    let groups = partition(samples, labels, cfg.num_classes)?;
    for (i, group) in groups.iter().enumerate() {
        info!("cluster {}: {:?}", i, group.dim());
        if group.is_empty() {
            continue;
        }
        plot_images(renderer, group, cfg)?;
    }
    Ok(())
}

/// Draws the centroid rows picked by `order` as a single image grid.
///
/// `None` draws every centroid in index order.
pub fn plot_centroids<R, S>(
    renderer: &mut R,
    centroids: &ArrayBase<S, Ix2>,
    order: Option<&[usize]>,
    cfg: &PlotConfig,
) -> Result<()>
where
    R: Renderer + ?Sized,
    S: Data<Elem = f32>,
{
    let available = centroids.len_of(Axis(0));
    let images = match order {
        Some(order) => {
            if let Some(&index) = order.iter().find(|&&i| i >= available) {
                return Err(Error::CentroidOutOfRange { index, available });
            }
            centroids.select(Axis(0), order)
        }
        None => centroids.to_owned(),
    };
    plot_images(renderer, &images, cfg)
}

/// Scatters 2D samples with one marker per label.
///
/// Every class in `[0, cfg.num_classes)` is forwarded, empty or not, so a
/// class keeps the same marker and legend entry across calls.
pub fn plot_2d_samples<R, S, L>(
    renderer: &mut R,
    samples: &ArrayBase<S, Ix2>,
    labels: &ArrayBase<L, Ix1>,
    title: &str,
    cfg: &PlotConfig,
) -> Result<()>
where
    R: Renderer + ?Sized,
    S: Data<Elem = f32>,
    L: Data<Elem = usize>,
{
    let cols = samples.len_of(Axis(1));
    if cols != 2 {
        return Err(Error::SampleWidth {
            expected: 2,
            found: cols,
        });
    }
    let groups = partition(samples, labels, cfg.num_classes)?;
    let views: Vec<ArrayView2<f32>> = groups.iter().map(|g| g.view()).collect();
    renderer.show_scatter(&views, title)
}

pub fn plot_loss<R: Renderer + ?Sized>(renderer: &mut R, loss: &[f32]) -> Result<()> {
    renderer.show_loss_curve(loss)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[derive(Debug, PartialEq)]
    enum Call {
        Grid {
            rows: Array2<f32>,
            max_count: usize,
            max_intensity: f32,
        },
        Scatter {
            groups: Vec<Array2<f32>>,
            title: String,
        },
        Loss(Vec<f32>),
    }

    #[derive(Default)]
    struct Recorder {
        calls: Vec<Call>,
    }

    impl Renderer for Recorder {
        fn show_image_grid(
            &mut self,
            rows: ArrayView2<f32>,
            max_count: usize,
            max_intensity: f32,
        ) -> Result<()> {
            self.calls.push(Call::Grid {
                rows: rows.to_owned(),
                max_count,
                max_intensity,
            });
            Ok(())
        }

        fn show_scatter(&mut self, groups: &[ArrayView2<f32>], title: &str) -> Result<()> {
            self.calls.push(Call::Scatter {
                groups: groups.iter().map(|g| g.to_owned()).collect(),
                title: title.to_string(),
            });
            Ok(())
        }

        fn show_loss_curve(&mut self, values: &[f32]) -> Result<()> {
            self.calls.push(Call::Loss(values.to_vec()));
            Ok(())
        }
    }

    #[test]
    fn test_plot_images_uses_config() {
        let mut r = Recorder::default();
        let images = Array2::<f32>::zeros((3, 64));
        let cfg = PlotConfig::default().with_num_images(2).with_max_intensity(8.0);
        plot_images(&mut r, &images, &cfg).unwrap();
        assert_eq!(
            r.calls,
            vec![Call::Grid {
                rows: images,
                max_count: 2,
                max_intensity: 8.0
            }]
        );
    }

    #[test]
    fn test_plot_clusters_skips_empty_buckets() {
        let mut r = Recorder::default();
        let samples = array![
            [1.0f32, 1.0, 1.0, 1.0],
            [2.0, 2.0, 2.0, 2.0],
            [3.0, 3.0, 3.0, 3.0]
        ];
        let labels = array![2usize, 0, 2];
        let cfg = PlotConfig::default().with_num_classes(3);
        plot_clusters(&mut r, &samples, &labels, &cfg).unwrap();
        assert_eq!(r.calls.len(), 2);
        match &r.calls[1] {
            Call::Grid { rows, .. } => {
                assert_eq!(rows, &array![[1.0f32, 1.0, 1.0, 1.0], [3.0, 3.0, 3.0, 3.0]])
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_plot_clusters_propagates_partition_errors() {
        let mut r = Recorder::default();
        let samples = Array2::<f32>::zeros((2, 4));
        let labels = array![0usize, 10];
        let err = plot_clusters(&mut r, &samples, &labels, &PlotConfig::default()).unwrap_err();
        assert!(matches!(err, Error::LabelOutOfRange { index: 1, .. }));
        assert!(r.calls.is_empty());
    }

    #[test]
    fn test_plot_centroids_in_order() {
        let mut r = Recorder::default();
        let centroids = array![[0.0f32], [1.0], [2.0]];
        plot_centroids(&mut r, &centroids, Some(&[2, 0]), &PlotConfig::default()).unwrap();
        match &r.calls[0] {
            Call::Grid { rows, .. } => assert_eq!(rows, &array![[2.0f32], [0.0]]),
            other => panic!("unexpected call {:?}", other),
        }

        let err =
            plot_centroids(&mut r, &centroids, Some(&[3]), &PlotConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            Error::CentroidOutOfRange {
                index: 3,
                available: 3
            }
        ));
    }

    #[test]
    fn test_plot_2d_samples_keeps_every_class() {
        let mut r = Recorder::default();
        let samples = array![[0.0f32, 0.0], [1.0, 1.0]];
        let labels = array![2usize, 2];
        let cfg = PlotConfig::default().with_num_classes(4);
        plot_2d_samples(&mut r, &samples, &labels, DEFAULT_SCATTER_TITLE, &cfg).unwrap();
        match &r.calls[0] {
            Call::Scatter { groups, title } => {
                assert_eq!(title, "2D samples");
                assert_eq!(groups.len(), 4);
                assert_eq!(groups[2], samples);
                assert!(groups[0].is_empty() && groups[3].is_empty());
            }
            other => panic!("unexpected call {:?}", other),
        }
    }

    #[test]
    fn test_plot_2d_samples_rejects_images() {
        let mut r = Recorder::default();
        let samples = Array2::<f32>::zeros((1, 64));
        let labels = array![0usize];
        assert!(matches!(
            plot_2d_samples(&mut r, &samples, &labels, "t", &PlotConfig::default()),
            Err(Error::SampleWidth {
                expected: 2,
                found: 64
            })
        ));
    }

    #[test]
    fn test_plot_loss_forwards_values() {
        let mut r = Recorder::default();
        plot_loss(&mut r, &[0.5, 0.25]).unwrap();
        assert_eq!(r.calls, vec![Call::Loss(vec![0.5, 0.25])]);
    }
}
