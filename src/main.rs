use std::path::Path;

use anyhow::Context;
use digitviz::{
    class_counts, plot_2d_samples, plot_centroids, plot_clusters, plot_loss, KMeans, PlotConfig,
    SvgRenderer, DEFAULT_SCATTER_TITLE,
};
use ndarray::{Array1, Array2, Axis};
use ndarray_rand::RandomExt;
use rand::distributions::Uniform;
use rand::prelude::*;
use rand_distr::Normal;

/// Builds `n_samples` noisy copies of `n_classes` random 8x8 prototypes.
fn generate_digits(
    rng: &mut StdRng,
    n_samples: usize,
    n_classes: usize,
    max_intensity: f32,
) -> anyhow::Result<(Array2<f32>, Array1<usize>)> {
    let prototypes =
        Array2::random_using((n_classes, 64), Uniform::new(0.0f32, max_intensity), rng);
    let noise = Normal::new(0.0f32, 2.0)?;
    let labels: Array1<usize> = (0..n_samples)
        .map(|_| rng.gen_range(0..n_classes))
        .collect();

    let mut data = Array2::<f32>::zeros((n_samples, 64));
    for (mut row, &label) in data.axis_iter_mut(Axis(0)).zip(labels.iter()) {
        row.assign(&prototypes.row(label));
        row.mapv_inplace(|v| (v + noise.sample(rng)).clamp(0.0, max_intensity));
    }
    Ok((data, labels))
}

/// Draws 2D points around `n_classes` random centers.
fn generate_blobs(
    rng: &mut StdRng,
    n_samples: usize,
    n_classes: usize,
) -> anyhow::Result<(Array2<f32>, Array1<usize>)> {
    let center_distribution = Normal::new(0.0f32, 10.0)?;
    let centers = Array2::random_using((n_classes, 2), center_distribution, rng);
    let spread = Normal::new(0.0f32, 1.0)?;

    let labels: Array1<usize> = (0..n_samples)
        .map(|_| rng.gen_range(0..n_classes))
        .collect();
    let mut points = Array2::<f32>::zeros((n_samples, 2));
    for (mut row, &label) in points.axis_iter_mut(Axis(0)).zip(labels.iter()) {
        for (p, &c) in row.iter_mut().zip(centers.row(label).iter()) {
            *p = c + spread.sample(rng);
        }
    }
    Ok((points, labels))
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Parameters for data generation
    let n_samples = 500; // Number of images
    let n_blob_samples = 300; // Number of 2D points
    let n_classes = 10; // Number of digit classes
    let n_iters = 25; // Number of iterations for K-Means
    let seed = 42;
    let out_dir = Path::new("plots");

    let cfg = PlotConfig::default()
        .with_num_classes(n_classes)
        .with_num_images(12);
    let mut rng = StdRng::seed_from_u64(seed);

    log::info!("generating {} digit images in {} classes", n_samples, n_classes);
    let (digits, truth) = generate_digits(&mut rng, n_samples, n_classes, cfg.max_intensity)?;
    log::info!("class counts: {:?}", class_counts(&truth, n_classes)?);

    let mut renderer = SvgRenderer::new();

    log::info!("starting K-Means clustering");
    let fit = KMeans::new(n_classes, n_iters)
        .with_seed(seed)
        .fit_predict(&digits)
        .context("clustering digit images")?;
    log::info!("clustering completed");

    plot_clusters(&mut renderer, &digits, &fit.labels, &cfg)?;
    plot_centroids(&mut renderer, &fit.centroids, None, &cfg)?;

    let (points, groups) = generate_blobs(&mut rng, n_blob_samples, n_classes)?;
    plot_2d_samples(&mut renderer, &points, &groups, DEFAULT_SCATTER_TITLE, &cfg)?;

    plot_loss(&mut renderer, &fit.inertia)?;

    let paths = renderer
        .save(out_dir)
        .with_context(|| format!("writing figures to {}", out_dir.display()))?;
    for path in paths {
        println!("{}", path.display());
    }
    Ok(())
}
