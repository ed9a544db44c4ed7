use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

/// Errors produced while partitioning, clustering or rendering samples.
#[derive(Error, Debug)]
pub enum Error {
    #[error("shape mismatch: {samples} samples but {labels} labels")]
    ShapeMismatch { samples: usize, labels: usize },

    #[error("label {label} at row {index} is outside the class range [0, {num_classes})")]
    LabelOutOfRange {
        index: usize,
        label: usize,
        num_classes: usize,
    },

    #[error("class range is empty: num_classes must be positive")]
    EmptyClassRange,

    #[error("row of length {len} cannot be reshaped into a square image")]
    NotSquare { len: usize },

    #[error("max intensity must be positive, got {0}")]
    InvalidIntensity(f32),

    #[error("samples have {found} features, expected {expected}")]
    SampleWidth { expected: usize, found: usize },

    #[error("scatter group {class} has {cols} columns, expected 2")]
    NotTwoDimensional { class: usize, cols: usize },

    #[error("centroid {index} requested but only {available} available")]
    CentroidOutOfRange { index: usize, available: usize },

    #[error("cannot fit {n_clusters} clusters to {n_samples} samples")]
    InvalidClusterCount { n_clusters: usize, n_samples: usize },

    #[error("dimension mismatch: data has {data} features, centroids have {centroids}")]
    DimensionMismatch { data: usize, centroids: usize },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    #[error("plotting backend error: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl<E> From<DrawingAreaErrorKind<E>> for Error
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        Error::Plot(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
