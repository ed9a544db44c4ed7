//! Splitting a sample matrix into per-class buckets.
//!
//! Out-of-range labels are rejected: the first label outside
//! `[0, num_classes)` aborts the call with [`Error::LabelOutOfRange`] and no
//! partial result is produced.

use log::{debug, trace};
use ndarray::{Array2, ArrayBase, Axis, Data, Ix1, Ix2};

use crate::error::{Error, Result};

fn check_label(index: usize, label: usize, num_classes: usize) -> Result<usize> {
    if label < num_classes {
        Ok(label)
    } else {
        Err(Error::LabelOutOfRange {
            index,
            label,
            num_classes,
        })
    }
}

fn check_shape(samples: usize, labels: usize, num_classes: usize) -> Result<()> {
    if samples != labels {
        return Err(Error::ShapeMismatch { samples, labels });
    }
    if num_classes == 0 {
        return Err(Error::EmptyClassRange);
    }
    Ok(())
}

/// Groups the rows of `samples` by their label.
///
/// Returns exactly `num_classes` buckets; bucket `c` holds every row labelled
/// `c`, in input order. Classes without rows yield a `(0, n_features)` bucket.
pub fn partition<S, L, A>(
    samples: &ArrayBase<S, Ix2>,
    labels: &ArrayBase<L, Ix1>,
    num_classes: usize,
) -> Result<Vec<Array2<A>>>
where
    S: Data<Elem = A>,
    L: Data<Elem = usize>,
    A: Clone,
{
    let n_samples = samples.len_of(Axis(0));
    let n_features = samples.len_of(Axis(1));
    check_shape(n_samples, labels.len(), num_classes)?;

    let mut data: Vec<Vec<A>> = vec![Vec::new(); num_classes];
    let mut counts = vec![0usize; num_classes];
    for (i, (row, &label)) in samples.axis_iter(Axis(0)).zip(labels.iter()).enumerate() {
        let class = check_label(i, label, num_classes)?;
        data[class].extend(row.iter().cloned());
        counts[class] += 1;
    }
    trace!("partition counts: {:?}", counts);

    let buckets = data
        .into_iter()
        .zip(counts)
        .map(|(rows, count)| Array2::from_shape_vec((count, n_features), rows))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    debug!(
        "partitioned {} samples of width {} into {} classes",
        n_samples, n_features, num_classes
    );
    Ok(buckets)
}

/// Same as [`partition`], for samples held as plain nested vectors.
pub fn partition_rows<T: Clone>(
    samples: &[Vec<T>],
    labels: &[usize],
    num_classes: usize,
) -> Result<Vec<Vec<Vec<T>>>> {
    check_shape(samples.len(), labels.len(), num_classes)?;

    let mut buckets: Vec<Vec<Vec<T>>> = vec![Vec::new(); num_classes];
    for (i, (row, &label)) in samples.iter().zip(labels).enumerate() {
        let class = check_label(i, label, num_classes)?;
        buckets[class].push(row.clone());
    }
    Ok(buckets)
}

/// Number of labels falling into each class.
pub fn class_counts<L>(labels: &ArrayBase<L, Ix1>, num_classes: usize) -> Result<Vec<usize>>
where
    L: Data<Elem = usize>,
{
    if num_classes == 0 {
        return Err(Error::EmptyClassRange);
    }
    let mut counts = vec![0; num_classes];
    for (i, &label) in labels.iter().enumerate() {
        counts[check_label(i, label, num_classes)?] += 1;
    }
    Ok(counts)
}
