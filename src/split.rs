//! Bucket arithmetic for splits.
//!
//! Pure sequence division: a two-way cut sized by a fractional ratio, and an
//! n-way round-robin deal. Both preserve input order inside each bucket;
//! shuffling (when wanted) happens upstream in the collector.

use crate::errors::DirShardError;

/// Accept a ratio in `[0.0, 1.0]`. The bounds are valid degenerate cases that
/// leave one bucket empty; NaN and out-of-range values are rejected.
pub fn validate_ratio(ratio: f64) -> Result<(), DirShardError> {
    if (0.0..=1.0).contains(&ratio) {
        Ok(())
    } else {
        Err(DirShardError::InvalidRatio(ratio))
    }
}

pub fn validate_parts(parts: usize) -> Result<(), DirShardError> {
    if parts >= 1 {
        Ok(())
    } else {
        Err(DirShardError::InvalidPartCount(parts))
    }
}

/// Number of items the first bucket receives: `floor(len * ratio)`.
pub fn ratio_count(len: usize, ratio: f64) -> Result<usize, DirShardError> {
    validate_ratio(ratio)?;
    Ok((len as f64 * ratio).floor() as usize)
}

/// Split `items` in two: the first `floor(len * ratio)` items keep their order
/// in the first bucket, the rest go to the second.
pub fn split_by_ratio<T>(mut items: Vec<T>, ratio: f64) -> Result<(Vec<T>, Vec<T>), DirShardError> {
    let cut = ratio_count(items.len(), ratio)?.min(items.len());
    let second = items.split_off(cut);
    Ok((items, second))
}

/// Deal `items` into `parts` buckets round-robin: position `i` lands in bucket
/// `i % parts`. Bucket sizes differ by at most one and sum to the input length.
pub fn split_round_robin<T>(items: Vec<T>, parts: usize) -> Result<Vec<Vec<T>>, DirShardError> {
    validate_parts(parts)?;
    let mut buckets: Vec<Vec<T>> = (0..parts)
        .map(|_| Vec::with_capacity(items.len() / parts + 1))
        .collect();
    for (i, item) in items.into_iter().enumerate() {
        buckets[i % parts].push(item);
    }
    Ok(buckets)
}
